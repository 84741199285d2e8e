use crate::adapters::render;
use crate::domain::model::{OutputFormat, ResultSet};
use crate::domain::ports::Console;
use crate::utils::error::Result;
use std::io::{BufRead, Write};

/// Line-oriented console over any reader/writer pair (stdin/stdout in the binary,
/// in-memory buffers in tests).
pub struct TerminalConsole<R: BufRead, W: Write> {
    reader: R,
    writer: W,
    format: OutputFormat,
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    pub fn new(reader: R, writer: W, format: OutputFormat) -> Self {
        Self {
            reader,
            writer,
            format,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: BufRead, W: Write> Console for TerminalConsole<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        // 只去掉換行，其餘空白保留原樣
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{}", message)?;
        Ok(())
    }

    fn warn(&mut self, reason: &str) -> Result<()> {
        writeln!(self.writer, "{}", reason)?;
        Ok(())
    }

    fn render(&mut self, rows: &ResultSet) -> Result<()> {
        render::write_rows(&mut self.writer, rows, self.format)?;
        self.writer.flush()?;
        Ok(())
    }
}
