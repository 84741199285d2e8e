use crate::domain::model::{OutputFormat, ResultSet};
use crate::utils::error::Result;
use std::io::Write;

/// Escapes the characters that would split a TSV field or record.
/// Backslash is escaped as well, so every escape decodes back to one character.
fn escape_tsv_field(value: &str) -> String {
    if !value.contains(['\\', '\t', '\n', '\r']) {
        return value.to_string();
    }

    let mut escaped = String::with_capacity(value.len() + 4);
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Header row (only when there is at least one row) followed by tab-separated values.
/// Tabs, line breaks and backslashes inside a value are written as `\t`, `\n`, `\r`, `\\`.
pub fn write_tsv<W: Write>(out: W, rows: &ResultSet) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(out);
    writer.write_record(rows.columns.iter().map(|c| escape_tsv_field(c)))?;
    for record in &rows.rows {
        writer.write_record(record.iter().map(|v| escape_tsv_field(v)))?;
    }
    writer.flush()?;
    Ok(())
}

/// `{"columns": [...], "rows": [[...], ...]}` on a single line.
pub fn write_json<W: Write>(mut out: W, rows: &ResultSet) -> Result<()> {
    serde_json::to_writer(&mut out, rows)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_rows<W: Write>(out: W, rows: &ResultSet, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Tsv => write_tsv(out, rows),
        OutputFormat::Json => write_json(out, rows),
    }
}
