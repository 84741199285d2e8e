use crate::domain::model::{OutputFormat, ResultSet, Statement};
use crate::utils::error::Result;

/// The relational store behind the shop. Every statement arrives parameterized.
pub trait DataStore {
    /// Runs a mutation and returns the number of affected rows.
    fn execute(&self, statement: &Statement) -> Result<usize>;

    /// Number of rows a read query yields; used for existence checks.
    fn count(&self, statement: &Statement) -> Result<usize>;

    fn query(&self, statement: &Statement) -> Result<ResultSet>;

    /// Current value of the store's native counter for `sequence`, if it has been used.
    fn current_sequence_value(&self, sequence: &str) -> Result<Option<i64>>;

    /// Runs `work` as one serialized unit: committed on `Ok`, rolled back on `Err`.
    fn atomically<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
        Self: Sized;

    fn exists(&self, statement: &Statement) -> Result<bool> {
        Ok(self.count(statement)? > 0)
    }
}

/// Line-oriented operator terminal.
pub trait Console {
    /// Shows `prompt` and reads one line without its line terminator. `None` means input ended.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    fn say(&mut self, message: &str) -> Result<()>;

    /// Reports why the last entry was rejected.
    fn warn(&mut self, reason: &str) -> Result<()>;

    fn render(&mut self, rows: &ResultSet) -> Result<()>;
}

/// One layer of settings (command line, config file). `None` defers to the next layer.
pub trait ConfigProvider {
    fn database_path(&self) -> Option<&str>;
    fn busy_timeout_ms(&self) -> Option<u64>;
    fn create_schema(&self) -> Option<bool>;
    fn output_format(&self) -> Option<OutputFormat>;
}
