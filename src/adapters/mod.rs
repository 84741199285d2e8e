// Adapters layer: concrete implementations of the domain ports (SQLite store, terminal console, rendering).

pub mod console;
pub mod render;
pub mod sqlite_store;

pub use console::TerminalConsole;
pub use sqlite_store::{SqliteStore, StoreOptions};
