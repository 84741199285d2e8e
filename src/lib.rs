pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{SqliteStore, StoreOptions, TerminalConsole};
pub use config::{settings::ShopSettings, toml_config::TomlConfig};
pub use core::{
    lifecycle::{RequestState, ServiceRequestLifecycle},
    query_builder::QueryBuilder,
    reports::{Report, ReportEngine},
    shop::{Operation, Shop},
};
pub use utils::error::{Result, ShopError};
