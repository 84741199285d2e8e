use crate::adapters::sqlite_store::{StoreOptions, DEFAULT_BUSY_TIMEOUT_MS};
use crate::config::toml_config::MAX_BUSY_TIMEOUT_MS;
use crate::domain::model::OutputFormat;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::time::Duration;

/// Environment variable consulted when no layer names a database.
pub const DATABASE_ENV_VAR: &str = "SHOP_DATABASE";
pub const DEFAULT_DATABASE_PATH: &str = "mechanic_shop.db";

/// Settings after merging every configuration layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopSettings {
    pub database_path: String,
    pub busy_timeout_ms: u64,
    pub create_schema: bool,
    pub output_format: OutputFormat,
}

impl ShopSettings {
    /// Merges `layers` in priority order (first `Some` wins), then `$SHOP_DATABASE`, then defaults.
    pub fn resolve(layers: &[&dyn ConfigProvider]) -> Self {
        Self::resolve_with_env(layers, std::env::var(DATABASE_ENV_VAR).ok())
    }

    fn resolve_with_env(layers: &[&dyn ConfigProvider], env_database: Option<String>) -> Self {
        let database_path = layers
            .iter()
            .find_map(|l| l.database_path().map(str::to_string))
            .or(env_database)
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        Self {
            database_path,
            busy_timeout_ms: layers
                .iter()
                .find_map(|l| l.busy_timeout_ms())
                .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
            create_schema: layers
                .iter()
                .find_map(|l| l.create_schema())
                .unwrap_or(true),
            output_format: layers
                .iter()
                .find_map(|l| l.output_format())
                .unwrap_or_default(),
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            create_schema: self.create_schema,
            read_only: false,
        }
    }
}

impl Validate for ShopSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("database.path", &self.database_path)?;
        validation::validate_path("database.path", &self.database_path)?;
        validation::validate_range(
            "database.busy_timeout_ms",
            self.busy_timeout_ms,
            0,
            MAX_BUSY_TIMEOUT_MS,
        )
    }
}
