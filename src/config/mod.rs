pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::OutputFormat;
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "mechanic-shop")]
#[command(about = "Interactive shop-management tool for an auto-repair business")]
pub struct CliConfig {
    /// SQLite database file (falls back to the config file, then $SHOP_DATABASE)
    pub database: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// How report rows are printed
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Do not create missing tables on startup
    #[arg(long)]
    pub no_schema: bool,

    /// Milliseconds to wait on a locked database
    #[arg(long)]
    pub busy_timeout_ms: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn database_path(&self) -> Option<&str> {
        self.database.as_deref()
    }

    fn busy_timeout_ms(&self) -> Option<u64> {
        self.busy_timeout_ms
    }

    fn create_schema(&self) -> Option<bool> {
        // 沒指定 --no-schema 時交給下一層決定
        self.no_schema.then_some(false)
    }

    fn output_format(&self) -> Option<OutputFormat> {
        self.format
    }
}
