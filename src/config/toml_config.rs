use crate::domain::model::OutputFormat;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, ShopError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Upper bound accepted for `database.busy_timeout_ms`.
pub const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: Option<String>,
    pub busy_timeout_ms: Option<u64>,
    pub create_schema: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ShopError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ShopError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SHOP_DATABASE})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(path) = &self.database.path {
            validation::validate_path("database.path", path)?;
            if env_var_pattern().is_match(path) {
                return Err(ShopError::InvalidConfigValueError {
                    field: "database.path".to_string(),
                    value: path.clone(),
                    reason: "references an environment variable that is not set".to_string(),
                });
            }
        }

        if let Some(timeout) = self.database.busy_timeout_ms {
            validation::validate_range("database.busy_timeout_ms", timeout, 0, MAX_BUSY_TIMEOUT_MS)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn database_path(&self) -> Option<&str> {
        self.database.path.as_deref()
    }

    fn busy_timeout_ms(&self) -> Option<u64> {
        self.database.busy_timeout_ms
    }

    fn create_schema(&self) -> Option<bool> {
        self.database.create_schema
    }

    fn output_format(&self) -> Option<OutputFormat> {
        self.output.format
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
