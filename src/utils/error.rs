use thiserror::Error;

/// A single field failed its constraint. Recovered by re-prompting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} has to be between {min}-{max} characters long")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("{field} must be a whole number")]
    NotANumber { field: &'static str },

    #[error("{field} must be at least {min}")]
    BelowMinimum {
        field: &'static str,
        min: i64,
        actual: i64,
    },

    #[error("{field} must be a date in the format YYYY-MM-DD")]
    MalformedDate { field: &'static str },
}

/// A looked-up identifier is missing, taken, or in the wrong state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("{entity} {key} does not exist")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} {key} already exists")]
    AlreadyExists { entity: &'static str, key: String },

    #[error("Service request {rid} is already closed by work order {wid}")]
    AlreadyClosed { rid: i64, wid: i64 },
}

impl ReferenceError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        ReferenceError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn already_exists(entity: &'static str, key: impl ToString) -> Self {
        ReferenceError::AlreadyExists {
            entity,
            key: key.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ShopError {
    #[error("Database error: {0}")]
    StoreError(#[from] rusqlite::Error),

    #[error("Unable to connect to database '{location}': {source}")]
    ConnectionError {
        location: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Rendering error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("{0}")]
    ReferenceError(#[from] ReferenceError),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Input stream closed")]
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Reference,
    Store,
    Connection,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code used by the binaries.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl ShopError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ShopError::ValidationError(_) | ShopError::InputClosed => ErrorCategory::Input,
            ShopError::ReferenceError(_) => ErrorCategory::Reference,
            ShopError::StoreError(_) | ShopError::ProcessingError { .. } => ErrorCategory::Store,
            ShopError::ConnectionError { .. } => ErrorCategory::Connection,
            ShopError::ConfigValidationError { .. }
            | ShopError::InvalidConfigValueError { .. }
            | ShopError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ShopError::IoError(_) | ShopError::SerializationError(_) | ShopError::CsvError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ShopError::ValidationError(_)
            | ShopError::ReferenceError(_)
            | ShopError::InputClosed => ErrorSeverity::Low,
            ShopError::StoreError(_) | ShopError::ProcessingError { .. } => ErrorSeverity::Medium,
            ShopError::ConfigValidationError { .. }
            | ShopError::InvalidConfigValueError { .. }
            | ShopError::MissingConfigError { .. }
            | ShopError::IoError(_)
            | ShopError::SerializationError(_)
            | ShopError::CsvError(_) => ErrorSeverity::High,
            ShopError::ConnectionError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ShopError::StoreError(e) => format!("The database rejected the operation: {}", e),
            ShopError::ConnectionError { location, .. } => {
                format!("Unable to connect to database '{}'", location)
            }
            ShopError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            ShopError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value for '{}' is invalid: {}", field, reason)
            }
            ShopError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            ShopError::InputClosed => "Input ended before the operation finished".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Re-enter the value in the requested format",
            ErrorCategory::Reference => "Check the identifier and try again",
            ErrorCategory::Store => {
                "Check the entered values against existing records and retry the operation"
            }
            ErrorCategory::Connection => {
                "Make sure the database path exists and is writable, or pass a different path"
            }
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    /// Errors that should re-prompt the current field instead of aborting.
    pub fn is_recoverable_input(&self) -> bool {
        matches!(
            self,
            ShopError::ValidationError(_) | ShopError::ReferenceError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
