use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Rules file error: {0}")]
    RulesParseError(#[from] toml::de::Error),

    #[error("Signing error: {0}")]
    SigningError(#[from] openssl::error::ErrorStack),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Authentication error: {message}")]
    AuthError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("DNS lookup failed for {domain}: {message}")]
    LookupError { domain: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::RulesParseError(_) => ErrorCategory::Configuration,
            EtlError::ApiError(_) | EtlError::LookupError { .. } | EtlError::AuthError { .. } => {
                ErrorCategory::Network
            }
            EtlError::StorageError { .. } => ErrorCategory::Storage,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) | EtlError::SigningError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::LookupError { .. } => ErrorSeverity::Low,
            EtlError::ApiError(_) | EtlError::StorageError { .. } => ErrorSeverity::Medium,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::RulesParseError(_)
            | EtlError::AuthError { .. } => ErrorSeverity::High,
            EtlError::IoError(_) | EtlError::SigningError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check GCS_BUCKET, INPUT_CSV and the command line flags"
            }
            ErrorCategory::Network => {
                "Check network access to the resolver and credentials, then retry"
            }
            ErrorCategory::Storage => {
                "Verify the bucket and object exist and the service account can read and write them"
            }
            ErrorCategory::Data => "Make sure the input is a UTF-8 CSV file with a header row",
            ErrorCategory::System => {
                "Check file permissions, free disk space and the credentials file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingConfigError { field } => {
                format!("Missing {}. Set it via flag or environment variable.", field)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid {}: {}", field, reason)
            }
            EtlError::StorageError { message } => format!("Cloud storage failed: {}", message),
            EtlError::AuthError { message } => format!("Could not authenticate: {}", message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

/// Process exit code for a failed run: warnings succeed, retryable failures exit 2.
pub fn exit_code(error: &EtlError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
