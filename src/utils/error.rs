use thiserror::Error;

/// 單一欄位轉換失敗的原因
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("cannot convert {value} to an integer")]
    NotAnInteger { value: String },

    #[error("cannot convert {value} to a float")]
    NotAFloat { value: String },

    #[error("expected a string, got {value}")]
    NotAString { value: String },

    #[error("'{value}' does not match date format '{format}': {source}")]
    InvalidDate {
        value: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Request to {url} failed: {message}")]
    RequestError { url: String, message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("{resource} not found: {message}")]
    NotFoundError { resource: String, message: String },

    #[error("Record {record_index} is missing field '{field}'")]
    MissingFieldError { field: String, record_index: usize },

    #[error("Transform of field '{field}' failed in record {record_index}: {source}")]
    TransformError {
        field: String,
        record_index: usize,
        #[source]
        source: ConversionError,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::RequestError { .. } | EtlError::ApiError(_) => ErrorSeverity::Medium,
            EtlError::NotFoundError { .. }
            | EtlError::MissingFieldError { .. }
            | EtlError::TransformError { .. }
            | EtlError::ValidationError { .. }
            | EtlError::SerializationError(_) => ErrorSeverity::High,
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// 與單筆記錄相關的錯誤所在的索引
    pub fn record_index(&self) -> Option<usize> {
        match self {
            EtlError::MissingFieldError { record_index, .. }
            | EtlError::TransformError { record_index, .. } => Some(*record_index),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::RequestError { .. } | EtlError::ApiError(_) => {
                "Check network connectivity, the base URL and the form id / API key pair"
            }
            EtlError::NotFoundError { .. } => {
                "Make sure the form has at least one published version, or pass --version"
            }
            EtlError::MissingFieldError { .. } => {
                "Remove the field from the mapping or fix the input records"
            }
            EtlError::TransformError { .. } => {
                "Check the transform declared for the field, or use --on-error skip-record"
            }
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => "Review the command line flags and mapping file",
            EtlError::ValidationError { .. } | EtlError::SerializationError(_) => {
                "Input must be a JSON document of the form {\"data\": [ {...}, ... ]}"
            }
            EtlError::IoError(_) => "Check that the file exists and is readable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::RequestError { url, .. } => format!("Could not fetch {}", url),
            EtlError::ApiError(e) => format!("Could not reach the forms API: {}", e),
            EtlError::MissingFieldError {
                field,
                record_index,
            } => format!("Record #{} has no field named '{}'", record_index, field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
