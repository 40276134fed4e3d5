use thiserror::Error;

#[derive(Error, Debug)]
pub enum DateRangeError {
    #[error("Validation error: {message}")]
    ValidationError {
        index: Option<usize>,
        message: String,
    },

    #[error("Invalid date range: {start} is after {end}")]
    InvalidRangeError { start: String, end: String },

    #[error("Range with code '{code}' already exists")]
    DuplicateCodeError { code: String },

    #[error("Range with code '{code}' not found")]
    NotFoundError { code: String },

    #[error("Host calendar error: {message}")]
    HostError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Conflict,
    Host,
    Config,
    Io,
}

impl DateRangeError {
    /// 建立不帶索引的驗證錯誤
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            index: None,
            message: message.into(),
        }
    }

    /// 建立指向批次中第 `index` 筆的驗證錯誤
    pub fn validation_at(index: usize, message: impl Into<String>) -> Self {
        Self::ValidationError {
            index: Some(index),
            message: format!("Range at index {}: {}", index, message.into()),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::InvalidRangeError { .. } => ErrorCategory::Input,
            Self::DuplicateCodeError { .. } | Self::NotFoundError { .. } => ErrorCategory::Conflict,
            Self::HostError { .. } => ErrorCategory::Host,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Config
            }
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorCategory::Io
            }
        }
    }

    /// Host failures are reported through the error event and never leave
    /// the plugin in a broken state.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Host | ErrorCategory::Conflict)
    }
}

pub type Result<T> = std::result::Result<T, DateRangeError>;
