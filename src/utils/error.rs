use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Not found: {key}")]
    NotFound { key: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mail delivery to {recipient} failed: {message}")]
    Transport { recipient: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

/// Coarse grouping used by callers to pick a response (not-found vs. fault).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Storage,
    Data,
    Transport,
    Configuration,
}

impl CatalogError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::FileNotFound { .. } | Self::Io(_) => ErrorCategory::Storage,
            Self::Deserialization(_) | Self::Csv(_) => ErrorCategory::Data,
            Self::Transport { .. } | Self::Http(_) => ErrorCategory::Transport,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NotFound { key } => format!("No whisky matches '{}'", key),
            Self::FileNotFound { path } => {
                format!("Catalog file '{}' does not exist", path)
            }
            Self::Deserialization(_) | Self::Csv(_) => {
                format!("Catalog data is malformed: {}", self)
            }
            Self::Transport { .. } | Self::Http(_) => {
                format!("Notification could not be delivered: {}", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
