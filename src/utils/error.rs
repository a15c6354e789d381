use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckinError {
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    #[error("Unexpected response: {message}")]
    ProtocolError { message: String },
}

/// 錯誤分類，對應批次執行器的處理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Network,
    Protocol,
}

impl CheckinError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthenticationError {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::IoError(_) => ErrorCategory::Configuration,
            Self::AuthenticationError { .. } => ErrorCategory::Authentication,
            Self::NetworkError(_) => ErrorCategory::Network,
            Self::SerializationError(_) | Self::ProtocolError { .. } => ErrorCategory::Protocol,
        }
    }

    /// Only configuration problems stop the process.
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingConfigError { field } => format!("{} is not set", field),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("{} is invalid: {}", field, reason)
            }
            Self::ConfigError { message } => message.clone(),
            Self::IoError(e) => format!("Could not read configuration: {}", e),
            Self::AuthenticationError { message } => format!("Login rejected: {}", message),
            Self::NetworkError(e) if e.is_timeout() => "Request timed out".to_string(),
            Self::NetworkError(e) => format!("Network failure: {}", e),
            Self::SerializationError(_) | Self::ProtocolError { .. } => {
                format!("Service returned an unexpected response: {}", self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the accounts environment variable and the --config file"
            }
            ErrorCategory::Authentication => "Refresh the account's cookie or password",
            ErrorCategory::Network => "Check connectivity; the next scheduled run will try again",
            ErrorCategory::Protocol => "The service API may have changed; inspect the logged body",
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckinError>;
