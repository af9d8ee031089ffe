use serde::{Deserialize, Serialize};

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Configuration (1xxx)
    ConfigurationError = 1001,

    // Resource Not Found (2xxx)
    NotFound = 2001,

    // Access (3xxx)
    PermissionDenied = 3001,

    // Data (4xxx)
    DataError = 4001,

    // Infrastructure & automation (5xxx)
    InfrastructureError = 5001,
    AutomationTimeout = 5002,
    AutomationAborted = 5003,

    // Validation (6xxx)
    ValidationError = 6001,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::NotFound | ErrorCode::ValidationError | ErrorCode::AutomationAborted => {
                ErrorSeverity::Info
            }

            ErrorCode::AutomationTimeout => ErrorSeverity::Warning,

            ErrorCode::ConfigurationError
            | ErrorCode::PermissionDenied
            | ErrorCode::DataError
            | ErrorCode::InfrastructureError => ErrorSeverity::Error,
        }
    }

    /// Whether the operator can simply try again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::InfrastructureError
                | ErrorCode::AutomationTimeout
                | ErrorCode::AutomationAborted
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Automation timed out: {0}")]
    AutomationTimeout(String),

    #[error("Automation aborted: {0}")]
    AutomationAborted(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Configuration(_) => ErrorCode::ConfigurationError,
            DomainError::NotFound(_) => ErrorCode::NotFound,
            DomainError::Permission(_) => ErrorCode::PermissionDenied,
            DomainError::Data(_) => ErrorCode::DataError,
            DomainError::AutomationTimeout(_) => ErrorCode::AutomationTimeout,
            DomainError::AutomationAborted(_) => ErrorCode::AutomationAborted,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
        }
    }

    /// Get error message
    pub fn message(&self) -> &str {
        match self {
            DomainError::Configuration(msg)
            | DomainError::NotFound(msg)
            | DomainError::Permission(msg)
            | DomainError::Data(msg)
            | DomainError::AutomationTimeout(msg)
            | DomainError::AutomationAborted(msg)
            | DomainError::Validation(msg)
            | DomainError::Infrastructure(msg) => msg,
        }
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}
