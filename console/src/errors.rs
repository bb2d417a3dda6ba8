use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConsoleError {
    // Network / backend errors
    NetworkError(String),
    ConnectionTimeout,
    InvalidResponse(String),
    Backend { status: u16, message: String },
    Unauthorized(String),

    // Storage errors
    StorageError(String),
    FileNotFound(String),
    PermissionDenied(String),

    // Local validation errors
    ValidationError(String),
    InvalidMoniker(String),
    InvalidCommission(String),
    InvalidStake(String),

    // Flow errors
    InstallFailed { component: String, reason: String },
    NoWallets,
    NotFound(String),
    Busy(String),
    Unsupported(String),

    // Generic errors
    Unknown(String),
}

impl ConsoleError {
    /// Errors raised before any backend call was attempted.
    pub fn is_local_validation(&self) -> bool {
        matches!(
            self,
            ConsoleError::ValidationError(_)
                | ConsoleError::InvalidMoniker(_)
                | ConsoleError::InvalidCommission(_)
                | ConsoleError::InvalidStake(_)
                | ConsoleError::NoWallets
        )
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ConsoleError::Unauthorized(_))
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConsoleError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ConsoleError::ConnectionTimeout => write!(f, "Connection timeout"),
            ConsoleError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            // Backend messages are shown to the operator as-is.
            ConsoleError::Backend { message, .. } => write!(f, "{}", message),
            ConsoleError::Unauthorized(msg) => write!(f, "{}", msg),

            ConsoleError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            ConsoleError::FileNotFound(msg) => write!(f, "File not found: {}", msg),
            ConsoleError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),

            ConsoleError::ValidationError(msg) => write!(f, "{}", msg),
            ConsoleError::InvalidMoniker(msg) => write!(f, "Invalid moniker: {}", msg),
            ConsoleError::InvalidCommission(msg) => write!(f, "Invalid commission: {}", msg),
            ConsoleError::InvalidStake(msg) => write!(f, "Invalid stake: {}", msg),

            ConsoleError::InstallFailed { component, reason } => {
                write!(f, "Failed to install {}: {}", component, reason)
            }
            ConsoleError::NoWallets => write!(
                f,
                "No wallets found. Create or import one in wallet management first"
            ),
            ConsoleError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ConsoleError::Busy(action) => write!(f, "{} is already in progress", action),
            ConsoleError::Unsupported(msg) => write!(f, "Not supported: {}", msg),

            ConsoleError::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for ConsoleError {}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

// Conversion helpers
impl From<std::io::Error> for ConsoleError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => ConsoleError::FileNotFound(error.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                ConsoleError::PermissionDenied(error.to_string())
            }
            _ => ConsoleError::StorageError(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(error: serde_json::Error) -> Self {
        ConsoleError::InvalidResponse(format!("JSON error: {}", error))
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ConsoleError::ConnectionTimeout
        } else if error.is_decode() {
            ConsoleError::InvalidResponse(format!("Failed to parse response: {}", error))
        } else {
            ConsoleError::NetworkError(format!("HTTP request failed: {}", error))
        }
    }
}
