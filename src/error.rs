//! Error types for CityVault
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using CityError
pub type Result<T> = std::result::Result<T, CityError>;

/// Unified error type for CityVault operations
#[derive(Debug, Error)]
pub enum CityError {
    // -------------------------------------------------------------------------
    // Domain Errors (always turned into a Response by command handlers)
    // -------------------------------------------------------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No element with key {0}")]
    NotFound(i32),

    #[error("Key {0} already exists")]
    DuplicateKey(i32),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server unavailable after {attempts} attempts")]
    Unreachable { attempts: u32 },

    #[error("Connection restored, resubmit the last command")]
    Reconnected,

    #[error("Session interrupted")]
    Interrupted,

    #[error("Not connected")]
    NotConnected,

    // -------------------------------------------------------------------------
    // Startup Errors
    // -------------------------------------------------------------------------
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CityError {
    /// Whether this error came from the byte stream rather than the domain
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CityError::Io(_) | CityError::Serialization(_) | CityError::Protocol(_)
        )
    }
}

impl From<bincode::Error> for CityError {
    fn from(err: bincode::Error) -> Self {
        match *err {
            bincode::ErrorKind::Io(io) => CityError::Io(io),
            bincode::ErrorKind::SizeLimit => {
                CityError::Protocol("message exceeds size limit".to_string())
            }
            other => CityError::Serialization(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CityError {
    fn from(err: serde_json::Error) -> Self {
        CityError::Snapshot(err.to_string())
    }
}
