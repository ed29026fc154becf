//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};

use crate::model::City;

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Human-readable outcome, always present
    pub message: String,

    /// Matching records, only for list-returning commands
    pub data: Option<Vec<City>>,
}

impl Response {
    /// A message-only response
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    /// A response carrying records
    pub fn with_data(message: impl Into<String>, data: Vec<City>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }

    /// Dispatch result for an unregistered name
    pub fn not_found() -> Self {
        Self::message("Command not found")
    }

    /// An error response
    pub fn error(message: &str) -> Self {
        Self::message(format!("Error: {}", message))
    }
}
