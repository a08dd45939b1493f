//! Error types for task service calls.

use thiserror::Error;

/// Errors that can occur while talking to the task service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Non-2xx response carrying a JSON `{error}` body; shown verbatim.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the response body.
        message: String,
    },

    /// Non-2xx response without a readable error body.
    #[error("Request failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Connection, timeout or protocol failure.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Base URL cannot carry path segments.
    #[error("Invalid service URL: {0}")]
    Url(String),
}

impl ServiceError {
    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Status { status } => Some(*status),
            Self::Transport(_) | Self::Decode(_) | Self::Url(_) => None,
        }
    }
}
