//! Error types for actions and configuration

use std::io;
use std::path::PathBuf;

use mintshop_store::{TaskPanicked, TransportError};
use thiserror::Error;

/// Why an action did not commit
#[derive(Debug, Error)]
pub enum ActionError {
    /// The call never produced an envelope
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service answered with a non-zero code
    #[error("request rejected with code {code}: {message}")]
    Business { code: i64, message: String },

    /// `data` did not have the shape the action expects
    #[error("malformed payload for {action}")]
    Payload {
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The in-flight call was aborted before it completed
    #[error("action cancelled")]
    Cancelled,

    /// The task running the call panicked
    #[error(transparent)]
    Panicked(#[from] TaskPanicked),
}

impl ActionError {
    /// Service code of a business failure
    pub fn code(&self) -> Option<i64> {
        match self {
            ActionError::Business { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
