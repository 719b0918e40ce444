//! Client errors

use reqwest::StatusCode;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum Error {
    /// Request never produced an HTTP response
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status. The message is the one sent by the server, so
    /// it can be displayed as-is.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("Malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response from {path} is missing {field}")]
    Incomplete { path: String, field: &'static str },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Your account has been suspended. Please contact support.")]
    Suspended,

    #[error("Invalid admin credentials")]
    InvalidAdminCredentials,

    #[error("{0}")]
    Validation(&'static str),
}

impl Error {
    /// HTTP status of a server-side rejection
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
