//! Local persistence of client state
//!
//! Mirrors the browser local storage: a flat string to string map. The session store keeps the
//! user token and profile there, admin authentication keeps its token and login time.

use thiserror::Error;

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Well known storage keys
pub mod keys {
    /// User bearer token
    pub const AUTH_TOKEN: &str = "authToken";
    /// JSON-encoded user profile
    pub const USER: &str = "user";
    /// Admin bearer token
    pub const ADMIN_AUTH_TOKEN: &str = "adminAuthToken";
    /// RFC3339 timestamp of the admin login
    pub const ADMIN_AUTH_TIME: &str = "adminAuthTime";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupted storage file: {0}")]
    Corrupted(#[from] serde_json::Error),
}

/// Key-value backend for the client state
///
/// Operations are synchronous like the browser API they replace. Removing a missing key is not
/// an error.
pub trait Storage: Send + Sync {
    /// Reads a value
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value, replacing the previous one
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a value
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
