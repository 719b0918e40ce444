//! Client library of the ALGO-trading platform
//!
//! Everything here is glue around the platform REST API: the [`ApiClient`] talking to it, the
//! [`SessionStore`] holding the logged-in user, the [`Storage`] the session survives restarts in,
//! and typed wrappers for the remaining endpoints in [`services`]. All business rules (balances,
//! profits, approvals) live on the server.

pub mod admin;
pub mod api;
pub mod error;
pub mod profile;
pub mod services;
pub mod session;
pub mod storage;

#[cfg(test)]
mod mock;

pub use admin::AdminAuth;
pub use api::{ApiClient, ApiConfig};
pub use error::{Error, Result};
pub use profile::{AccountStatus, Profile, ProfitStats};
pub use session::{AiToggle, Session, SessionState, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage};
