//! Admin console authentication
//!
//! PLACEHOLDER, NOT REAL AUTHENTICATION. The credential pair is compiled into the client and the
//! resulting bearer token is a fixed string, so anyone holding the binary can act as the
//! administrator. It exists only to keep the admin console usable until the backend exposes an
//! admin login; the server must not treat this token as proof of anything.

use std::sync::Arc;

use base64::prelude::*;
use chrono::{DateTime, TimeDelta, Utc};
use sha3::{Digest, Sha3_256};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::{Storage, keys};

/// Hardcoded admin login
const ADMIN_EMAIL: &str = "admin@algotrade.io";

/// Base64 of the SHA3-256 digest of the hardcoded admin password
const ADMIN_PASSWORD_SHA3: &str = "zTY1YhVTTFazOOGNGWZcu1tyqV9ElvB5ZzPZK4S+GIQ=";

/// Fixed bearer token sent on admin requests
pub const ADMIN_TOKEN: &str = "admin-static-token";

/// How long an admin login stays valid
const ADMIN_SESSION_HOURS: i64 = 24;

/// Admin login state kept in the client storage
#[derive(Clone)]
pub struct AdminAuth {
    storage: Arc<dyn Storage>,
}

impl AdminAuth {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Checks the credentials and stores the admin token with the login time
    pub fn login(&self, email: &str, password: &str) -> Result<()> {
        self.login_at(email, password, Utc::now())
    }

    fn login_at(&self, email: &str, password: &str, now: DateTime<Utc>) -> Result<()> {
        let digest = BASE64_STANDARD.encode(Sha3_256::digest(password.as_bytes()));
        if !email.trim().eq_ignore_ascii_case(ADMIN_EMAIL) || digest != ADMIN_PASSWORD_SHA3 {
            info!(email, "Rejected admin login");
            return Err(Error::InvalidAdminCredentials);
        }

        warn!("Admin logged in with the built-in placeholder credentials");
        self.storage.set(keys::ADMIN_AUTH_TOKEN, ADMIN_TOKEN)?;
        self.storage
            .set(keys::ADMIN_AUTH_TIME, &now.to_rfc3339())?;
        Ok(())
    }

    /// Removes the admin token
    pub fn logout(&self) -> Result<()> {
        self.storage.remove(keys::ADMIN_AUTH_TOKEN)?;
        self.storage.remove(keys::ADMIN_AUTH_TIME)?;
        info!("Admin logged out");
        Ok(())
    }

    /// An admin login exists and is not older than a day
    ///
    /// Stale or malformed entries are removed.
    pub fn is_authenticated(&self) -> Result<bool> {
        self.is_authenticated_at(Utc::now())
    }

    fn is_authenticated_at(&self, now: DateTime<Utc>) -> Result<bool> {
        let token = self.storage.get(keys::ADMIN_AUTH_TOKEN)?;
        let time = self.storage.get(keys::ADMIN_AUTH_TIME)?;

        let (Some(_), Some(time)) = (token, time) else {
            return Ok(false);
        };

        let valid = DateTime::parse_from_rfc3339(&time)
            .map(|time| now - time.with_timezone(&Utc) < TimeDelta::hours(ADMIN_SESSION_HOURS))
            .unwrap_or(false);

        if !valid {
            debug!("Admin session expired");
            self.logout()?;
        }
        Ok(valid)
    }

    /// When the admin logged in
    pub fn logged_in_at(&self) -> Result<Option<DateTime<Utc>>> {
        let time = self.storage.get(keys::ADMIN_AUTH_TIME)?;
        Ok(time
            .and_then(|time| DateTime::parse_from_rfc3339(&time).ok())
            .map(|time| time.with_timezone(&Utc)))
    }
}
