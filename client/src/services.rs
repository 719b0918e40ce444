//! Endpoint wrappers
//!
//! Records returned here are opaque to the client: all validation and state changes happen on the
//! server. Each record keeps the fields the client shows, plus every unknown field in `extra`.
//! Requests fail early, without a round-trip, only on the checks the forms did client side.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize};

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::profile::lenient_number;

pub mod cron;
pub mod deposits;
pub mod pairs;
pub mod profit_rules;
pub mod users;
pub mod withdrawals;

pub use cron::{CronSettings, CronSettingsService};
pub use deposits::{Deposit, Deposits, NewDeposit};
pub use pairs::{NewPair, Pair, Pairs};
pub use profit_rules::{NewProfitRule, ProfitRule, ProfitRules};
pub use users::AdminUsers;
pub use withdrawals::{NewWithdrawal, Withdrawal, Withdrawals};

/// Review state of deposit and withdrawal requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// Server id of a record
///
/// Sent as `_id`, as `id`, or as both when the backend serializes virtuals. `_id` wins. Records
/// carry it flattened, so neither key ends up in their `extra` fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawRecordId")]
pub struct RecordId(String);

#[derive(Deserialize)]
struct RawRecordId {
    #[serde(rename = "_id", default)]
    mongo_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

impl From<RawRecordId> for RecordId {
    fn from(raw: RawRecordId) -> Self {
        Self(raw.mongo_id.or(raw.id).unwrap_or_default())
    }
}

impl Deref for RecordId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl PartialEq<str> for RecordId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RecordId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Body of status changing requests
#[derive(Debug, Serialize)]
struct StatusUpdate<T> {
    status: T,
}

/// Rejects amounts no form would let through
fn check_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Error::Validation("Amount must be a positive number"))
    }
}

/// Rejects ids which would change the request path
fn check_id(id: &str) -> Result<&str> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        Err(Error::Validation("Invalid record id"))
    } else {
        Ok(id)
    }
}

/// Numeric field defaulting to zero when missing or malformed
fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_number(deserializer).map(Option::unwrap_or_default)
}

impl ApiClient {
    /// Deposit requests of the logged-in user, and their review by the admin
    pub fn deposits(&self) -> Deposits<'_> {
        Deposits::new(self)
    }

    /// Withdrawal requests of the logged-in user, and their review by the admin
    pub fn withdrawals(&self) -> Withdrawals<'_> {
        Withdrawals::new(self)
    }

    /// Trading pairs
    pub fn pairs(&self) -> Pairs<'_> {
        Pairs::new(self)
    }

    /// Profit rules, admin only
    pub fn profit_rules(&self) -> ProfitRules<'_> {
        ProfitRules::new(self)
    }

    /// User management, admin only
    pub fn admin_users(&self) -> AdminUsers<'_> {
        AdminUsers::new(self)
    }

    /// Scheduler settings, admin only
    pub fn cron_settings(&self) -> CronSettingsService<'_> {
        CronSettingsService::new(self)
    }
}
