//! Withdrawal requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use super::{RecordId, RequestStatus, StatusUpdate, amount, check_amount, check_id};
use crate::api::ApiClient;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    #[serde(flatten)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "amount")]
    pub amount: f64,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWithdrawal {
    pub amount: f64,
    pub wallet_address: String,
    pub network: String,
}

pub struct Withdrawals<'a> {
    api: &'a ApiClient,
}

impl<'a> Withdrawals<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Submits a withdrawal request for review
    ///
    /// Whether the balance covers it is decided by the server.
    pub async fn create(&self, withdrawal: &NewWithdrawal) -> Result<Withdrawal> {
        check_amount(withdrawal.amount)?;
        if withdrawal.wallet_address.trim().is_empty() {
            return Err(Error::Validation("Wallet address is required"));
        }

        let withdrawal: Withdrawal = self.api.post("/withdrawal", withdrawal).await?;
        info!(withdrawal = %withdrawal.id, amount = withdrawal.amount, "Withdrawal requested");
        Ok(withdrawal)
    }

    /// Withdrawal requests of the logged-in user
    pub async fn mine(&self) -> Result<Vec<Withdrawal>> {
        self.api.get("/withdrawal").await
    }

    /// Every withdrawal request, admin only
    pub async fn all(&self) -> Result<Vec<Withdrawal>> {
        self.api.get("/admin/withdrawals").await
    }

    /// Approves or rejects a withdrawal, admin only
    pub async fn set_status(&self, id: &str, status: RequestStatus) -> Result<Withdrawal> {
        let path = format!("/admin/withdrawals/{}/status", check_id(id)?);
        let withdrawal: Withdrawal = self.api.patch(&path, &StatusUpdate { status }).await?;
        info!(withdrawal = %withdrawal.id, status = ?withdrawal.status, "Withdrawal reviewed");
        Ok(withdrawal)
    }
}
