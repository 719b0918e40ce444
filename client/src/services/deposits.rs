//! Deposit requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use super::{RecordId, RequestStatus, StatusUpdate, amount, check_amount, check_id};
use crate::api::ApiClient;
use crate::error::Result;

/// Deposit request as listed by the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    #[serde(flatten)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "amount")]
    pub amount: f64,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deposit request to submit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeposit {
    pub amount: f64,
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

pub struct Deposits<'a> {
    api: &'a ApiClient,
}

impl<'a> Deposits<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Submits a deposit request for review
    pub async fn create(&self, deposit: &NewDeposit) -> Result<Deposit> {
        check_amount(deposit.amount)?;
        let deposit: Deposit = self.api.post("/deposits", deposit).await?;
        info!(deposit = %deposit.id, amount = deposit.amount, "Deposit requested");
        Ok(deposit)
    }

    /// Deposit requests of the logged-in user
    pub async fn mine(&self) -> Result<Vec<Deposit>> {
        self.api.get("/deposits").await
    }

    /// Every deposit request, admin only
    pub async fn all(&self) -> Result<Vec<Deposit>> {
        self.api.get("/admin/deposits").await
    }

    /// Approves or rejects a deposit, admin only
    pub async fn set_status(&self, id: &str, status: RequestStatus) -> Result<Deposit> {
        let path = format!("/admin/deposits/{}/status", check_id(id)?);
        let deposit: Deposit = self.api.patch(&path, &StatusUpdate { status }).await?;
        info!(deposit = %deposit.id, status = ?deposit.status, "Deposit reviewed");
        Ok(deposit)
    }
}
