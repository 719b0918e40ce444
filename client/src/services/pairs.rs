//! Trading pairs shown on the dashboard

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use super::{RecordId, amount, check_id};
use crate::api::ApiClient;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    #[serde(flatten)]
    pub id: RecordId,
    pub symbol: String,
    #[serde(default)]
    pub base_asset: Option<String>,
    #[serde(default)]
    pub quote_asset: Option<String>,
    #[serde(default, deserialize_with = "amount")]
    pub price: f64,
    #[serde(default, deserialize_with = "amount")]
    pub change_24h: f64,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPair {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub is_active: bool,
}

impl NewPair {
    fn check(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(Error::Validation("Pair symbol is required"));
        }
        Ok(())
    }
}

pub struct Pairs<'a> {
    api: &'a ApiClient,
}

impl<'a> Pairs<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Pairs available for trading
    pub async fn list(&self) -> Result<Vec<Pair>> {
        self.api.get("/pairs").await
    }

    /// Adds a pair, admin only
    pub async fn create(&self, pair: &NewPair) -> Result<Pair> {
        pair.check()?;
        let pair: Pair = self.api.post("/admin/pairs", pair).await?;
        info!(pair = %pair.symbol, "Pair created");
        Ok(pair)
    }

    /// Replaces a pair, admin only
    pub async fn update(&self, id: &str, pair: &NewPair) -> Result<Pair> {
        pair.check()?;
        let path = format!("/admin/pairs/{}", check_id(id)?);
        let pair: Pair = self.api.put(&path, pair).await?;
        info!(pair = %pair.symbol, "Pair updated");
        Ok(pair)
    }

    /// Removes a pair, admin only
    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("/admin/pairs/{}", check_id(id)?);
        let _: Value = self.api.delete(&path).await?;
        info!(pair = id, "Pair deleted");
        Ok(())
    }
}
