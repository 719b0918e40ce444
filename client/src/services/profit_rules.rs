//! Profit rules driving the simulated algo returns, admin only

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use super::{RecordId, amount, check_id};
use crate::api::ApiClient;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitRule {
    #[serde(flatten)]
    pub id: RecordId,
    #[serde(default)]
    pub tier: Option<u8>,
    #[serde(default, deserialize_with = "amount")]
    pub min_profit_percentage: f64,
    #[serde(default, deserialize_with = "amount")]
    pub max_profit_percentage: f64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfitRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<u8>,
    pub min_profit_percentage: f64,
    pub max_profit_percentage: f64,
    pub is_active: bool,
}

impl NewProfitRule {
    fn check(&self) -> Result<()> {
        let (min, max) = (self.min_profit_percentage, self.max_profit_percentage);
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::Validation("Profit percentages must be numbers"));
        }
        if min > max {
            return Err(Error::Validation(
                "Minimum profit cannot exceed maximum profit",
            ));
        }
        Ok(())
    }
}

pub struct ProfitRules<'a> {
    api: &'a ApiClient,
}

impl<'a> ProfitRules<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<ProfitRule>> {
        self.api.get("/profit-rules").await
    }

    pub async fn create(&self, rule: &NewProfitRule) -> Result<ProfitRule> {
        rule.check()?;
        let rule: ProfitRule = self.api.post("/profit-rules", rule).await?;
        info!(rule = %rule.id, "Profit rule created");
        Ok(rule)
    }

    pub async fn update(&self, id: &str, rule: &NewProfitRule) -> Result<ProfitRule> {
        rule.check()?;
        let path = format!("/profit-rules/{}", check_id(id)?);
        let rule: ProfitRule = self.api.put(&path, rule).await?;
        info!(rule = %rule.id, "Profit rule updated");
        Ok(rule)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("/profit-rules/{}", check_id(id)?);
        let _: Value = self.api.delete(&path).await?;
        info!(rule = id, "Profit rule deleted");
        Ok(())
    }
}
