//! Scheduler settings for the server-side profit distribution, admin only

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::api::ApiClient;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Minutes between two profit distribution runs
    #[serde(default)]
    pub interval_minutes: u32,
    #[serde(default, skip_serializing)]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub next_run: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct CronSettingsService<'a> {
    api: &'a ApiClient,
}

impl<'a> CronSettingsService<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn get(&self) -> Result<CronSettings> {
        self.api.get("/cron-settings").await
    }

    /// Stores new settings, returning them as the server accepted them
    pub async fn update(&self, settings: &CronSettings) -> Result<CronSettings> {
        if settings.enabled && settings.interval_minutes == 0 {
            return Err(Error::Validation("Interval must be at least one minute"));
        }

        let settings: CronSettings = self.api.put("/cron-settings", settings).await?;
        info!(
            enabled = settings.enabled,
            interval = settings.interval_minutes,
            "Cron settings updated"
        );
        Ok(settings)
    }
}
