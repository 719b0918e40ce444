//! User profile snapshot
//!
//! The server owns every field here. The client only keeps the last snapshot it fetched, filling
//! in defaults for anything the server omitted or sent as `null`. All payloads go through
//! [`RawProfile`] and the single `From<RawProfile>` conversion, so login, registration, refreshes
//! and the persisted copy always agree on the defaults.

use chrono::{DateTime, Utc};
use derivative::Derivative;
use serde::{Deserialize, Deserializer, Serialize};

/// Account status as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    /// Suspended by an administrator, the client must not keep the session
    Inactive,
    /// Any status this client does not know about
    #[serde(other)]
    Unknown,
}

/// Normalized user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[serde(rename_all = "camelCase", from = "RawProfile")]
pub struct Profile {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub balance: f64,
    pub ai_status: bool,
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub referral_count: u32,
    #[derivative(Default(value = "3"))]
    pub tier: u8,
    pub total_commission: f64,
    pub algo_profit_amount: f64,
    pub algo_profit_percentage: f64,
    pub status: AccountStatus,
    #[derivative(Default(value = "\"user\".to_owned()"))]
    pub role: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// The account was suspended
    pub fn is_suspended(&self) -> bool {
        self.status == AccountStatus::Inactive
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    pub fn profit_stats(&self) -> ProfitStats {
        ProfitStats {
            algo_profit_amount: self.algo_profit_amount,
            algo_profit_percentage: self.algo_profit_percentage,
        }
    }

    pub(crate) fn merge_profit(&mut self, stats: ProfitStats) {
        self.algo_profit_amount = stats.algo_profit_amount;
        self.algo_profit_percentage = stats.algo_profit_percentage;
    }
}

/// Profile as sent by the server, every field optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProfile {
    /// Mongo id, preferred over `id` when both are sent
    #[serde(rename = "_id")]
    pub mongo_id: Option<String>,
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub balance: Option<f64>,
    pub ai_status: Option<bool>,
    pub referral_code: Option<String>,
    pub referred_by: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub referral_count: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub tier: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub total_commission: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub algo_profit_amount: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub algo_profit_percentage: Option<f64>,
    pub status: Option<AccountStatus>,
    pub role: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<RawProfile> for Profile {
    fn from(raw: RawProfile) -> Self {
        let defaults = Profile::default();

        Self {
            id: raw.mongo_id.or(raw.id).unwrap_or(defaults.id),
            first_name: raw.first_name.unwrap_or(defaults.first_name),
            last_name: raw.last_name.unwrap_or(defaults.last_name),
            email: raw.email.unwrap_or(defaults.email),
            balance: raw.balance.unwrap_or(defaults.balance),
            ai_status: raw.ai_status.unwrap_or(defaults.ai_status),
            referral_code: raw.referral_code.unwrap_or(defaults.referral_code),
            referred_by: raw.referred_by,
            referral_count: raw
                .referral_count
                .map(|count| count.max(0.0) as u32)
                .unwrap_or(defaults.referral_count),
            tier: raw
                .tier
                .map(|tier| tier.clamp(0.0, u8::MAX as f64) as u8)
                .unwrap_or(defaults.tier),
            total_commission: raw.total_commission.unwrap_or(defaults.total_commission),
            algo_profit_amount: raw
                .algo_profit_amount
                .unwrap_or(defaults.algo_profit_amount),
            algo_profit_percentage: raw
                .algo_profit_percentage
                .unwrap_or(defaults.algo_profit_percentage),
            status: raw.status.unwrap_or(defaults.status),
            role: raw.role.unwrap_or(defaults.role),
            created_at: raw.created_at,
        }
    }
}

/// Algo-trading profit figures
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitStats {
    pub algo_profit_amount: f64,
    pub algo_profit_percentage: f64,
}

impl<'de> Deserialize<'de> for ProfitStats {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Default, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        struct Raw {
            #[serde(deserialize_with = "lenient_number")]
            algo_profit_amount: Option<f64>,
            #[serde(deserialize_with = "lenient_number")]
            algo_profit_percentage: Option<f64>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Self {
            algo_profit_amount: raw.algo_profit_amount.unwrap_or_default(),
            algo_profit_percentage: raw.algo_profit_percentage.unwrap_or_default(),
        })
    }
}

/// Body of the balance endpoint
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct BalanceResponse {
    #[serde(default, deserialize_with = "lenient_number")]
    pub balance: Option<f64>,
}

/// Accepts JSON numbers, numeric strings and `null`
///
/// Anything else is treated as missing rather than failing the whole payload.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    let number = Option::<Number>::deserialize(deserializer)?;
    Ok(match number {
        Some(Number::Number(value)) => Some(value),
        Some(Number::Text(text)) => text.trim().parse().ok().filter(|v: &f64| v.is_finite()),
        Some(Number::Other(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> Profile {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_payload_gets_default_table() {
        let profile = parse(json!({}));

        assert_eq!(profile.balance, 0.0);
        assert_eq!(profile.tier, 3);
        assert_eq!(profile.referral_count, 0);
        assert_eq!(profile.total_commission, 0.0);
        assert_eq!(profile.algo_profit_amount, 0.0);
        assert_eq!(profile.algo_profit_percentage, 0.0);
        assert!(!profile.ai_status);
        assert_eq!(profile.status, AccountStatus::Active);
        assert_eq!(profile.role, "user");
        assert_eq!(profile.referral_code, "");
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn both_id_keys_are_accepted() {
        let profile = parse(json!({ "_id": "u1", "id": "u1", "email": "a@example.com" }));
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.email, "a@example.com");

        let profile = parse(json!({ "_id": "u1", "id": "virtual" }));
        assert_eq!(profile.id, "u1");
    }

    #[test]
    fn nulls_are_defaulted() {
        let profile = parse(json!({
            "_id": "u1",
            "balance": null,
            "tier": null,
            "referralCount": null,
            "aiStatus": null,
            "status": null,
        }));

        assert_eq!(profile.id, "u1");
        assert_eq!(profile.balance, 0.0);
        assert_eq!(profile.tier, 3);
        assert_eq!(profile.referral_count, 0);
        assert!(!profile.ai_status);
        assert_eq!(profile.status, AccountStatus::Active);
    }

    #[test]
    fn server_values_are_kept() {
        let profile = parse(json!({
            "id": "u2",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "balance": "1250.5",
            "aiStatus": true,
            "referralCode": "ADA123",
            "referredBy": "BOB1",
            "referralCount": 4,
            "tier": 1,
            "totalCommission": 12.25,
            "algoProfitAmount": 40,
            "algoProfitPercentage": 3.2,
            "status": "inactive",
            "role": "admin",
            "createdAt": "2024-05-01T10:00:00Z",
        }));

        assert_eq!(profile.id, "u2");
        assert_eq!(profile.full_name(), "Ada Lovelace");
        assert_eq!(profile.balance, 1250.5);
        assert!(profile.ai_status);
        assert_eq!(profile.referred_by.as_deref(), Some("BOB1"));
        assert_eq!(profile.referral_count, 4);
        assert_eq!(profile.tier, 1);
        assert_eq!(profile.algo_profit_amount, 40.0);
        assert!(profile.is_suspended());
        assert_eq!(profile.role, "admin");
        assert!(profile.created_at.is_some());
    }

    #[test]
    fn unknown_status_is_not_suspension() {
        let profile = parse(json!({ "status": "pending-kyc" }));
        assert_eq!(profile.status, AccountStatus::Unknown);
        assert!(!profile.is_suspended());
    }

    #[test]
    fn garbage_numbers_fall_back_to_defaults() {
        let profile = parse(json!({ "balance": "abc", "tier": { "level": 2 } }));
        assert_eq!(profile.balance, 0.0);
        assert_eq!(profile.tier, 3);
    }

    #[test]
    fn persisted_form_round_trips() {
        let profile = parse(json!({ "_id": "u3", "balance": 10, "tier": 2 }));
        let stored = serde_json::to_string(&profile).unwrap();
        assert_eq!(serde_json::from_str::<Profile>(&stored).unwrap(), profile);
    }

    #[test]
    fn profit_stats_default_to_zero() {
        let stats: ProfitStats = serde_json::from_value(json!({ "algoProfitAmount": 7.5 })).unwrap();
        assert_eq!(
            stats,
            ProfitStats {
                algo_profit_amount: 7.5,
                algo_profit_percentage: 0.0,
            }
        );
    }
}
