//! User management, admin only

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{StatusUpdate, check_id};
use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::profile::{AccountStatus, Profile};

#[derive(Debug, Serialize)]
struct BalanceUpdate {
    balance: f64,
}

pub struct AdminUsers<'a> {
    api: &'a ApiClient,
}

impl<'a> AdminUsers<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// All registered users, normalized the same way as the session profile
    pub async fn list(&self) -> Result<Vec<Profile>> {
        self.api.get("/admin/users").await
    }

    pub async fn get(&self, id: &str) -> Result<Profile> {
        let path = format!("/admin/users/{}", check_id(id)?);
        self.api.get(&path).await
    }

    /// Activates or suspends an account
    ///
    /// A suspended user is logged out by their own client on the next profile fetch.
    pub async fn set_status(&self, id: &str, status: AccountStatus) -> Result<Profile> {
        if status == AccountStatus::Unknown {
            return Err(Error::Validation("Unknown account status"));
        }

        let path = format!("/admin/users/{}/status", check_id(id)?);
        let user: Profile = self.api.patch(&path, &StatusUpdate { status }).await?;
        info!(user = %user.id, status = ?user.status, "User status changed");
        Ok(user)
    }

    /// Overrides the balance of an account
    pub async fn set_balance(&self, id: &str, balance: f64) -> Result<Profile> {
        if !balance.is_finite() || balance < 0.0 {
            return Err(Error::Validation("Balance must be a non-negative number"));
        }

        let path = format!("/admin/users/{}/balance", check_id(id)?);
        let user: Profile = self.api.patch(&path, &BalanceUpdate { balance }).await?;
        info!(user = %user.id, balance = user.balance, "User balance changed");
        Ok(user)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("/admin/users/{}", check_id(id)?);
        let _: Value = self.api.delete(&path).await?;
        info!(user = id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    use super::*;
    use crate::api::ApiConfig;
    use crate::mock::{MockApi, MockResponse};
    use crate::storage::MemoryStorage;

    fn api(mock: &MockApi) -> ApiClient {
        ApiClient::new(ApiConfig::new(mock.url()), Arc::new(MemoryStorage::new())).unwrap()
    }

    #[tokio::test]
    async fn listed_users_are_normalized() {
        let mock = MockApi::spawn(|_| {
            MockResponse::ok(json!({ "data": [
                { "_id": "u1", "email": "a@example.com", "tier": null },
                { "_id": "u2", "email": "b@example.com", "status": "inactive", "balance": 5 },
            ] }))
        });
        let api = api(&mock);

        let users = api.admin_users().list().await.unwrap();

        assert_eq!(users[0].tier, 3);
        assert_eq!(users[0].balance, 0.0);
        assert!(users[1].is_suspended());
        assert_eq!(users[1].balance, 5.0);
    }

    #[tokio::test]
    async fn suspend_user() {
        let mock = MockApi::spawn(|request| {
            MockResponse::ok(json!({ "_id": "u2", "status": request.body["status"] }))
        });
        let api = api(&mock);

        let user = api
            .admin_users()
            .set_status("u2", AccountStatus::Inactive)
            .await
            .unwrap();

        assert!(user.is_suspended());
        assert_json_eq!(
            mock.requests_to("PATCH", "/admin/users/u2/status")[0].body,
            json!({ "status": "inactive" })
        );
    }

    #[tokio::test]
    async fn negative_balance_is_not_sent() {
        let mock = MockApi::spawn(|_| MockResponse::ok(json!({})));
        let api = api(&mock);

        assert!(api.admin_users().set_balance("u1", -5.0).await.is_err());
        assert!(
            api.admin_users()
                .set_status("u1", AccountStatus::Unknown)
                .await
                .is_err()
        );
        assert!(mock.requests().is_empty());
    }
}
