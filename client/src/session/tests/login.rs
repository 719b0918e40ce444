//! Login, registration and logout

use assert_json_diff::assert_json_eq;
use serde_json::json;

use super::{backend, persisted, store, store_with, user};
use crate::error::Error;
use crate::mock::{MockApi, MockResponse};
use crate::session::SessionState;
use crate::storage::{MemoryStorage, Storage, keys};

#[tokio::test]
async fn login_stores_normalized_profile() {
    let mock = MockApi::spawn(backend("active"));
    let (store, storage) = store(&mock);

    let profile = store.login("ada@example.com", "secret").await.unwrap();

    assert_eq!(profile.id, "u1");
    assert_eq!(profile.balance, 100.0);
    // Fields missing in the payload are defaulted
    assert_eq!(profile.tier, 3);
    assert_eq!(profile.referral_count, 0);
    assert_eq!(profile.algo_profit_amount, 0.0);
    assert!(!profile.ai_status);

    assert!(store.is_authenticated());
    assert_eq!(store.token().as_deref(), Some("token-1"));
    assert_eq!(store.profile(), Some(profile.clone()));

    assert_eq!(
        storage.get(keys::AUTH_TOKEN).unwrap().as_deref(),
        Some("token-1")
    );
    let stored: serde_json::Value =
        serde_json::from_str(&storage.get(keys::USER).unwrap().unwrap()).unwrap();
    assert_eq!(stored["tier"], 3);
    assert_eq!(stored["referralCount"], 0);

    let login = &mock.requests_to("POST", "/auth/login")[0];
    assert_json_eq!(
        login.body,
        json!({ "email": "ada@example.com", "password": "secret" })
    );
    // The profile check after login goes with the fresh token
    let check = &mock.requests_to("GET", "/profile")[0];
    assert_eq!(check.authorization.as_deref(), Some("Bearer token-1"));
}

#[tokio::test]
async fn login_failure_propagates_server_message() {
    let mock = MockApi::spawn(|_| {
        MockResponse::status(401, json!({ "message": "Invalid email or password" }))
    });
    let (store, storage) = store(&mock);

    let err = store.login("ada@example.com", "wrong").await.unwrap_err();

    assert!(matches!(err, Error::Api { .. }));
    assert_eq!(err.to_string(), "Invalid email or password");
    assert_eq!(store.state(), SessionState::Anonymous);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn suspended_account_is_logged_out() {
    let mock = MockApi::spawn(backend("inactive"));
    let (store, storage) = store(&mock);

    let err = store.login("ada@example.com", "secret").await.unwrap_err();

    assert!(matches!(err, Error::Suspended));
    assert_eq!(store.state(), SessionState::Suspended);
    assert!(!store.is_authenticated());
    assert_eq!(store.token(), None);
    assert_eq!(store.profile(), None);
    assert!(storage.is_empty());
    assert_eq!(mock.requests_to("GET", "/profile").len(), 1);
}

#[tokio::test]
async fn suspension_in_login_response_skips_profile_check() {
    let mock = MockApi::spawn(|_| {
        MockResponse::ok(json!({ "token": "token-1", "user": user("u1", "inactive") }))
    });
    let (store, storage) = store(&mock);

    let err = store.login("ada@example.com", "secret").await.unwrap_err();

    assert!(matches!(err, Error::Suspended));
    assert_eq!(store.state(), SessionState::Suspended);
    assert!(storage.is_empty());
    assert!(mock.requests_to("GET", "/profile").is_empty());
}

#[tokio::test]
async fn failed_profile_check_keeps_login() {
    let mock = MockApi::spawn(|request| match request.path.as_str() {
        "/auth/login" => {
            MockResponse::ok(json!({ "token": "token-1", "user": user("u1", "active") }))
        }
        _ => MockResponse::status(500, json!({})),
    });
    let (store, _) = store(&mock);

    let profile = store.login("ada@example.com", "secret").await.unwrap();
    assert_eq!(profile.id, "u1");
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn login_accepts_profile_with_both_id_keys() {
    let mock = MockApi::spawn(|request| {
        let mut user = user("u1", "active");
        user["id"] = json!("u1");
        match request.path.as_str() {
            "/auth/login" => MockResponse::ok(json!({ "token": "token-1", "user": user })),
            _ => MockResponse::ok(json!({ "data": user })),
        }
    });
    let (store, storage) = store(&mock);

    let profile = store.login("ada@example.com", "secret").await.unwrap();

    assert_eq!(profile.id, "u1");
    assert!(store.is_authenticated());
    assert!(storage.get(keys::USER).unwrap().is_some());
}

#[tokio::test]
async fn register_sends_referral_code_only_when_given() {
    let mock = MockApi::spawn(backend("active"));
    let (store, _) = store(&mock);

    store
        .register("Ada", "Lovelace", "ada@example.com", "secret", Some(" REF42 "))
        .await
        .unwrap();
    store.logout();
    store
        .register("Ada", "Lovelace", "ada@example.com", "secret", Some(""))
        .await
        .unwrap();

    let requests = mock.requests_to("POST", "/auth/register");
    assert_json_eq!(
        requests[0].body,
        json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "secret",
            "referralCode": "REF42",
        })
    );
    assert_json_eq!(
        requests[1].body,
        json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "secret",
        })
    );
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn register_failure_propagates_server_message() {
    let mock = MockApi::spawn(|_| {
        MockResponse::status(409, json!({ "message": "Email already registered" }))
    });
    let (store, _) = store(&mock);

    let err = store
        .register("Ada", "Lovelace", "ada@example.com", "secret", None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Email already registered");
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn logout_always_ends_anonymous() {
    let mock = MockApi::spawn(backend("active"));

    // Fresh store
    let (store, storage) = store(&mock);
    store.logout();
    assert_eq!(store.state(), SessionState::Anonymous);
    assert!(storage.is_empty());

    // After login
    store.login("ada@example.com", "secret").await.unwrap();
    store.logout();
    assert_eq!(store.state(), SessionState::Anonymous);
    assert_eq!(store.token(), None);
    assert_eq!(store.profile(), None);
    assert!(storage.is_empty());

    // After suspension
    let mock = MockApi::spawn(backend("inactive"));
    let (store, storage) = super::store(&mock);
    let _ = store.login("ada@example.com", "secret").await.unwrap_err();
    store.logout();
    assert_eq!(store.state(), SessionState::Anonymous);
    assert!(storage.is_empty());

    // No request is ever made by logout
    assert!(mock.requests_to("POST", "/auth/logout").is_empty());
}

#[tokio::test]
async fn logout_notifies_subscribers() {
    let mock = MockApi::spawn(backend("active"));
    let (store, _) = store(&mock);
    store.login("ada@example.com", "secret").await.unwrap();

    let mut changes = store.subscribe();
    assert!(changes.borrow_and_update().is_authenticated());

    store.logout();
    changes.changed().await.unwrap();
    assert_eq!(*changes.borrow(), SessionState::Anonymous);
}

#[tokio::test]
async fn persisted_session_is_restored() {
    let mock = MockApi::spawn(backend("active"));
    let (store, _) = store_with(&mock, persisted(json!({ "_id": "u9", "balance": 42 })));

    let session = store.session().unwrap();
    assert_eq!(session.token, "token-0");
    assert_eq!(session.profile.id, "u9");
    assert_eq!(session.profile.balance, 42.0);
    assert_eq!(session.profile.tier, 3);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn partial_persisted_session_is_wiped() {
    let mock = MockApi::spawn(backend("active"));

    let storage = MemoryStorage::new();
    storage.set(keys::AUTH_TOKEN, "token-0").unwrap();
    let (store, storage) = store_with(&mock, storage);
    assert_eq!(store.state(), SessionState::Anonymous);
    assert!(storage.is_empty());

    let storage = persisted(json!({ "_id": "u9" }));
    storage.set(keys::USER, "{ not json").unwrap();
    let (store, storage) = store_with(&mock, storage);
    assert_eq!(store.state(), SessionState::Anonymous);
    assert!(storage.is_empty());

    let storage = persisted(json!({ "_id": "u9", "status": "inactive" }));
    let (store, storage) = store_with(&mock, storage);
    assert!(!store.is_authenticated());
    assert!(storage.is_empty());
}
