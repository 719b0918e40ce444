//! Session store
//!
//! Single owner of the logged-in user: the bearer token and the last profile snapshot, mirrored to
//! [`Storage`] under `authToken` and `user`. Consumers read the current state or subscribe to its
//! changes, and trigger refreshes on their own schedule.
//!
//! Refreshes are not sequenced. Two overlapping refreshes of the same data race, and whichever
//! response resolves last overwrites the state. The server stays authoritative, so the next
//! refresh heals any stale value. A response only ever lands in the session whose token issued
//! the request; once that session is gone the response is dropped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::profile::{BalanceResponse, Profile, ProfitStats, RawProfile};
use crate::storage::{Storage, keys};


/// Authenticated session data
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Bearer token for user requests
    pub token: String,
    /// Last known profile
    pub profile: Profile,
}

/// Observable state of the store
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Session),
    /// The account turned out to be inactive and the session was dropped
    ///
    /// Behaves as `Anonymous`, but lets consumers show why the user was logged out.
    Suspended,
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            Self::Anonymous | Self::Suspended => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Response of both login and registration
#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    #[serde(default)]
    user: RawProfile,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    referral_code: Option<&'a str>,
}

/// Result of switching the AI trading
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiToggle {
    /// AI trading is now enabled
    pub ai_status: bool,
    #[serde(default)]
    pub message: String,
}

struct SessionStoreInner {
    api: ApiClient,
    state: watch::Sender<SessionState>,
}

/// Shared handle to the session
#[derive(Clone)]
pub struct SessionStore(Arc<SessionStoreInner>);

impl SessionStore {
    /// Creates the store, restoring a persisted session from the client storage
    pub fn new(api: ApiClient) -> Self {
        let state = restore(api.storage().as_ref());
        let (state, _) = watch::channel(state);

        Self(Arc::new(SessionStoreInner { api, state }))
    }

    /// API client the store talks through
    pub fn api(&self) -> &ApiClient {
        &self.0.api
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.0.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.0.state.subscribe()
    }

    pub fn session(&self) -> Option<Session> {
        self.0.state.borrow().session().cloned()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.0.state.borrow().session().map(|s| s.profile.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.0.state.borrow().session().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.state.borrow().is_authenticated()
    }

    /// Logs in with email and password
    ///
    /// On rejection the server message is returned unchanged. Fails with [`Error::Suspended`]
    /// when the account is inactive, leaving the store in [`SessionState::Suspended`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Profile> {
        let response: AuthResponse = self
            .0
            .api
            .post("/auth/login", &LoginRequest { email, password })
            .await?;

        info!(email, "Logged in");
        self.establish(response).await
    }

    /// Creates an account and logs into it
    ///
    /// Same contract as [`login`](Self::login).
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        referral_code: Option<&str>,
    ) -> Result<Profile> {
        let referral_code = referral_code.map(str::trim).filter(|code| !code.is_empty());
        let request = RegisterRequest {
            first_name,
            last_name,
            email,
            password,
            referral_code,
        };

        let response: AuthResponse = self.0.api.post("/auth/register", &request).await?;

        info!(email, referred = referral_code.is_some(), "Registered");
        self.establish(response).await
    }

    /// Drops the session, no server call involved
    pub fn logout(&self) {
        self.0.state.send_replace(SessionState::Anonymous);
        clear_persisted(self.0.api.storage().as_ref());
        info!("Logged out");
    }

    /// Re-fetches the profile, replacing the stored one
    ///
    /// Failures are only logged. An inactive account ends the session.
    pub async fn refresh_user(&self) {
        let Some(token) = self.token() else {
            debug!("Not logged in, skipping profile refresh");
            return;
        };

        match self.fetch_profile().await {
            Ok(profile) => {
                if let Err(err) = self.apply_profile(&token, profile) {
                    warn!(error = %err, "Session dropped on profile refresh");
                }
            }
            Err(err) => warn!(error = %err, "Profile refresh failed"),
        }
    }

    /// Re-fetches the balance and merges it into the profile
    ///
    /// Returns the new balance. On failure the stored balance is left as it was.
    pub async fn refresh_balance(&self) -> Result<f64> {
        let token = self.token().ok_or(Error::NotAuthenticated)?;

        let response: BalanceResponse = self.0.api.get("/balance").await?;
        let balance = response.balance.ok_or_else(|| Error::Incomplete {
            path: "/balance".to_owned(),
            field: "balance",
        })?;

        self.update_profile(&token, |profile| profile.balance = balance);
        debug!(balance, "Balance refreshed");
        Ok(balance)
    }

    /// Re-fetches the algo profit figures and merges them into the profile
    ///
    /// Never fails. On error the figures held so far are returned, zero when logged out.
    pub async fn refresh_profit_data(&self) -> ProfitStats {
        let Some(token) = self.token() else {
            return ProfitStats::default();
        };

        match self.0.api.get::<ProfitStats>("/profit-stats").await {
            Ok(stats) => {
                self.update_profile(&token, |profile| profile.merge_profit(stats));
                stats
            }
            Err(err) => {
                warn!(error = %err, "Profit stats refresh failed");
                self.profile()
                    .map(|profile| profile.profit_stats())
                    .unwrap_or_default()
            }
        }
    }

    /// Switches AI trading on or off, merging the new flag into the profile
    pub async fn toggle_ai_status(&self) -> Result<AiToggle> {
        let token = self.token().ok_or(Error::NotAuthenticated)?;

        let toggle: AiToggle = self.0.api.post("/ai-status/toggle", &json!({})).await?;
        self.update_profile(&token, |profile| profile.ai_status = toggle.ai_status);

        info!(ai_status = toggle.ai_status, "AI trading toggled");
        Ok(toggle)
    }

    /// Stores the session from an auth response and double checks the account status
    async fn establish(&self, response: AuthResponse) -> Result<Profile> {
        let profile = Profile::from(response.user);
        if profile.is_suspended() {
            warn!(user = %profile.id, "Account is inactive, refusing login");
            self.0.state.send_replace(SessionState::Suspended);
            clear_persisted(self.0.api.storage().as_ref());
            return Err(Error::Suspended);
        }

        let token = response.token;
        let session = Session {
            token: token.clone(),
            profile,
        };
        self.persist(&session);
        self.0
            .state
            .send_replace(SessionState::Authenticated(session));

        // The auth response may carry a stale status, the profile endpoint is authoritative
        match self.fetch_profile().await {
            Ok(profile) => self.apply_profile(&token, profile)?,
            Err(err) => warn!(error = %err, "Cannot verify profile after login"),
        }

        let profile = self
            .session()
            .filter(|session| session.token == token)
            .map(|session| session.profile);
        profile.ok_or(Error::NotAuthenticated)
    }

    async fn fetch_profile(&self) -> Result<Profile> {
        let profile: RawProfile = self.0.api.get("/profile").await?;
        Ok(profile.into())
    }

    /// Replaces the profile of the session holding `token`
    ///
    /// An inactive profile drops that session instead. Ignored if the session ended meanwhile.
    fn apply_profile(&self, token: &str, profile: Profile) -> Result<()> {
        if !profile.is_suspended() {
            self.update_profile(token, move |current| *current = profile);
            return Ok(());
        }

        let suspended = self.0.state.send_if_modified(|state| match state {
            SessionState::Authenticated(session) if session.token == token => {
                *state = SessionState::Suspended;
                true
            }
            _ => false,
        });

        if !suspended {
            debug!(user = %profile.id, "Session ended before the suspension arrived");
            return Ok(());
        }

        warn!(user = %profile.id, "Account is inactive, forcing logout");
        clear_persisted(self.0.api.storage().as_ref());
        Err(Error::Suspended)
    }

    /// Modifies the profile in place if the session holding `token` is still current, persisting
    /// the result
    fn update_profile(&self, token: &str, update: impl FnOnce(&mut Profile)) -> bool {
        let mut updated = None;
        self.0.state.send_if_modified(|state| match state {
            SessionState::Authenticated(session) if session.token == token => {
                update(&mut session.profile);
                updated = Some(session.clone());
                true
            }
            _ => false,
        });

        match updated {
            Some(session) => {
                self.persist(&session);
                true
            }
            None => {
                debug!("Session changed before the update arrived, dropping it");
                false
            }
        }
    }

    /// Mirrors the session to storage
    ///
    /// Storage failures are logged only, the in-memory state stays authoritative.
    fn persist(&self, session: &Session) {
        let storage = self.0.api.storage();
        let result = serde_json::to_string(&session.profile)
            .map_err(crate::storage::StorageError::from)
            .and_then(|user| {
                storage.set(keys::AUTH_TOKEN, &session.token)?;
                storage.set(keys::USER, &user)
            });

        if let Err(err) = result {
            warn!(error = %err, "Cannot persist session");
        }
    }
}

/// Removes the persisted session, logging failures only
fn clear_persisted(storage: &dyn Storage) {
    for key in [keys::AUTH_TOKEN, keys::USER] {
        if let Err(err) = storage.remove(key) {
            warn!(key, error = %err, "Cannot clear persisted session");
        }
    }
}

/// Rebuilds the state persisted by a previous run
///
/// Both the token and a decodable profile are needed. Anything partial is wiped, as is the
/// session of an inactive account.
fn restore(storage: &dyn Storage) -> SessionState {
    let token = storage.get(keys::AUTH_TOKEN);
    let user = storage.get(keys::USER);

    let session = match (token, user) {
        (Ok(None), Ok(None)) => return SessionState::Anonymous,
        (Ok(Some(token)), Ok(Some(user))) => serde_json::from_str::<Profile>(&user)
            .inspect_err(|err| warn!(error = %err, "Persisted profile is corrupted"))
            .ok()
            .filter(|profile| !profile.is_suspended())
            .map(|profile| Session { token, profile }),
        (Err(err), _) | (_, Err(err)) => {
            warn!(error = %err, "Cannot read persisted session");
            None
        }
        _ => {
            warn!("Persisted session is incomplete");
            None
        }
    };

    match session {
        Some(session) => {
            info!(user = %session.profile.id, "Session restored");
            SessionState::Authenticated(session)
        }
        None => {
            clear_persisted(storage);
            SessionState::Anonymous
        }
    }
}
