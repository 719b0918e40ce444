//! REST API client
//!
//! Thin wrapper over `reqwest` which knows three things about the backend: which bearer token a
//! path needs, that successful bodies come either raw or wrapped in `{ "data": ... }`, and that
//! failures carry a human readable `message`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::storage::{Storage, keys};

/// Path prefixes served only to the administrator
///
/// Requests to these paths carry the admin token, everything else carries the user token.
const ADMIN_PATH_PREFIXES: &[&str] = &["/admin", "/profit-rules", "/cron-settings"];

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// API connection settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every path is appended to, eg. `https://host/api`
    pub base_url: String,
    /// Timeout of a single request
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Which stored credential authenticates a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    User,
    Admin,
}

impl TokenKind {
    /// Selects the token for a path by prefix
    pub fn for_path(path: &str) -> Self {
        let is_admin = ADMIN_PATH_PREFIXES.iter().any(|prefix| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?']))
        });

        if is_admin { Self::Admin } else { Self::User }
    }

    fn storage_key(self) -> &'static str {
        match self {
            Self::User => keys::AUTH_TOKEN,
            Self::Admin => keys::ADMIN_AUTH_TOKEN,
        }
    }
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn Storage>,
}

/// Shared handle to the backend
#[derive(Clone)]
pub struct ApiClient(Arc<ApiClientInner>);

impl ApiClient {
    /// Creates a client reading its credentials from `storage`
    pub fn new(config: ApiConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self(Arc::new(ApiClientInner {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            storage,
        })))
    }

    /// Storage the credentials are read from
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.0.storage
    }

    pub fn base_url(&self) -> &str {
        &self.0.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None::<&()>).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::DELETE, path, None::<&()>).await
    }

    async fn request<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = format!("{}{path}", self.0.base_url);
        let token_kind = TokenKind::for_path(path);

        let mut request = self.0.http.request(method.clone(), &url);
        if let Some(token) = self.0.storage.get(token_kind.storage_key())? {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, token = ?token_kind, "Sending API request");
        let response = request.send().await.inspect_err(|err| {
            warn!(%method, path, error = %err, "API request failed");
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let err = api_error(status, &bytes);
            debug!(%method, path, %status, error = %err, "API request rejected");
            return Err(err);
        }

        decode(path, &bytes)
    }
}

/// Builds the error for a non-success response
///
/// The server `message` is used verbatim, `error` is the second choice. An empty or malformed
/// body yields a generic message with the status code.
fn api_error(status: StatusCode, body: &[u8]) -> Error {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|body| {
            ["message", "error"].into_iter().find_map(|field| {
                body.get(field)
                    .and_then(Value::as_str)
                    .filter(|message| !message.is_empty())
                    .map(str::to_owned)
            })
        })
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    Error::Api { status, message }
}

/// Decodes a success body
///
/// Empty bodies decode as `null`, so endpoints returning nothing can be read as `()` or
/// `Option<_>`.
fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T> {
    let value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(body).map_err(|source| Error::Decode {
            path: path.to_owned(),
            source,
        })?
    };

    serde_json::from_value(unwrap_data(value)).map_err(|source| Error::Decode {
        path: path.to_owned(),
        source,
    })
}

/// Strips the `{ "data": ... }` envelope if present
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut fields) if fields.get("data").is_some_and(|data| !data.is_null()) => {
            fields.remove("data").unwrap_or(Value::Null)
        }
        value => value,
    }
}
