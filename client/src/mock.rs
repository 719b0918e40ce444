//! Local HTTP server standing in for the backend in tests

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use warp::Filter;
use warp::http::{Method, StatusCode};
use warp::hyper::body::Bytes;
use warp::path::FullPath;

/// Request as seen by the mock server
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    /// JSON body, `null` if there was none
    pub body: Value,
}

/// What the mock answers with
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    body: Value,
    delay: Duration,
}

impl MockResponse {
    pub fn ok(body: Value) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            delay: Duration::ZERO,
        }
    }

    /// Answer only after `delay`
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub struct MockApi {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockApi {
    /// Starts the server on an ephemeral port, answering every request with `handler`
    pub fn spawn<F>(handler: F) -> Self
    where
        F: Fn(&Recorded) -> MockResponse + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(handler);

        let recorded = requests.clone();
        let route = warp::method()
            .and(warp::path::full())
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::body::bytes())
            .and_then(
                move |method: Method, path: FullPath, authorization: Option<String>, body: Bytes| {
                    let handler = handler.clone();
                    let recorded = recorded.clone();
                    async move {
                        let request = Recorded {
                            method: method.to_string(),
                            path: path.as_str().to_owned(),
                            authorization,
                            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
                        };

                        let response = handler(&request);
                        recorded.lock().push(request);

                        if !response.delay.is_zero() {
                            tokio::time::sleep(response.delay).await;
                        }

                        let status = StatusCode::from_u16(response.status).unwrap();
                        Ok::<_, Infallible>(warp::reply::with_status(
                            warp::reply::json(&response.body),
                            status,
                        ))
                    }
                },
            );

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self { addr, requests }
    }

    /// Base URL to point the client at
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }

    /// Requests received for the given method and path
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .collect()
    }
}
