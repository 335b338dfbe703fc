// Items here are shared across test binaries; not every binary uses all of them.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::response::Response;
use axum::Router;
use serde_json::Value;

use projects_api::api;
use projects_api::auth::{generate_jwt, Claims};
use projects_api::handlers::projects::RefreshTokenRequest;
use projects_api::middleware::AuthUser;
use projects_api::state::AppState;
use projects_api::store::{FetchOutcome, ProjectsReader, StoreError};

/// Backend reader stub: returns a prepared outcome and counts calls so
/// tests can assert that failed preconditions perform no backend read.
pub struct StubReader {
    outcome: FetchOutcome,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ProjectsReader for StubReader {
    async fn fetch(
        &self,
        _identity: &AuthUser,
        _request: &RefreshTokenRequest,
    ) -> Result<FetchOutcome, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.outcome.clone())
    }

    async fn healthcheck(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn provider(&self) -> &'static str {
        "stub"
    }
}

pub fn app_with(outcome: FetchOutcome) -> (Router, Arc<AtomicUsize>) {
    app_with_timeout(outcome, None, Duration::from_secs(5))
}

pub fn app_with_timeout(
    outcome: FetchOutcome,
    delay: Option<Duration>,
    request_timeout: Duration,
) -> (Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let reader = StubReader {
        outcome,
        delay,
        calls: calls.clone(),
    };
    let state = AppState {
        reader: Arc::new(reader),
        request_timeout,
    };
    (api::app(state), calls)
}

/// Mint a Bearer header value for the given uid using the dev-tier secret.
pub fn bearer_for(uid: &str) -> String {
    let token = generate_jwt(Claims::new(uid.to_string())).expect("token generation");
    format!("Bearer {}", token)
}

pub async fn json_body(response: Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn projects_request(method: &str, auth: Option<&str>, body: Option<&str>) -> Result<axum::http::Request<Body>> {
    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri("/api/v1/projects")
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    let body = match body {
        Some(body) => Body::from(body.to_string()),
        None => Body::empty(),
    };
    Ok(builder.body(body)?)
}
