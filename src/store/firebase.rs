use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::handlers::projects::RefreshTokenRequest;
use crate::middleware::AuthUser;

use super::{FetchOutcome, ProjectsReader, StoreError};

/// Document-store reader over the realtime database REST surface.
///
/// Projects live at the per-user path `users/{uid}/projects`; a GET on
/// `{base}/users/{uid}/projects.json` returns the stored JSON value, or
/// `null` when the path does not exist.
pub struct FirebaseReader {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl FirebaseReader {
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let base_url = config
            .firebase_database_url
            .clone()
            .ok_or(StoreError::ConfigMissing("FIREBASE_DATABASE_URL"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: config.firebase_auth_token.clone(),
        })
    }

    async fn get_value(&self, path: &str) -> Result<Value, StoreError> {
        let url = format!("{}/{}.json", self.base_url, path);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth", token.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UpstreamStatus(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

/// Realtime-database keys may not contain `.`, `$`, `#`, `[`, `]` or `/`;
/// anything outside this whitelist is rejected before it reaches a URL.
fn is_valid_uid(uid: &str) -> bool {
    !uid.is_empty() && uid.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Interpret the stored value under `users/{uid}/projects`.
///
/// Collections written through the realtime database arrive either as an
/// array or as an object keyed by child id; both are passed through as a
/// list. A missing path (`null`) and an empty collection both resolve to
/// NoProjects.
fn projects_from_value(value: Value) -> FetchOutcome {
    match value {
        Value::Null => FetchOutcome::NoProjects,
        Value::Array(items) => {
            if items.is_empty() {
                FetchOutcome::NoProjects
            } else {
                FetchOutcome::Projects(items)
            }
        }
        Value::Object(map) => {
            if map.is_empty() {
                FetchOutcome::NoProjects
            } else {
                FetchOutcome::Projects(map.into_iter().map(|(_, v)| v).collect())
            }
        }
        other => FetchOutcome::Projects(vec![other]),
    }
}

#[async_trait]
impl ProjectsReader for FirebaseReader {
    async fn fetch(
        &self,
        _identity: &AuthUser,
        request: &RefreshTokenRequest,
    ) -> Result<FetchOutcome, StoreError> {
        let uid = request.uid.as_deref().ok_or(StoreError::MissingUid)?;
        if !is_valid_uid(uid) {
            return Err(StoreError::InvalidUid(uid.to_string()));
        }

        let value = self.get_value(&format!("users/{}/projects", uid)).await?;
        debug!("document store lookup for uid {} resolved", uid);
        Ok(projects_from_value(value))
    }

    async fn healthcheck(&self) -> Result<(), StoreError> {
        let url = format!("{}/.json", self.base_url);
        let mut request = self.client.get(&url).query(&[("shallow", "true")]);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth", token.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UpstreamStatus(status.as_u16()));
        }
        Ok(())
    }

    fn provider(&self) -> &'static str {
        "firebase"
    }
}
