pub mod firebase;
pub mod models;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::{DatabaseConfig, DatabaseProvider};
use crate::handlers::projects::RefreshTokenRequest;
use crate::middleware::AuthUser;

pub use firebase::FirebaseReader;
pub use postgres::PostgresReader;

/// Errors from the backend readers
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no uid supplied for document-store lookup")]
    MissingUid,

    #[error("invalid uid: {0}")]
    InvalidUid(String),

    #[error("missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// What a project lookup resolved to. The handler maps this exhaustively
/// to exactly one HTTP response; backend faults travel as StoreError.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Lookup succeeded with a (possibly empty, relational mode) list.
    Projects(Vec<Value>),
    /// Document-store path exists but holds no projects.
    NoProjects,
    /// No identity record for the authenticated caller (relational mode).
    UserNotFound,
    /// Presented refresh token does not match or has expired (relational mode).
    InvalidToken,
}

/// Capability consumed by the projects endpoint. One implementation is
/// selected at startup from the DATABASE_PROVIDER flag and shared for the
/// process lifetime.
#[async_trait]
pub trait ProjectsReader: Send + Sync {
    async fn fetch(
        &self,
        identity: &AuthUser,
        request: &RefreshTokenRequest,
    ) -> Result<FetchOutcome, StoreError>;

    async fn healthcheck(&self) -> Result<(), StoreError>;

    fn provider(&self) -> &'static str;
}

/// Construct the reader for the configured provider.
pub async fn build_reader(config: &DatabaseConfig) -> Result<Arc<dyn ProjectsReader>, StoreError> {
    match config.provider {
        DatabaseProvider::Firebase => Ok(Arc::new(FirebaseReader::from_config(config)?)),
        DatabaseProvider::Postgres => Ok(Arc::new(PostgresReader::connect(config).await?)),
    }
}
