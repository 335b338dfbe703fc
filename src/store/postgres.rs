use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::auth::check_refresh_token;
use crate::config::DatabaseConfig;
use crate::handlers::projects::RefreshTokenRequest;
use crate::middleware::AuthUser;

use super::models::{Project, User};
use super::{FetchOutcome, ProjectsReader, StoreError};

/// Relational reader backed by a connection pool built once at startup.
pub struct PostgresReader {
    pool: PgPool,
}

impl PostgresReader {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, refresh_token_hash, refresh_token_expires_at, created_at, updated_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_projects(&self, owner_id: Uuid) -> Result<Vec<Project>, StoreError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, owner_id, name, description, created_at, updated_at \
             FROM projects WHERE owner_id = $1 ORDER BY created_at",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }
}

#[async_trait]
impl ProjectsReader for PostgresReader {
    async fn fetch(
        &self,
        identity: &AuthUser,
        request: &RefreshTokenRequest,
    ) -> Result<FetchOutcome, StoreError> {
        // A subject that is not a UUID cannot exist in this store
        let user_id = match Uuid::parse_str(&identity.uid) {
            Ok(id) => id,
            Err(_) => return Ok(FetchOutcome::UserNotFound),
        };

        let user = match self.find_user(user_id).await? {
            Some(user) => user,
            None => return Ok(FetchOutcome::UserNotFound),
        };

        let presented = request.refresh_token.as_deref().unwrap_or_default();
        let check = check_refresh_token(&user, presented);
        debug!(
            matches = check.matches,
            valid = check.valid,
            "refresh token check for user {}",
            user.id
        );
        if !check.matches || !check.valid {
            return Ok(FetchOutcome::InvalidToken);
        }

        let projects = self.find_projects(user.id).await?;
        let records = projects
            .into_iter()
            .map(|p| serde_json::to_value(p).unwrap_or(serde_json::Value::Null))
            .collect();

        Ok(FetchOutcome::Projects(records))
    }

    async fn healthcheck(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn provider(&self) -> &'static str {
        "postgres"
    }
}
