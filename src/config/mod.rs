use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Which backend serves project lookups. Selected once at startup from
/// DATABASE_PROVIDER: the literal "firebase" picks the document store,
/// any other value (or none) picks the relational store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseProvider {
    Firebase,
    Postgres,
}

impl DatabaseProvider {
    fn from_env() -> Self {
        match env::var("DATABASE_PROVIDER").as_deref() {
            Ok("firebase") => DatabaseProvider::Firebase,
            _ => DatabaseProvider::Postgres,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub provider: DatabaseProvider,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    /// Upper bound on a single backend read; elapsed maps to 503.
    pub request_timeout_secs: u64,
    pub firebase_database_url: Option<String>,
    pub firebase_auth_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        self.database.provider = DatabaseProvider::from_env();

        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_REQUEST_TIMEOUT_SECS") {
            self.database.request_timeout_secs = v.parse().unwrap_or(self.database.request_timeout_secs);
        }
        if let Ok(v) = env::var("FIREBASE_DATABASE_URL") {
            self.database.firebase_database_url = Some(v);
        }
        if let Ok(v) = env::var("FIREBASE_AUTH_TOKEN") {
            self.database.firebase_auth_token = Some(v);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                provider: DatabaseProvider::Postgres,
                max_connections: 10,
                connect_timeout_secs: 30,
                request_timeout_secs: 10,
                firebase_database_url: None,
                firebase_auth_token: None,
            },
            security: SecurityConfig {
                // Fixed insecure default so the service runs out of the box
                jwt_secret: "insecure-dev-secret".to_string(),
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                provider: DatabaseProvider::Postgres,
                max_connections: 20,
                connect_timeout_secs: 10,
                request_timeout_secs: 10,
                firebase_database_url: None,
                firebase_auth_token: None,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                provider: DatabaseProvider::Postgres,
                max_connections: 50,
                connect_timeout_secs: 5,
                request_timeout_secs: 5,
                firebase_database_url: None,
                firebase_auth_token: None,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
