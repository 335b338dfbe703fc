use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::store::ProjectsReader;

/// Shared application state handed to the router. The backend reader is
/// constructed once at startup and injected here; handlers never reach
/// for a module-level client.
#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<dyn ProjectsReader>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(reader: Arc<dyn ProjectsReader>, config: &AppConfig) -> Self {
        Self {
            reader,
            request_timeout: Duration::from_secs(config.database.request_timeout_secs),
        }
    }
}
