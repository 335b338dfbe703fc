use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::middleware::auth_context_middleware;
use crate::state::AppState;

/// Assemble the application router around the injected state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Non-GET methods must reach the handler for the contract's 401
        .route("/api/v1/projects", any(handlers::projects::projects_get))
        .layer(middleware::from_fn(auth_context_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Projects API",
        "version": version,
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "projects": "/api/v1/projects (GET, Bearer token required)",
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.reader.healthcheck().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "provider": state.reader.provider(),
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "provider": state.reader.provider(),
                "backend_error": e.to_string(),
            })),
        ),
    }
}
