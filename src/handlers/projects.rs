use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::store::FetchOutcome;

/// Parsed request body. Clients send either a JSON object or a
/// JSON-encoded string of one; both forms deserialize identically.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
    pub uid: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectsResponse {
    pub projects: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

/// GET /api/v1/projects - list the calling user's projects
///
/// Registered with `any()` so non-GET methods reach this handler and get
/// the contract's 401 instead of a router-level 405. Exactly one response
/// is emitted per request, from the single match at the bottom.
pub async fn projects_get(
    State(state): State<AppState>,
    method: Method,
    identity: Option<Extension<AuthUser>>,
    body: Bytes,
) -> Result<Json<ProjectsResponse>, ApiError> {
    let identity = match identity {
        Some(Extension(identity)) if method == Method::GET => identity,
        _ => return Err(ApiError::unauthorized("Not authorized!")),
    };

    let request = parse_request(&body)?;

    if request.refresh_token.is_none() {
        return Err(ApiError::unauthorized("No refresh token provided"));
    }

    let outcome = tokio::time::timeout(
        state.request_timeout,
        state.reader.fetch(&identity, &request),
    )
    .await
    .map_err(|_| {
        tracing::error!("backend read timed out for uid {}", identity.uid);
        ApiError::service_unavailable("Backend request timed out")
    })??;

    match outcome {
        FetchOutcome::Projects(projects) => Ok(Json(ProjectsResponse {
            projects,
            error_msg: None,
        })),
        FetchOutcome::NoProjects => Ok(Json(ProjectsResponse {
            projects: Vec::new(),
            error_msg: Some("No projects found".to_string()),
        })),
        FetchOutcome::UserNotFound => Err(ApiError::unauthorized("User not found!")),
        FetchOutcome::InvalidToken => Err(ApiError::unauthorized("Invalid refresh token")),
    }
}

/// Parse the request body into a RefreshTokenRequest.
///
/// An empty body counts as an empty object. A body that is a JSON-encoded
/// string is unwrapped one level before being read as an object.
fn parse_request(body: &[u8]) -> Result<RefreshTokenRequest, ApiError> {
    if body.is_empty() {
        return Ok(RefreshTokenRequest::default());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::invalid_json(format!("Malformed request body: {}", e)))?;

    let value = match value {
        Value::String(inner) => serde_json::from_str(&inner)
            .map_err(|e| ApiError::invalid_json(format!("Malformed request body: {}", e)))?,
        other => other,
    };

    if !value.is_object() {
        return Err(ApiError::invalid_json("Request body must be a JSON object"));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::invalid_json(format!("Malformed request body: {}", e)))
}
