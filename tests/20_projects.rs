mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use tower::util::ServiceExt;

use projects_api::store::FetchOutcome;

const BODY: &str = r#"{"refresh_token": "tok-123", "uid": "user-1"}"#;

#[tokio::test]
async fn non_get_method_is_unauthorized() -> Result<()> {
    let (app, calls) = common::app_with(FetchOutcome::Projects(vec![json!({"name": "alpha"})]));

    let auth = common::bearer_for("user-1");
    let response = app
        .oneshot(common::projects_request("POST", Some(&auth), Some(BODY))?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::json_body(response).await?;
    assert_eq!(body["message"], "Not authorized!");
    // Precondition failures never reach the backend
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn missing_identity_is_unauthorized() -> Result<()> {
    let (app, calls) = common::app_with(FetchOutcome::Projects(vec![]));

    let response = app
        .oneshot(common::projects_request("GET", None, Some(BODY))?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::json_body(response).await?;
    assert_eq!(body["message"], "Not authorized!");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn garbage_bearer_token_is_unauthorized() -> Result<()> {
    let (app, calls) = common::app_with(FetchOutcome::Projects(vec![]));

    let response = app
        .oneshot(common::projects_request(
            "GET",
            Some("Bearer not-a-jwt"),
            Some(BODY),
        )?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn missing_refresh_token_is_a_hard_stop() -> Result<()> {
    let (app, calls) = common::app_with(FetchOutcome::Projects(vec![json!({"name": "alpha"})]));

    let auth = common::bearer_for("user-1");
    let response = app
        .oneshot(common::projects_request(
            "GET",
            Some(&auth),
            Some(r#"{"uid": "user-1"}"#),
        )?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::json_body(response).await?;
    assert_eq!(body["message"], "No refresh token provided");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn empty_body_means_no_refresh_token() -> Result<()> {
    let (app, calls) = common::app_with(FetchOutcome::Projects(vec![]));

    let auth = common::bearer_for("user-1");
    let response = app
        .oneshot(common::projects_request("GET", Some(&auth), None)?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::json_body(response).await?;
    assert_eq!(body["message"], "No refresh token provided");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_bad_request() -> Result<()> {
    let (app, calls) = common::app_with(FetchOutcome::Projects(vec![]));

    let auth = common::bearer_for("user-1");
    let response = app
        .oneshot(common::projects_request("GET", Some(&auth), Some("{not json"))?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::json_body(response).await?;
    assert_eq!(body["code"], "INVALID_JSON");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn empty_project_list_reports_error_msg() -> Result<()> {
    let (app, _calls) = common::app_with(FetchOutcome::NoProjects);

    let auth = common::bearer_for("user-1");
    let response = app
        .oneshot(common::projects_request("GET", Some(&auth), Some(BODY))?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::json_body(response).await?;
    assert_eq!(body["projects"], json!([]));
    assert_eq!(body["error_msg"], "No projects found");
    Ok(())
}

#[tokio::test]
async fn non_empty_project_list_passes_through() -> Result<()> {
    let p1 = json!({"name": "alpha"});
    let p2 = json!({"name": "beta"});
    let (app, calls) = common::app_with(FetchOutcome::Projects(vec![p1.clone(), p2.clone()]));

    let auth = common::bearer_for("user-1");
    let response = app
        .oneshot(common::projects_request("GET", Some(&auth), Some(BODY))?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::json_body(response).await?;
    assert_eq!(body["projects"], json!([p1, p2]));
    assert!(body.get("error_msg").is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn relational_empty_list_is_plain_success() -> Result<()> {
    // Relational mode reports an empty ownership scan as Projects([]),
    // which serializes without error_msg
    let (app, _calls) = common::app_with(FetchOutcome::Projects(vec![]));

    let auth = common::bearer_for("user-1");
    let response = app
        .oneshot(common::projects_request("GET", Some(&auth), Some(BODY))?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::json_body(response).await?;
    assert_eq!(body["projects"], json!([]));
    assert!(body.get("error_msg").is_none());
    Ok(())
}

#[tokio::test]
async fn missing_user_record_is_unauthorized() -> Result<()> {
    let (app, _calls) = common::app_with(FetchOutcome::UserNotFound);

    let auth = common::bearer_for("user-1");
    let response = app
        .oneshot(common::projects_request("GET", Some(&auth), Some(BODY))?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::json_body(response).await?;
    assert_eq!(body["message"], "User not found!");
    Ok(())
}

#[tokio::test]
async fn failed_token_check_is_unauthorized() -> Result<()> {
    let (app, _calls) = common::app_with(FetchOutcome::InvalidToken);

    let auth = common::bearer_for("user-1");
    let response = app
        .oneshot(common::projects_request("GET", Some(&auth), Some(BODY))?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::json_body(response).await?;
    assert_eq!(body["message"], "Invalid refresh token");
    Ok(())
}

#[tokio::test]
async fn string_encoded_body_behaves_like_object_body() -> Result<()> {
    let project = json!({"name": "alpha"});
    let encoded = r#""{\"refresh_token\": \"tok-123\", \"uid\": \"user-1\"}""#;

    let auth = common::bearer_for("user-1");

    let (app, _calls) = common::app_with(FetchOutcome::Projects(vec![project.clone()]));
    let object_response = app
        .oneshot(common::projects_request("GET", Some(&auth), Some(BODY))?)
        .await?;

    let (app, _calls) = common::app_with(FetchOutcome::Projects(vec![project]));
    let encoded_response = app
        .oneshot(common::projects_request("GET", Some(&auth), Some(encoded))?)
        .await?;

    assert_eq!(object_response.status(), encoded_response.status());
    let object_body = common::json_body(object_response).await?;
    let encoded_body = common::json_body(encoded_response).await?;
    assert_eq!(object_body, encoded_body);
    Ok(())
}

#[tokio::test]
async fn slow_backend_read_times_out_as_unavailable() -> Result<()> {
    let (app, calls) = common::app_with_timeout(
        FetchOutcome::Projects(vec![]),
        Some(Duration::from_millis(200)),
        Duration::from_millis(50),
    );

    let auth = common::bearer_for("user-1");
    let response = app
        .oneshot(common::projects_request("GET", Some(&auth), Some(BODY))?)
        .await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = common::json_body(response).await?;
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}
