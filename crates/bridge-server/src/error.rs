use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use bridge_core::BridgeError;
use bytebase_client::{BytebaseError, WorkflowFailure};
use jira_client::JiraError;

/// Unified error type for HTTP responses.
///
/// Validation and mapping failures (nothing was attempted remotely) map to
/// 400 with a bare `error`; dependency and workflow failures map to 500 and
/// carry the underlying failure in `details` so operators can see what, if
/// anything, was already created.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(e) = self.0.downcast_ref::<BridgeError>() {
            let status = match e {
                BridgeError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            };
            let body = serde_json::json!({ "error": e.to_string() });
            return (status, axum::Json(body)).into_response();
        }

        if let Some(failure) = self.0.downcast_ref::<WorkflowFailure>() {
            let body = serde_json::json!({
                "error": "Failed to create Bytebase issue",
                "details": failure.to_string(),
            });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
        }

        if let Some(e) = self.0.downcast_ref::<JiraError>() {
            let body = serde_json::json!({
                "error": "Failed to update Jira issue",
                "details": e.to_string(),
            });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
        }

        if let Some(e) = self.0.downcast_ref::<BytebaseError>() {
            let body = serde_json::json!({
                "error": "Bytebase request failed",
                "details": e.to_string(),
            });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
