use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::poller;
use crate::state::AppState;

/// GET /api/poll — run one reconciliation cycle.
pub async fn poll(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let updated = poller::poll_once(&app).await?;
    Ok(Json(serde_json::json!({ "updatedIssues": updated })))
}
