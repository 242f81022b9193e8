use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /api/webhooks/jira/last — the latest parsed change request, if any.
pub async fn last_event(State(app): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = app.last_event.read().await.clone();
    Json(serde_json::json!({ "jira": snapshot }))
}
