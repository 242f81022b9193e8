use axum::extract::State;
use axum::Json;
use tracing::info;

use bridge_core::{BridgeConfig, BridgeError, ChangeRequest, EventKind, WebhookEvent};
use bytebase_client::{create_change_workflow, ChangeWorkflowInput};

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/webhooks/jira — the inbound intake event.
///
/// Creation events drive the full change workflow and write the resulting
/// link back to the intake issue. Update events are recorded for the
/// last-snapshot endpoint but never acted on: there is no defined semantics
/// for re-running a change workflow. Everything else is acknowledged as a
/// no-op.
pub async fn receive(
    State(app): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let event: WebhookEvent = serde_json::from_value(payload).map_err(BridgeError::from)?;
    let config = &app.config;

    let category = &event.issue.fields.issuetype.name;
    if *category != config.change_request_type {
        return Err(BridgeError::NotChangeRequest(category.clone()).into());
    }
    if event.issue.fields.project.key != config.jira_project_key {
        return Err(BridgeError::ProjectNotConfigured(event.issue.fields.project.key.clone()).into());
    }

    let mut request = ChangeRequest::from_event(&event, config);

    match event.kind() {
        EventKind::Created => {
            let project = resolve_target_project(&event, config)?;

            // The requested database must match exactly one record under the
            // target project, compared on the trailing path segment.
            let databases = app.bytebase.list_databases(&project).await?;
            let database = databases
                .iter()
                .find(|db| db.name.rsplit('/').next() == Some(request.database.as_str()))
                .ok_or_else(|| BridgeError::DatabaseNotFound(request.database.clone()))?;

            let scheduled_time = config
                .schedule_field
                .as_deref()
                .and_then(|field_id| event.custom_field(field_id));

            let success = create_change_workflow(
                &app.bytebase,
                &app.tag,
                ChangeWorkflowInput {
                    project: &project,
                    database: &database.name,
                    sql: &request.sql_statement,
                    summary: &request.summary,
                    description: &request.description,
                    correlation_key: &request.issue_key,
                    intake_base_url: &config.jira_base_url,
                    scheduled_time: scheduled_time.as_deref(),
                },
            )
            .await?;

            // The workflow has already run; a failed write-back leaves the
            // two systems inconsistent and is surfaced as a server error for
            // a human to reconcile.
            app.jira
                .update_field(
                    &request.issue_key,
                    &config.back_link_field,
                    &serde_json::json!(success.issue_link),
                )
                .await?;
            app.jira
                .transition_to(&request.issue_key, "In Progress")
                .await?;

            request.bytebase_issue_link = Some(success.issue_link.clone());
            info!(issue = %request.issue_key, link = %success.issue_link, "change workflow created");
            *app.last_event.write().await = Some(request.clone());
        }
        EventKind::Updated => {
            info!(issue = %request.issue_key, "intake issue updated; observing only");
            *app.last_event.write().await = Some(request.clone());
        }
        EventKind::Other => {}
    }

    Ok(Json(serde_json::json!({
        "message": "Webhook received and processed successfully",
        "data": request,
    })))
}

/// Pick the change-execution project: a dynamic routing field when one is
/// configured (required on the event in that case), the static configured
/// project otherwise.
fn resolve_target_project(event: &WebhookEvent, config: &BridgeConfig) -> Result<String, BridgeError> {
    match &config.project_field {
        Some(field_id) => {
            let value = event
                .custom_field(field_id)
                .ok_or_else(|| BridgeError::MissingField(field_id.clone()))?;
            if value.starts_with("projects/") {
                Ok(value)
            } else {
                Ok(format!("projects/{value}"))
            }
        }
        None => Ok(config.bytebase_project.clone()),
    }
}
