use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::BridgeConfig;

const EVENT_ISSUE_CREATED: &str = "jira:issue_created";
const EVENT_ISSUE_UPDATED: &str = "jira:issue_updated";
const SUBTYPE_ISSUE_CREATED: &str = "issue_created";

/// Inbound field that the intake tracker renders either as a bare string or
/// as an option object carrying a `value` property, depending on the field's
/// screen configuration. Both shapes normalize through [`FieldValue::as_str`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Plain(String),
    Wrapped { value: String },
}

impl FieldValue {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(value) => value,
            Self::Wrapped { value } => value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRef {
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueFields {
    pub issuetype: NamedRef,
    pub project: ProjectRef,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<NamedRef>,
    /// Custom fields, keyed by the instance-specific field id. Which ids
    /// carry the SQL payload, database, back-link, and dynamic project is
    /// configuration, so they cannot be named statically here.
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookIssue {
    pub key: String,
    pub fields: IssueFields,
}

/// The inbound webhook payload, as posted by the intake tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "webhookEvent")]
    pub webhook_event: String,
    #[serde(default)]
    pub issue_event_type_name: Option<String>,
    pub issue: WebhookIssue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A newly created issue: drives the change workflow.
    Created,
    /// An edit to an existing issue: observed, never acted on.
    Updated,
    /// Anything else: acknowledged as a no-op.
    Other,
}

impl WebhookEvent {
    pub fn kind(&self) -> EventKind {
        if self.webhook_event == EVENT_ISSUE_CREATED
            && self.issue_event_type_name.as_deref() == Some(SUBTYPE_ISSUE_CREATED)
        {
            EventKind::Created
        } else if self.webhook_event == EVENT_ISSUE_UPDATED {
            EventKind::Updated
        } else {
            EventKind::Other
        }
    }

    /// Read a configured custom field, tolerating both inbound shapes.
    pub fn custom_field(&self, field_id: &str) -> Option<String> {
        let raw = self.issue.fields.custom.get(field_id)?;
        let value: FieldValue = serde_json::from_value(raw.clone()).ok()?;
        Some(value.as_str().to_owned())
    }
}

/// Point-in-time snapshot of a change request parsed from an inbound event.
///
/// This is a snapshot, not a tracked entity: a later event for the same issue
/// key produces a fresh one. Serialized (camelCase) straight into the webhook
/// response and the last-snapshot endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    pub issue_key: String,
    pub issue_type: String,
    pub project_key: String,
    pub summary: String,
    pub description: String,
    pub sql_statement: String,
    pub database: String,
    pub status: String,
    pub bytebase_issue_link: Option<String>,
}

impl ChangeRequest {
    pub fn from_event(event: &WebhookEvent, config: &BridgeConfig) -> Self {
        let fields = &event.issue.fields;
        Self {
            issue_key: event.issue.key.clone(),
            issue_type: fields.issuetype.name.clone(),
            project_key: fields.project.key.clone(),
            summary: fields.summary.clone().unwrap_or_default(),
            description: fields.description.clone().unwrap_or_default(),
            sql_statement: event.custom_field(&config.sql_field).unwrap_or_default(),
            database: event.custom_field(&config.database_field).unwrap_or_default(),
            status: fields
                .status
                .as_ref()
                .map(|status| status.name.clone())
                .unwrap_or_default(),
            bytebase_issue_link: event.custom_field(&config.back_link_field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PollScope;

    fn test_config() -> BridgeConfig {
        BridgeConfig {
            bytebase_host: "http://bb.example".into(),
            bytebase_service_account: "svc@example.com".into(),
            bytebase_service_key: "secret".into(),
            bytebase_project: "projects/sample".into(),
            jira_base_url: "http://jira.example".into(),
            jira_email: "bot@example.com".into(),
            jira_api_token: "token".into(),
            jira_project_key: "DB".into(),
            change_request_type: "Database Change".into(),
            sql_field: "customfield_10236".into(),
            database_field: "customfield_10235".into(),
            back_link_field: "customfield_10268".into(),
            project_field: None,
            schedule_field: None,
            tag_prefix: "JIRA".into(),
            poll_scope: PollScope::ConfiguredProject,
        }
    }

    fn event_json(database_field: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "webhookEvent": "jira:issue_created",
            "issue_event_type_name": "issue_created",
            "issue": {
                "key": "DB-7",
                "fields": {
                    "issuetype": { "name": "Database Change" },
                    "project": { "key": "DB" },
                    "summary": "add index",
                    "description": "speed up lookups",
                    "status": { "name": "To Do" },
                    "customfield_10236": "CREATE INDEX idx ON t (c);",
                    "customfield_10235": database_field
                }
            }
        })
    }

    #[test]
    fn created_event_is_classified() {
        let event: WebhookEvent = serde_json::from_value(event_json("sales".into())).unwrap();
        assert_eq!(event.kind(), EventKind::Created);
    }

    #[test]
    fn updated_event_is_classified() {
        let mut raw = event_json("sales".into());
        raw["webhookEvent"] = "jira:issue_updated".into();
        raw["issue_event_type_name"] = "issue_generic".into();
        let event: WebhookEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.kind(), EventKind::Updated);
    }

    #[test]
    fn unknown_event_is_other() {
        let mut raw = event_json("sales".into());
        raw["webhookEvent"] = "comment_created".into();
        let event: WebhookEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.kind(), EventKind::Other);
    }

    #[test]
    fn plain_database_field_resolves() {
        let event: WebhookEvent = serde_json::from_value(event_json("mydb".into())).unwrap();
        let request = ChangeRequest::from_event(&event, &test_config());
        assert_eq!(request.database, "mydb");
    }

    #[test]
    fn wrapped_database_field_resolves_to_same_value() {
        let raw = event_json(serde_json::json!({ "value": "mydb" }));
        let event: WebhookEvent = serde_json::from_value(raw).unwrap();
        let request = ChangeRequest::from_event(&event, &test_config());
        assert_eq!(request.database, "mydb");
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let raw = serde_json::json!({
            "webhookEvent": "jira:issue_created",
            "issue": {
                "key": "DB-8",
                "fields": {
                    "issuetype": { "name": "Database Change" },
                    "project": { "key": "DB" }
                }
            }
        });
        let event: WebhookEvent = serde_json::from_value(raw).unwrap();
        let request = ChangeRequest::from_event(&event, &test_config());
        assert_eq!(request.summary, "");
        assert_eq!(request.sql_statement, "");
        assert!(request.bytebase_issue_link.is_none());
    }
}
