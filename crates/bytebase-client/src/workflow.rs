//! The four-step change workflow: sheet → plan → issue → rollout.
//!
//! Steps run strictly in order; each one's returned resource name feeds the
//! next. A failed step aborts the rest but nothing already created is rolled
//! back: the failure names the step and the orphaned artifacts for an
//! operator to reconcile. The workflow is never retried automatically, since
//! re-running it would duplicate sheets, plans, and issues.

use std::fmt;

use thiserror::Error;
use tracing::warn;

use bridge_core::correlation::CorrelationTag;
use bridge_core::schedule::normalize_scheduled_time;

use crate::client::BytebaseClient;
use crate::error::BytebaseError;
use crate::types::Issue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    Sheet,
    Plan,
    Issue,
    Rollout,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sheet => "sheet",
            Self::Plan => "plan",
            Self::Issue => "issue",
            Self::Rollout => "rollout",
        };
        f.write_str(name)
    }
}

/// Resource names created before a failure, for operator cleanup.
#[derive(Debug, Clone, Default)]
pub struct CreatedArtifacts {
    pub sheet: Option<String>,
    pub plan: Option<String>,
    pub issue: Option<String>,
    pub rollout: Option<String>,
}

impl fmt::Display for CreatedArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for (label, name) in [
            ("sheet", &self.sheet),
            ("plan", &self.plan),
            ("issue", &self.issue),
            ("rollout", &self.rollout),
        ] {
            if let Some(name) = name {
                parts.push(format!("{label} {name}"));
            }
        }
        if parts.is_empty() {
            f.write_str("nothing")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// A workflow abort: which step failed, what already exists remotely, and
/// the underlying call failure.
#[derive(Debug, Error)]
#[error("change workflow failed at the {step} step (created so far: {created}): {source}")]
pub struct WorkflowFailure {
    pub step: WorkflowStep,
    pub created: CreatedArtifacts,
    #[source]
    pub source: BytebaseError,
}

#[derive(Debug, Clone)]
pub struct WorkflowSuccess {
    /// Human-facing link, `{host}/projects/{project}/issues/{number}`.
    pub issue_link: String,
    pub issue: Issue,
}

#[derive(Debug, Clone)]
pub struct ChangeWorkflowInput<'a> {
    /// Change-execution project resource name, e.g. `projects/sample`.
    pub project: &'a str,
    /// Target database resource name as returned by the database listing.
    pub database: &'a str,
    pub sql: &'a str,
    pub summary: &'a str,
    pub description: &'a str,
    /// The intake issue key embedded into the execution issue's title.
    pub correlation_key: &'a str,
    /// Intake tracker base URL, used to render the link back to the ticket.
    pub intake_base_url: &'a str,
    /// Raw scheduled-time string off the inbound event, if any.
    pub scheduled_time: Option<&'a str>,
}

/// Drive the full creation sequence against the change-execution system.
pub async fn create_change_workflow(
    client: &BytebaseClient,
    tag: &CorrelationTag,
    input: ChangeWorkflowInput<'_>,
) -> Result<WorkflowSuccess, WorkflowFailure> {
    let mut created = CreatedArtifacts::default();

    let sheet = client
        .create_sheet(input.project, input.sql)
        .await
        .map_err(|source| WorkflowFailure {
            step: WorkflowStep::Sheet,
            created: created.clone(),
            source,
        })?;
    created.sheet = Some(sheet.name.clone());

    // A malformed schedule degrades to "no schedule" rather than failing the
    // workflow; the change just becomes eligible immediately.
    let earliest_allowed = match input.scheduled_time {
        Some(raw) => normalize_scheduled_time(raw).unwrap_or_else(|| {
            warn!(raw, "scheduled time did not parse; creating plan without one");
            String::new()
        }),
        None => String::new(),
    };

    let plan = client
        .create_plan(input.project, input.database, &sheet.name, &earliest_allowed)
        .await
        .map_err(|source| WorkflowFailure {
            step: WorkflowStep::Plan,
            created: created.clone(),
            source,
        })?;
    if plan.name.is_empty() {
        // Every later step references the plan, so this is the one hard
        // precondition check.
        return Err(WorkflowFailure {
            step: WorkflowStep::Plan,
            created,
            source: BytebaseError::MissingResourceName("plan"),
        });
    }
    created.plan = Some(plan.name.clone());

    let intake_url = format!(
        "{}/browse/{}",
        input.intake_base_url.trim_end_matches('/'),
        input.correlation_key
    );
    let title = tag.issue_title(input.correlation_key, input.summary);
    let description = format!(
        "Jira Issue Link: [{intake_url}]({intake_url})\n\n{}",
        input.description
    );

    let issue = client
        .create_issue(input.project, &title, &description, &plan.name)
        .await
        .map_err(|source| WorkflowFailure {
            step: WorkflowStep::Issue,
            created: created.clone(),
            source,
        })?;
    created.issue = Some(issue.name.clone());

    let rollout = client
        .create_rollout(input.project, &plan.name)
        .await
        .map_err(|source| WorkflowFailure {
            step: WorkflowStep::Rollout,
            created: created.clone(),
            source,
        })?;
    created.rollout = Some(rollout.name);

    let issue_number = issue.name.rsplit('/').next().unwrap_or(&issue.name);
    let project_segment = input
        .project
        .split('/')
        .nth(1)
        .unwrap_or(input.project);
    let issue_link = format!(
        "{}/projects/{}/issues/{}",
        client.host(),
        project_segment,
        issue_number
    );

    Ok(WorkflowSuccess { issue_link, issue })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ChangeWorkflowInput<'static> {
        ChangeWorkflowInput {
            project: "projects/sample",
            database: "instances/prod/databases/sales",
            sql: "ALTER TABLE orders ADD COLUMN note text;",
            summary: "add note column",
            description: "requested by support",
            correlation_key: "DB-42",
            intake_base_url: "http://jira.example",
            scheduled_time: None,
        }
    }

    async fn mock_login(server: &mut mockito::Server) {
        server
            .mock("POST", "/v1/auth/login")
            .with_body(r#"{"token":"t"}"#)
            .create_async()
            .await;
    }

    async fn mock_sheet(server: &mut mockito::Server) {
        server
            .mock("POST", "/v1/projects/sample/sheets")
            .with_body(r#"{"name":"projects/sample/sheets/7"}"#)
            .create_async()
            .await;
    }

    #[tokio::test]
    async fn full_sequence_returns_composed_link() {
        let mut server = mockito::Server::new_async().await;
        mock_login(&mut server).await;
        mock_sheet(&mut server).await;
        server
            .mock("POST", "/v1/projects/sample/plans")
            .with_body(r#"{"name":"projects/sample/plans/8"}"#)
            .create_async()
            .await;
        let issue = server
            .mock("POST", "/v1/projects/sample/issues")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "title": "[JIRA>DB-42] add note column",
                "description": "Jira Issue Link: [http://jira.example/browse/DB-42](http://jira.example/browse/DB-42)\n\nrequested by support",
                "type": "DATABASE_CHANGE",
                "plan": "projects/sample/plans/8",
            })))
            .with_body(r#"{"name":"projects/sample/issues/101","title":"[JIRA>DB-42] add note column","status":"OPEN"}"#)
            .create_async()
            .await;
        let rollout = server
            .mock("POST", "/v1/projects/sample/rollouts")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "plan": "projects/sample/plans/8",
            })))
            .with_body(r#"{"name":"projects/sample/rollouts/9"}"#)
            .create_async()
            .await;

        let client = BytebaseClient::new(&server.url(), "svc@example.com", "secret").unwrap();
        let success = create_change_workflow(&client, &CorrelationTag::default(), input())
            .await
            .unwrap();

        assert_eq!(
            success.issue_link,
            format!("{}/projects/sample/issues/101", server.url())
        );
        issue.assert_async().await;
        rollout.assert_async().await;
    }

    #[tokio::test]
    async fn plan_failure_stops_before_issue_and_names_the_sheet() {
        let mut server = mockito::Server::new_async().await;
        mock_login(&mut server).await;
        mock_sheet(&mut server).await;
        server
            .mock("POST", "/v1/projects/sample/plans")
            .with_status(500)
            .with_body("plan exploded")
            .create_async()
            .await;
        let issue = server
            .mock("POST", "/v1/projects/sample/issues")
            .expect(0)
            .create_async()
            .await;

        let client = BytebaseClient::new(&server.url(), "svc@example.com", "secret").unwrap();
        let failure = create_change_workflow(&client, &CorrelationTag::default(), input())
            .await
            .unwrap_err();

        assert_eq!(failure.step, WorkflowStep::Plan);
        assert_eq!(
            failure.created.sheet.as_deref(),
            Some("projects/sample/sheets/7")
        );
        assert!(failure.created.plan.is_none());
        assert!(failure.to_string().contains("plan exploded"));
        issue.assert_async().await;
    }

    #[tokio::test]
    async fn nameless_plan_is_a_hard_stop() {
        let mut server = mockito::Server::new_async().await;
        mock_login(&mut server).await;
        mock_sheet(&mut server).await;
        server
            .mock("POST", "/v1/projects/sample/plans")
            .with_body("{}")
            .create_async()
            .await;
        let issue = server
            .mock("POST", "/v1/projects/sample/issues")
            .expect(0)
            .create_async()
            .await;

        let client = BytebaseClient::new(&server.url(), "svc@example.com", "secret").unwrap();
        let failure = create_change_workflow(&client, &CorrelationTag::default(), input())
            .await
            .unwrap_err();

        assert_eq!(failure.step, WorkflowStep::Plan);
        assert!(matches!(
            failure.source,
            BytebaseError::MissingResourceName("plan")
        ));
        issue.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_schedule_degrades_to_no_schedule() {
        let mut server = mockito::Server::new_async().await;
        mock_login(&mut server).await;
        mock_sheet(&mut server).await;
        let plan = server
            .mock("POST", "/v1/projects/sample/plans")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "steps": [{ "specs": [{ "earliestAllowedTime": "" }] }],
            })))
            .with_body(r#"{"name":"projects/sample/plans/8"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v1/projects/sample/issues")
            .with_body(r#"{"name":"projects/sample/issues/101"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v1/projects/sample/rollouts")
            .with_body(r#"{"name":"projects/sample/rollouts/9"}"#)
            .create_async()
            .await;

        let client = BytebaseClient::new(&server.url(), "svc@example.com", "secret").unwrap();
        let mut with_schedule = input();
        with_schedule.scheduled_time = Some("not-a-date");
        let success = create_change_workflow(&client, &CorrelationTag::default(), with_schedule)
            .await
            .unwrap();

        assert!(success.issue_link.ends_with("/issues/101"));
        plan.assert_async().await;
    }

    #[tokio::test]
    async fn compact_offset_schedule_reaches_the_plan_normalized() {
        let mut server = mockito::Server::new_async().await;
        mock_login(&mut server).await;
        mock_sheet(&mut server).await;
        let plan = server
            .mock("POST", "/v1/projects/sample/plans")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "steps": [{ "specs": [{ "earliestAllowedTime": "2024-01-01T15:00:00.000Z" }] }],
            })))
            .with_body(r#"{"name":"projects/sample/plans/8"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v1/projects/sample/issues")
            .with_body(r#"{"name":"projects/sample/issues/101"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v1/projects/sample/rollouts")
            .with_body(r#"{"name":"projects/sample/rollouts/9"}"#)
            .create_async()
            .await;

        let client = BytebaseClient::new(&server.url(), "svc@example.com", "secret").unwrap();
        let mut with_schedule = input();
        with_schedule.scheduled_time = Some("2024-01-01T10:00-0500");
        create_change_workflow(&client, &CorrelationTag::default(), with_schedule)
            .await
            .unwrap();
        plan.assert_async().await;
    }
}
