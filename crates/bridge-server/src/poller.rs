//! Reconciliation poller: propagate change-execution status moves back to
//! the intake tracker.
//!
//! The ledger is updated BEFORE the intake transition is attempted, so a
//! transition that fails is not retried on the next cycle for the same
//! status value (at-most-one-attempt-per-status semantics). One issue's
//! failure never aborts the rest of the cycle.

use serde::Serialize;
use tracing::{info, warn};

use bridge_core::status::intake_transition;
use bridge_core::{Observation, PollScope};

use crate::state::AppState;

/// An intake issue the poller successfully transitioned, as reported on the
/// poll endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedIssue {
    pub issue_name: String,
    pub issue_title: String,
    pub issue_status: String,
    pub issue_type: String,
    pub issue_description: String,
    pub project_name: String,
    pub bytebase_issue_link: String,
    pub jira_issue_key: String,
}

/// Run one reconciliation cycle and return the transitions that were applied.
pub async fn poll_once(app: &AppState) -> anyhow::Result<Vec<UpdatedIssue>> {
    let projects: Vec<String> = match app.config.poll_scope {
        PollScope::ConfiguredProject => vec![app.config.bytebase_project.clone()],
        PollScope::AllProjects => app
            .bytebase
            .list_projects()
            .await?
            .into_iter()
            // Returned names may or may not carry the resource prefix; make
            // sure the issue-list path has exactly one.
            .map(|project| {
                let bare = project
                    .name
                    .strip_prefix("projects/")
                    .map(str::to_owned)
                    .unwrap_or(project.name);
                format!("projects/{bare}")
            })
            .collect(),
    };

    let mut updated = Vec::new();
    for project in projects {
        let issues = match app.bytebase.list_issues(&project).await {
            Ok(issues) => issues,
            Err(error) => {
                if app.config.poll_scope == PollScope::AllProjects {
                    warn!(%project, %error, "skipping project: issue listing failed");
                    continue;
                }
                return Err(error.into());
            }
        };

        for issue in issues {
            // Issues without a correlation tag did not originate here.
            let Some(key) = app.tag.extract_key(&issue.title).map(str::to_owned) else {
                continue;
            };
            if app.ledger.observe(&issue.name, &issue.status) == Observation::Unchanged {
                continue;
            }
            let Some(transition) = intake_transition(&issue.status) else {
                continue;
            };

            match app.jira.transition_to(&key, transition).await {
                Ok(()) => {
                    info!(issue = %issue.name, %key, transition, "transitioned intake issue");
                    let project_name = project
                        .strip_prefix("projects/")
                        .unwrap_or(&project)
                        .to_owned();
                    updated.push(UpdatedIssue {
                        bytebase_issue_link: format!("{}/{}", app.bytebase.host(), issue.name),
                        issue_name: issue.name,
                        issue_title: issue.title,
                        issue_status: issue.status,
                        issue_type: issue.issue_type,
                        issue_description: issue.description,
                        project_name,
                        jira_issue_key: key,
                    });
                }
                Err(error) => {
                    warn!(issue = %issue.name, %key, %error, "failed to transition intake issue");
                }
            }
        }
    }

    Ok(updated)
}
