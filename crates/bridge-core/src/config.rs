use crate::error::{BridgeError, Result};

const ENV_BB_HOST: &str = "BRIDGE_BB_HOST";
const ENV_BB_SERVICE_ACCOUNT: &str = "BRIDGE_BB_SERVICE_ACCOUNT";
const ENV_BB_SERVICE_KEY: &str = "BRIDGE_BB_SERVICE_KEY";
const ENV_BB_PROJECT: &str = "BRIDGE_BB_PROJECT";
const ENV_JIRA_BASE_URL: &str = "BRIDGE_JIRA_BASE_URL";
const ENV_JIRA_EMAIL: &str = "BRIDGE_JIRA_EMAIL";
const ENV_JIRA_API_TOKEN: &str = "BRIDGE_JIRA_API_TOKEN";
const ENV_JIRA_PROJECT_KEY: &str = "BRIDGE_JIRA_PROJECT_KEY";
const ENV_CHANGE_REQUEST_TYPE: &str = "BRIDGE_CHANGE_REQUEST_TYPE";
const ENV_SQL_FIELD: &str = "BRIDGE_JIRA_SQL_FIELD";
const ENV_DATABASE_FIELD: &str = "BRIDGE_JIRA_DATABASE_FIELD";
const ENV_BACK_LINK_FIELD: &str = "BRIDGE_JIRA_BACK_LINK_FIELD";
const ENV_PROJECT_FIELD: &str = "BRIDGE_JIRA_PROJECT_FIELD";
const ENV_SCHEDULE_FIELD: &str = "BRIDGE_JIRA_SCHEDULE_FIELD";
const ENV_TAG_PREFIX: &str = "BRIDGE_TAG_PREFIX";
const ENV_POLL_SCOPE: &str = "BRIDGE_POLL_SCOPE";

const DEFAULT_CHANGE_REQUEST_TYPE: &str = "Database Change";
const DEFAULT_SQL_FIELD: &str = "customfield_10236";
const DEFAULT_DATABASE_FIELD: &str = "customfield_10235";
const DEFAULT_BACK_LINK_FIELD: &str = "customfield_10268";
const DEFAULT_TAG_PREFIX: &str = "JIRA";

/// Which change-execution projects the reconciliation poller lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollScope {
    /// Only the configured change-execution project.
    ConfiguredProject,
    /// Every project visible to the service account.
    AllProjects,
}

impl PollScope {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "project" => Ok(Self::ConfiguredProject),
            "all" => Ok(Self::AllProjects),
            other => Err(BridgeError::Configuration(format!(
                "{ENV_POLL_SCOPE} must be 'project' or 'all', got '{other}'"
            ))),
        }
    }
}

/// Environment-supplied configuration for both sides of the bridge.
///
/// Custom field ids default to the workflow this bridge was built against but
/// can be overridden, since field ids differ per intake-tracker instance.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub bytebase_host: String,
    pub bytebase_service_account: String,
    pub bytebase_service_key: String,
    /// Change-execution project resource name, e.g. `projects/sample`.
    pub bytebase_project: String,

    pub jira_base_url: String,
    pub jira_email: String,
    pub jira_api_token: String,
    pub jira_project_key: String,

    /// Issue category that marks an inbound event as a change request.
    pub change_request_type: String,
    /// Field id carrying the SQL payload.
    pub sql_field: String,
    /// Field id carrying the target database identifier.
    pub database_field: String,
    /// Field id the change-execution link is written back to.
    pub back_link_field: String,
    /// Field id carrying a dynamic target project. When set, the webhook
    /// handler routes to the project named on the event instead of the
    /// configured one, and rejects events that omit the field.
    pub project_field: Option<String>,
    /// Field id carrying an earliest-allowed execution time, if the intake
    /// workflow exposes one.
    pub schedule_field: Option<String>,

    /// Prefix of the correlation tag embedded in issue titles.
    pub tag_prefix: String,
    pub poll_scope: PollScope,
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bytebase_host: required(ENV_BB_HOST)?,
            bytebase_service_account: required(ENV_BB_SERVICE_ACCOUNT)?,
            bytebase_service_key: required(ENV_BB_SERVICE_KEY)?,
            bytebase_project: required(ENV_BB_PROJECT)?,
            jira_base_url: required(ENV_JIRA_BASE_URL)?,
            jira_email: required(ENV_JIRA_EMAIL)?,
            jira_api_token: required(ENV_JIRA_API_TOKEN)?,
            jira_project_key: required(ENV_JIRA_PROJECT_KEY)?,
            change_request_type: optional(ENV_CHANGE_REQUEST_TYPE)
                .unwrap_or_else(|| DEFAULT_CHANGE_REQUEST_TYPE.to_owned()),
            sql_field: optional(ENV_SQL_FIELD).unwrap_or_else(|| DEFAULT_SQL_FIELD.to_owned()),
            database_field: optional(ENV_DATABASE_FIELD)
                .unwrap_or_else(|| DEFAULT_DATABASE_FIELD.to_owned()),
            back_link_field: optional(ENV_BACK_LINK_FIELD)
                .unwrap_or_else(|| DEFAULT_BACK_LINK_FIELD.to_owned()),
            project_field: optional(ENV_PROJECT_FIELD),
            schedule_field: optional(ENV_SCHEDULE_FIELD),
            tag_prefix: optional(ENV_TAG_PREFIX).unwrap_or_else(|| DEFAULT_TAG_PREFIX.to_owned()),
            poll_scope: match optional(ENV_POLL_SCOPE) {
                Some(raw) => PollScope::parse(&raw)?,
                None => PollScope::ConfiguredProject,
            },
        })
    }
}

fn required(name: &str) -> Result<String> {
    optional(name).ok_or_else(|| {
        BridgeError::Configuration(format!("{name} is not set. Export it before starting the bridge."))
    })
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_scope_parses_known_values() {
        assert_eq!(PollScope::parse("project").unwrap(), PollScope::ConfiguredProject);
        assert_eq!(PollScope::parse("all").unwrap(), PollScope::AllProjects);
    }

    #[test]
    fn poll_scope_rejects_unknown_value() {
        let err = PollScope::parse("everything").unwrap_err();
        assert!(err.to_string().contains("BRIDGE_POLL_SCOPE"));
    }
}
