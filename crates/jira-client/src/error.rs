use thiserror::Error;

#[derive(Debug, Error)]
pub enum JiraError {
    #[error("Jira request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Jira API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Jira response was malformed JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("no transition to status '{0}' is available on the issue")]
    TransitionNotFound(String),
}
