use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("not a change request issue: got type '{0}'")]
    NotChangeRequest(String),

    #[error("issue project '{0}' is not the configured intake project")]
    ProjectNotConfigured(String),

    #[error("missing required field '{0}' on inbound event")]
    MissingField(String),

    #[error("no matching database found for '{0}'")]
    DatabaseNotFound(String),

    #[error("malformed webhook payload: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
