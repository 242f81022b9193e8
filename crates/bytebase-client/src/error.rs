use thiserror::Error;

#[derive(Debug, Error)]
pub enum BytebaseError {
    #[error("Bytebase request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Bytebase API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Bytebase response was malformed JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("login response did not contain a token")]
    MissingToken,

    #[error("{0} creation returned no resource name")]
    MissingResourceName(&'static str),
}
