use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::error::JiraError;
use crate::Result;

const REQUEST_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitionTarget {
    #[serde(default)]
    pub name: String,
}

/// One workflow transition currently available on an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct Transition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// The status the transition lands on.
    #[serde(default)]
    pub to: TransitionTarget,
}

#[derive(Debug, Default, Deserialize)]
struct TransitionList {
    #[serde(default)]
    transitions: Vec<Transition>,
}

/// Typed request wrapper over the intake tracker's issue REST surface.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    authorization: String,
}

impl JiraClient {
    pub fn new(base_url: &str, email: &str, api_token: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            authorization: format!("Basic {}", BASE64.encode(format!("{email}:{api_token}"))),
        })
    }

    fn issue_url(&self, issue_key: &str) -> String {
        format!("{}/rest/api/3/issue/{}", self.base_url, issue_key)
    }

    /// Set a single field on an issue, e.g. the change-execution back-link.
    pub async fn update_field(
        &self,
        issue_key: &str,
        field_id: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        let mut fields = serde_json::Map::new();
        fields.insert(field_id.to_owned(), value.clone());
        let response = self
            .http
            .put(self.issue_url(issue_key))
            .header(header::AUTHORIZATION, &self.authorization)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        read_success_body(response).await?;
        Ok(())
    }

    /// List the transitions currently available on an issue. The set depends
    /// on the project's workflow configuration, so it is discovered at call
    /// time rather than hard-coded.
    pub async fn list_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
        let response = self
            .http
            .get(format!("{}/transitions", self.issue_url(issue_key)))
            .header(header::AUTHORIZATION, &self.authorization)
            .send()
            .await?;
        let body = read_success_body(response).await?;
        let list: TransitionList = serde_json::from_str(&body).map_err(JiraError::Decode)?;
        Ok(list.transitions)
    }

    /// Move an issue to `target_status` by discovering and executing the
    /// matching transition. The destination name is matched
    /// case-insensitively.
    pub async fn transition_to(&self, issue_key: &str, target_status: &str) -> Result<()> {
        let transitions = self.list_transitions(issue_key).await?;
        let transition = transitions
            .iter()
            .find(|transition| transition.to.name.eq_ignore_ascii_case(target_status))
            .ok_or_else(|| JiraError::TransitionNotFound(target_status.to_owned()))?;

        debug!(issue_key, target_status, transition_id = %transition.id, "executing transition");
        let response = self
            .http
            .post(format!("{}/transitions", self.issue_url(issue_key)))
            .header(header::AUTHORIZATION, &self.authorization)
            .json(&json!({ "transition": { "id": transition.id } }))
            .send()
            .await?;
        read_success_body(response).await?;
        Ok(())
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(JiraError::Api { status, body });
    }
    Ok(body)
}
