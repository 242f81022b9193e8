use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

use crate::error::BytebaseError;
use crate::types::{Database, DatabaseList, Issue, IssueList, Plan, Project, ProjectList, Rollout, Sheet};
use crate::Result;

const REQUEST_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: String,
}

/// Typed request wrapper over the change-execution REST surface.
///
/// Every public method acquires a fresh service-account token before the
/// call; the token is short-lived and never cached, trading an extra login
/// round-trip for freedom from stale-token coordination.
#[derive(Debug, Clone)]
pub struct BytebaseClient {
    http: reqwest::Client,
    host: String,
    service_account: String,
    service_key: String,
}

impl BytebaseClient {
    pub fn new(host: &str, service_account: &str, service_key: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            host: host.trim_end_matches('/').to_owned(),
            service_account: service_account.to_owned(),
            service_key: service_key.to_owned(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    /// Exchange the service-account credentials for a bearer token.
    async fn token(&self) -> Result<String> {
        let response = self
            .http
            .post(self.url("/v1/auth/login"))
            .json(&json!({
                "email": self.service_account,
                "password": self.service_key,
                "web": true,
            }))
            .send()
            .await?;
        let body = read_success_body(response).await?;
        let login: LoginResponse = serde_json::from_str(&body).map_err(BytebaseError::Decode)?;
        if login.token.is_empty() {
            return Err(BytebaseError::MissingToken);
        }
        Ok(login.token)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.token().await?;
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        decode(read_success_body(response).await?)
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let token = self.token().await?;
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        decode(read_success_body(response).await?)
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let list: ProjectList = self.get_json("/v1/projects").await?;
        Ok(list.projects)
    }

    /// List the databases visible under `project` (a full resource name such
    /// as `projects/sample`).
    pub async fn list_databases(&self, project: &str) -> Result<Vec<Database>> {
        let list: DatabaseList = self.get_json(&format!("/v1/{project}/databases")).await?;
        Ok(list.databases)
    }

    pub async fn list_issues(&self, project: &str) -> Result<Vec<Issue>> {
        let list: IssueList = self.get_json(&format!("/v1/{project}/issues")).await?;
        Ok(list.issues)
    }

    /// Create a sheet holding the SQL payload. Engine and statement type are
    /// left unspecified; the execution side is schema-agnostic about dialect.
    pub async fn create_sheet(&self, project: &str, sql: &str) -> Result<Sheet> {
        let body = json!({
            "name": "",
            "title": "",
            "content": BASE64.encode(sql),
            "payload": {
                "type": "TYPE_UNSPECIFIED",
                "commands": [{ "start": 1, "end": 1 }],
            },
            "engine": "ENGINE_UNSPECIFIED",
        });
        self.post_json(&format!("/v1/{project}/sheets"), &body).await
    }

    /// Create a migration plan targeting `database` with the given sheet.
    /// `earliest_allowed_time` is an RFC 3339 UTC instant, or empty for
    /// "as soon as approved".
    pub async fn create_plan(
        &self,
        project: &str,
        database: &str,
        sheet: &str,
        earliest_allowed_time: &str,
    ) -> Result<Plan> {
        let body = json!({
            "steps": [{
                "specs": [{
                    "id": Uuid::new_v4().to_string(),
                    "earliestAllowedTime": earliest_allowed_time,
                    "change_database_config": {
                        "target": database,
                        "type": "MIGRATE",
                        "sheet": sheet,
                    },
                }],
            }],
            "title": format!("Change database {database}"),
            "description": "MIGRATE",
        });
        self.post_json(&format!("/v1/{project}/plans"), &body).await
    }

    pub async fn create_issue(
        &self,
        project: &str,
        title: &str,
        description: &str,
        plan: &str,
    ) -> Result<Issue> {
        let body = json!({
            "approvers": [],
            "approvalTemplates": [],
            "subscribers": [],
            "title": title,
            "description": description,
            "type": "DATABASE_CHANGE",
            "plan": plan,
        });
        self.post_json(&format!("/v1/{project}/issues"), &body).await
    }

    pub async fn create_rollout(&self, project: &str, plan: &str) -> Result<Rollout> {
        let body = json!({ "plan": plan });
        self.post_json(&format!("/v1/{project}/rollouts"), &body).await
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(BytebaseError::Api { status, body });
    }
    Ok(body)
}

fn decode<T: DeserializeOwned>(body: String) -> Result<T> {
    serde_json::from_str(&body).map_err(BytebaseError::Decode)
}
