//! Project IAM policy surface: read-modify-write of role bindings.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::BytebaseClient;
use crate::Result;

const PROJECT_OWNER_ROLE: &str = "roles/projectOwner";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IamCondition {
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IamBinding {
    pub role: String,
    pub members: Vec<String>,
    #[serde(default)]
    pub condition: IamCondition,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IamPolicy {
    #[serde(default)]
    pub bindings: Vec<IamBinding>,
    #[serde(default)]
    pub etag: String,
}

impl BytebaseClient {
    /// Fetch the IAM policy of `project` (a full resource name).
    pub async fn get_iam_policy(&self, project: &str) -> Result<IamPolicy> {
        self.get_json(&format!("/v1/{project}:getIamPolicy")).await
    }

    /// Replace the IAM policy of `project`. The etag carried on `policy` must
    /// be the one returned by the preceding fetch or the write is rejected.
    pub async fn set_iam_policy(&self, project: &str, policy: &IamPolicy) -> Result<IamPolicy> {
        let body = json!({
            "resource": project,
            "policy": { "bindings": policy.bindings },
            "etag": policy.etag,
        });
        self.post_json(&format!("/v1/{project}:setIamPolicy"), &body)
            .await
    }

    /// Append a project-owner binding for `email` to the current policy.
    pub async fn grant_project_owner(&self, project: &str, email: &str) -> Result<IamPolicy> {
        let mut policy = self.get_iam_policy(project).await?;
        policy.bindings.push(IamBinding {
            role: PROJECT_OWNER_ROLE.to_owned(),
            members: vec![format!("user:{email}")],
            condition: IamCondition::default(),
        });
        self.set_iam_policy(project, &policy).await
    }
}
