use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    /// Full resource name, e.g. `instances/prod/databases/sales`.
    pub name: String,
    #[serde(default)]
    pub environment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "type")]
    pub issue_type: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sheet {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rollout {
    #[serde(default)]
    pub name: String,
}

// Listing endpoints wrap their results; a missing array means an empty
// listing, not a protocol error.

#[derive(Debug, Default, Deserialize)]
pub struct ProjectList {
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DatabaseList {
    #[serde(default)]
    pub databases: Vec<Database>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IssueList {
    #[serde(default)]
    pub issues: Vec<Issue>,
}
