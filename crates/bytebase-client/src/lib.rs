//! `bytebase-client` — typed async client for the change-execution system.
//!
//! Wraps the Bytebase REST surface the bridge needs: service-account login,
//! project/database/issue listings, the sheet → plan → issue → rollout
//! creation sequence, and project IAM policy edits. Authentication is a
//! short-lived bearer token fetched fresh for every outbound call; there is
//! deliberately no token cache to go stale.
//!
//! The four-step creation sequence lives in [`workflow`], which turns a
//! parsed change request into remote artifacts and reports partial failures
//! by name instead of hiding them behind a generic error.

pub mod client;
pub mod error;
pub mod iam;
pub mod types;
pub mod workflow;

pub use client::BytebaseClient;
pub use error::BytebaseError;
pub use iam::{IamBinding, IamCondition, IamPolicy};
pub use types::{Database, Issue, Plan, Project, Rollout, Sheet};
pub use workflow::{
    create_change_workflow, ChangeWorkflowInput, CreatedArtifacts, WorkflowFailure, WorkflowStep,
    WorkflowSuccess,
};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, BytebaseError>;
