//! `jira-client` — typed async client for the intake tracker.
//!
//! Covers the two calls the bridge makes against the intake side: updating a
//! field (the change-execution back-link) and transitioning an issue. The
//! tracker models transitions rather than direct status assignment, and the
//! transition set depends on per-project workflow configuration, so moving an
//! issue is a two-step protocol: list the transitions currently available,
//! pick the one whose destination matches the requested status
//! (case-insensitively), and execute it by id.

pub mod client;
pub mod error;

pub use client::{JiraClient, Transition, TransitionTarget};
pub use error::JiraError;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, JiraError>;
