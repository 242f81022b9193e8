pub mod config;
pub mod correlation;
pub mod error;
pub mod event;
pub mod recon;
pub mod schedule;
pub mod status;

pub use config::{BridgeConfig, PollScope};
pub use correlation::CorrelationTag;
pub use error::{BridgeError, Result};
pub use event::{ChangeRequest, EventKind, FieldValue, WebhookEvent};
pub use recon::{MemoryLedger, Observation, ReconciliationStore};
