use std::sync::Arc;
use tokio::sync::RwLock;

use bridge_core::{BridgeConfig, ChangeRequest, CorrelationTag, MemoryLedger, ReconciliationStore};
use bytebase_client::BytebaseClient;
use jira_client::JiraClient;

/// Shared application state passed to all route handlers.
///
/// The reconciliation ledger is only ever touched by the poller; the webhook
/// path and the poll path share no other mutable state, so they need no
/// coordination beyond what the ledger itself provides.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BridgeConfig>,
    pub bytebase: Arc<BytebaseClient>,
    pub jira: Arc<JiraClient>,
    pub ledger: Arc<dyn ReconciliationStore>,
    pub tag: Arc<CorrelationTag>,
    /// Latest parsed change request, for the last-snapshot endpoint.
    pub last_event: Arc<RwLock<Option<ChangeRequest>>>,
}

impl AppState {
    pub fn new(config: BridgeConfig) -> anyhow::Result<Self> {
        Self::with_ledger(config, Arc::new(MemoryLedger::new()))
    }

    /// Build state with an injected ledger, e.g. a durable store.
    pub fn with_ledger(
        config: BridgeConfig,
        ledger: Arc<dyn ReconciliationStore>,
    ) -> anyhow::Result<Self> {
        let bytebase = BytebaseClient::new(
            &config.bytebase_host,
            &config.bytebase_service_account,
            &config.bytebase_service_key,
        )?;
        let jira = JiraClient::new(&config.jira_base_url, &config.jira_email, &config.jira_api_token)?;
        let tag = CorrelationTag::new(&config.tag_prefix);

        Ok(Self {
            config: Arc::new(config),
            bytebase: Arc::new(bytebase),
            jira: Arc::new(jira),
            ledger,
            tag: Arc::new(tag),
            last_event: Arc::new(RwLock::new(None)),
        })
    }
}
