//! Process-wide connector state snapshots.

use connector_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// One immutable snapshot of the connector's runtime configuration.
///
/// Never mutated in place: a reload builds a fresh snapshot and swaps it in
/// through [`StateHandle::replace`], so a concurrently running fetch cycle
/// always observes a coherent endpoint/credential pair.
#[derive(Debug, Clone)]
pub struct ConnectorState {
    /// Base URL of the shop's server API.
    pub api_url: String,
    /// Shop API key (may be an unset sentinel).
    pub api_key: String,
    /// Verbose-cycle logging flag, surfaced by the admin status command.
    pub debug_mode: bool,
    /// Interval between poll cycles.
    pub check_interval: Duration,
}

impl ConnectorState {
    /// Build a snapshot from loaded configuration.
    ///
    /// A zero `check-interval-seconds` is raised to one second; the timer
    /// cannot run on a zero period.
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            debug_mode: config.debug_mode,
            check_interval: Duration::from_secs(config.check_interval_seconds.max(1)),
        }
    }

    /// Whether a usable API key is configured.
    pub fn api_key_set(&self) -> bool {
        connector_core::api_key_set(&self.api_key)
    }
}

/// Shared handle to the current state snapshot.
///
/// Readers take a cheap `Arc` clone; the reload path replaces the whole
/// snapshot atomically.
#[derive(Clone)]
pub struct StateHandle {
    inner: Arc<RwLock<Arc<ConnectorState>>>,
}

impl StateHandle {
    /// Create a handle around an initial snapshot.
    pub fn new(state: ConnectorState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(state))),
        }
    }

    /// Get the current snapshot.
    pub async fn snapshot(&self) -> Arc<ConnectorState> {
        self.inner.read().await.clone()
    }

    /// Atomically swap in a new snapshot.
    pub async fn replace(&self, state: ConnectorState) {
        *self.inner.write().await = Arc::new(state);
    }
}
