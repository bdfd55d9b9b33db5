//! Interval-driven polling with an explicit Idle/Running state machine.

use crate::{run_cycle, StateHandle};
use console_bridge::CommandSink;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Floor for the polling period; the timer cannot run on a zero interval.
const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Drives the fetch/dispatch cycle on a timer.
///
/// Two states: Idle (no armed task) and Running (one armed task, whose
/// `JoinHandle` is the cancellation handle). Reconfiguration is always
/// stop-then-start, never in-place mutation of a running timer, so old and
/// new schedules can never overlap.
pub struct CommandPoller {
    state: StateHandle,
    sink: Arc<dyn CommandSink>,
    task: Option<JoinHandle<()>>,
    cycles_completed: Arc<AtomicU64>,
}

/// Snapshot of the poller for the admin status surface.
#[derive(Debug, Clone)]
pub struct PollerStatus {
    /// Whether a polling task is armed.
    pub running: bool,
    /// Interval configured on the current state snapshot.
    pub check_interval: std::time::Duration,
    /// Cycles run so far, forced checks included.
    pub cycles_completed: u64,
}

impl CommandPoller {
    /// Create an idle poller.
    pub fn new(state: StateHandle, sink: Arc<dyn CommandSink>) -> Self {
        Self {
            state,
            sink,
            task: None,
            cycles_completed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Arm the polling timer at the current snapshot's interval.
    ///
    /// Runs one cycle immediately, then one per interval. Calling `start`
    /// while Running cancels the existing timer first (idempotent re-arm).
    pub async fn start(&mut self) {
        self.stop();

        let configured = self.state.snapshot().await.check_interval;
        let interval = configured.max(MIN_CHECK_INTERVAL);
        if interval != configured {
            warn!(
                configured_secs = configured.as_secs(),
                "Check interval below minimum; polling every 1s"
            );
        }
        let state = self.state.clone();
        let sink = self.sink.clone();
        let cycles = self.cycles_completed.clone();

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                // First tick completes immediately.
                ticker.tick().await;
                let snapshot = state.snapshot().await;
                let outcome = run_cycle(&snapshot, sink.as_ref()).await;
                cycles.fetch_add(1, Ordering::SeqCst);
                debug!(?outcome, "Poll cycle finished");
            }
        }));

        info!(interval_secs = interval.as_secs(), "Command poller started");
    }

    /// Cancel the armed timer, if any. Safe to call when already Idle.
    ///
    /// Cancels future firings only; a fetch already in flight completes on
    /// its own.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Command poller stopped");
        }
    }

    /// Restart with the current state snapshot (the reload path).
    pub async fn restart(&mut self) {
        self.stop();
        self.start().await;
    }

    /// Trigger one immediate cycle, independent of the timer schedule.
    pub fn force_check(&self) {
        let state = self.state.clone();
        let sink = self.sink.clone();
        let cycles = self.cycles_completed.clone();

        tokio::spawn(async move {
            let snapshot = state.snapshot().await;
            let outcome = run_cycle(&snapshot, sink.as_ref()).await;
            cycles.fetch_add(1, Ordering::SeqCst);
            debug!(?outcome, "Forced check finished");
        });
    }

    /// Whether a polling task is armed.
    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Cycles run so far, forced checks included.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::SeqCst)
    }

    /// Status snapshot for the admin surface.
    pub async fn status(&self) -> PollerStatus {
        PollerStatus {
            running: self.is_running(),
            check_interval: self.state.snapshot().await.check_interval,
            cycles_completed: self.cycles_completed(),
        }
    }
}

impl Drop for CommandPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
