//! One poll cycle: fetch, resolve, hand off to the console, acknowledge.

use crate::ConnectorState;
use console_bridge::CommandSink;
use shop_queue_client::{PendingCommand, ShopQueueClient};
use tracing::{debug, info, warn};

/// Placeholder token the shop embeds in purchased command templates.
pub const PLAYER_PLACEHOLDER: &str = "{player}";

/// Substitute every occurrence of the player placeholder.
pub fn resolve_command(command_line: &str, player_name: &str) -> String {
    command_line.replace(PLAYER_PLACEHOLDER, player_name)
}

/// How one poll cycle ended. Feeds debug logging and tests; no outcome is an
/// error to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No credential configured; no network call was made.
    SkippedNoCredential,
    /// The fetch step failed; the cycle aborted with no partial state.
    FetchError,
    /// The shop had nothing pending.
    Empty,
    /// Commands were handed to the console and an acknowledge was dispatched.
    Dispatched {
        /// Number of commands submitted this cycle.
        submitted: usize,
    },
}

/// Run one fetch/dispatch/acknowledge cycle against the given state snapshot.
///
/// This is the only place the connector crosses from the async runtime into
/// the console's serialized context: submissions go through `sink` in
/// response order, without waiting for execution. The acknowledge call is
/// spawned fire-and-forget: its failure is logged, never retried, and never
/// reaches the scheduler.
pub async fn run_cycle(snapshot: &ConnectorState, sink: &dyn CommandSink) -> CycleOutcome {
    if !snapshot.api_key_set() {
        debug!("API key not set; skipping command check");
        return CycleOutcome::SkippedNoCredential;
    }

    let client = ShopQueueClient::new(snapshot.api_url.as_str(), snapshot.api_key.as_str());

    let batch = match client.fetch_pending().await {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, "Failed to fetch commands; skipping cycle");
            return CycleOutcome::FetchError;
        }
    };

    if batch.is_empty() {
        debug!("No new commands to process");
        return CycleOutcome::Empty;
    }

    let ids = dispatch_batch(&batch, sink);
    let submitted = ids.len();

    tokio::spawn(async move {
        match client.acknowledge(&ids).await {
            Ok(()) => debug!(count = ids.len(), "Acknowledged processed commands"),
            Err(e) => warn!(error = %e, "Failed to acknowledge commands"),
        }
    });

    CycleOutcome::Dispatched { submitted }
}

/// Resolve and submit every command in response order; return the ids to
/// acknowledge.
///
/// Ids are recorded at submission time; the console reports no result, so
/// re-delivery after a crash re-executes.
pub fn dispatch_batch(batch: &[PendingCommand], sink: &dyn CommandSink) -> Vec<i64> {
    let mut ids = Vec::with_capacity(batch.len());

    for command in batch {
        let resolved = resolve_command(&command.command_line, &command.player_name);
        info!(
            id = command.id,
            player = %command.player_name,
            command = %resolved,
            "Dispatching shop command"
        );
        sink.submit(resolved);
        ids.push(command.id);
    }

    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Sink that records submitted command lines.
    struct RecordingSink {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                lines: Mutex::new(Vec::new()),
            }
        }

        fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl CommandSink for RecordingSink {
        fn submit(&self, command_line: String) {
            self.lines.lock().unwrap().push(command_line);
        }
    }

    fn command(id: i64, player: &str, line: &str) -> PendingCommand {
        PendingCommand {
            id,
            player_name: player.to_string(),
            command_line: line.to_string(),
        }
    }

    fn state_with_key(api_url: &str, api_key: &str) -> ConnectorState {
        ConnectorState {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            debug_mode: false,
            check_interval: Duration::from_secs(60),
        }
    }

    // =========================================================================
    // resolve_command
    // =========================================================================

    #[test]
    fn resolve_substitutes_placeholder() {
        assert_eq!(
            resolve_command("give {player} diamond 1", "Alice"),
            "give Alice diamond 1"
        );
    }

    #[test]
    fn resolve_substitutes_every_occurrence() {
        assert_eq!(
            resolve_command("tell {player} thanks {player}!", "Bob"),
            "tell Bob thanks Bob!"
        );
    }

    #[test]
    fn resolve_without_placeholder_is_identity() {
        assert_eq!(resolve_command("broadcast Sale is live", "Bob"), "broadcast Sale is live");
    }

    // =========================================================================
    // dispatch_batch
    // =========================================================================

    #[test]
    fn dispatch_preserves_response_order() {
        let sink = RecordingSink::new();
        let batch = vec![
            command(5, "Alice", "give {player} diamond 1"),
            command(3, "Bob", "heal {player}"),
            command(9, "Alice", "kit vip {player}"),
        ];

        let ids = dispatch_batch(&batch, &sink);

        assert_eq!(ids, vec![5, 3, 9]);
        assert_eq!(
            sink.lines(),
            vec!["give Alice diamond 1", "heal Bob", "kit vip Alice"]
        );
    }

    #[test]
    fn dispatch_records_ids_for_every_submission() {
        let sink = RecordingSink::new();
        let batch: Vec<PendingCommand> = (1..=50)
            .map(|i| command(i, "Player", "heal {player}"))
            .collect();

        let ids = dispatch_batch(&batch, &sink);

        assert_eq!(ids.len(), 50);
        assert_eq!(sink.lines().len(), 50);
    }

    #[test]
    fn dispatch_end_to_end_example() {
        // The canonical purchase flow: {"id":7,...} becomes "heal Bob" on the
        // console and {"command_ids":[7]} on the wire.
        let sink = RecordingSink::new();
        let batch = shop_queue_client::parse_fetch_body(
            r#"{"data":[{"id":7,"player_name":"Bob","command_line":"heal {player}"}]}"#,
        )
        .unwrap();

        let ids = dispatch_batch(&batch, &sink);

        assert_eq!(sink.lines(), vec!["heal Bob"]);
        let body =
            serde_json::to_string(&shop_queue_client::AcknowledgeRequest { command_ids: &ids })
                .unwrap();
        assert_eq!(body, r#"{"command_ids":[7]}"#);
    }

    // =========================================================================
    // run_cycle guards
    // =========================================================================

    #[tokio::test]
    async fn cycle_without_credential_skips_network_and_console() {
        let sink = RecordingSink::new();
        let state = state_with_key("http://127.0.0.1:1", "NOT_SET");

        let outcome = run_cycle(&state, &sink).await;

        assert_eq!(outcome, CycleOutcome::SkippedNoCredential);
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn cycle_with_placeholder_credential_skips() {
        let sink = RecordingSink::new();
        let state = state_with_key("http://127.0.0.1:1", "PASTE_YOUR_UNIQUE_API_KEY_HERE");

        let outcome = run_cycle(&state, &sink).await;

        assert_eq!(outcome, CycleOutcome::SkippedNoCredential);
    }

    #[tokio::test]
    async fn cycle_with_unreachable_endpoint_aborts_without_submissions() {
        let sink = RecordingSink::new();
        let state = state_with_key("http://127.0.0.1:1", "real-key");

        let outcome = run_cycle(&state, &sink).await;

        assert_eq!(outcome, CycleOutcome::FetchError);
        assert!(sink.lines().is_empty());
    }
}
