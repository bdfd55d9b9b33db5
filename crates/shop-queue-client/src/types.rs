//! Wire types for the shop's command queue API.

use serde::{Deserialize, Serialize};

/// One purchased command pending delivery to the game server.
///
/// Parsed from an element of the fetch response's `data` array. Immutable
/// once parsed; lives for a single dispatch cycle and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PendingCommand {
    /// Queue-side identifier, echoed back in the acknowledge call.
    pub id: i64,
    /// The player the command was purchased for.
    pub player_name: String,
    /// Command template with a `{player}` placeholder.
    pub command_line: String,
}

/// Request body for `POST /commands/acknowledge`.
#[derive(Debug, Serialize)]
pub struct AcknowledgeRequest<'a> {
    /// Ids of every command handed to the game server this cycle.
    pub command_ids: &'a [i64],
}
