//! # Command poller: the fetch → dispatch → acknowledge engine
//!
//! This crate owns the connector's delivery pipeline. On a fixed interval (or
//! an admin-forced check) it fetches the batch of purchased commands pending
//! for this game server, resolves each command template against its target
//! player, hands the resolved lines to the console bridge in response order,
//! and acknowledges the batch so the shop retires it.
//!
//! ```text
//! ┌────────────┐  fetch   ┌────────────┐  submit   ┌────────────────┐
//! │  Shop API  │─────────▶│ run_cycle  │──────────▶│ console bridge │
//! │  (remote)  │◀─────────│ (dispatch) │           │ (single thread)│
//! └────────────┘   ack    └────────────┘           └────────────────┘
//! ```
//!
//! ## Delivery contract
//!
//! Command ids are acknowledged once submitted to the console, not once
//! executed; the console reports no outcome to check. A crash between
//! submission and acknowledgement re-delivers the batch on the next fetch:
//! at-least-once delivery until acknowledgement succeeds, at most one
//! acknowledge attempt per fetched batch.
//!
//! ## Cycle isolation
//!
//! Every cycle reads one [`ConnectorState`] snapshot and builds its queue
//! client from it, so a concurrent reload can never expose a half-updated
//! endpoint/credential pair to an in-flight cycle. Any fetch error aborts
//! only the current cycle; the schedule is untouched.

mod dispatcher;
mod poller;
mod state;

pub use dispatcher::{dispatch_batch, resolve_command, run_cycle, CycleOutcome, PLAYER_PLACEHOLDER};
pub use poller::{CommandPoller, PollerStatus};
pub use state::{ConnectorState, StateHandle};
