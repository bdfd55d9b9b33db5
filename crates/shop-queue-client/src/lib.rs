//! HTTP client for the XiShop pending-command queue.
//!
//! This crate provides:
//! - PendingCommand: one purchased command awaiting delivery to the game server
//! - ShopQueueClient: authenticated fetch/acknowledge calls against the shop API
//! - QueueError: the error taxonomy for fetch and acknowledge failures

mod client;
mod error;
mod types;

pub use client::{parse_fetch_body, ShopQueueClient, REQUEST_TIMEOUT};
pub use error::{QueueError, QueueResult};
pub use types::{AcknowledgeRequest, PendingCommand};
