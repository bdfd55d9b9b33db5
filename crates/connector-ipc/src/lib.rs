//! Admin IPC for the connector daemon.
//!
//! A JSON-RPC-like request/response protocol over a Unix domain socket. The
//! socket file is owner-only (0600): filesystem ownership is the permission
//! gate for every admin command.

mod error;
mod protocol;
mod server;

pub use error::{IpcError, IpcResult};
pub use protocol::{error_codes, ErrorInfo, Method, Request, Response};
pub use server::{IpcClient, IpcServer};
