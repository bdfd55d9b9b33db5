//! Core types, configuration, and utilities for the XiShop connector daemon.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    api_key_set, Config, API_KEY_UNSET, DEFAULT_API_URL, DEFAULT_CHECK_INTERVAL_SECS,
    DEFAULT_LOG_LEVEL,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
