//! File system paths for the connector.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Manages file system paths for the connector daemon.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for runtime files (~/.xishop-connector)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.xishop-connector`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".xishop-connector"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (`<base>/config.json`).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the admin IPC socket path (`<base>/connector.sock`).
    pub fn socket_file(&self) -> PathBuf {
        self.base_dir.join("connector.sock")
    }

    /// Get the PID file path (`<base>/connector.pid`).
    pub fn pid_file(&self) -> PathBuf {
        self.base_dir.join("connector.pid")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        Ok(())
    }
}
