//! Concrete console executors.
//!
//! The game server's command subsystem is external to the connector; these
//! executors are the integration points it can be wired to.

use connector_core::Config;
use console_bridge::{ConsoleExecutor, ConsoleGateway};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

/// Executor that only records each dispatched command in the log.
///
/// The default when no console pipe is configured; keeps a fresh install
/// running end-to-end with the dispatch stream observable.
pub struct LogConsole;

impl ConsoleExecutor for LogConsole {
    fn execute(&mut self, command_line: &str) {
        info!(command = %command_line, "Console command (log only)");
    }
}

/// Executor that appends each command line to a named pipe wired into the
/// game server's console stdin.
pub struct PipeConsole {
    pipe_path: PathBuf,
}

impl PipeConsole {
    /// Create an executor writing to the given pipe path.
    pub fn new(pipe_path: PathBuf) -> Self {
        Self { pipe_path }
    }
}

impl ConsoleExecutor for PipeConsole {
    fn execute(&mut self, command_line: &str) {
        // Open per command: the pipe may not outlive the server process.
        let file = OpenOptions::new().append(true).open(&self.pipe_path);
        match file {
            Ok(mut pipe) => {
                if let Err(e) = writeln!(pipe, "{}", command_line) {
                    error!(
                        error = %e,
                        path = %self.pipe_path.display(),
                        "Failed to write command to console pipe"
                    );
                }
            }
            Err(e) => {
                error!(
                    error = %e,
                    path = %self.pipe_path.display(),
                    "Failed to open console pipe"
                );
            }
        }
    }
}

/// Spawn the console gateway around the executor the config selects.
pub fn build_console(config: &Config) -> ConsoleGateway {
    match &config.console_pipe {
        Some(path) => {
            info!(path = %path, "Console bridge writing to pipe");
            ConsoleGateway::spawn(PipeConsole::new(PathBuf::from(path)))
        }
        None => {
            info!("No console pipe configured; dispatched commands will be logged only");
            ConsoleGateway::spawn(LogConsole)
        }
    }
}
