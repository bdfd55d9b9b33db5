//! Bridge between the connector's async tasks and the game server console.
//!
//! The game server's command subsystem is single-threaded: it must never be
//! invoked concurrently with its own main loop. This crate owns that boundary.
//! [`ConsoleGateway`] runs ONE dedicated OS thread that drains a queue and
//! invokes the injected [`ConsoleExecutor`] strictly in submission order;
//! [`ConsoleSubmitter`] handles are cloneable, thread-safe, and never block,
//! so fetch cycles on the tokio runtime can hand commands off without waiting
//! on the console.
//!
//! The dispatcher depends only on the [`CommandSink`] trait, which keeps the
//! console swappable for a recording fake in tests.

use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// The game server's command execution capability.
///
/// Implementations are invoked from exactly one thread, one command at a
/// time, in submission order. No result is consumed; delivery to the console
/// is one-way.
pub trait ConsoleExecutor: Send + 'static {
    /// Execute one fully resolved command line.
    fn execute(&mut self, command_line: &str);
}

/// Submission seam the dispatcher hands resolved commands to.
pub trait CommandSink: Send + Sync {
    /// Queue a command line for serialized execution. Must not block.
    fn submit(&self, command_line: String);
}

enum ConsoleMessage {
    Execute(String),
    Shutdown,
}

/// Cloneable, non-blocking handle onto the console gateway's queue.
#[derive(Clone)]
pub struct ConsoleSubmitter {
    sender: mpsc::UnboundedSender<ConsoleMessage>,
}

impl CommandSink for ConsoleSubmitter {
    fn submit(&self, command_line: String) {
        // Unbounded send only fails once the gateway has shut down.
        if self.sender.send(ConsoleMessage::Execute(command_line)).is_err() {
            warn!("Console gateway is closed; dropping command");
        }
    }
}

/// Owns the serialized console execution context.
pub struct ConsoleGateway {
    sender: mpsc::UnboundedSender<ConsoleMessage>,
    worker: thread::JoinHandle<()>,
}

impl ConsoleGateway {
    /// Spawn the gateway thread around the given executor.
    pub fn spawn<E: ConsoleExecutor>(mut executor: E) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<ConsoleMessage>();

        let worker = thread::Builder::new()
            .name("console-gateway".to_string())
            .spawn(move || {
                while let Some(message) = receiver.blocking_recv() {
                    match message {
                        ConsoleMessage::Execute(command_line) => executor.execute(&command_line),
                        ConsoleMessage::Shutdown => break,
                    }
                }
                debug!("Console gateway stopped");
            })
            .expect("Failed to spawn console gateway thread");

        Self { sender, worker }
    }

    /// Get a submission handle for the dispatcher.
    pub fn submitter(&self) -> ConsoleSubmitter {
        ConsoleSubmitter {
            sender: self.sender.clone(),
        }
    }

    /// Stop the gateway and wait for it to finish.
    ///
    /// The shutdown marker queues behind everything already submitted, so
    /// queued commands drain first; submissions racing in after it are
    /// dropped. Outstanding [`ConsoleSubmitter`] clones stay safe to call:
    /// their sends fail and are logged.
    pub fn shutdown(self) {
        let Self { sender, worker } = self;
        let _ = sender.send(ConsoleMessage::Shutdown);
        drop(sender);
        if worker.join().is_err() {
            warn!("Console gateway thread panicked during shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Executor that records every command line it is handed.
    struct RecordingExecutor {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl ConsoleExecutor for RecordingExecutor {
        fn execute(&mut self, command_line: &str) {
            self.lines.lock().unwrap().push(command_line.to_string());
        }
    }

    fn recording_gateway() -> (ConsoleGateway, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let gateway = ConsoleGateway::spawn(RecordingExecutor {
            lines: lines.clone(),
        });
        (gateway, lines)
    }

    #[test]
    fn executes_in_submission_order() {
        let (gateway, lines) = recording_gateway();
        let submitter = gateway.submitter();

        for i in 0..100 {
            submitter.submit(format!("give Player{} diamond 1", i));
        }

        // Shutdown joins the gateway thread, draining the queue first.
        gateway.shutdown();

        let executed = lines.lock().unwrap();
        assert_eq!(executed.len(), 100);
        for (i, line) in executed.iter().enumerate() {
            assert_eq!(line, &format!("give Player{} diamond 1", i));
        }
    }

    #[test]
    fn shutdown_drains_queued_commands() {
        let (gateway, lines) = recording_gateway();
        let submitter = gateway.submitter();

        submitter.submit("heal Bob".to_string());
        submitter.submit("kit vip Alice".to_string());
        gateway.shutdown();

        let executed = lines.lock().unwrap();
        assert_eq!(*executed, vec!["heal Bob", "kit vip Alice"]);
    }

    #[test]
    fn submit_after_shutdown_does_not_panic() {
        let (gateway, lines) = recording_gateway();
        let submitter = gateway.submitter();

        gateway.shutdown();
        submitter.submit("heal Bob".to_string());

        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn submitter_is_usable_as_trait_object() {
        let (gateway, lines) = recording_gateway();
        let sink: Arc<dyn CommandSink> = Arc::new(gateway.submitter());

        sink.submit("broadcast Hello".to_string());
        gateway.shutdown();

        assert_eq!(*lines.lock().unwrap(), vec!["broadcast Hello"]);
    }

    #[tokio::test]
    async fn submissions_from_concurrent_tasks_all_execute() {
        let (gateway, lines) = recording_gateway();
        let submitter = gateway.submitter();

        let mut handles = Vec::new();
        for i in 0..8 {
            let submitter = submitter.clone();
            handles.push(tokio::spawn(async move {
                submitter.submit(format!("cmd-{}", i));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        gateway.shutdown();
        assert_eq!(lines.lock().unwrap().len(), 8);
    }
}
