//! Connector lifecycle subcommands (stop, status, forcecheck, reload).

use connector_core::Paths;
use connector_ipc::{IpcClient, IpcError, Method};
use std::path::Path;
use std::time::Duration;

/// How long a graceful shutdown gets before falling back to SIGKILL.
const SHUTDOWN_WAIT: Duration = Duration::from_secs(3);

/// Render a failed admin connect as a user-visible message.
fn connect_failure_message(e: &IpcError) -> String {
    let text = e.to_string();
    if text.contains("Permission denied") {
        "You do not have permission to control the connector (admin socket is owner-only)"
            .to_string()
    } else {
        format!("Failed to connect to connector: {}", text)
    }
}

/// Poll until the daemon's socket disappears or the deadline passes.
async fn wait_for_exit(socket_path: &Path, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if !socket_path.exists() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Read the daemon's pid file, if it holds a usable pid.
fn read_pid(paths: &Paths) -> Option<i32> {
    std::fs::read_to_string(paths.pid_file())
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Remove socket and pid files left behind by a dead daemon.
fn remove_runtime_files(paths: &Paths) {
    let _ = std::fs::remove_file(paths.socket_file());
    let _ = std::fs::remove_file(paths.pid_file());
}

/// Stop the connector daemon.
///
/// Asks for a graceful shutdown over IPC and gives it [`SHUTDOWN_WAIT`] to
/// finish; only then reaches for the pid file and SIGKILL.
pub async fn stop_connector(paths: &Paths) -> anyhow::Result<()> {
    let socket_path = paths.socket_file();

    if !socket_path.exists() {
        println!("Connector is not running (socket not found)");
        remove_runtime_files(paths);
        return Ok(());
    }

    let client = IpcClient::new(&socket_path.to_string_lossy());
    match client.call_method(Method::Shutdown).await {
        Ok(response) if response.is_success() => {
            if wait_for_exit(&socket_path, SHUTDOWN_WAIT).await {
                println!("Connector stopped");
                return Ok(());
            }
            println!(
                "Connector did not stop within {}s",
                SHUTDOWN_WAIT.as_secs()
            );
        }
        Ok(response) => println!("Shutdown failed: {:?}", response.error),
        Err(e) => println!("{}", connect_failure_message(&e)),
    }

    // Graceful shutdown did not take; fall back to the pid file.
    match read_pid(paths) {
        Some(pid) => {
            println!("Sending SIGKILL to PID {}", pid);
            unsafe {
                libc::kill(pid, libc::SIGKILL);
            }
            remove_runtime_files(paths);
            println!("Connector killed");
        }
        None => {
            remove_runtime_files(paths);
            println!("Cleaned up stale runtime files");
        }
    }

    Ok(())
}

/// Report connector status.
pub async fn check_status(paths: &Paths) -> anyhow::Result<()> {
    let socket_path = paths.socket_file();

    if !socket_path.exists() {
        println!("Connector is not running (socket not found)");
        return Ok(());
    }

    let client = IpcClient::new(&socket_path.to_string_lossy());

    match client.call_method(Method::Status).await {
        Ok(response) => {
            if let Some(result) = response.result {
                let version = result
                    .get("version")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");
                let running = result
                    .get("running")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                let interval = result
                    .get("check_interval_seconds")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0);
                let cycles = result
                    .get("cycles_completed")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0);
                let api_url = result
                    .get("api_url")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");
                let api_key_set = result
                    .get("api_key_set")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                let debug_mode = result
                    .get("debug_mode")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);

                println!("Connector is running");
                if running {
                    println!("  Poller:   polling every {}s", interval);
                } else {
                    println!("  Poller:   idle");
                }
                println!("  Version:  {}", version);
                println!("  Cycles:   {}", cycles);
                println!("  API URL:  {}", api_url);
                println!("  API key:  {}", if api_key_set { "set" } else { "NOT SET" });
                println!("  Debug:    {}", debug_mode);
                println!("  Socket:   {}", socket_path.display());
            } else {
                println!("Connector is running (no details available)");
            }
        }
        Err(e) => {
            println!("{}", connect_failure_message(&e));
            println!("Connector may not be running or socket may be stale");
        }
    }

    Ok(())
}

/// Trigger an immediate command check.
pub async fn force_check(paths: &Paths) -> anyhow::Result<()> {
    let socket_path = paths.socket_file();

    if !socket_path.exists() {
        println!("Connector is not running (socket not found)");
        return Ok(());
    }

    let client = IpcClient::new(&socket_path.to_string_lossy());

    match client.call_method(Method::ForceCheck).await {
        Ok(response) => {
            if response.is_success() {
                println!("Forcing a check for new commands...");
            } else {
                println!("Force check failed: {:?}", response.error);
            }
        }
        Err(e) => {
            println!("{}", connect_failure_message(&e));
        }
    }

    Ok(())
}

/// Reload configuration and restart the poller.
pub async fn reload(paths: &Paths) -> anyhow::Result<()> {
    let socket_path = paths.socket_file();

    if !socket_path.exists() {
        println!("Connector is not running (socket not found)");
        return Ok(());
    }

    let client = IpcClient::new(&socket_path.to_string_lossy());

    match client.call_method(Method::Reload).await {
        Ok(response) => {
            if let Some(result) = response.result {
                let interval = result
                    .get("check_interval_seconds")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0);
                println!("Configuration reloaded (polling every {}s)", interval);
                if result.get("api_key_set").and_then(|v| v.as_bool()) == Some(false) {
                    println!("Warning: API key is still not set");
                }
            } else {
                println!("Reload failed: {:?}", response.error);
            }
        }
        Err(e) => {
            println!("{}", connect_failure_message(&e));
        }
    }

    Ok(())
}
