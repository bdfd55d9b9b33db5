//! Daemon initialization and run loop.

use crate::admin::{register_handlers, ConnectorRuntime};
use crate::console::build_console;
use command_poller::{CommandPoller, ConnectorState, StateHandle};
use connector_core::{Config, Paths};
use connector_ipc::{IpcClient, IpcServer};
use console_bridge::CommandSink;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Run the connector daemon.
pub async fn run_connector(config: Config, paths: Paths, _foreground: bool) -> anyhow::Result<()> {
    // Singleton enforcement: check if a connector is already running
    let socket_path = paths.socket_file();
    if socket_path.exists() {
        let client = IpcClient::new(&socket_path.to_string_lossy());
        if client.is_daemon_running().await {
            eprintln!(
                "Error: Connector is already running. Use 'xishop-connector stop' to stop it first."
            );
            std::process::exit(1);
        }
        // Socket exists but daemon not responding - clean up stale socket
        eprintln!("Removing stale socket file");
        let _ = std::fs::remove_file(&socket_path);
    }

    // Clean up stale PID file if it exists
    let pid_file = paths.pid_file();
    if pid_file.exists() {
        let _ = std::fs::remove_file(&pid_file);
    }

    info!("Starting XiShop connector");
    paths.ensure_dirs()?;

    // Seed a default config file on first start so operators have something
    // to paste their key into.
    if !paths.config_file().exists() {
        config.save(&paths)?;
        info!(path = %paths.config_file().display(), "Wrote default config file");
    }

    // Surface a broken endpoint now instead of on the first cycle.
    config.api_url()?;

    if !config.api_key_set() {
        error!(
            "API key is not set in config.json; the connector will idle until one is configured"
        );
    }

    info!(
        api_url = %config.api_url,
        check_interval_seconds = config.check_interval_seconds,
        api_key_set = config.api_key_set(),
        "Configuration loaded"
    );

    // Write PID file
    let pid = std::process::id();
    std::fs::write(paths.pid_file(), pid.to_string())?;
    info!(pid = pid, "Connector started");

    // The console gateway is the host's serialized execution context.
    let gateway = build_console(&config);
    let sink: Arc<dyn CommandSink> = Arc::new(gateway.submitter());

    // Shared state snapshot, swapped wholesale on reload.
    let state = StateHandle::new(ConnectorState::from_config(&config));

    // Arm the poller.
    let mut poller = CommandPoller::new(state.clone(), sink);
    poller.start().await;
    let poller = Arc::new(Mutex::new(poller));

    // Admin IPC
    let ipc_server = IpcServer::new(&socket_path.to_string_lossy());
    register_handlers(
        &ipc_server,
        ConnectorRuntime {
            paths: paths.clone(),
            state,
            poller: poller.clone(),
        },
    )
    .await;

    // Ctrl-C triggers the same graceful shutdown as the admin command.
    let shutdown_tx = ipc_server.shutdown_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received; shutting down");
            let _ = shutdown_tx.send(());
        }
    });

    let server_result = ipc_server.run().await;

    // Cancel the timer first, then drain the console queue.
    poller.lock().await.stop();
    gateway.shutdown();

    let _ = std::fs::remove_file(paths.pid_file());
    info!("Connector stopped");

    server_result.map_err(Into::into)
}
