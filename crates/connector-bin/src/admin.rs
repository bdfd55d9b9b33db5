//! Admin IPC handlers.

use command_poller::{CommandPoller, ConnectorState, StateHandle};
use connector_core::{Config, Paths};
use connector_ipc::{error_codes, IpcServer, Method, Response};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Shared handles the admin handlers operate on.
#[derive(Clone)]
pub struct ConnectorRuntime {
    pub paths: Paths,
    pub state: StateHandle,
    pub poller: Arc<Mutex<CommandPoller>>,
}

/// Register all admin handlers.
pub async fn register_handlers(server: &IpcServer, runtime: ConnectorRuntime) {
    // Status (read-only)
    let rt = runtime.clone();
    server
        .register_handler(Method::Status, move |req| {
            let rt = rt.clone();
            async move {
                let snapshot = rt.state.snapshot().await;
                let status = rt.poller.lock().await.status().await;
                Response::success(
                    &req.id,
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "running": status.running,
                        "check_interval_seconds": status.check_interval.as_secs(),
                        "cycles_completed": status.cycles_completed,
                        "api_url": snapshot.api_url,
                        "api_key_set": snapshot.api_key_set(),
                        "debug_mode": snapshot.debug_mode,
                    }),
                )
            }
        })
        .await;

    // Force check
    let rt = runtime.clone();
    server
        .register_handler(Method::ForceCheck, move |req| {
            let rt = rt.clone();
            async move {
                info!("Forced command check requested");
                rt.poller.lock().await.force_check();
                Response::success(&req.id, serde_json::json!({ "triggered": true }))
            }
        })
        .await;

    // Reload: new snapshot swapped in whole, then stop-and-start the poller
    // so the old and new schedules never overlap.
    let rt = runtime.clone();
    server
        .register_handler(Method::Reload, move |req| {
            let rt = rt.clone();
            async move {
                let config = match Config::load(&rt.paths) {
                    Ok(config) => config,
                    Err(e) => {
                        return Response::error(
                            &req.id,
                            error_codes::INTERNAL_ERROR,
                            &format!("Failed to reload config: {}", e),
                        );
                    }
                };

                rt.state.replace(ConnectorState::from_config(&config)).await;
                rt.poller.lock().await.restart().await;

                info!(
                    check_interval_seconds = config.check_interval_seconds,
                    "Configuration reloaded"
                );
                Response::success(
                    &req.id,
                    serde_json::json!({
                        "reloaded": true,
                        "check_interval_seconds": config.check_interval_seconds,
                        "api_key_set": config.api_key_set(),
                    }),
                )
            }
        })
        .await;

    // Shutdown
    let shutdown_tx = server.shutdown_sender();
    server
        .register_handler(Method::Shutdown, move |req| {
            let tx = shutdown_tx.clone();
            async move {
                let _ = tx.send(());
                Response::success(&req.id, serde_json::json!({ "status": "shutting_down" }))
            }
        })
        .await;

    info!("Registered admin handlers");
}

#[cfg(test)]
mod tests {
    use super::*;
    use connector_ipc::IpcClient;
    use console_bridge::CommandSink;
    use std::path::Path;
    use tempfile::tempdir;
    use tokio::time::{sleep, Duration};

    struct NullSink;

    impl CommandSink for NullSink {
        fn submit(&self, _command_line: String) {}
    }

    async fn start_admin_server(base_dir: &Path) -> (Arc<IpcServer>, ConnectorRuntime, IpcClient) {
        let paths = Paths::with_base_dir(base_dir.to_path_buf());
        paths.ensure_dirs().unwrap();

        let state = StateHandle::new(ConnectorState::from_config(&Config::default()));
        let sink: Arc<dyn CommandSink> = Arc::new(NullSink);
        let poller = Arc::new(Mutex::new(CommandPoller::new(state.clone(), sink)));

        let runtime = ConnectorRuntime {
            paths: paths.clone(),
            state,
            poller,
        };

        let socket_path = paths.socket_file();
        let server = Arc::new(IpcServer::new(&socket_path.to_string_lossy()));
        register_handlers(&server, runtime.clone()).await;

        let server_task = server.clone();
        tokio::spawn(async move {
            let _ = server_task.run().await;
        });

        for _ in 0..100 {
            if socket_path.exists() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }

        let client = IpcClient::new(&socket_path.to_string_lossy());
        (server, runtime, client)
    }

    #[tokio::test]
    async fn status_reports_config_and_poller() {
        let dir = tempdir().unwrap();
        let (server, _runtime, client) = start_admin_server(dir.path()).await;

        let response = client.call_method(Method::Status).await.unwrap();
        assert!(response.is_success());

        let result = response.result.unwrap();
        assert_eq!(result["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(result["running"], false);
        assert_eq!(result["api_key_set"], false);
        assert_eq!(result["check_interval_seconds"], 60);
        assert_eq!(result["cycles_completed"], 0);

        server.shutdown();
    }

    #[tokio::test]
    async fn force_check_triggers_one_cycle() {
        let dir = tempdir().unwrap();
        let (server, runtime, client) = start_admin_server(dir.path()).await;

        let response = client.call_method(Method::ForceCheck).await.unwrap();
        assert!(response.is_success());
        assert_eq!(response.result.unwrap()["triggered"], true);

        // The forced cycle is a credential-less no-op but still counted.
        sleep(Duration::from_millis(50)).await;
        assert_eq!(runtime.poller.lock().await.cycles_completed(), 1);

        server.shutdown();
    }

    #[tokio::test]
    async fn reload_swaps_state_and_restarts_poller() {
        let dir = tempdir().unwrap();
        let (server, runtime, client) = start_admin_server(dir.path()).await;

        // Write a changed config to disk, then ask the daemon to reload it.
        let mut config = Config::default();
        config.api_key = "fresh-key".to_string();
        config.check_interval_seconds = 15;
        config.save(&runtime.paths).unwrap();

        let response = client.call_method(Method::Reload).await.unwrap();
        assert!(response.is_success());
        let result = response.result.unwrap();
        assert_eq!(result["reloaded"], true);
        assert_eq!(result["check_interval_seconds"], 15);
        assert_eq!(result["api_key_set"], true);

        let snapshot = runtime.state.snapshot().await;
        assert_eq!(snapshot.api_key, "fresh-key");
        assert_eq!(snapshot.check_interval, Duration::from_secs(15));
        assert!(runtime.poller.lock().await.is_running());

        server.shutdown();
    }

    #[tokio::test]
    async fn reload_with_broken_config_is_an_error_response() {
        let dir = tempdir().unwrap();
        let (server, runtime, client) = start_admin_server(dir.path()).await;

        std::fs::write(runtime.paths.config_file(), "{ not json").unwrap();

        let response = client.call_method(Method::Reload).await.unwrap();
        assert!(!response.is_success());
        assert_eq!(
            response.error.unwrap().code,
            error_codes::INTERNAL_ERROR
        );

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_stops_the_server() {
        let dir = tempdir().unwrap();
        let (_server, runtime, client) = start_admin_server(dir.path()).await;

        let response = client.call_method(Method::Shutdown).await.unwrap();
        assert!(response.is_success());

        // The socket disappears once the server loop exits.
        for _ in 0..100 {
            if !runtime.paths.socket_file().exists() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert!(!runtime.paths.socket_file().exists());
    }
}
