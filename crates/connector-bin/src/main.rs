//! XiShop Connector - bridges the shop's purchased-command queue to the game
//! server console.

mod admin;
mod app;
mod console;
mod lifecycle;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use connector_core::{init_logging, Config, Paths};

/// XiShop connector command-line interface.
#[derive(Parser)]
#[command(name = "xishop-connector")]
#[command(about = "Delivers purchased XiShop commands to the game server console")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error); defaults to the config file's log-level
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for runtime files (socket, config, pid). Defaults to ~/.xishop-connector
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the connector daemon
    Start {
        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,
    },
    /// Stop the connector daemon
    Stop,
    /// Report connector status and configuration
    Status,
    /// Trigger an immediate check for pending commands
    Forcecheck,
    /// Reload config.json and restart the poller
    Reload,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let config = Config::load(&paths)?;

    // Initialize logging; an explicit --log-level wins over the config file
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(level, config.debug_mode);

    match cli.command {
        Some(Commands::Start { foreground }) => {
            app::run_connector(config, paths, foreground).await?;
        }
        None => {
            // Default to start in foreground if no command given
            app::run_connector(config, paths, true).await?;
        }
        Some(Commands::Stop) => {
            lifecycle::stop_connector(&paths).await?;
        }
        Some(Commands::Status) => {
            lifecycle::check_status(&paths).await?;
        }
        Some(Commands::Forcecheck) => {
            lifecycle::force_check(&paths).await?;
        }
        Some(Commands::Reload) => {
            lifecycle::reload(&paths).await?;
        }
    }

    Ok(())
}
