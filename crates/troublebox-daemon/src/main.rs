//! Troublebox daemon - synthetic load generator
//!
//! Serves HTTP triggers that start CPU, memory, and disk load and exposes the
//! resulting metrics for Prometheus to scrape.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use troublebox_daemon::error::{DaemonError, DaemonResult};
use troublebox_daemon::{DaemonConfig, Server};

/// Troublebox daemon CLI
#[derive(Parser)]
#[command(name = "troubleboxd")]
#[command(about = "Troublebox - synthetic load generator with metrics", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TROUBLEBOX_CONFIG")]
    config: Option<String>,

    /// Listen address, overrides the configuration file
    #[arg(short, long, env = "TROUBLEBOX_LISTEN_ADDR")]
    listen: Option<String>,

    /// Directory for order files, overrides the configuration file
    #[arg(short, long, env = "TROUBLEBOX_WORK_DIR")]
    work_dir: Option<String>,

    /// Log level
    #[arg(long, env = "TROUBLEBOX_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "TROUBLEBOX_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(work_dir) = cli.work_dir {
        config.engine.work_dir = work_dir.into();
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Print startup banner
    println!(
        r#"
  _____                 _     _      _
 |_   _| __ ___  _   _ | |__ | | ___| |__   _____  __
   | || '__/ _ \| | | || '_ \| |/ _ \ '_ \ / _ \ \/ /
   | || | | (_) | |_| || |_) | |  __/ |_) | (_) >  <
   |_||_|  \___/ \__,_||_.__/|_|\___|_.__/ \___/_/\_\

  Synthetic load generator
  Version: {}
  Work dir: {}
  Listening: {}
"#,
        env!("CARGO_PKG_VERSION"),
        config.engine.work_dir.display(),
        config.server.listen_addr
    );

    // Create and run server
    let server = Server::new(config)?;
    server.run().await
}
