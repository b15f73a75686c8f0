//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use tokio::net::TcpListener;
use troublebox_engine::LoadEngine;

/// Troublebox daemon server
pub struct Server {
    config: DaemonConfig,
    engine: LoadEngine,
}

impl Server {
    /// Create a new server, building the load engine and its working
    /// directory from the given configuration
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let engine = LoadEngine::new(config.engine.clone())?;
        Ok(Self { config, engine })
    }

    pub fn engine(&self) -> &LoadEngine {
        &self.engine
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        // Create router
        let state = AppState::new(self.engine.clone());
        let app = create_router(state, self.config.server.enable_cors);

        // Create listener
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Troublebox daemon listening on {}", addr);
        tracing::info!("Order files written to {}", self.engine.work_dir().display());

        // Start background loops
        self.engine.spawn_background_loops();

        // Run server with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Troublebox daemon shutting down");

        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
