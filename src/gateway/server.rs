//! Gateway server

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use super::auth::ApiKey;
use super::router::{AppState, create_router};
use crate::config::Config;
use crate::publisher::{self, Publisher};
use crate::{Error, Result};

/// Enqueue gateway server
pub struct Gateway {
    /// Configuration
    config: Config,
    /// Resolved secret expected in `x-api-key`
    api_key: Arc<ApiKey>,
    /// Queue backend, one per process
    publisher: Arc<dyn Publisher>,
}

impl Gateway {
    /// Create a gateway around an existing publisher
    pub fn new(config: Config, publisher: Arc<dyn Publisher>) -> Self {
        let api_key = Arc::new(ApiKey::new(config.auth.resolve_api_key()));
        Self {
            config,
            api_key,
            publisher,
        }
    }

    /// Validate `config` and build the publisher it describes
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let publisher = publisher::from_config(&config.publisher)?;
        info!(publisher = config.publisher.kind(), "Publisher ready");
        Ok(Self::new(config, publisher))
    }

    /// HTTP router serving the gateway
    pub fn router(&self) -> Router {
        let state = Arc::new(AppState {
            publisher: Arc::clone(&self.publisher),
        });
        create_router(state, Arc::clone(&self.api_key))
    }

    /// Run the gateway until Ctrl+C or SIGTERM, then close the publisher
    pub async fn run(self) -> Result<()> {
        let addr = self.config.listen_address();
        let listener = TcpListener::bind(&addr).await?;

        info!("============================================================");
        info!("ENQUEUE GATEWAY v{}", env!("CARGO_PKG_VERSION"));
        info!("============================================================");
        info!(address = %addr, publisher = self.config.publisher.kind(), "Listening");
        info!("  GET  http://{addr}/ping");
        info!("  GET  http://{addr}/len");
        info!("  POST http://{addr}/enqueue");
        info!("============================================================");

        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(e.to_string()));

        info!("Closing publisher...");
        self.publisher.close().await;

        result
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
