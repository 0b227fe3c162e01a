use std::sync::Arc;

use tokio::net::TcpListener;

use docket_store::{CollectionStore, FileStore};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_app;

/// Docket document server.
pub struct DocketServer {
    config: ServerConfig,
    state: AppState,
}

impl DocketServer {
    /// Server backed by the JSON file named in `config`.
    pub fn new(config: ServerConfig) -> Self {
        let backend: Arc<dyn CollectionStore> = Arc::new(FileStore::new(&config.data_file));
        Self::with_backend(config, backend)
    }

    /// Server over an arbitrary collection store.
    pub fn with_backend(config: ServerConfig, backend: Arc<dyn CollectionStore>) -> Self {
        Self {
            config,
            state: AppState::new(backend),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_app(&self.config, self.state.clone())
    }

    /// Start serving requests until Ctrl-C.
    ///
    /// The store is loaded once before binding so a missing file is created
    /// and a corrupt one is reported at startup.
    pub async fn serve(self) -> ServerResult<()> {
        let store = self.state.store.clone();
        let docs = tokio::task::spawn_blocking(move || store.list())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))??;
        tracing::info!(
            path = %self.config.data_file.display(),
            documents = docs.len(),
            "store ready"
        );

        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("Docket server listening on http://{}", self.config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
