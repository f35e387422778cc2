use std::future::Future;
use std::sync::Arc;

use rolodex_service::UserService;
use rolodex_store::{JsonFileRepository, UserRepository};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::{build_router, AppState};

/// rolodex HTTP server.
pub struct RolodexServer {
    config: ServerConfig,
}

impl RolodexServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open the configured store, initializing it when `init_store` is set.
    pub fn open_store(&self) -> ServerResult<JsonFileRepository> {
        let repo = if self.config.init_store {
            JsonFileRepository::open_or_init(&self.config.store_path)?
        } else {
            JsonFileRepository::open(&self.config.store_path)?
        };
        Ok(repo)
    }

    /// Build the router over the configured store (useful for testing).
    pub fn router(&self) -> ServerResult<axum::Router> {
        let repo: Arc<dyn UserRepository> = Arc::new(self.open_store()?);
        let state = AppState::new(UserService::new(repo));
        Ok(build_router(state, self.config.request_timeout()))
    }

    /// Serve until Ctrl-C, then finish in-flight requests and return.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_on(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router()?;
        tracing::info!(
            addr = %listener.local_addr()?,
            store = %self.config.store_path.display(),
            "rolodex server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("rolodex server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "failed to listen for shutdown signal"),
    }
}
