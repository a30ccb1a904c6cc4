use std::sync::Arc;

use strata_store::ObjectStore;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::build_router;
use crate::state::AppState;

/// Strata sync and entity server over an object store.
pub struct StrataServer {
    config: ServerConfig,
    state: AppState,
}

impl StrataServer {
    pub fn new(config: ServerConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config,
            state: AppState::new(store),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = build_router(self.state);
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("strata server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| crate::error::ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_store::InMemoryObjectStore;

    #[test]
    fn server_construction() {
        let server = StrataServer::new(
            ServerConfig::default(),
            Arc::new(InMemoryObjectStore::new()),
        );
        assert_eq!(server.config().bind_addr, "127.0.0.1:8640".parse().unwrap());
    }

    #[test]
    fn router_builds() {
        let server = StrataServer::new(
            ServerConfig::default(),
            Arc::new(InMemoryObjectStore::new()),
        );
        let _router = server.router();
    }
}
