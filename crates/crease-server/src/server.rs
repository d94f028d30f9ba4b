use std::sync::Arc;

use tokio::net::TcpListener;

use crease_engine::{InMemoryRoster, Scorer};
use crease_ledger::InMemoryBallLedger;

use crate::auth::TokenAuth;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// crease scoring server.
pub struct CreaseServer {
    config: ServerConfig,
    state: AppState,
}

impl CreaseServer {
    /// In-memory roster and ledger, bearer-token auth from `config`.
    pub fn new(config: ServerConfig) -> Self {
        let scorer = Scorer::new(
            Arc::new(InMemoryRoster::new()),
            InMemoryBallLedger::new(),
            config.engine.clone(),
        );
        let state = AppState::new(scorer, Arc::new(TokenAuth::from_config(&config)));
        Self { config, state }
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
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            scorer_tokens = self.config.scorer_tokens.len(),
            "crease server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
