//! Server lifecycle: bind and serve the router.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::router::create_router;
use crate::state::ServerState;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

pub struct GitscopeServer {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl GitscopeServer {
    pub fn new(state: Arc<ServerState>, config: ServerConfig) -> Self {
        GitscopeServer { state, config }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.config.host, self.config.port)
    }

    /// Bind and serve until the process exits.
    pub async fn start(self) -> anyhow::Result<()> {
        let router = create_router(self.state);
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("cannot bind {addr}"))?;
        info!("Studio ready at http://{addr}");
        axum::serve(listener, router).await?;
        Ok(())
    }
}
