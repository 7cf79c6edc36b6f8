//! Claims Gateway server.

use crate::domain::config::GatewayConfig;
use crate::router::{build_router, AppState};
use axum::Router;
use pl_01_settlement_ledger::SettlementApi;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

/// Gateway startup and serving errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::domain::config::ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// The Claims Gateway: validated config plus the settlement API it fronts.
pub struct ClaimsGateway {
    config: GatewayConfig,
    api: Arc<dyn SettlementApi>,
}

impl ClaimsGateway {
    pub fn new(config: GatewayConfig, api: Arc<dyn SettlementApi>) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self { config, api })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn router(&self) -> Router {
        build_router(AppState::new(Arc::clone(&self.api)), &self.config)
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })?;
        serve_on(listener, self.router(), shutdown).await
    }
}

/// Serve `router` on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
) -> Result<(), GatewayError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener.local_addr().map_err(GatewayError::Serve)?;
    info!(addr = %local, "Claims gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(GatewayError::Serve)?;

    info!("Claims gateway stopped");
    Ok(())
}
