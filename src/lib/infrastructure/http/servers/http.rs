//! The application's HTTP server.

use std::net::{Ipv4Addr, SocketAddr, TcpListener};

use anyhow::{Context, Result};
use axum::{async_trait, Router};
use axum_server::Handle;
use tracing::{debug, info};

use crate::{
    domain::{campaigns::CampaignService, drafting::DraftingService, journal::Journal},
    infrastructure::http::{shutdown_signal, state::AppState, HttpServerConfig, Server},
};

use super::governed_router;

/// The application's HTTP server
#[derive(Debug)]
pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(
        state: AppState<impl CampaignService, impl DraftingService, impl Journal>,
        config: &HttpServerConfig,
    ) -> Result<Self> {
        let router = governed_router(state)?;

        let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.http_port));
        let listener = TcpListener::bind(address)
            .with_context(|| format!("failed to listen on {}", config.http_port))?;

        Ok(Self { router, listener })
    }
}

#[async_trait]
impl Server for HttpServer {
    /// Runs the HTTP server.
    #[mutants::skip]
    async fn run(self) -> Result<()> {
        debug!(
            "HTTP Server listening on {}",
            self.listener
                .local_addr()
                .context("failed to get local address")?
        );

        let handle = Handle::new();

        let server = axum_server::from_tcp(self.listener)
            .handle(handle.clone())
            .serve(
                self.router
                    .into_make_service_with_connect_info::<SocketAddr>(),
            );

        tokio::select! {
            result = server => result.context("server error")?,
            _ = shutdown_signal(Some(handle)) => {
                info!("Shutting down HTTP server");
            }
        }

        Ok(())
    }
}
