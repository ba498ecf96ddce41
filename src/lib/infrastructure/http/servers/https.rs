//! HTTPS application server

use std::net::{Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use axum::{async_trait, Router};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{debug, info};

use crate::{
    domain::{campaigns::CampaignService, drafting::DraftingService, journal::Journal},
    infrastructure::http::{shutdown_signal, state::AppState, HttpServerConfig, Server},
};

use super::governed_router;

/// The application's HTTPS server
#[derive(Debug)]
pub struct HttpsServer {
    router: Router,
    address: SocketAddr,
    tls_config: RustlsConfig,
}

impl HttpsServer {
    /// Returns a new HTTPS server bound to the port specified in `config`.
    pub async fn new(
        state: AppState<impl CampaignService, impl DraftingService, impl Journal>,
        config: &HttpServerConfig,
    ) -> Result<Self> {
        let cert_path = config
            .cert_path
            .as_deref()
            .context("TLS_CERT_PATH is not set")?;
        let key_path = config
            .key_path
            .as_deref()
            .context("TLS_KEY_PATH is not set")?;

        let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .context("failed to load TLS config")?;

        let router = governed_router(state)?;

        let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.https_port));

        Ok(Self {
            router,
            address,
            tls_config,
        })
    }
}

#[async_trait]
impl Server for HttpsServer {
    async fn run(self) -> Result<()> {
        debug!("HTTPS Server listening on {}", self.address);

        let handle = Handle::new();

        let server = axum_server::bind_rustls(self.address, self.tls_config)
            .handle(handle.clone())
            .serve(
                self.router
                    .into_make_service_with_connect_info::<SocketAddr>(),
            );

        tokio::select! {
            result = server => result.context("server error")?,
            _ = shutdown_signal(Some(handle)) => {
                info!("Shutting down HTTPS server");
            }
        }

        Ok(())
    }
}
