//! HTTP Server

use std::time::Duration;

use anyhow::Result;
use axum::{async_trait, extract::DefaultBodyLimit, extract::Request, Router};
use axum_server::Handle;
use clap::Parser;
use handlers::v1;
use state::AppState;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, trace::TraceLayer,
};
use tracing::debug;

use crate::domain::{
    campaigns::CampaignService, drafting::DraftingService, journal::Journal,
};

mod errors;
mod handlers;
mod open_api;
mod rate_limit;
pub mod servers;
pub mod state;

/// Multipart uploads larger than this are rejected
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for the HTTP and HTTPS servers.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
pub struct HttpServerConfig {
    /// The port to listen on for HTTP
    #[arg(long, env = "HTTP_PORT", default_value = "3000")]
    pub http_port: u16,

    /// The port to listen on for HTTPS
    #[arg(long, env = "HTTPS_PORT", default_value = "3443")]
    pub https_port: u16,

    /// Path to the TLS certificate, in PEM format
    #[arg(long, env = "TLS_CERT_PATH")]
    pub cert_path: Option<String>,

    /// Path to the TLS private key, in PEM format
    #[arg(long, env = "TLS_KEY_PATH")]
    pub key_path: Option<String>,
}

/// A server that runs until shutdown
#[async_trait]
pub trait Server {
    /// Runs the server.
    async fn run(self) -> Result<()>;
}

/// Create the application's router
pub fn router<C: CampaignService, D: DraftingService, J: Journal>(
    state: AppState<C, D, J>,
) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        let uri = request.uri().to_string();
        tracing::info_span!("http_request", method = ?request.method(), uri)
    });

    Router::new()
        .nest("/api/v1", v1::router())
        .layer(trace_layer)
        .layer(CatchPanicLayer::custom(handlers::panic_handler))
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[mutants::skip]
async fn shutdown_signal(handle: Option<Handle>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    if let Some(handle) = handle {
        debug!("shutting down gracefully");
        handle.graceful_shutdown(Some(Duration::from_secs(10)));
    }
}
