//! HTTP and HTTPS application servers

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::{
    domain::{campaigns::CampaignService, drafting::DraftingService, journal::Journal},
    infrastructure::http::{
        rate_limit::{rate_limit_error_handler, RateLimitConfig},
        router,
        state::AppState,
    },
};

pub mod http;
pub mod https;

/// Wrap the application router with the edge rate limiter
fn governed_router(
    state: AppState<impl CampaignService, impl DraftingService, impl Journal>,
) -> Result<Router> {
    let rate = RateLimitConfig::default();

    let governor = GovernorConfigBuilder::default()
        .per_second(rate.per_second)
        .burst_size(rate.burst_size)
        .error_handler(rate_limit_error_handler)
        .finish()
        .context("failed to build the rate limiter")?;

    Ok(router(state).layer(GovernorLayer {
        config: Arc::new(governor),
    }))
}
