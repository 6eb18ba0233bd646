mod analysis;
mod config;
mod errors;
mod gateway;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::gateway::cache::ResultCache;
use crate::gateway::rate_limiter::{RateLimiter, RateLimiterConfig};
use crate::gateway::{AnalysisGateway, GatewaySettings};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analysis API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_api_url.clone(),
        config.model_timeout,
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Shared stores, owned by the gateway for the process lifetime
    let limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
        interval: config.rate_limit_interval,
        max_tracked_identities: config.rate_limit_max_identities,
    }));
    let cache = Arc::new(ResultCache::new(config.cache_max_entries));
    info!(
        "Rate limiter: {} identities, {}ms window; cache: {} entries, {}s TTL",
        config.rate_limit_max_identities,
        config.rate_limit_interval.as_millis(),
        config.cache_max_entries,
        config.cache_ttl.as_secs()
    );

    let gateway = Arc::new(AnalysisGateway::new(
        Arc::new(llm),
        limiter,
        cache,
        GatewaySettings {
            cache_ttl: config.cache_ttl,
            model_timeout: config.model_timeout,
        },
    ));

    spawn_store_sweeper(gateway.clone(), config.sweep_interval);

    // Build app state
    let state = AppState {
        gateway,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict origins once the web client domain is fixed
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drops lapsed rate windows and expired cache entries.
fn spawn_store_sweeper(gateway: Arc<AnalysisGateway>, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period.max(Duration::from_secs(1)));
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            let windows = gateway.limiter().purge_expired();
            let entries = gateway.cache().purge_expired();
            debug!(
                "Store sweep removed {windows} rate windows and {entries} cache entries \
                 ({} windows, {} entries remain)",
                gateway.limiter().len(),
                gateway.cache().len()
            );
        }
    });
}
