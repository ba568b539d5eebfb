mod config;
mod editor;
mod errors;
mod layout;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::session::{InMemorySessionStore, SessionStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pager v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Page geometry: {}x{}px, buffer {}px, fit threshold {:.0}px, spacing step {}px",
        config.page.page_width,
        config.page.page_height,
        config.page.buffer,
        config.page.fit_threshold(),
        config.page.spacing_step
    );

    info!(
        "Sessions: idle TTL {}s, limit {}",
        config.session_ttl.as_secs(),
        config.max_sessions
    );

    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(
        config.session_ttl,
        config.max_sessions,
    ));
    spawn_session_sweeper(Arc::clone(&sessions), config.session_ttl);

    let state = AppState {
        config: config.clone(),
        sessions,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // renderer is served from a different origin in dev

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Drops idle sessions in the background so abandoned documents do not pile up.
fn spawn_session_sweeper(sessions: Arc<dyn SessionStore>, ttl: Duration) {
    let period = ttl.min(Duration::from_secs(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = sessions.evict_expired().await;
            if evicted > 0 {
                let remaining = sessions.len().await;
                info!(evicted, remaining, "Expired idle sessions");
            }
        }
    });
}
