mod advisory;
mod config;
mod errors;
mod estimate;
mod llm_client;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::estimate::coefficients::CoefficientTable;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting DataWorth API v{}", env!("CARGO_PKG_VERSION"));

    // Coefficient table is fixed for the life of the process
    let table = CoefficientTable::load(config.coefficients_path.as_deref())?;
    info!(
        "Coefficient table ready: base={} currency_factor={}",
        table.base_amount, table.currency_factor
    );

    let advisor = GeminiClient::new(&config)?;
    if advisor.has_credential() {
        info!("Advisory client initialized ({})", advisor.endpoint());
    } else {
        warn!("GEMINI_API_KEY not set; advice requests will fail");
    }

    let state = AppState::new(table, Arc::new(advisor));

    spawn_session_reaper(
        Arc::clone(&state.sessions),
        Duration::from_secs(config.session_idle_ttl_secs),
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Evicts idle sessions periodically. Checks at a tenth of the TTL, at least every second.
fn spawn_session_reaper(sessions: Arc<SessionStore>, ttl: Duration) {
    let Ok(chrono_ttl) = chrono::Duration::from_std(ttl) else {
        warn!("Session TTL out of range; idle sessions will not be evicted");
        return;
    };
    let period = (ttl / 10).max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            sessions.purge_idle(chrono::Utc::now(), chrono_ttl).await;
        }
    });
}
