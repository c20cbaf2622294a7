//! # Money Pot Node
//!
//! Hosts one market behind an HTTP and WebSocket API.

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod api;
mod config;
mod state;

use config::NodeConfig;
use state::AppState;

/// Run the Money Pot node server.
pub async fn run_server(config: NodeConfig) -> anyhow::Result<()> {
    let market = config.build_market()?;
    let state = AppState::new(market);
    let app = create_router(state);

    info!(addr = %config.addr, "listening");

    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router.
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health::health_check))
        // Pots
        .route("/api/v1/pots", post(api::pots::create_pot).get(api::pots::list_pots))
        .route("/api/v1/pots/:id", get(api::pots::get_pot))
        .route("/api/v1/pots/:id/attempts", post(api::pots::attempt_pot))
        .route("/api/v1/pots/:id/expire", post(api::pots::expire_pot))
        // Attempts
        .route("/api/v1/attempts/:id", get(api::attempts::get_attempt))
        .route(
            "/api/v1/attempts/:id/outcome",
            post(api::attempts::report_outcome),
        )
        // Ledger reads
        .route("/api/v1/events", get(api::events::list_events))
        .route(
            "/api/v1/balances/:account/:asset",
            get(api::events::get_balance),
        )
        // WebSocket endpoints
        .route("/ws/events", get(api::ws::event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let config = NodeConfig::from_env()?;
    info!(
        oracle = %config.market.oracle,
        platform = %config.market.platform,
        custody = %config.market.custody,
        "Money Pot node starting"
    );

    run_server(config).await
}
