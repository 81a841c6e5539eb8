//! Claims Back-Office - API Server Binary
//!
//! Starts the webhook intake and claim query API.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-api
//!
//! # Point at a secured agent
//! API_AGENT_ADMIN_URL=http://agent:8021 API_AGENT_API_KEY=... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_AGENT_ADMIN_URL` - Agent admin API base URL (default: http://localhost:8021)
//! * `API_AGENT_API_KEY` - Agent admin API key (default: none)
//! * `API_AGENT_TIMEOUT_SECS` - Timeout per agent call (default: 10)
//! * `API_AGENT_PROOF_API` - `v1` or `v2` proof endpoints (default: v1)
//! * `API_WEBHOOK_QUEUE_CAPACITY` - Buffered webhook events (default: 1024)
//! * `API_WEBHOOK_MAX_IN_FLIGHT` - Concurrently processed events (default: 16)
//! * `API_DEFAULT_POLICY_ID` - Policy used when a proof discloses none
//! * `API_DAILY_RATE` / `API_PROCEDURE_BONUS` - Payout schedule

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_claims::{ClaimStorePort, InMemoryClaimStore, PayoutEngine, ProtocolEnginePort};
use infra_agent::AgentClient;
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        agent = %config.agent_admin_url,
        "Starting claims back-office API server"
    );

    let engine: Arc<dyn ProtocolEnginePort> = Arc::new(
        AgentClient::new(config.agent_config()).context("cannot build agent client")?,
    );
    let store: Arc<dyn ClaimStorePort> =
        Arc::new(InMemoryClaimStore::new(PayoutEngine::new(config.payout_schedule())));

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    let (state, worker) = AppState::new(config, engine, store);
    let app = create_router(state);

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Draining webhook queue");
    worker.join().await;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
