//! HTTP API Layer
//!
//! This crate exposes the claims back-office over HTTP using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: webhook intake, claim queries, payout preview, health
//! - **Worker**: queue consumer that runs the webhook event handler
//! - **Middleware**: request ids, tracing, access logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: `{ ok: false, error }` responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let (state, worker) = AppState::new(config, engine, store);
//! axum::serve(listener, create_router(state)).await?;
//! worker.join().await;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod worker;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_claims::{ClaimStorePort, PayoutEngine, ProtocolEnginePort, WebhookEventHandler};

use crate::config::ApiConfig;
use crate::handlers::{claims, health, webhooks};
use crate::middleware::access_log_middleware;
use crate::worker::{WebhookQueue, WebhookWorker};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub engine: Arc<dyn ProtocolEnginePort>,
    pub store: Arc<dyn ClaimStorePort>,
    /// Engine used by the stateless preview endpoint
    pub payout: Arc<PayoutEngine>,
    pub webhooks: WebhookQueue,
}

impl AppState {
    /// Wires the webhook handler and starts its worker
    ///
    /// Must be called inside a Tokio runtime. The worker drains once the
    /// returned state and every clone of it are dropped.
    pub fn new(
        config: ApiConfig,
        engine: Arc<dyn ProtocolEnginePort>,
        store: Arc<dyn ClaimStorePort>,
    ) -> (Self, WebhookWorker) {
        let handler = WebhookEventHandler::new(
            engine.clone(),
            store.clone(),
            config.default_policy_id.as_str().into(),
        );
        let (webhooks, worker) = WebhookWorker::spawn(
            handler,
            config.webhook_queue_capacity,
            config.webhook_max_in_flight,
        );

        let state = Self {
            payout: Arc::new(PayoutEngine::new(config.payout_schedule())),
            config: Arc::new(config),
            engine,
            store,
            webhooks,
        };

        (state, worker)
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let webhook_routes = Router::new()
        .route("/topic/:topic", post(webhooks::receive_webhook));

    let claims_routes = Router::new()
        .route("/", get(claims::list_claims))
        .route("/preview", post(claims::preview_payout))
        .route("/:claim_id", get(claims::get_claim));

    Router::new()
        .merge(public_routes)
        .nest("/webhooks", webhook_routes)
        .nest("/claims", claims_routes)
        .layer(axum_middleware::from_fn(access_log_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
