//! Webhook intake

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::{debug, warn};

use domain_claims::VerificationEvent;

use crate::dto::claims::WebhookAck;
use crate::worker::Enqueued;
use crate::AppState;

/// Accepts one event from the agent
///
/// Always answers 200: processing happens on the webhook worker and its
/// failures are logged there.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    body: Bytes,
) -> Json<WebhookAck> {
    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(topic = %topic, error = %e, "webhook body is not JSON, acknowledging without processing");
            return Json(WebhookAck { ok: true });
        }
    };

    let event = VerificationEvent::from_webhook(&topic, payload);
    debug!(
        topic = %event.topic,
        exchange_id = ?event.exchange_id,
        state = ?event.state,
        "webhook received"
    );

    if state.webhooks.enqueue(event) != Enqueued::Accepted {
        debug!(topic = %topic, "webhook acknowledged but not queued");
    }

    Json(WebhookAck { ok: true })
}
