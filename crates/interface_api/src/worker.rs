//! Webhook worker
//!
//! The webhook route only enqueues; events are drained here so that
//! acknowledgment latency never depends on the agent or the store.
//!
//! ```text
//! POST /webhooks/topic/{topic} -> WebhookQueue::enqueue -> mpsc -> worker
//!                                                              -> spawn per event
//!                                                                 (bounded by semaphore)
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use domain_claims::{VerificationEvent, WebhookEventHandler};

/// Upper bound on buffered webhook events
pub const MAX_QUEUE_CAPACITY: usize = 1 << 20;

/// Upper bound on concurrently processed webhook events
pub const MAX_IN_FLIGHT: usize = 4096;

/// Result of handing an event to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// The event will be processed
    Accepted,
    /// The queue was full; the event was dropped
    QueueFull,
    /// The worker has stopped
    Closed,
}

/// Sending side of the webhook queue
#[derive(Debug, Clone)]
pub struct WebhookQueue {
    sender: mpsc::Sender<VerificationEvent>,
}

impl WebhookQueue {
    /// Enqueues an event without waiting for capacity
    pub fn enqueue(&self, event: VerificationEvent) -> Enqueued {
        match self.sender.try_send(event) {
            Ok(()) => Enqueued::Accepted,
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(
                    topic = %event.topic,
                    exchange_id = ?event.exchange_id,
                    state = ?event.state,
                    "webhook queue full, dropping event"
                );
                Enqueued::QueueFull
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                warn!(
                    topic = %event.topic,
                    exchange_id = ?event.exchange_id,
                    "webhook worker stopped, dropping event"
                );
                Enqueued::Closed
            }
        }
    }
}

/// Handle to the running worker
#[derive(Debug)]
pub struct WebhookWorker {
    handle: JoinHandle<()>,
}

impl WebhookWorker {
    /// Starts the worker and returns the queue feeding it
    ///
    /// The worker stops once every `WebhookQueue` clone is dropped and the
    /// in-flight events have finished.
    pub fn spawn(
        handler: WebhookEventHandler,
        capacity: usize,
        max_in_flight: usize,
    ) -> (WebhookQueue, WebhookWorker) {
        let capacity = capacity.clamp(1, MAX_QUEUE_CAPACITY);
        let max_in_flight = max_in_flight.clamp(1, MAX_IN_FLIGHT);
        debug!(capacity, max_in_flight, "starting webhook worker");

        let (sender, receiver) = mpsc::channel(capacity);
        let handle = tokio::spawn(run(handler, receiver, max_in_flight));

        (WebhookQueue { sender }, WebhookWorker { handle })
    }

    /// Waits for the worker to drain
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            warn!(error = %e, "webhook worker terminated abnormally");
        }
    }
}

async fn run(
    handler: WebhookEventHandler,
    mut receiver: mpsc::Receiver<VerificationEvent>,
    max_in_flight: usize,
) {
    let permits = Arc::new(Semaphore::new(max_in_flight));

    while let Some(event) = receiver.recv().await {
        let permit = match permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let handler = handler.clone();

        tokio::spawn(async move {
            let outcome = handler.handle(&event).await;
            debug!(topic = %event.topic, outcome = ?outcome, "webhook processed");
            drop(permit);
        });
    }

    // Wait for in-flight events before reporting the worker as stopped
    let all = u32::try_from(max_in_flight).unwrap_or(u32::MAX);
    let _ = permits.acquire_many(all).await;
    info!("webhook worker stopped");
}
