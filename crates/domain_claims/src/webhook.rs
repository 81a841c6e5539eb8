//! Webhook event handling
//!
//! Drives one proof exchange through the adjudication pipeline:
//!
//! ```text
//! request-sent, ...        -> ignored
//! presentation-received    -> ask the engine to verify, stop
//! verified / done          -> fetch record -> check engine's verified flag
//!                             -> reconstruct -> create-if-absent
//! abandoned                -> log the failure, stop
//! ```
//!
//! Every outcome is terminal-and-logged. Nothing here returns an error to the
//! transport; redelivery is the engine's concern and duplicate deliveries are
//! absorbed by the store's encounter index.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use core_kernel::{ConnectionId, ExchangeId, InsuredId, PolicyId};

use crate::attributes::{reconstruct_attributes, FlatAttributes};
use crate::claim::Claim;
use crate::event::{ProofState, Topic, VerificationEvent};
use crate::ports::{ClaimCreation, ClaimStorePort, NewClaim, ProtocolEnginePort};

/// Insured id used when neither the attributes nor the exchange name one
pub const UNKNOWN_INSURED: &str = "UNKNOWN";

const INSURED_KEYS: &[&str] = &["insured_id", "insuredId", "patient_id", "patientId"];
const POLICY_KEYS: &[&str] = &["policy_id", "policyId"];

/// Terminal outcome of handling one event
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// Topic with no claim logic
    Acknowledged,
    /// Proof state with no action
    Ignored { state: String },
    /// Proof-topic event without an exchange id
    MissingExchangeId,
    /// Verification was requested from the engine
    VerificationRequested,
    /// The engine reported the proof as not verified, or the exchange failed
    VerificationFailed { reason: String },
    /// The record lacked the data needed to rebuild the attributes
    InsufficientData { reason: String },
    /// A call to the engine failed
    UpstreamFailure { reason: String },
    /// The claim store rejected the write
    StoreFailure { reason: String },
    /// A new claim was created
    ClaimCreated(Claim),
    /// A claim for the encounter already existed
    DuplicateEncounter(Claim),
}

impl HandlerOutcome {
    /// The claim produced or found, if any
    pub fn claim(&self) -> Option<&Claim> {
        match self {
            HandlerOutcome::ClaimCreated(claim) | HandlerOutcome::DuplicateEncounter(claim) => Some(claim),
            _ => None,
        }
    }
}

/// Orchestrates reconstruction, deduplication, payout and storage
#[derive(Clone)]
pub struct WebhookEventHandler {
    engine: Arc<dyn ProtocolEnginePort>,
    store: Arc<dyn ClaimStorePort>,
    default_policy_id: PolicyId,
}

impl WebhookEventHandler {
    pub fn new(
        engine: Arc<dyn ProtocolEnginePort>,
        store: Arc<dyn ClaimStorePort>,
        default_policy_id: PolicyId,
    ) -> Self {
        Self {
            engine,
            store,
            default_policy_id,
        }
    }

    /// Handles one webhook delivery; safe to call concurrently
    pub async fn handle(&self, event: &VerificationEvent) -> HandlerOutcome {
        if event.topic != Topic::ProofStateChanged {
            debug!(topic = %event.topic, state = ?event.state, "webhook acknowledged without claim logic");
            return HandlerOutcome::Acknowledged;
        }

        let Some(state) = event.proof_state() else {
            debug!(topic = %event.topic, "proof event without state ignored");
            return HandlerOutcome::Ignored { state: String::new() };
        };

        let Some(exchange_id) = event.exchange_id.as_ref() else {
            warn!(state = ?state, "proof event without exchange id");
            return HandlerOutcome::MissingExchangeId;
        };

        match state {
            ProofState::PresentationReceived => self.request_verification(exchange_id).await,
            state if state.carries_outcome() => self.adjudicate(exchange_id, event).await,
            ProofState::Abandoned => {
                let reason = event.error_message().unwrap_or("exchange abandoned").to_string();
                warn!(exchange_id = %exchange_id, reason = %reason, "proof exchange abandoned");
                HandlerOutcome::VerificationFailed { reason }
            }
            _ => {
                let state = event.state.clone().unwrap_or_default();
                debug!(exchange_id = %exchange_id, state = %state, "proof state ignored");
                HandlerOutcome::Ignored { state }
            }
        }
    }

    async fn request_verification(&self, exchange_id: &ExchangeId) -> HandlerOutcome {
        match self.engine.verify_presentation(exchange_id).await {
            Ok(trigger) => {
                info!(
                    exchange_id = %exchange_id,
                    state = ?trigger.state,
                    "verification requested"
                );
                HandlerOutcome::VerificationRequested
            }
            Err(e) => {
                warn!(exchange_id = %exchange_id, error = %e, transient = e.is_transient(), "verify presentation failed");
                HandlerOutcome::UpstreamFailure { reason: e.to_string() }
            }
        }
    }

    async fn adjudicate(&self, exchange_id: &ExchangeId, event: &VerificationEvent) -> HandlerOutcome {
        let record = match self.engine.get_exchange_record(exchange_id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(exchange_id = %exchange_id, error = %e, transient = e.is_transient(), "fetch exchange record failed");
                return HandlerOutcome::UpstreamFailure { reason: e.to_string() };
            }
        };

        if !record.verified.is_true() {
            let reason = record.failure_reason();
            warn!(
                exchange_id = %exchange_id,
                verified = ?record.verified,
                reason = %reason,
                "proof not verified"
            );
            return HandlerOutcome::VerificationFailed { reason };
        }

        let credential_attrs = match reconstruct_attributes(&record) {
            Ok(attrs) => attrs,
            Err(e) => {
                warn!(exchange_id = %exchange_id, error = %e, "cannot rebuild disclosed attributes");
                return HandlerOutcome::InsufficientData { reason: e.to_string() };
            }
        };

        let connection_id = record.connection_id().or_else(|| event.connection_id.clone());
        let request = NewClaim {
            insured_id: resolve_insured(&credential_attrs, connection_id.as_ref()),
            policy_id: resolve_policy(&credential_attrs, &self.default_policy_id),
            credential_attrs,
        };

        match self.store.create_if_absent(request).await {
            Ok(ClaimCreation::Created(claim)) => {
                info!(
                    exchange_id = %exchange_id,
                    claim_id = %claim.claim_id,
                    encounter_id = ?claim.encounter_id(),
                    eligible = claim.preview.eligible,
                    "claim created from verified proof"
                );
                HandlerOutcome::ClaimCreated(claim)
            }
            Ok(ClaimCreation::Existing(claim)) => {
                info!(
                    exchange_id = %exchange_id,
                    claim_id = %claim.claim_id,
                    encounter_id = ?claim.encounter_id(),
                    "duplicate encounter, existing claim kept"
                );
                HandlerOutcome::DuplicateEncounter(claim)
            }
            Err(e) => {
                error!(exchange_id = %exchange_id, error = %e, "claim store rejected write");
                HandlerOutcome::StoreFailure { reason: e.to_string() }
            }
        }
    }
}

fn first_value(attrs: &FlatAttributes, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| attrs.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Insured id from the attributes, then the connection, then `UNKNOWN`
fn resolve_insured(attrs: &FlatAttributes, connection_id: Option<&ConnectionId>) -> InsuredId {
    first_value(attrs, INSURED_KEYS)
        .or_else(|| connection_id.map(|id| id.as_str().to_string()))
        .map(InsuredId::new)
        .unwrap_or_else(|| InsuredId::new(UNKNOWN_INSURED))
}

/// Policy id from the attributes, then the configured default
fn resolve_policy(attrs: &FlatAttributes, default_policy_id: &PolicyId) -> PolicyId {
    first_value(attrs, POLICY_KEYS)
        .map(PolicyId::new)
        .unwrap_or_else(|| default_policy_id.clone())
}
