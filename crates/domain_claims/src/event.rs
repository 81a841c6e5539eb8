//! Inbound webhook events
//!
//! The protocol engine posts one JSON payload per state change, addressed by
//! topic. Only a handful of fields matter here; the rest of the payload is
//! kept opaque.

use serde_json::Value;
use std::fmt;

use core_kernel::{ConnectionId, ExchangeId};

use crate::attributes::VerifiedFlag;

/// Webhook topic, normalized from the path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    /// `connections`
    ConnectionStateChanged,
    /// `issue_credential`, `issue_credential_v2_0`, ...
    CredentialStateChanged,
    /// `present_proof`, `present_proof_v2_0`, ...
    ProofStateChanged,
    /// Anything else; acknowledged and ignored
    Unrecognized(String),
}

impl Topic {
    pub fn parse(segment: &str) -> Self {
        let segment = segment.trim().to_ascii_lowercase();
        if segment == "connections" {
            Topic::ConnectionStateChanged
        } else if segment.starts_with("issue_credential") {
            Topic::CredentialStateChanged
        } else if segment.starts_with("present_proof") {
            Topic::ProofStateChanged
        } else {
            Topic::Unrecognized(segment)
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::ConnectionStateChanged => f.write_str("connection-state-changed"),
            Topic::CredentialStateChanged => f.write_str("credential-state-changed"),
            Topic::ProofStateChanged => f.write_str("proof-state-changed"),
            Topic::Unrecognized(topic) => write!(f, "unrecognized:{topic}"),
        }
    }
}

/// Proof exchange state, normalized so `presentation_received` and
/// `presentation-received` compare equal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofState {
    RequestSent,
    PresentationReceived,
    /// Terminal, outcome in the exchange record
    Verified,
    /// Terminal in newer protocol versions, outcome in the exchange record
    Done,
    /// Terminal, the exchange failed
    Abandoned,
    Other(String),
}

impl ProofState {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "request-sent" => ProofState::RequestSent,
            "presentation-received" => ProofState::PresentationReceived,
            "verified" => ProofState::Verified,
            "done" => ProofState::Done,
            "abandoned" => ProofState::Abandoned,
            _ => ProofState::Other(normalized),
        }
    }

    /// True for the states whose outcome is read from the exchange record
    pub fn carries_outcome(&self) -> bool {
        matches!(self, ProofState::Verified | ProofState::Done)
    }
}

/// One webhook delivery
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationEvent {
    pub exchange_id: Option<ExchangeId>,
    pub topic: Topic,
    pub state: Option<String>,
    /// Flag carried by the webhook itself; informational only
    pub verified: VerifiedFlag,
    pub connection_id: Option<ConnectionId>,
    pub payload: Value,
}

fn text_field<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| payload.get(*key).and_then(Value::as_str))
}

impl VerificationEvent {
    /// Builds an event from the topic path segment and the raw body
    pub fn from_webhook(topic: &str, payload: Value) -> Self {
        let exchange_id = text_field(&payload, &["presentation_exchange_id", "pres_ex_id", "exchange_id"])
            .and_then(ExchangeId::non_blank);
        let state = text_field(&payload, &["state"]).map(str::to_string);
        let connection_id = text_field(&payload, &["connection_id"]).and_then(ConnectionId::non_blank);
        let verified = VerifiedFlag::from_value(payload.get("verified"));

        Self {
            exchange_id,
            topic: Topic::parse(topic),
            state,
            verified,
            connection_id,
            payload,
        }
    }

    /// Proof state, for events on the proof topic
    pub fn proof_state(&self) -> Option<ProofState> {
        match self.topic {
            Topic::ProofStateChanged => self.state.as_deref().map(ProofState::parse),
            _ => None,
        }
    }

    /// `error_msg` carried by the payload, if any
    pub fn error_message(&self) -> Option<&str> {
        self.payload.get("error_msg").and_then(Value::as_str)
    }
}
