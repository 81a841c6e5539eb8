//! Exchange records and attribute reconstruction
//!
//! A verified presentation carries its disclosed values keyed by opaque
//! referents. The proof request that produced it maps the same referents to
//! attribute names. [`reconstruct_attributes`] joins the two into a flat
//! `name -> value` map.
//!
//! # Referent name resolution
//!
//! For every referent in the revealed attributes, the attribute name is
//! resolved in priority order:
//!
//! 1. the request entry's `name`
//! 2. the first entry of the request's `names`
//! 3. the referent itself, when the request has no entry for it
//!
//! Values disclosed through attribute groups (multi-name referents) are
//! flattened name by name.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use core_kernel::{ConnectionId, ExchangeId};

use crate::error::ClaimError;

/// Attribute name to disclosed value, ordered by name
pub type FlatAttributes = BTreeMap<String, String>;

/// Tri-state verification outcome reported by the protocol engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifiedFlag {
    True,
    False,
    #[default]
    Unknown,
}

impl VerifiedFlag {
    pub fn is_true(&self) -> bool {
        matches!(self, VerifiedFlag::True)
    }

    /// Decodes the flag from an arbitrary JSON value
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Bool(true)) => VerifiedFlag::True,
            Some(Value::Bool(false)) => VerifiedFlag::False,
            Some(Value::String(text)) => Self::from_text(text),
            _ => VerifiedFlag::Unknown,
        }
    }

    fn from_text(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" => VerifiedFlag::True,
            "false" => VerifiedFlag::False,
            _ => VerifiedFlag::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for VerifiedFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(VerifiedFlag::from_value(value.as_ref()))
    }
}

/// A disclosed value as it appears inside a presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RevealedValue {
    /// A bare string value
    Raw(String),
    /// The usual `{ "raw": ..., "encoded": ... }` object
    Encoded {
        raw: String,
        #[serde(default)]
        encoded: Option<String>,
    },
    /// Any other shape, kept so it is never silently dropped
    Unrecognized(Value),
}

impl RevealedValue {
    /// Returns the disclosed raw value as text
    pub fn raw(&self) -> String {
        match self {
            RevealedValue::Raw(raw) => raw.clone(),
            RevealedValue::Encoded { raw, .. } => raw.clone(),
            RevealedValue::Unrecognized(value) => match value.get("raw") {
                Some(Value::String(raw)) => raw.clone(),
                Some(other) => other.to_string(),
                None => match value {
                    Value::Null => String::new(),
                    other => other.to_string(),
                },
            },
        }
    }
}

/// One requested attribute of a proof request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestedAttribute {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub names: Option<Vec<String>>,
}

impl RequestedAttribute {
    /// Canonical attribute name: `name`, then the first of `names`
    pub fn canonical_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.names.as_ref().and_then(|names| names.first()).map(String::as_str))
    }
}

/// The proof request sent to the holder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProofRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub requested_attributes: Option<BTreeMap<String, RequestedAttribute>>,
}

/// Values disclosed for one multi-name referent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevealedGroup {
    #[serde(default)]
    pub values: BTreeMap<String, RevealedValue>,
}

/// The `requested_proof` section of a presentation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestedProof {
    #[serde(default)]
    pub revealed_attrs: BTreeMap<String, RevealedValue>,
    #[serde(default)]
    pub revealed_attr_groups: BTreeMap<String, RevealedGroup>,
}

/// The presentation returned by the holder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    #[serde(default)]
    pub requested_proof: Option<RequestedProof>,
}

/// Format-keyed payload used by newer protocol versions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatPayload<T> {
    #[serde(default)]
    pub indy: Option<T>,
    #[serde(default)]
    pub anoncreds: Option<T>,
}

impl<T> FormatPayload<T> {
    fn first(&self) -> Option<&T> {
        self.indy.as_ref().or(self.anoncreds.as_ref())
    }
}

/// Format-keyed request and presentation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ByFormat {
    #[serde(default)]
    pub pres_request: Option<FormatPayload<ProofRequest>>,
    #[serde(default)]
    pub pres: Option<FormatPayload<Presentation>>,
}

/// A full proof-exchange record as returned by the protocol engine
///
/// Owned by the engine and read-only here. Both the flat (`presentation_request`,
/// `presentation`) and the format-keyed (`by_format`) layouts are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    #[serde(default)]
    pub presentation_exchange_id: Option<String>,
    #[serde(default)]
    pub pres_ex_id: Option<String>,
    #[serde(default)]
    pub connection_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub verified: VerifiedFlag,
    #[serde(default)]
    pub presentation_request: Option<ProofRequest>,
    #[serde(default)]
    pub proof_request: Option<ProofRequest>,
    #[serde(default)]
    pub presentation: Option<Presentation>,
    #[serde(default)]
    pub by_format: Option<ByFormat>,
    #[serde(default)]
    pub presentation_error: Option<Value>,
    #[serde(default)]
    pub error_msg: Option<String>,
    #[serde(default)]
    pub verified_msgs: Option<Vec<String>>,
}

impl ExchangeRecord {
    /// Exchange id, whichever protocol version reported it
    pub fn exchange_id(&self) -> Option<ExchangeId> {
        self.presentation_exchange_id
            .as_deref()
            .or(self.pres_ex_id.as_deref())
            .and_then(ExchangeId::non_blank)
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection_id.as_deref().and_then(ConnectionId::non_blank)
    }

    /// The proof request's requested-attributes map, if any layout carries one
    pub fn requested_attributes(&self) -> Option<&BTreeMap<String, RequestedAttribute>> {
        let format_request = self
            .by_format
            .as_ref()
            .and_then(|f| f.pres_request.as_ref())
            .and_then(FormatPayload::first);

        [self.presentation_request.as_ref(), self.proof_request.as_ref(), format_request]
            .into_iter()
            .flatten()
            .find_map(|request| request.requested_attributes.as_ref())
    }

    /// The presentation's requested-proof section, if any layout carries one
    pub fn requested_proof(&self) -> Option<&RequestedProof> {
        let format_pres = self
            .by_format
            .as_ref()
            .and_then(|f| f.pres.as_ref())
            .and_then(FormatPayload::first);

        [self.presentation.as_ref(), format_pres]
            .into_iter()
            .flatten()
            .find_map(|pres| pres.requested_proof.as_ref())
    }

    /// Engine-provided reasons for an unsuccessful verification, joined for logging
    pub fn failure_reason(&self) -> String {
        let mut reasons = Vec::new();
        if let Some(error) = &self.presentation_error {
            match error {
                Value::String(text) => reasons.push(text.clone()),
                Value::Null => {}
                other => reasons.push(other.to_string()),
            }
        }
        if let Some(msg) = &self.error_msg {
            reasons.push(msg.clone());
        }
        if let Some(msgs) = &self.verified_msgs {
            reasons.extend(msgs.iter().cloned());
        }

        if reasons.is_empty() {
            "no reason reported".to_string()
        } else {
            reasons.join("; ")
        }
    }
}

/// Resolves the attribute name for a referent
fn resolve_name(requested: &BTreeMap<String, RequestedAttribute>, referent: &str) -> String {
    requested
        .get(referent)
        .and_then(RequestedAttribute::canonical_name)
        .unwrap_or(referent)
        .to_string()
}

/// Rebuilds the flat attribute map from a verified exchange record
///
/// # Errors
///
/// Returns `ClaimError::InsufficientProofData` when the record has no
/// requested-attributes map or no presentation at all. Callers treat this as
/// terminal: it is logged and never retried.
pub fn reconstruct_attributes(record: &ExchangeRecord) -> Result<FlatAttributes, ClaimError> {
    let requested = record.requested_attributes().ok_or_else(|| {
        ClaimError::InsufficientProofData("proof request has no requested_attributes".to_string())
    })?;
    let proof = record.requested_proof().ok_or_else(|| {
        ClaimError::InsufficientProofData("presentation has no requested_proof".to_string())
    })?;

    let mut flat = FlatAttributes::new();
    for (referent, value) in &proof.revealed_attrs {
        flat.insert(resolve_name(requested, referent), value.raw());
    }
    for group in proof.revealed_attr_groups.values() {
        for (name, value) in &group.values {
            flat.insert(name.clone(), value.raw());
        }
    }

    Ok(flat)
}
