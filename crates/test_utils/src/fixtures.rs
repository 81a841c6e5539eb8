//! Pre-built Test Fixtures
//!
//! Provides ready-to-use attribute sets and exchange records. Records are
//! built as JSON first, in the shape the protocol engine returns, so the
//! serde decoding path is exercised by every test that uses them.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use domain_claims::{ExchangeRecord, FlatAttributes};

/// Fixture for disclosed encounter attributes
pub struct EncounterFixtures;

impl EncounterFixtures {
    /// Five-day inpatient stay with a procedure (2025-06-01 to 2025-06-05)
    pub fn inpatient_with_procedure(encounter_id: &str) -> FlatAttributes {
        Self::attrs(&[
            ("hospital_id", "HOSP-001"),
            ("encounter_id", encounter_id),
            ("encounter_class", "INPATIENT"),
            ("admission_date", "2025-06-01"),
            ("discharge_date", "2025-06-05"),
            ("diagnosis_code", "K35.80"),
            ("diagnosis_display", "Acute appendicitis"),
            ("procedure_code", "0DTJ4ZZ"),
            ("procedure_display", "Laparoscopic appendectomy"),
            ("insured_id", "INS-100"),
            ("policy_id", "POL-100"),
        ])
    }

    /// Inpatient admission with no discharge date and no procedure
    pub fn inpatient_same_day(encounter_id: &str) -> FlatAttributes {
        Self::attrs(&[
            ("hospital_id", "HOSP-001"),
            ("encounter_id", encounter_id),
            ("encounter_class", "INPATIENT"),
            ("admission_date", "2025-06-01"),
            ("insured_id", "INS-100"),
        ])
    }

    /// Outpatient visit spanning several days
    pub fn outpatient(encounter_id: &str) -> FlatAttributes {
        Self::attrs(&[
            ("hospital_id", "HOSP-002"),
            ("encounter_id", encounter_id),
            ("encounter_class", "OUTPATIENT"),
            ("admission_date", "2025-06-01"),
            ("discharge_date", "2025-06-10"),
            ("insured_id", "INS-200"),
        ])
    }

    /// Builds attributes from key/value pairs
    pub fn attrs(pairs: &[(&str, &str)]) -> FlatAttributes {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

/// Builder for exchange records in the flat (v1) layout
///
/// Each attribute is requested under its own generated referent, mirroring
/// what the engine produces for a single-credential proof request.
#[derive(Debug, Clone)]
pub struct ExchangeRecordBuilder {
    exchange_id: String,
    connection_id: Option<String>,
    state: String,
    verified: Value,
    requested: Map<String, Value>,
    revealed: Map<String, Value>,
    include_request: bool,
    include_presentation: bool,
    extra: Map<String, Value>,
}

impl ExchangeRecordBuilder {
    pub fn new(exchange_id: impl Into<String>) -> Self {
        Self {
            exchange_id: exchange_id.into(),
            connection_id: Some("conn-fixture".to_string()),
            state: "verified".to_string(),
            verified: json!("true"),
            requested: Map::new(),
            revealed: Map::new(),
            include_request: true,
            include_presentation: true,
            extra: Map::new(),
        }
    }

    /// Random exchange id
    pub fn random() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    /// Requests and reveals every attribute, one referent each
    pub fn with_attributes(mut self, attrs: &FlatAttributes) -> Self {
        for (index, (name, value)) in attrs.iter().enumerate() {
            let referent = format!("{}_{}_uuid", index, name);
            self.requested.insert(referent.clone(), json!({ "name": name }));
            self.revealed
                .insert(referent, json!({ "raw": value, "encoded": format!("{}", index) }));
        }
        self
    }

    /// Reveals a value under a referent the request does not know
    pub fn with_orphan_referent(mut self, referent: &str, value: &str) -> Self {
        self.revealed.insert(referent.to_string(), json!({ "raw": value }));
        self
    }

    /// Sets the `verified` field to an arbitrary JSON value
    pub fn verified(mut self, verified: Value) -> Self {
        self.verified = verified;
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn connection_id(mut self, connection_id: Option<&str>) -> Self {
        self.connection_id = connection_id.map(str::to_string);
        self
    }

    /// Drops the proof request entirely
    pub fn without_request(mut self) -> Self {
        self.include_request = false;
        self
    }

    /// Keeps the request but drops the presentation
    pub fn without_presentation(mut self) -> Self {
        self.include_presentation = false;
        self
    }

    /// Adds a top-level field such as `verified_msgs` or `presentation_error`
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn exchange_id(&self) -> &str {
        &self.exchange_id
    }

    /// Renders the record as the engine's JSON
    pub fn to_json(&self) -> Value {
        let mut record = Map::new();
        record.insert("presentation_exchange_id".to_string(), json!(self.exchange_id));
        if let Some(connection_id) = &self.connection_id {
            record.insert("connection_id".to_string(), json!(connection_id));
        }
        record.insert("state".to_string(), json!(self.state));
        record.insert("verified".to_string(), self.verified.clone());
        if self.include_request {
            record.insert(
                "presentation_request".to_string(),
                json!({ "name": "Encounter proof", "requested_attributes": self.requested }),
            );
        }
        if self.include_presentation {
            record.insert(
                "presentation".to_string(),
                json!({ "requested_proof": { "revealed_attrs": self.revealed } }),
            );
        }
        for (key, value) in &self.extra {
            record.insert(key.clone(), value.clone());
        }
        Value::Object(record)
    }

    /// Decodes the JSON into an `ExchangeRecord`
    pub fn build(&self) -> ExchangeRecord {
        serde_json::from_value(self.to_json()).expect("fixture record must decode")
    }
}

/// Fixture for webhook payloads
pub struct WebhookFixtures;

impl WebhookFixtures {
    /// Proof-topic payload for a state change
    pub fn proof_event(exchange_id: &str, state: &str) -> Value {
        json!({
            "presentation_exchange_id": exchange_id,
            "connection_id": "conn-fixture",
            "state": state,
        })
    }

    /// Terminal proof-topic payload whose own flag claims success
    pub fn verified_event(exchange_id: &str) -> Value {
        json!({
            "presentation_exchange_id": exchange_id,
            "connection_id": "conn-fixture",
            "state": "verified",
            "verified": "true",
        })
    }
}
