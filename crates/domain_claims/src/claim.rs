//! Claim record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimNumber, EncounterId, InsuredId, PolicyId};
use crate::attributes::FlatAttributes;
use crate::encounter::EncounterRecord;
use crate::payout::PayoutPreview;

/// Claim status
///
/// Only `Received` is assigned here; later transitions belong to downstream
/// review and payment services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Created from a verified proof
    Received,
    /// Under manual review
    InReview,
    /// Approved for payment
    Approved,
    /// Denied
    Denied,
    /// Paid out
    Paid,
}

/// An adjudicated claim for one encounter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    /// Sequence-based identifier
    pub claim_id: ClaimNumber,
    /// Policyholder
    pub insured_id: InsuredId,
    /// Policy the claim is made against
    pub policy_id: PolicyId,
    /// Status
    pub status: ClaimStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp, equal to `created_at` at creation
    pub updated_at: DateTime<Utc>,
    /// Normalized encounter
    #[serde(rename = "encounterDTO")]
    pub encounter: EncounterRecord,
    /// Disclosed attributes, retained verbatim for audit
    pub credential_attrs: FlatAttributes,
    /// Payout computed at creation
    pub preview: PayoutPreview,
}

impl Claim {
    /// Creates a claim in the `Received` status
    pub fn received(
        claim_id: ClaimNumber,
        insured_id: InsuredId,
        policy_id: PolicyId,
        encounter: EncounterRecord,
        credential_attrs: FlatAttributes,
        preview: PayoutPreview,
    ) -> Self {
        let now = Utc::now();

        Self {
            claim_id,
            insured_id,
            policy_id,
            status: ClaimStatus::Received,
            created_at: now,
            updated_at: now,
            encounter,
            credential_attrs,
            preview,
        }
    }

    /// Encounter id used for deduplication, if disclosed
    pub fn encounter_id(&self) -> Option<&EncounterId> {
        self.encounter.encounter_id.as_ref()
    }
}
