//! In-memory claim store
//!
//! Claims live in insertion order inside a single `RwLock`-guarded struct,
//! together with two indexes: claim number to position, and encounter id to
//! position. The encounter index is checked and updated under the same write
//! guard as the insert, which makes `create_if_absent` atomic per encounter.
//!
//! Encounter mapping and payout evaluation run before the lock is taken.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{ClaimNumber, DomainPort, EncounterId, InsuredId, PortError};

use crate::claim::Claim;
use crate::encounter::EncounterRecord;
use crate::payout::PayoutEngine;
use crate::ports::{ClaimCreation, ClaimStorePort, NewClaim};

#[derive(Debug, Default)]
struct StoreState {
    claims: Vec<Claim>,
    by_number: HashMap<ClaimNumber, usize>,
    by_encounter: HashMap<EncounterId, usize>,
    last_sequence: u64,
}

/// Claim store backed by process memory
#[derive(Debug)]
pub struct InMemoryClaimStore {
    payout: PayoutEngine,
    state: RwLock<StoreState>,
}

impl InMemoryClaimStore {
    /// Creates an empty store that evaluates payouts with `payout`
    pub fn new(payout: PayoutEngine) -> Self {
        Self {
            payout,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Number of stored claims
    pub async fn len(&self) -> usize {
        self.state.read().await.claims.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryClaimStore {
    fn default() -> Self {
        Self::new(PayoutEngine::default())
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl ClaimStorePort for InMemoryClaimStore {
    async fn create_if_absent(&self, request: NewClaim) -> Result<ClaimCreation, PortError> {
        let encounter = EncounterRecord::from_attributes(&request.credential_attrs);
        let preview = self.payout.evaluate(&encounter);

        let mut state = self.state.write().await;

        if let Some(encounter_id) = encounter.encounter_id.as_ref() {
            if let Some(&index) = state.by_encounter.get(encounter_id) {
                let existing = state.claims[index].clone();
                debug!(
                    claim_id = %existing.claim_id,
                    encounter_id = %encounter_id,
                    "claim already exists for encounter"
                );
                return Ok(ClaimCreation::Existing(existing));
            }
        }

        let sequence = state
            .last_sequence
            .checked_add(1)
            .ok_or_else(|| PortError::internal("claim sequence exhausted"))?;
        let claim_id = ClaimNumber::from_sequence(sequence);

        let claim = Claim::received(
            claim_id,
            request.insured_id,
            request.policy_id,
            encounter,
            request.credential_attrs,
            preview,
        );

        let index = state.claims.len();
        state.last_sequence = sequence;
        state.by_number.insert(claim_id, index);
        if let Some(encounter_id) = claim.encounter_id() {
            state.by_encounter.insert(encounter_id.clone(), index);
        }
        state.claims.push(claim.clone());

        debug!(
            claim_id = %claim.claim_id,
            insured_id = %claim.insured_id,
            total_payout = claim.preview.total_payout,
            "claim stored"
        );

        Ok(ClaimCreation::Created(claim))
    }

    async fn get(&self, claim_id: &ClaimNumber) -> Result<Claim, PortError> {
        let state = self.state.read().await;
        state
            .by_number
            .get(claim_id)
            .map(|&index| state.claims[index].clone())
            .ok_or_else(|| PortError::not_found("Claim", claim_id))
    }

    async fn list(&self, insured_id: Option<&InsuredId>) -> Result<Vec<Claim>, PortError> {
        let state = self.state.read().await;
        Ok(state
            .claims
            .iter()
            .filter(|claim| insured_id.map_or(true, |id| &claim.insured_id == id))
            .cloned()
            .collect())
    }
}
