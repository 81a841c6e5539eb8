//! Claims Domain Ports
//!
//! Port interfaces the adjudication pipeline depends on:
//!
//! - [`ProtocolEnginePort`]: the external credential-exchange engine, used to
//!   trigger verification and to fetch full exchange records
//! - [`ClaimStorePort`]: the owner of the canonical claim collection
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_claims::{InMemoryClaimStore, PayoutEngine, WebhookEventHandler};
//! use infra_agent::AgentClient;
//! use std::sync::Arc;
//!
//! let engine = Arc::new(AgentClient::new(agent_config)?);
//! let store = Arc::new(InMemoryClaimStore::new(PayoutEngine::default()));
//! let handler = WebhookEventHandler::new(engine, store, default_policy);
//! ```

use async_trait::async_trait;
use serde::Deserialize;

use core_kernel::{
    ClaimNumber, DomainPort, ExchangeId, HealthCheckable, InsuredId, PolicyId, PortError,
};

use crate::attributes::{ExchangeRecord, FlatAttributes, VerifiedFlag};
use crate::claim::Claim;

/// Result of asking the engine to verify a received presentation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VerificationTrigger {
    /// Exchange state after the call, when reported
    #[serde(default)]
    pub state: Option<String>,
    /// Verification outcome, when the engine reports it synchronously
    #[serde(default)]
    pub verified: VerifiedFlag,
}

/// The external protocol engine
#[async_trait]
pub trait ProtocolEnginePort: DomainPort + HealthCheckable {
    /// Asks the engine to verify the presentation of an exchange
    async fn verify_presentation(&self, exchange_id: &ExchangeId) -> Result<VerificationTrigger, PortError>;

    /// Fetches the full exchange record
    async fn get_exchange_record(&self, exchange_id: &ExchangeId) -> Result<ExchangeRecord, PortError>;
}

/// Input to [`ClaimStorePort::create_if_absent`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClaim {
    pub credential_attrs: FlatAttributes,
    pub insured_id: InsuredId,
    pub policy_id: PolicyId,
}

/// What `create_if_absent` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimCreation {
    /// A new claim was stored
    Created(Claim),
    /// A claim for the same encounter already existed and is returned unchanged
    Existing(Claim),
}

impl ClaimCreation {
    pub fn claim(&self) -> &Claim {
        match self {
            ClaimCreation::Created(claim) | ClaimCreation::Existing(claim) => claim,
        }
    }

    pub fn into_claim(self) -> Claim {
        match self {
            ClaimCreation::Created(claim) | ClaimCreation::Existing(claim) => claim,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, ClaimCreation::Created(_))
    }
}

/// Owner of the claim collection and its sequence counter
///
/// `create_if_absent` is the only mutating operation. Implementations must
/// serialize the check-and-insert for an encounter id so that concurrent
/// callers for the same encounter observe exactly one stored claim.
#[async_trait]
pub trait ClaimStorePort: DomainPort {
    /// Maps the encounter, evaluates payout and stores a claim unless one
    /// already exists for the same encounter id
    async fn create_if_absent(&self, request: NewClaim) -> Result<ClaimCreation, PortError>;

    /// Gets a claim by its number
    async fn get(&self, claim_id: &ClaimNumber) -> Result<Claim, PortError>;

    /// Lists claims in creation order, optionally for one insured party
    async fn list(&self, insured_id: Option<&InsuredId>) -> Result<Vec<Claim>, PortError>;
}
