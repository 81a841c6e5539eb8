//! Claims Adjudication Domain
//!
//! This crate turns verified selective-disclosure proofs into auditable
//! claim records.
//!
//! # Pipeline
//!
//! ```text
//! webhook event -> fetch exchange record -> reconstruct attributes
//!               -> map encounter -> evaluate payout rules -> create-if-absent
//! ```
//!
//! The reconstruction, mapping and payout steps are pure functions. The only
//! shared mutable state is owned by a [`ClaimStorePort`] implementation.

pub mod attributes;
pub mod encounter;
pub mod payout;
pub mod claim;
pub mod event;
pub mod ports;
pub mod store;
pub mod webhook;
pub mod error;

pub use attributes::{
    reconstruct_attributes, ExchangeRecord, FlatAttributes, RevealedValue, VerifiedFlag,
};
pub use encounter::{EncounterRecord, UNKNOWN_ENCOUNTER_CLASS};
pub use payout::{PayoutEngine, PayoutPreview, PayoutRule, PayoutSchedule, RuleOutcome};
pub use claim::{Claim, ClaimStatus};
pub use event::{ProofState, Topic, VerificationEvent};
pub use ports::{ClaimCreation, ClaimStorePort, NewClaim, ProtocolEnginePort, VerificationTrigger};
pub use store::InMemoryClaimStore;
pub use webhook::{HandlerOutcome, WebhookEventHandler};
pub use error::ClaimError;
