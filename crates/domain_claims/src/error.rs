//! Claims domain errors

use thiserror::Error;

/// Errors that can occur in the claims domain
///
/// Adapter failures stay as `core_kernel::PortError`; this type only covers
/// proof data that cannot be turned into a claim.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Insufficient proof data: {0}")]
    InsufficientProofData(String),
}
