//! Custom Test Assertions
//!
//! Provides assertion helpers for claims that give more meaningful failure
//! messages than bare `assert_eq!`.

use domain_claims::{Claim, ClaimStatus, PayoutPreview};

/// Asserts that at most one claim exists per encounter id
///
/// # Panics
///
/// Panics naming the first encounter id that appears twice
pub fn assert_unique_encounters(claims: &[Claim]) {
    let mut seen = std::collections::HashSet::new();
    for claim in claims {
        if let Some(encounter_id) = claim.encounter_id() {
            assert!(
                seen.insert(encounter_id.clone()),
                "Encounter {} has more than one claim",
                encounter_id
            );
        }
    }
}

/// Asserts that a preview pays `expected` and is consistent with it
pub fn assert_payout(preview: &PayoutPreview, expected: u64) {
    assert_eq!(
        preview.total_payout, expected,
        "Unexpected total payout; breakdown: {:?}",
        preview.breakdown
    );
    assert_eq!(
        preview.eligible,
        expected > 0,
        "Eligibility must follow the total payout"
    );
}

/// Asserts that claim numbers strictly increase in list order
pub fn assert_increasing_claim_numbers(claims: &[Claim]) {
    for pair in claims.windows(2) {
        assert!(
            pair[0].claim_id < pair[1].claim_id,
            "Claim numbers out of order: {} then {}",
            pair[0].claim_id,
            pair[1].claim_id
        );
    }
}

/// Asserts the invariants every freshly created claim satisfies
pub fn assert_freshly_received(claim: &Claim) {
    assert_eq!(claim.status, ClaimStatus::Received);
    assert_eq!(claim.created_at, claim.updated_at);
    assert_eq!(claim.preview.eligible, claim.preview.total_payout > 0);
}
