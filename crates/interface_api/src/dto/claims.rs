//! Claims DTOs

use serde::{Deserialize, Serialize};

use domain_claims::{Claim, PayoutPreview};

/// Query string of `GET /claims`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClaimsQuery {
    pub insured_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClaimListResponse {
    pub ok: bool,
    pub claims: Vec<Claim>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub ok: bool,
    pub claim: Claim,
}

/// Payout preview for a raw attribute mapping
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub preview: PayoutPreview,
}

/// Acknowledgment returned for every webhook delivery
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
}
