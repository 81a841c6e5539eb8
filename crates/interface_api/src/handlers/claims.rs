//! Claims handlers

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};

use core_kernel::{ClaimNumber, InsuredId};
use domain_claims::{EncounterRecord, FlatAttributes};

use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Lists claims, optionally for one insured
pub async fn list_claims(
    State(state): State<AppState>,
    Query(query): Query<ListClaimsQuery>,
) -> Result<Json<ClaimListResponse>, ApiError> {
    let insured = match query.insured_id {
        Some(raw) => Some(
            InsuredId::non_blank(&raw)
                .ok_or_else(|| ApiError::BadRequest("insuredId must not be empty".to_string()))?,
        ),
        None => None,
    };

    let claims = state.store.list(insured.as_ref()).await?;
    Ok(Json(ClaimListResponse { ok: true, claims }))
}

/// Gets a claim by its number
pub async fn get_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let number: ClaimNumber = claim_id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Claim {claim_id} not found")))?;

    let claim = state.store.get(&number).await.map_err(|e| {
        if e.is_not_found() {
            ApiError::NotFound(format!("Claim {claim_id} not found"))
        } else {
            e.into()
        }
    })?;

    Ok(Json(ClaimResponse { ok: true, claim }))
}

/// Computes the payout for a raw attribute mapping without storing anything
pub async fn preview_payout(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PreviewResponse>, ApiError> {
    let attrs: FlatAttributes = serde_json::from_slice(&body).map_err(|e| {
        ApiError::Validation(format!("expected a JSON object of string attributes: {e}"))
    })?;

    let encounter = EncounterRecord::from_attributes(&attrs);
    let preview = state.payout.evaluate(&encounter);

    Ok(Json(PreviewResponse {
        ok: true,
        preview,
    }))
}
