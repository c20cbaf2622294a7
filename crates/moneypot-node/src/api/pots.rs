//! Pot endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use moneypot_core::{AttemptId, Pot, PotId, PotParams};
use serde::{Deserialize, Serialize};

use super::{ApiResult, Caller};
use crate::state::AppState;

/// Request to create a pot.
#[derive(Debug, Deserialize)]
pub struct CreatePotRequest {
    pub amount: u64,

    /// Seconds until the creator may reclaim the pot.
    pub duration: u64,

    /// Fee each attempt pays into the pot.
    pub fee: u64,

    #[serde(default)]
    pub unique_tag: String,

    pub asset_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePotResponse {
    pub pot_id: PotId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttemptPotResponse {
    pub attempt_id: AttemptId,
}

/// Filters for listing pots.
#[derive(Debug, Default, Deserialize)]
pub struct ListPotsQuery {
    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub expirable: bool,
}

/// Create a pot funded by the caller.
pub async fn create_pot(
    State(state): State<AppState>,
    Caller(creator): Caller,
    Json(req): Json<CreatePotRequest>,
) -> ApiResult<(StatusCode, Json<CreatePotResponse>)> {
    let params = PotParams::new(req.amount, req.duration, req.fee, req.asset_type)
        .tag(req.unique_tag);

    let pot_id = state.market.write().await.create_pot(&creator, params)?;

    Ok((StatusCode::CREATED, Json(CreatePotResponse { pot_id })))
}

/// List pot ids.
pub async fn list_pots(
    State(state): State<AppState>,
    Query(query): Query<ListPotsQuery>,
) -> Json<Vec<PotId>> {
    let market = state.market.read().await;

    let ids = if query.expirable {
        market.list_expirable_pot_ids()
    } else if query.active {
        market.list_active_pot_ids()
    } else {
        market.list_pot_ids()
    };

    Json(ids)
}

/// Get a pot by id.
pub async fn get_pot(State(state): State<AppState>, Path(id): Path<PotId>) -> ApiResult<Json<Pot>> {
    let pot = state.market.read().await.get_pot(id)?;
    Ok(Json(pot))
}

/// Pay the fee and register an attempt as the caller.
pub async fn attempt_pot(
    State(state): State<AppState>,
    Caller(hunter): Caller,
    Path(id): Path<PotId>,
) -> ApiResult<(StatusCode, Json<AttemptPotResponse>)> {
    let attempt_id = state.market.write().await.attempt_pot(&hunter, id)?;
    Ok((StatusCode::CREATED, Json(AttemptPotResponse { attempt_id })))
}

/// Reclaim an expired pot as its creator.
pub async fn expire_pot(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<PotId>,
) -> ApiResult<StatusCode> {
    state.market.write().await.expire_pot(&caller, id)?;
    Ok(StatusCode::NO_CONTENT)
}
