//! Attempt endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use moneypot_core::{Attempt, AttemptId};
use serde::Deserialize;

use super::{ApiResult, Caller};
use crate::state::AppState;

/// The oracle's verdict on an attempt.
#[derive(Debug, Deserialize)]
pub struct OutcomeRequest {
    pub succeeded: bool,
}

/// Get an attempt by id.
pub async fn get_attempt(
    State(state): State<AppState>,
    Path(id): Path<AttemptId>,
) -> ApiResult<Json<Attempt>> {
    let attempt = state.market.read().await.get_attempt(id)?;
    Ok(Json(attempt))
}

/// Report an attempt's outcome. Only the configured oracle may call this.
pub async fn report_outcome(
    State(state): State<AppState>,
    Caller(oracle): Caller,
    Path(id): Path<AttemptId>,
    Json(req): Json<OutcomeRequest>,
) -> ApiResult<StatusCode> {
    state
        .market
        .write()
        .await
        .report_attempt_outcome(&oracle, id, req.succeeded)?;
    Ok(StatusCode::NO_CONTENT)
}
