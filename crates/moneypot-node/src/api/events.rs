//! Event log and balance reads.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use moneypot_core::{AccountId, AssetType, Event};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// First sequence number to return.
    #[serde(default)]
    pub since: u64,
}

/// A page of the event log and the digest of the whole log.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
    pub digest: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: u64,
}

/// Read committed events.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<EventsResponse> {
    let market = state.market.read().await;
    let log = market.events();

    Json(EventsResponse {
        events: log.since(query.since).to_vec(),
        digest: log.digest(),
    })
}

/// Read an account's custodial balance.
pub async fn get_balance(
    State(state): State<AppState>,
    Path((account, asset)): Path<(String, String)>,
) -> Json<BalanceResponse> {
    let balance = state
        .market
        .read()
        .await
        .balance_of(&AccountId::new(account), &AssetType::new(asset));
    Json(BalanceResponse { balance })
}
