//! The registry: id counters, the pot and attempt tables, and the event log.
//!
//! Only [`Market`](crate::Market) writes to a registry. Readers get owned
//! copies, never references into the tables.

use std::collections::BTreeMap;

use moneypot_core::{
    AssetType, Attempt, AttemptId, Event, EventLog, MarketError, Pot, PotId, Result, Timestamp,
};

/// Sole storage for pots, attempts and events.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Id the next pot will receive.
    next_pot_id: PotId,

    /// Id the next attempt will receive.
    next_attempt_id: AttemptId,

    /// Pots indexed by id.
    pots: BTreeMap<PotId, Pot>,

    /// Attempts indexed by id.
    attempts: BTreeMap<AttemptId, Attempt>,

    /// Committed transitions.
    events: EventLog,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next pot id and advance the counter.
    pub fn allocate_pot_id(&mut self) -> PotId {
        let id = self.next_pot_id;
        self.next_pot_id += 1;
        id
    }

    /// Return the next attempt id and advance the counter.
    pub fn allocate_attempt_id(&mut self) -> AttemptId {
        let id = self.next_attempt_id;
        self.next_attempt_id += 1;
        id
    }

    /// Get a copy of a pot.
    pub fn get_pot(&self, id: PotId) -> Result<Pot> {
        self.pot(id).cloned()
    }

    /// Get a copy of an attempt.
    pub fn get_attempt(&self, id: AttemptId) -> Result<Attempt> {
        self.attempt(id).cloned()
    }

    /// Ids of every pot, ascending.
    pub fn list_pot_ids(&self) -> Vec<PotId> {
        self.pots.keys().copied().collect()
    }

    /// Ids of active pots, ascending.
    pub fn list_active_pot_ids(&self) -> Vec<PotId> {
        self.pots
            .values()
            .filter(|p| p.is_active)
            .map(|p| p.id)
            .collect()
    }

    /// Ids of active pots whose expiry has passed at `now`, ascending.
    pub fn list_expirable_pot_ids(&self, now: Timestamp) -> Vec<PotId> {
        self.pots
            .values()
            .filter(|p| p.is_expirable_at(now))
            .map(|p| p.id)
            .collect()
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Sum of `total_value` over active pots escrowing `asset`.
    pub fn escrowed_total(&self, asset: &AssetType) -> u128 {
        self.pots
            .values()
            .filter(|p| p.is_active && &p.asset_type == asset)
            .map(|p| u128::from(p.total_value))
            .sum()
    }

    pub(crate) fn pot(&self, id: PotId) -> Result<&Pot> {
        self.pots.get(&id).ok_or_else(|| MarketError::pot_not_found(id))
    }

    pub(crate) fn attempt(&self, id: AttemptId) -> Result<&Attempt> {
        self.attempts
            .get(&id)
            .ok_or_else(|| MarketError::attempt_not_found(id))
    }

    /// Insert or replace a pot record.
    pub(crate) fn put_pot(&mut self, pot: Pot) {
        self.pots.insert(pot.id, pot);
    }

    /// Insert or replace an attempt record.
    pub(crate) fn put_attempt(&mut self, attempt: Attempt) {
        self.attempts.insert(attempt.id, attempt);
    }

    pub(crate) fn append_event(&mut self, event: Event) -> Event {
        self.events.append(event)
    }
}
