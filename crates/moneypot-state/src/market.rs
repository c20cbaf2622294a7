//! The pot/attempt lifecycle state machine.
//!
//! Every mutating operation follows the same shape: check preconditions in
//! order, build the updated records and the transfer batch, hand the batch to
//! the custodian, then write the records and append the event. Nothing is
//! written before the custodian accepts the batch, and nothing after it can
//! fail, so an operation either commits entirely or leaves no trace.

use std::sync::Arc;

use moneypot_core::escrow;
use moneypot_core::{
    difficulty_for, AccessControl, AccountId, AssetType, Attempt, AttemptId, Event, EventKind,
    EventLog, MarketConfig, MarketError, Pot, PotId, PotParams, Result, Role, Timestamp,
    Transfer, ATTEMPT_WINDOW_SECS,
};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::custody::{Custodian, InMemoryCustodian};
use crate::registry::Registry;
use crate::subscription::EventBus;

/// One authoritative market: configuration, registry, custody and clock.
///
/// Methods take `&mut self`, so operations against a market are serialized by
/// ownership. Share one across tasks behind a lock.
pub struct Market<C: Custodian = InMemoryCustodian> {
    config: MarketConfig,
    access: AccessControl,
    registry: Registry,
    custodian: C,
    clock: Arc<dyn Clock>,
    bus: EventBus,
}

impl<C: Custodian> Market<C> {
    /// Create a market over `custodian`.
    pub fn new(config: MarketConfig, custodian: C, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        info!(
            oracle = %config.oracle,
            platform = %config.platform,
            custody = %config.custody,
            "market initialized"
        );
        Ok(Self {
            access: AccessControl::new(config.oracle.clone(), config.custody.clone()),
            config,
            registry: Registry::new(),
            custodian,
            clock,
            bus: EventBus::default(),
        })
    }

    /// The market configuration.
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Read access to the custodian.
    pub fn custodian(&self) -> &C {
        &self.custodian
    }

    /// The bus committed events are published on.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Current logical time.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Fund a new pot from `creator`.
    pub fn create_pot(&mut self, creator: &AccountId, params: PotParams) -> Result<PotId> {
        let now = self.clock.now();
        params
            .validate()
            .and_then(|()| self.access.require_participant(creator, Role::Creator))
            .inspect_err(|e| warn!(%creator, error = %e, "pot creation rejected"))?;

        let deposit = escrow::deposit(&self.config, creator, &params.asset_type, params.amount);
        let creator = creator.clone();

        let pot_id = self.commit(&[deposit], |registry| {
            let id = registry.allocate_pot_id();
            registry.put_pot(Pot {
                id,
                creator: creator.clone(),
                total_value: params.amount,
                fee: params.fee,
                created_at: now,
                expires_at: now.saturating_add(params.duration),
                is_active: true,
                attempts_count: 0,
                unique_tag: params.unique_tag,
                asset_type: params.asset_type,
            });
            (id, Event::new(EventKind::Created, id, now, creator.clone()))
        })?;

        info!(pot_id, %creator, amount = params.amount, fee = params.fee, "pot created");
        Ok(pot_id)
    }

    /// Pay the fee and register an attempt on `pot_id`.
    pub fn attempt_pot(&mut self, hunter: &AccountId, pot_id: PotId) -> Result<AttemptId> {
        let now = self.clock.now();
        let (updated, fee) = self
            .check_attempt(hunter, pot_id, now)
            .inspect_err(|e| warn!(pot_id, %hunter, error = %e, "attempt rejected"))?;

        let total_value = updated.total_value;
        let difficulty = difficulty_for(updated.attempts_count);
        let hunter = hunter.clone();

        let attempt_id = self.commit(&[fee], |registry| {
            let id = registry.allocate_attempt_id();
            registry.put_pot(updated);
            registry.put_attempt(Attempt {
                id,
                pot_id,
                hunter: hunter.clone(),
                expires_at: now.saturating_add(ATTEMPT_WINDOW_SECS),
                difficulty,
                is_completed: false,
            });
            (id, Event::new(EventKind::Attempted, id, now, hunter.clone()))
        })?;

        info!(pot_id, attempt_id, %hunter, difficulty, total_value, "attempt registered");
        Ok(attempt_id)
    }

    /// Record the oracle's verdict on an attempt, paying out on success.
    pub fn report_attempt_outcome(
        &mut self,
        oracle: &AccountId,
        attempt_id: AttemptId,
        succeeded: bool,
    ) -> Result<()> {
        let now = self.clock.now();
        let (attempt, pot) = self
            .check_report(oracle, attempt_id, now)
            .inspect_err(|e| warn!(attempt_id, %oracle, error = %e, "report rejected"))?;

        let pot_id = pot.id;
        let mut completed = attempt;
        completed.is_completed = true;

        if !succeeded {
            self.commit(&[], |registry| {
                registry.put_attempt(completed);
                ((), Event::new(EventKind::Failed, attempt_id, now, oracle.clone()))
            })?;
            info!(pot_id, attempt_id, "attempt failed");
            return Ok(());
        }

        let (split, transfers) = escrow::payout(&self.config, &completed.hunter, &pot);
        let mut solved = pot;
        solved.is_active = false;

        self.commit(&transfers, |registry| {
            registry.put_attempt(completed);
            registry.put_pot(solved);
            ((), Event::new(EventKind::Solved, pot_id, now, oracle.clone()))
        })?;

        info!(
            pot_id,
            attempt_id,
            hunter_share = split.hunter_share,
            platform_share = split.platform_share,
            "pot solved"
        );
        Ok(())
    }

    /// Return an expired pot's full value to its creator.
    pub fn expire_pot(&mut self, caller: &AccountId, pot_id: PotId) -> Result<()> {
        let now = self.clock.now();
        let pot = self
            .check_expire(caller, pot_id, now)
            .inspect_err(|e| warn!(pot_id, %caller, error = %e, "expiry rejected"))?;

        let refund = escrow::refund(&self.config, &pot);
        let amount = refund.amount;
        let mut expired = pot;
        expired.is_active = false;

        self.commit(&[refund], |registry| {
            registry.put_pot(expired);
            ((), Event::new(EventKind::Expired, pot_id, now, caller.clone()))
        })?;

        info!(pot_id, refund = amount, "pot expired");
        Ok(())
    }

    /// Get a copy of a pot.
    pub fn get_pot(&self, id: PotId) -> Result<Pot> {
        self.registry.get_pot(id)
    }

    /// Get a copy of an attempt.
    pub fn get_attempt(&self, id: AttemptId) -> Result<Attempt> {
        self.registry.get_attempt(id)
    }

    /// Ids of every pot.
    pub fn list_pot_ids(&self) -> Vec<PotId> {
        self.registry.list_pot_ids()
    }

    /// Ids of pots still open or awaiting expiry.
    pub fn list_active_pot_ids(&self) -> Vec<PotId> {
        self.registry.list_active_pot_ids()
    }

    /// Ids of active pots whose creator could expire them now.
    pub fn list_expirable_pot_ids(&self) -> Vec<PotId> {
        self.registry.list_expirable_pot_ids(self.clock.now())
    }

    /// The committed event log.
    pub fn events(&self) -> &EventLog {
        self.registry.events()
    }

    /// Balance held by `account` according to the custodian.
    pub fn balance_of(&self, account: &AccountId, asset: &AssetType) -> u64 {
        self.custodian.balance_of(account, asset)
    }

    /// Value of `asset` the registry says is escrowed in active pots.
    pub fn escrowed_total(&self, asset: &AssetType) -> u128 {
        self.registry.escrowed_total(asset)
    }

    fn check_attempt(
        &self,
        hunter: &AccountId,
        pot_id: PotId,
        now: Timestamp,
    ) -> Result<(Pot, Transfer)> {
        let pot = self.registry.pot(pot_id)?;
        pot.ensure_open(now)?;
        self.access.require_hunter(hunter, pot)?;

        let available = self.custodian.balance_of(hunter, &pot.asset_type);
        if available < pot.fee {
            return Err(MarketError::InsufficientFunds {
                account: hunter.clone(),
                asset: pot.asset_type.clone(),
                required: pot.fee,
                available,
            });
        }

        let mut updated = pot.clone();
        updated.total_value = pot
            .total_value
            .checked_add(pot.fee)
            .ok_or_else(|| MarketError::Overflow(format!("total value of pot {pot_id}")))?;
        updated.attempts_count = pot
            .attempts_count
            .checked_add(1)
            .ok_or_else(|| MarketError::Overflow(format!("attempt count of pot {pot_id}")))?;

        Ok((updated, escrow::entry_fee(&self.config, hunter, pot)))
    }

    fn check_report(
        &self,
        oracle: &AccountId,
        attempt_id: AttemptId,
        now: Timestamp,
    ) -> Result<(Attempt, Pot)> {
        self.access.require_oracle(oracle)?;

        let attempt = self.registry.attempt(attempt_id)?;
        let pot = self.registry.pot(attempt.pot_id)?;
        pot.ensure_open(now)?;

        if attempt.is_expired_at(now) {
            return Err(MarketError::AttemptExpired {
                attempt_id,
                expires_at: attempt.expires_at,
            });
        }
        if attempt.is_completed {
            return Err(MarketError::AttemptAlreadyCompleted { attempt_id });
        }

        Ok((attempt.clone(), pot.clone()))
    }

    fn check_expire(&self, caller: &AccountId, pot_id: PotId, now: Timestamp) -> Result<Pot> {
        let pot = self.registry.pot(pot_id)?;
        if !pot.is_active {
            return Err(MarketError::PotNotActive { pot_id });
        }
        if !pot.is_expired_at(now) {
            return Err(MarketError::NotYetExpired {
                pot_id,
                expires_at: pot.expires_at,
            });
        }
        self.access.require_creator(caller, pot)?;
        Ok(pot.clone())
    }

    /// Apply `transfers` atomically, then run `apply` against the registry and
    /// append the event it returns. `apply` must not fail.
    fn commit<T>(
        &mut self,
        transfers: &[Transfer],
        apply: impl FnOnce(&mut Registry) -> (T, Event),
    ) -> Result<T> {
        if !transfers.is_empty() {
            debug!(?transfers, "applying transfer batch");
            self.custodian.transfer_all(transfers)?;
        }

        let (output, event) = apply(&mut self.registry);
        let event = self.registry.append_event(event);
        self.bus.publish(&event);
        Ok(output)
    }
}
