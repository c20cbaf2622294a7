//! Asset custody: the ledger of balances the market moves value through.

use std::collections::HashMap;

use moneypot_core::{AccountId, AssetType, MarketError, Result, Transfer};
use tracing::error;

/// Holds and moves value between named accounts.
pub trait Custodian: Send + Sync {
    /// Balance of `asset` held by `account`.
    fn balance_of(&self, account: &AccountId, asset: &AssetType) -> u64;

    /// Move `amount` of `asset` from one account to another.
    ///
    /// Fails with [`MarketError::InsufficientFunds`] when `from` cannot cover
    /// the amount, leaving both balances untouched.
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        asset: &AssetType,
        amount: u64,
    ) -> Result<()>;

    /// Apply a batch of transfers all-or-nothing.
    ///
    /// The default applies the legs in order and, if one fails, reverses the
    /// legs already applied before returning the error.
    fn transfer_all(&mut self, transfers: &[Transfer]) -> Result<()> {
        for (applied, t) in transfers.iter().enumerate() {
            if let Err(err) = self.transfer(&t.from, &t.to, &t.asset, t.amount) {
                for done in transfers[..applied].iter().rev() {
                    let undo = done.reversed();
                    if let Err(undo_err) =
                        self.transfer(&undo.from, &undo.to, &undo.asset, undo.amount)
                    {
                        error!(?undo, %undo_err, "failed to reverse transfer leg");
                        return Err(MarketError::Transfer(format!(
                            "batch failed ({err}) and could not be reversed: {undo_err}"
                        )));
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

/// In-memory implementation of [`Custodian`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustodian {
    balances: HashMap<(AccountId, AssetType), u64>,
}

impl InMemoryCustodian {
    /// Create an empty custodian.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `account` from outside the ledger. Used to seed
    /// balances that exist before the market starts.
    pub fn credit(&mut self, account: &AccountId, asset: &AssetType, amount: u64) -> Result<()> {
        let balance = self
            .balances
            .entry((account.clone(), asset.clone()))
            .or_insert(0);
        *balance = balance.checked_add(amount).ok_or_else(|| {
            MarketError::Overflow(format!("balance of {account} in {asset}"))
        })?;
        Ok(())
    }

    /// Builder-style [`credit`](Self::credit).
    pub fn with_balance(
        mut self,
        account: impl Into<AccountId>,
        asset: impl Into<AssetType>,
        amount: u64,
    ) -> Result<Self> {
        self.credit(&account.into(), &asset.into(), amount)?;
        Ok(self)
    }

    /// Sum of all balances of `asset`.
    pub fn total_supply(&self, asset: &AssetType) -> u128 {
        self.balances
            .iter()
            .filter(|((_, a), _)| a == asset)
            .map(|(_, amount)| u128::from(*amount))
            .sum()
    }

    fn apply(
        balances: &mut HashMap<(AccountId, AssetType), u64>,
        transfer: &Transfer,
    ) -> Result<()> {
        let from_key = (transfer.from.clone(), transfer.asset.clone());
        let available = balances.get(&from_key).copied().unwrap_or(0);
        if available < transfer.amount {
            return Err(MarketError::InsufficientFunds {
                account: transfer.from.clone(),
                asset: transfer.asset.clone(),
                required: transfer.amount,
                available,
            });
        }
        if transfer.amount == 0 || transfer.from == transfer.to {
            return Ok(());
        }

        let to_key = (transfer.to.clone(), transfer.asset.clone());
        let to_balance = balances.get(&to_key).copied().unwrap_or(0);
        let credited = to_balance.checked_add(transfer.amount).ok_or_else(|| {
            MarketError::Overflow(format!("balance of {} in {}", transfer.to, transfer.asset))
        })?;

        balances.insert(from_key, available - transfer.amount);
        balances.insert(to_key, credited);
        Ok(())
    }
}

impl Custodian for InMemoryCustodian {
    fn balance_of(&self, account: &AccountId, asset: &AssetType) -> u64 {
        self.balances
            .get(&(account.clone(), asset.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        asset: &AssetType,
        amount: u64,
    ) -> Result<()> {
        let transfer = Transfer::new(from.clone(), to.clone(), asset.clone(), amount);
        Self::apply(&mut self.balances, &transfer)
    }

    /// Stages the whole batch on the touched balances and writes only if
    /// every leg succeeds.
    fn transfer_all(&mut self, transfers: &[Transfer]) -> Result<()> {
        let mut staged: HashMap<(AccountId, AssetType), u64> = HashMap::new();
        for t in transfers {
            for account in [&t.from, &t.to] {
                let key = (account.clone(), t.asset.clone());
                let balance = self.balances.get(&key).copied().unwrap_or(0);
                staged.entry(key).or_insert(balance);
            }
        }

        for t in transfers {
            Self::apply(&mut staged, t)?;
        }

        self.balances.extend(staged);
        Ok(())
    }
}
