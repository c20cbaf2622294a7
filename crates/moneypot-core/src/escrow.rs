//! Escrow accounting: payout splits and transfer plans.
//!
//! Every lifecycle operation that moves value describes the movement as a
//! list of [`Transfer`]s which the custodian applies as one batch.

use serde::{Deserialize, Serialize};

use crate::config::{MarketConfig, HUNTER_PAYOUT_PERCENT};
use crate::pot::Pot;
use crate::types::{AccountId, AssetType};

/// A single movement of value between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: AccountId,
    pub to: AccountId,
    pub asset: AssetType,
    pub amount: u64,
}

impl Transfer {
    /// Create a transfer.
    pub fn new(from: AccountId, to: AccountId, asset: AssetType, amount: u64) -> Self {
        Self {
            from,
            to,
            asset,
            amount,
        }
    }

    /// The transfer that undoes this one.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            asset: self.asset.clone(),
            amount: self.amount,
        }
    }
}

/// Division of a solved pot between hunter and platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutSplit {
    pub hunter_share: u64,
    pub platform_share: u64,
}

impl PayoutSplit {
    /// Split `total_value`. The platform receives the remainder so the two
    /// shares always sum to `total_value`.
    pub fn compute(total_value: u64) -> Self {
        let hunter_share =
            (u128::from(total_value) * u128::from(HUNTER_PAYOUT_PERCENT) / 100) as u64;
        Self {
            hunter_share,
            platform_share: total_value - hunter_share,
        }
    }

    /// Sum of both shares.
    pub fn total(&self) -> u64 {
        self.hunter_share + self.platform_share
    }
}

/// Transfer moving a creator's deposit into custody.
pub fn deposit(
    config: &MarketConfig,
    creator: &AccountId,
    asset: &AssetType,
    amount: u64,
) -> Transfer {
    Transfer::new(creator.clone(), config.custody.clone(), asset.clone(), amount)
}

/// Transfer moving an attempt fee into custody.
pub fn entry_fee(config: &MarketConfig, hunter: &AccountId, pot: &Pot) -> Transfer {
    Transfer::new(
        hunter.clone(),
        config.custody.clone(),
        pot.asset_type.clone(),
        pot.fee,
    )
}

/// Transfers paying out a solved pot.
pub fn payout(
    config: &MarketConfig,
    hunter: &AccountId,
    pot: &Pot,
) -> (PayoutSplit, Vec<Transfer>) {
    let split = PayoutSplit::compute(pot.total_value);
    let transfers = vec![
        Transfer::new(
            config.custody.clone(),
            hunter.clone(),
            pot.asset_type.clone(),
            split.hunter_share,
        ),
        Transfer::new(
            config.custody.clone(),
            config.platform.clone(),
            pot.asset_type.clone(),
            split.platform_share,
        ),
    ];
    (split, transfers)
}

/// Transfer returning an expired pot to its creator.
pub fn refund(config: &MarketConfig, pot: &Pot) -> Transfer {
    Transfer::new(
        config.custody.clone(),
        pot.creator.clone(),
        pot.asset_type.clone(),
        pot.total_value,
    )
}
