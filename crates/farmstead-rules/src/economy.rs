//! Coins, experience and levels.
//!
//! All balance changes go through checked helpers here so that neither
//! engine can underflow a balance or silently wrap a counter.

use farmstead_types::{CropKind, Rarity};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::catalog;
use crate::error::DomainError;

/// Experience needed per level.
pub const EXPERIENCE_PER_LEVEL: u64 = 100;

/// Coins granted per native currency unit on the remote ledger.
pub const DEFAULT_COINS_PER_NATIVE_UNIT: u64 = 50;

/// Experience awarded for harvesting a crop of the given rarity.
pub const fn experience_for(rarity: Rarity) -> u64 {
    match rarity {
        Rarity::Legendary => 50,
        Rarity::Epic => 25,
        Rarity::Rare => 15,
        Rarity::Common => 10,
    }
}

/// Level for an experience total: `floor(experience / 100) + 1`.
pub fn level_for(experience: u64) -> Result<u32, DomainError> {
    let completed = experience
        .checked_div(EXPERIENCE_PER_LEVEL)
        .ok_or_else(|| DomainError::overflow("level division"))?;
    let level = completed
        .checked_add(1)
        .ok_or_else(|| DomainError::overflow("level increment"))?;
    u32::try_from(level).map_err(|e| DomainError::overflow(format!("level out of range: {e}")))
}

/// Total price of `quantity` seeds of `kind`.
pub fn seed_cost(kind: CropKind, quantity: u32) -> Result<u64, DomainError> {
    catalog::crop(kind)
        .buy_price
        .checked_mul(u64::from(quantity))
        .ok_or_else(|| DomainError::overflow("seed cost"))
}

/// Total sale value of `quantity` harvested units of `kind`.
pub fn sale_value(kind: CropKind, quantity: u32) -> Result<u64, DomainError> {
    catalog::crop(kind)
        .sell_price
        .checked_mul(u64::from(quantity))
        .ok_or_else(|| DomainError::overflow("sale value"))
}

/// Remove `cost` coins from `balance`, rejecting if the balance is short.
pub fn debit(balance: u64, cost: u64) -> Result<u64, DomainError> {
    balance
        .checked_sub(cost)
        .ok_or_else(|| DomainError::InsufficientResource {
            resource: "coins".to_owned(),
            required: cost,
            available: balance,
        })
}

/// Add `amount` coins to `balance`.
pub fn credit(balance: u64, amount: u64) -> Result<u64, DomainError> {
    balance
        .checked_add(amount)
        .ok_or_else(|| DomainError::overflow("coin balance"))
}

/// Coins bought with a native currency payment: `floor(payment * rate)`.
///
/// The payment must be positive.
pub fn coins_for_payment(payment: Decimal, coins_per_unit: u64) -> Result<u64, DomainError> {
    if payment <= Decimal::ZERO {
        return Err(DomainError::invalid_state("payment must be positive"));
    }
    payment
        .checked_mul(Decimal::from(coins_per_unit))
        .map(|coins| coins.floor())
        .and_then(|coins| coins.to_u64())
        .ok_or_else(|| DomainError::overflow("coin purchase"))
}
