//! Supply conservation invariant checker.
//!
//! Invariant enforced by the reference bank:
//! ```text
//! ∀ asset: Σ balances == Σ deposits - Σ withdrawals
//! ```
//!
//! Transfers (and therefore every swap operation) only move value between
//! principals. If this ever breaks, a transfer minted or burned funds.

use std::collections::{BTreeSet, HashMap};

use p2pswap_types::{AssetRef, Result, SwapError};
use rust_decimal::Decimal;

/// Tracks per-asset deposits and withdrawals since genesis.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    deposits: HashMap<AssetRef, Decimal>,
    withdrawals: HashMap<AssetRef, Decimal>,
}

impl SupplyConservation {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deposit.
    pub fn record_deposit(&mut self, asset: &AssetRef, amount: Decimal) {
        *self.deposits.entry(asset.clone()).or_insert(Decimal::ZERO) += amount;
    }

    /// Record a withdrawal.
    pub fn record_withdrawal(&mut self, asset: &AssetRef, amount: Decimal) {
        *self.withdrawals.entry(asset.clone()).or_insert(Decimal::ZERO) += amount;
    }

    /// Total deposited for an asset.
    #[must_use]
    pub fn total_deposits(&self, asset: &AssetRef) -> Decimal {
        self.deposits.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Total withdrawn for an asset.
    #[must_use]
    pub fn total_withdrawals(&self, asset: &AssetRef) -> Decimal {
        self.withdrawals.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Expected total supply for an asset: deposits - withdrawals.
    #[must_use]
    pub fn expected_supply(&self, asset: &AssetRef) -> Decimal {
        self.total_deposits(asset) - self.total_withdrawals(asset)
    }

    /// Verify that an asset's actual supply matches deposits minus withdrawals.
    ///
    /// # Errors
    /// Returns `Internal` if `actual_supply` differs from the expected supply.
    pub fn verify(&self, asset: &AssetRef, actual_supply: Decimal) -> Result<()> {
        let expected = self.expected_supply(asset);
        if actual_supply != expected {
            return Err(SwapError::Internal(format!(
                "supply invariant violated for {asset}: actual {actual_supply} != expected \
                 {expected} (deposits={}, withdrawals={})",
                self.total_deposits(asset),
                self.total_withdrawals(asset),
            )));
        }
        Ok(())
    }

    /// All assets that ever saw a deposit or withdrawal, in stable order.
    #[must_use]
    pub fn tracked_assets(&self) -> Vec<AssetRef> {
        let assets: BTreeSet<&AssetRef> =
            self.deposits.keys().chain(self.withdrawals.keys()).collect();
        assets.into_iter().cloned().collect()
    }
}
