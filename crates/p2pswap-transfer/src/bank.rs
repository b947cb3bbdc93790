//! In-memory reference implementation of [`AssetTransfer`].
//!
//! Tracks one balance per (principal, asset). All mutations are atomic:
//! either the full operation succeeds or every balance is unchanged.

use std::collections::HashMap;

use p2pswap_types::{AssetRef, Principal, Result, TransferError};
use rust_decimal::Decimal;

use crate::service::{AssetTransfer, TransferLeg, TransferResult};
use crate::supply_conservation::SupplyConservation;

type BalanceKey = (Principal, AssetRef);

/// Balance book backing the ledger in tests and embedded deployments.
#[derive(Debug, Default)]
pub struct InMemoryBank {
    balances: HashMap<BalanceKey, Decimal>,
    supply: SupplyConservation,
    /// Number of upcoming transfer calls to refuse.
    fail_next: usize,
}

impl InMemoryBank {
    /// Create an empty bank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint funds into a principal's balance.
    pub fn deposit(&mut self, principal: &Principal, asset: &AssetRef, amount: Decimal) {
        *self
            .balances
            .entry((principal.clone(), asset.clone()))
            .or_insert(Decimal::ZERO) += amount;
        self.supply.record_deposit(asset, amount);
    }

    /// Burn funds from a principal's balance.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if the principal holds less than `amount`.
    pub fn withdraw(
        &mut self,
        principal: &Principal,
        asset: &AssetRef,
        amount: Decimal,
    ) -> TransferResult<()> {
        check_amount(amount)?;
        let key = (principal.clone(), asset.clone());
        let available = self.balances.get(&key).copied().unwrap_or(Decimal::ZERO);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.balances.insert(key, available - amount);
        self.supply.record_withdrawal(asset, amount);
        Ok(())
    }

    /// Balance of `principal` in `asset` (zero if never funded).
    #[must_use]
    pub fn balance(&self, principal: &Principal, asset: &AssetRef) -> Decimal {
        self.balances
            .get(&(principal.clone(), asset.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of every principal's balance of `asset`.
    #[must_use]
    pub fn total_supply(&self, asset: &AssetRef) -> Decimal {
        self.balances
            .iter()
            .filter(|((_, a), _)| a == asset)
            .map(|(_, amount)| *amount)
            .sum()
    }

    /// # Errors
    /// Returns `Internal` if transfers created or destroyed `asset`.
    pub fn verify_supply(&self, asset: &AssetRef) -> Result<()> {
        self.supply.verify(asset, self.total_supply(asset))
    }

    /// Verify supply conservation for every asset ever deposited.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn verify_all_supplies(&self) -> Result<()> {
        for asset in self.supply.tracked_assets() {
            self.verify_supply(&asset)?;
        }
        Ok(())
    }

    /// Refuse the next `count` transfer calls with `Rejected`, leaving
    /// balances untouched. Lets callers exercise collaborator failures.
    pub fn fail_next_transfers(&mut self, count: usize) {
        self.fail_next = count;
    }

    /// Deposit and withdrawal totals behind the supply check.
    #[must_use]
    pub fn supply(&self) -> &SupplyConservation {
        &self.supply
    }

    fn take_injected_failure(&mut self) -> TransferResult<()> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            tracing::debug!(remaining = self.fail_next, "Injected transfer failure");
            return Err(TransferError::Rejected {
                reason: "injected failure".into(),
            });
        }
        Ok(())
    }
}

fn check_amount(amount: Decimal) -> TransferResult<()> {
    if amount <= Decimal::ZERO {
        return Err(TransferError::InvalidAmount(amount));
    }
    Ok(())
}

/// Apply one leg against a view of balances, failing without mutation.
fn apply_leg(balances: &mut HashMap<BalanceKey, Decimal>, leg: &TransferLeg) -> TransferResult<()> {
    check_amount(leg.amount)?;
    let from_key = (leg.from.clone(), leg.asset.clone());
    let available = balances.get(&from_key).copied().unwrap_or(Decimal::ZERO);
    if available < leg.amount {
        return Err(TransferError::InsufficientBalance {
            needed: leg.amount,
            available,
        });
    }
    balances.insert(from_key, available - leg.amount);
    *balances
        .entry((leg.to.clone(), leg.asset.clone()))
        .or_insert(Decimal::ZERO) += leg.amount;
    Ok(())
}

impl AssetTransfer for InMemoryBank {
    fn transfer(
        &mut self,
        from: &Principal,
        to: &Principal,
        asset: &AssetRef,
        amount: Decimal,
    ) -> TransferResult<()> {
        self.take_injected_failure()?;
        let leg = TransferLeg::new(from.clone(), to.clone(), asset.clone(), amount);
        apply_leg(&mut self.balances, &leg)
    }

    /// Stage every leg on a copy of the touched balances; commit only if
    /// all of them apply.
    fn transfer_atomic(&mut self, legs: &[TransferLeg]) -> TransferResult<()> {
        self.take_injected_failure()?;

        let mut staged: HashMap<BalanceKey, Decimal> = HashMap::new();
        for leg in legs {
            for key in [
                (leg.from.clone(), leg.asset.clone()),
                (leg.to.clone(), leg.asset.clone()),
            ] {
                let current = self.balances.get(&key).copied().unwrap_or(Decimal::ZERO);
                staged.entry(key).or_insert(current);
            }
        }

        for leg in legs {
            tracing::debug!(leg = %leg, "Staging transfer leg");
            apply_leg(&mut staged, leg)?;
        }

        self.balances.extend(staged);
        Ok(())
    }

    fn balance_of(&self, principal: &Principal, asset: &AssetRef) -> Option<Decimal> {
        Some(self.balance(principal, asset))
    }
}
