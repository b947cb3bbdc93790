//! The transfer service contract.
//!
//! A transfer either fully applies before returning or changes nothing.
//! The ledger treats every call as synchronous and blocking.

use std::fmt;

use p2pswap_types::{AssetRef, Principal, TransferError};
use rust_decimal::Decimal;

/// `Result` alias for transfer service calls.
pub type TransferResult<T> = std::result::Result<T, TransferError>;

/// One movement of funds between two principals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLeg {
    pub from: Principal,
    pub to: Principal,
    pub asset: AssetRef,
    pub amount: Decimal,
}

impl TransferLeg {
    #[must_use]
    pub fn new(from: Principal, to: Principal, asset: AssetRef, amount: Decimal) -> Self {
        Self {
            from,
            to,
            asset,
            amount,
        }
    }

    /// The leg that undoes this one.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            asset: self.asset.clone(),
            amount: self.amount,
        }
    }
}

impl fmt::Display for TransferLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} -> {}",
            self.amount, self.asset, self.from, self.to
        )
    }
}

/// Moves fungible assets between principals.
pub trait AssetTransfer {
    /// Move `amount` of `asset` from `from` to `to`.
    ///
    /// On error no balance may have changed.
    fn transfer(
        &mut self,
        from: &Principal,
        to: &Principal,
        asset: &AssetRef,
        amount: Decimal,
    ) -> TransferResult<()>;

    /// Apply every leg, or none of them.
    ///
    /// The default applies legs in order and, if one fails, unwinds the
    /// legs already applied in reverse order. Implementations that can stage
    /// a batch should override this with a check-then-apply pass.
    fn transfer_atomic(&mut self, legs: &[TransferLeg]) -> TransferResult<()> {
        for (applied, leg) in legs.iter().enumerate() {
            tracing::debug!(leg = %leg, "Applying transfer leg");
            if let Err(err) = self.transfer(&leg.from, &leg.to, &leg.asset, leg.amount) {
                for done in legs[..applied].iter().rev() {
                    let undo = done.reversed();
                    if let Err(unwind_err) =
                        self.transfer(&undo.from, &undo.to, &undo.asset, undo.amount)
                    {
                        tracing::error!(
                            leg = %done,
                            error = %unwind_err,
                            "Failed to unwind transfer leg; balances are inconsistent"
                        );
                        return Err(TransferError::Rejected {
                            reason: format!("unwind of `{done}` failed: {unwind_err}"),
                        });
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Current balance, if this service can report it.
    fn balance_of(&self, _principal: &Principal, _asset: &AssetRef) -> Option<Decimal> {
        None
    }
}
