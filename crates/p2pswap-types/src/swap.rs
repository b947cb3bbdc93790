//! The swap record and the terms a caller opens it with.
//!
//! ## Lifecycle
//!
//! ```text
//!   NonExistent ──open──▶ Open ──fulfill / cancel──▶ NonExistent (terminal)
//! ```
//!
//! A record carries no status field: it exists in the ledger exactly while
//! the swap is open. Once removed, its identifier is never handed out again.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AssetRef, Principal, Result, SwapError};

/// What a caller offers and what they ask for in return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapTerms {
    pub offered_asset: AssetRef,
    pub offered_amount: Decimal,
    pub requested_asset: AssetRef,
    pub requested_amount: Decimal,
}

impl SwapTerms {
    #[must_use]
    pub fn new(
        offered_asset: AssetRef,
        offered_amount: Decimal,
        requested_asset: AssetRef,
        requested_amount: Decimal,
    ) -> Self {
        Self {
            offered_asset,
            offered_amount,
            requested_asset,
            requested_amount,
        }
    }

    /// Reject terms a swap could never settle with.
    ///
    /// # Errors
    /// Returns `InvalidAmount` if either amount is zero, negative, or
    /// fractional.
    pub fn validate(&self) -> Result<()> {
        validate_amount("offered", self.offered_amount)?;
        validate_amount("requested", self.requested_amount)
    }

    /// Bind these terms to the principal opening the swap.
    #[must_use]
    pub fn into_record(self, opener: Principal) -> SwapRecord {
        SwapRecord {
            opener,
            offered_asset: self.offered_asset,
            offered_amount: self.offered_amount,
            requested_asset: self.requested_asset,
            requested_amount: self.requested_amount,
        }
    }
}

fn validate_amount(side: &str, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(SwapError::InvalidAmount {
            reason: format!("{side} amount must be positive, got {amount}"),
        });
    }
    if !amount.fract().is_zero() {
        return Err(SwapError::InvalidAmount {
            reason: format!("{side} amount must be a whole number of units, got {amount}"),
        });
    }
    Ok(())
}

/// An open swap. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    /// The principal whose offered asset sits in escrow.
    pub opener: Principal,
    pub offered_asset: AssetRef,
    pub offered_amount: Decimal,
    pub requested_asset: AssetRef,
    pub requested_amount: Decimal,
}

impl SwapRecord {
    /// Check the caller's view of the offered asset against the record.
    ///
    /// # Errors
    /// Returns `AssetMismatch` if `expected` differs from the stored asset.
    pub fn check_offered(&self, expected: &AssetRef) -> Result<()> {
        if &self.offered_asset != expected {
            return Err(SwapError::AssetMismatch {
                reason: format!(
                    "offered asset is {}, caller expected {expected}",
                    self.offered_asset
                ),
            });
        }
        Ok(())
    }

    /// Check the caller's view of the requested asset against the record.
    ///
    /// # Errors
    /// Returns `AssetMismatch` if `expected` differs from the stored asset.
    pub fn check_requested(&self, expected: &AssetRef) -> Result<()> {
        if &self.requested_asset != expected {
            return Err(SwapError::AssetMismatch {
                reason: format!(
                    "requested asset is {}, caller expected {expected}",
                    self.requested_asset
                ),
            });
        }
        Ok(())
    }

    /// Whether `principal` opened this swap.
    #[must_use]
    pub fn is_opened_by(&self, principal: &Principal) -> bool {
        &self.opener == principal
    }

    /// Canonical bytes used when hashing this record into a receipt.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128);
        for part in [
            self.opener.as_str().to_string(),
            self.offered_asset.to_string(),
            self.offered_amount.normalize().to_string(),
            self.requested_asset.to_string(),
            self.requested_amount.normalize().to_string(),
        ] {
            out.extend_from_slice(&(part.len() as u64).to_le_bytes());
            out.extend_from_slice(part.as_bytes());
        }
        out
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl SwapTerms {
    /// Native-coin-for-native-coin terms, in whole units.
    #[must_use]
    pub fn native(offered_amount: u64, requested_amount: u64) -> Self {
        Self::new(
            AssetRef::NativeCoin,
            Decimal::from(offered_amount),
            AssetRef::NativeCoin,
            Decimal::from(requested_amount),
        )
    }
}
