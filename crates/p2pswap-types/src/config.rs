//! Configuration for a ledger instance.

use serde::{Deserialize, Serialize};

use crate::{Principal, Result, SwapError, SwapId, constants};

/// Configuration for a single swap ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Principal that holds escrowed funds while swaps are open.
    pub custody: Principal,
    /// Maximum receipts retained in memory; the oldest are evicted first.
    pub receipt_capacity: usize,
    /// First identifier the allocator hands out. Non-zero only when
    /// resuming a ledger whose earlier identifiers are already spent.
    pub first_swap_id: SwapId,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            custody: Principal::new(constants::DEFAULT_CUSTODY_PRINCIPAL),
            receipt_capacity: constants::DEFAULT_RECEIPT_CAPACITY,
            first_swap_id: SwapId(constants::FIRST_SWAP_ID),
        }
    }
}

impl LedgerConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `Configuration` if the JSON is malformed or the result fails
    /// [`LedgerConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SwapError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns `Configuration` for an empty custody principal or a zero
    /// receipt capacity.
    pub fn validate(&self) -> Result<()> {
        if self.custody.is_empty() {
            return Err(SwapError::Configuration(
                "custody principal must not be empty".into(),
            ));
        }
        if self.receipt_capacity == 0 {
            return Err(SwapError::Configuration(
                "receipt_capacity must be > 0".into(),
            ));
        }
        Ok(())
    }
}
