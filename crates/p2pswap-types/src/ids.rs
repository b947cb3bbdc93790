//! Identifiers used throughout P2PSwap.
//!
//! Swaps are numbered sequentially by the ledger. Receipts use UUIDv7 for
//! time-ordered lexicographic sorting. Principals are opaque account names.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SwapId
// ---------------------------------------------------------------------------

/// Sequential swap identifier assigned by the ledger on a successful open.
///
/// Identifiers are never reused, even after the swap they named is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SwapId(pub u64);

impl SwapId {
    /// The identifier that follows this one, or `None` on `u64` exhaustion.
    #[must_use]
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for SwapId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SwapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "swap:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Principal
// ---------------------------------------------------------------------------

/// An account that can own assets: a wallet, a contract, or the ledger's
/// own custody account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Principal {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Principal {
    /// A throwaway wallet name, unique with overwhelming probability.
    #[must_use]
    pub fn random() -> Self {
        use rand::Rng;
        let suffix: u64 = rand::thread_rng().r#gen();
        Self(format!("wallet_{suffix:016x}"))
    }
}

// ---------------------------------------------------------------------------
// ReceiptId
// ---------------------------------------------------------------------------

/// Globally unique receipt identifier. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ReceiptId(pub Uuid);

impl ReceiptId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ReceiptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rcpt:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
