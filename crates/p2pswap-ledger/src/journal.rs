//! Bounded receipt journal.
//!
//! Keeps the most recent receipts in insertion order. When the journal is
//! full, the oldest receipt is evicted to make room, so memory stays
//! predictable in long-running ledgers.

use std::collections::VecDeque;

use p2pswap_types::{Result, SwapError, SwapReceipt};

/// Append-only, bounded list of receipts for committed operations.
#[derive(Debug)]
pub struct ReceiptJournal {
    /// Front = oldest.
    entries: VecDeque<SwapReceipt>,
    capacity: usize,
    /// Receipts ever recorded, including evicted ones.
    total_recorded: u64,
}

impl ReceiptJournal {
    /// Create a journal retaining at most `capacity` receipts.
    ///
    /// # Errors
    /// Returns `Configuration` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SwapError::Configuration(
                "receipt journal capacity must be > 0".into(),
            ));
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            total_recorded: 0,
        })
    }

    /// Append a receipt, evicting the oldest if full.
    pub fn record(&mut self, receipt: SwapReceipt) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(receipt);
        self.total_recorded += 1;
    }

    /// Retained receipts, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SwapReceipt> {
        self.entries.iter()
    }

    /// Most recent receipt.
    #[must_use]
    pub fn latest(&self) -> Option<&SwapReceipt> {
        self.entries.back()
    }

    /// Number of retained receipts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Receipts ever recorded, including evicted ones.
    #[must_use]
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }
}
