//! Thread-safe swap ledger.
//!
//! One mutex guards the [`SwapBook`] together with the transfer service.
//! Every operation holds it from the first transfer call through the map
//! mutation, so two concurrent fulfills of the same id serialize: one
//! settles, the other finds nothing. Readers take the same lock and only
//! ever see states between operations.

use p2pswap_transfer::AssetTransfer;
use p2pswap_types::{
    AssetRef, LedgerConfig, Principal, Result, SwapId, SwapReceipt, SwapRecord, SwapTerms,
};
use parking_lot::Mutex;

use crate::book::SwapBook;

struct Inner<T> {
    book: SwapBook,
    transfers: T,
}

/// Shared handle to one ledger instance.
pub struct SwapLedger<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: AssetTransfer> SwapLedger<T> {
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn new(config: &LedgerConfig, transfers: T) -> Result<Self> {
        let book = SwapBook::new(config)?;
        tracing::info!(
            custody = %book.custody(),
            next_id = %book.next_id(),
            "Swap ledger initialised"
        );
        Ok(Self {
            inner: Mutex::new(Inner { book, transfers }),
        })
    }

    /// Ledger with [`LedgerConfig::default`].
    ///
    /// # Errors
    /// Never fails with the default config; kept fallible for symmetry.
    pub fn with_defaults(transfers: T) -> Result<Self> {
        Self::new(&LedgerConfig::default(), transfers)
    }

    /// Escrow `terms.offered_amount` from `caller` and open a swap.
    ///
    /// # Errors
    /// `InvalidAmount` or `TransferFailed`; see [`SwapBook::open`].
    pub fn open(&self, caller: &Principal, terms: SwapTerms) -> Result<SwapId> {
        let mut guard = self.inner.lock();
        let Inner { book, transfers } = &mut *guard;
        book.open(transfers, caller, terms)
    }

    /// Settle swap `id` with `caller` as the fulfiller.
    ///
    /// # Errors
    /// `SwapNotFound`, `AssetMismatch` or `TransferFailed`; see
    /// [`SwapBook::fulfill`].
    pub fn fulfill(
        &self,
        caller: &Principal,
        id: SwapId,
        expected_offered: &AssetRef,
        expected_requested: &AssetRef,
    ) -> Result<bool> {
        let mut guard = self.inner.lock();
        let Inner { book, transfers } = &mut *guard;
        book.fulfill(transfers, caller, id, expected_offered, expected_requested)
    }

    /// Cancel swap `id`; only its opener may do so.
    ///
    /// # Errors
    /// `SwapNotFound`, `AssetMismatch` or `TransferFailed`; see
    /// [`SwapBook::cancel`].
    pub fn cancel(&self, caller: &Principal, id: SwapId, expected_offered: &AssetRef) -> Result<bool> {
        let mut guard = self.inner.lock();
        let Inner { book, transfers } = &mut *guard;
        book.cancel(transfers, caller, id, expected_offered)
    }

    /// # Errors
    /// Returns `Internal` describing the first violated invariant.
    pub fn check_invariants(&self) -> Result<()> {
        let guard = self.inner.lock();
        guard.book.check_invariants(&guard.transfers)
    }

    /// Run `f` against the transfer service under the ledger lock, e.g. to
    /// fund wallets or read balances consistently with the book.
    pub fn with_transfers<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.lock().transfers)
    }
}

impl<T> SwapLedger<T> {
    /// The open swap with this id, if any.
    #[must_use]
    pub fn swap(&self, id: SwapId) -> Option<SwapRecord> {
        self.inner.lock().book.get(id).cloned()
    }

    /// The id the next successful open will receive.
    #[must_use]
    pub fn next_id(&self) -> SwapId {
        self.inner.lock().book.next_id()
    }

    /// Number of open swaps.
    #[must_use]
    pub fn open_swap_count(&self) -> usize {
        self.inner.lock().book.len()
    }

    /// Snapshot of every open swap, in id order.
    #[must_use]
    pub fn open_swaps(&self) -> Vec<(SwapId, SwapRecord)> {
        self.inner
            .lock()
            .book
            .iter()
            .map(|(id, record)| (id, record.clone()))
            .collect()
    }

    /// Snapshot of the retained receipts, oldest first.
    #[must_use]
    pub fn receipts(&self) -> Vec<SwapReceipt> {
        self.inner.lock().book.journal().iter().cloned().collect()
    }

    /// Principal holding escrowed funds.
    #[must_use]
    pub fn custody(&self) -> Principal {
        self.inner.lock().book.custody().clone()
    }

    /// Tear the ledger down, returning the transfer service.
    pub fn into_transfers(self) -> T {
        self.inner.into_inner().transfers
    }
}
