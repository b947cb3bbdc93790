//! Swap book: the escrow state machine.
//!
//! The book owns the open swaps and the id allocator. Each operation calls
//! into the transfer service first and mutates the map only after every
//! transfer has succeeded, so a failed operation leaves no trace.
//!
//! `SwapBook` is single-threaded (`&mut self`); wrap it in a
//! [`SwapLedger`](crate::SwapLedger) to share it between threads.

use std::collections::{BTreeMap, BTreeSet};

use p2pswap_transfer::{AssetTransfer, TransferLeg};
use p2pswap_types::{
    AssetRef, LedgerConfig, Principal, ReceiptType, Result, SwapError, SwapId, SwapReceipt,
    SwapRecord, SwapTerms, TransferError,
};
use rust_decimal::Decimal;

use crate::allocator::SwapIdAllocator;
use crate::journal::ReceiptJournal;

/// Open swaps, keyed by id. Presence in `swaps` is the only status.
#[derive(Debug)]
pub struct SwapBook {
    swaps: BTreeMap<SwapId, SwapRecord>,
    allocator: SwapIdAllocator,
    /// Principal that holds offered funds while swaps are open.
    custody: Principal,
    /// Every asset ever escrowed, so custody is checked even with no open swaps.
    escrowed_assets: BTreeSet<AssetRef>,
    journal: ReceiptJournal,
}

impl SwapBook {
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            swaps: BTreeMap::new(),
            allocator: SwapIdAllocator::starting_at(config.first_swap_id),
            custody: config.custody.clone(),
            escrowed_assets: BTreeSet::new(),
            journal: ReceiptJournal::new(config.receipt_capacity)?,
        })
    }

    /// Escrow the offered funds and record a new swap.
    ///
    /// 1. Validate the amounts (nothing is transferred on failure)
    /// 2. Move `offered_amount` from `caller` into custody
    /// 3. Assign the next id and insert the record
    ///
    /// If the escrow transfer fails, no record is created and no id is
    /// consumed.
    ///
    /// # Errors
    /// - `InvalidAmount` if either amount is not a positive whole number
    /// - `TransferFailed` if the caller is the custody principal or the
    ///   escrow transfer fails
    pub fn open<T: AssetTransfer>(
        &mut self,
        transfers: &mut T,
        caller: &Principal,
        terms: SwapTerms,
    ) -> Result<SwapId> {
        self.reject_custody_caller(caller, None, "open")?;
        if let Err(err) = terms.validate() {
            tracing::warn!(caller = %caller, error = %err, "Swap open rejected");
            return Err(err);
        }
        self.allocator.ensure_capacity()?;

        transfers
            .transfer(caller, &self.custody, &terms.offered_asset, terms.offered_amount)
            .map_err(|err| transfer_failed("open", caller, None, err))?;

        let id = self.allocator.allocate()?;
        let record = terms.into_record(caller.clone());
        self.escrowed_assets.insert(record.offered_asset.clone());

        tracing::info!(
            swap_id = %id,
            opener = %caller,
            offered_asset = %record.offered_asset,
            offered_amount = %record.offered_amount,
            requested_asset = %record.requested_asset,
            requested_amount = %record.requested_amount,
            "Swap opened"
        );

        self.journal.record(SwapReceipt::issue(
            ReceiptType::SwapOpened,
            id,
            caller.clone(),
            record.clone(),
        ));
        self.swaps.insert(id, record);
        Ok(id)
    }

    /// Settle an open swap: the caller pays the requested amount to the
    /// opener and receives the escrowed offered amount, as one unit.
    ///
    /// The caller's expected assets are checked against the record before
    /// any transfer. The record is removed only if both legs succeed.
    ///
    /// # Errors
    /// - `SwapNotFound` if `id` is not open
    /// - `AssetMismatch` if an expected asset differs from the record
    /// - `TransferFailed` if the caller is the custody principal or either
    ///   leg fails (the swap stays open)
    pub fn fulfill<T: AssetTransfer>(
        &mut self,
        transfers: &mut T,
        caller: &Principal,
        id: SwapId,
        expected_offered: &AssetRef,
        expected_requested: &AssetRef,
    ) -> Result<bool> {
        self.reject_custody_caller(caller, Some(id), "fulfill")?;
        let record = self.lookup(caller, id, "fulfill")?;
        record
            .check_offered(expected_offered)
            .and_then(|()| record.check_requested(expected_requested))
            .inspect_err(|err| {
                tracing::warn!(swap_id = %id, caller = %caller, error = %err, "Swap fulfill rejected");
            })?;

        let legs = [
            TransferLeg::new(
                caller.clone(),
                record.opener.clone(),
                record.requested_asset.clone(),
                record.requested_amount,
            ),
            TransferLeg::new(
                self.custody.clone(),
                caller.clone(),
                record.offered_asset.clone(),
                record.offered_amount,
            ),
        ];
        transfers
            .transfer_atomic(&legs)
            .map_err(|err| transfer_failed("fulfill", caller, Some(id), err))?;

        let record = self.close(id)?;
        tracing::info!(
            swap_id = %id,
            opener = %record.opener,
            fulfiller = %caller,
            "Swap fulfilled"
        );
        self.journal.record(SwapReceipt::issue(
            ReceiptType::SwapFulfilled,
            id,
            caller.clone(),
            record,
        ));
        Ok(true)
    }

    /// Refund an open swap to its opener and remove it.
    ///
    /// Only the opener may cancel. Any other caller gets `SwapNotFound`,
    /// exactly as if the id did not exist.
    ///
    /// # Errors
    /// - `SwapNotFound` if `id` is not open or `caller` is not the opener
    /// - `AssetMismatch` if `expected_offered` differs from the record
    /// - `TransferFailed` if the caller is the custody principal or the
    ///   refund fails (the swap stays open)
    pub fn cancel<T: AssetTransfer>(
        &mut self,
        transfers: &mut T,
        caller: &Principal,
        id: SwapId,
        expected_offered: &AssetRef,
    ) -> Result<bool> {
        self.reject_custody_caller(caller, Some(id), "cancel")?;
        let record = self.lookup(caller, id, "cancel")?;
        if !record.is_opened_by(caller) {
            tracing::warn!(swap_id = %id, caller = %caller, "Swap cancel by non-opener");
            return Err(SwapError::SwapNotFound);
        }
        record.check_offered(expected_offered).inspect_err(|err| {
            tracing::warn!(swap_id = %id, caller = %caller, error = %err, "Swap cancel rejected");
        })?;

        transfers
            .transfer(
                &self.custody,
                &record.opener,
                &record.offered_asset,
                record.offered_amount,
            )
            .map_err(|err| transfer_failed("cancel", caller, Some(id), err))?;

        let record = self.close(id)?;
        tracing::info!(swap_id = %id, opener = %caller, "Swap cancelled");
        self.journal.record(SwapReceipt::issue(
            ReceiptType::SwapCancelled,
            id,
            caller.clone(),
            record,
        ));
        Ok(true)
    }

    /// Custody funds back other principals' swaps; it can never act as a party.
    fn reject_custody_caller(&self, caller: &Principal, id: Option<SwapId>, op: &str) -> Result<()> {
        if *caller == self.custody {
            tracing::warn!(
                op,
                caller = %caller,
                swap_id = ?id.map(|id| id.0),
                "Custody principal rejected as caller"
            );
            return Err(SwapError::TransferFailed);
        }
        Ok(())
    }

    /// Clone the record so transfers can borrow the book mutably later.
    fn lookup(&self, caller: &Principal, id: SwapId, op: &str) -> Result<SwapRecord> {
        self.swaps.get(&id).cloned().ok_or_else(|| {
            tracing::warn!(swap_id = %id, caller = %caller, op, "Swap not found");
            SwapError::SwapNotFound
        })
    }

    fn close(&mut self, id: SwapId) -> Result<SwapRecord> {
        self.swaps
            .remove(&id)
            .ok_or_else(|| SwapError::Internal(format!("{id} vanished during settlement")))
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// The open swap with this id, if any.
    #[must_use]
    pub fn get(&self, id: SwapId) -> Option<&SwapRecord> {
        self.swaps.get(&id)
    }

    /// The id the next successful open will receive.
    #[must_use]
    pub fn next_id(&self) -> SwapId {
        self.allocator.peek()
    }

    /// Open swaps in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SwapId, &SwapRecord)> {
        self.swaps.iter().map(|(id, record)| (*id, record))
    }

    /// Number of open swaps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.swaps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty()
    }

    /// Principal holding escrowed funds.
    #[must_use]
    pub fn custody(&self) -> &Principal {
        &self.custody
    }

    /// Receipts of committed operations.
    #[must_use]
    pub fn journal(&self) -> &ReceiptJournal {
        &self.journal
    }

    /// Escrowed total per offered asset across all open swaps.
    #[must_use]
    pub fn escrowed_totals(&self) -> BTreeMap<AssetRef, Decimal> {
        let mut totals = BTreeMap::new();
        for record in self.swaps.values() {
            *totals
                .entry(record.offered_asset.clone())
                .or_insert(Decimal::ZERO) += record.offered_amount;
        }
        totals
    }

    /// Check the book's structural invariants, and custody backing when
    /// the transfer service can report balances.
    ///
    /// - every open id is below the allocator's counter
    /// - every stored amount is positive
    /// - custody holds exactly the escrowed total of every asset it has
    ///   ever escrowed (zero once no swap offers it)
    ///
    /// # Errors
    /// Returns `Internal` describing the first violation.
    pub fn check_invariants<T: AssetTransfer>(&self, transfers: &T) -> Result<()> {
        let next = self.allocator.peek();
        if let Some((&last, _)) = self.swaps.last_key_value() {
            if last >= next {
                return Err(SwapError::Internal(format!(
                    "open {last} is not below next id {next}"
                )));
            }
        }

        for (id, record) in &self.swaps {
            if record.offered_amount <= Decimal::ZERO || record.requested_amount <= Decimal::ZERO {
                return Err(SwapError::Internal(format!("{id} holds a non-positive amount")));
            }
        }

        let totals = self.escrowed_totals();
        for asset in &self.escrowed_assets {
            let escrowed = totals.get(asset).copied().unwrap_or(Decimal::ZERO);
            if let Some(held) = transfers.balance_of(&self.custody, asset) {
                if held != escrowed {
                    return Err(SwapError::Internal(format!(
                        "custody holds {held} {asset} but open swaps escrow {escrowed}"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn transfer_failed(
    op: &str,
    caller: &Principal,
    id: Option<SwapId>,
    err: TransferError,
) -> SwapError {
    tracing::warn!(
        op,
        caller = %caller,
        swap_id = ?id.map(|id| id.0),
        error = %err,
        "Swap transfer failed"
    );
    SwapError::from(err)
}
