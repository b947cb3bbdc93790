//! End-to-end lifecycle tests for the swap ledger.
//!
//! These drive a `SwapLedger` backed by the in-memory bank through the
//! open / fulfill / cancel flows that wallets perform on the live system,
//! checking result codes, stored records, and balances after each step.

use p2pswap_ledger::SwapLedger;
use p2pswap_transfer::InMemoryBank;
use p2pswap_types::*;
use rust_decimal::Decimal;

const STARTING_BALANCE: i64 = 100_000_000_000_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

fn wallet(n: u8) -> Principal {
    Principal::new(format!("wallet_{n}"))
}

fn native() -> AssetRef {
    AssetRef::NativeCoin
}

/// Ledger with wallets 1..=3 funded in the native coin.
fn funded_ledger() -> SwapLedger<InMemoryBank> {
    init_tracing();
    let ledger = SwapLedger::with_defaults(InMemoryBank::new()).unwrap();
    ledger.with_transfers(|bank| {
        for n in 1..=3 {
            bank.deposit(&wallet(n), &native(), dec(STARTING_BALANCE));
        }
    });
    ledger
}

fn balance(ledger: &SwapLedger<InMemoryBank>, who: &Principal, asset: &AssetRef) -> Decimal {
    ledger.with_transfers(|bank| bank.balance(who, asset))
}

fn open_native(ledger: &SwapLedger<InMemoryBank>, who: &Principal, offered: u64, requested: u64) -> SwapId {
    ledger
        .open(who, SwapTerms::native(offered, requested))
        .expect("open should succeed")
}

// =============================================================================
// open
// =============================================================================

#[test]
fn open_stores_record_and_escrows_funds() {
    let ledger = funded_ledger();
    let before = balance(&ledger, &wallet(1), &native());

    let id = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);

    assert_eq!(id, SwapId(0));
    assert_eq!(
        ledger.swap(id),
        Some(SwapRecord {
            opener: wallet(1),
            offered_asset: native(),
            offered_amount: dec(1_000_000),
            requested_asset: native(),
            requested_amount: dec(2_000_000),
        })
    );
    assert_eq!(balance(&ledger, &wallet(1), &native()), before - dec(1_000_000));
    assert_eq!(balance(&ledger, &ledger.custody(), &native()), dec(1_000_000));
}

#[test]
fn ids_are_sequential_from_zero() {
    let ledger = funded_ledger();
    for expected in 0..5 {
        let id = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);
        assert_eq!(id, SwapId(expected));
    }
    for id in 0..5 {
        assert!(ledger.swap(SwapId(id)).is_some());
    }
    assert_eq!(ledger.next_id(), SwapId(5));
}

#[test]
fn same_opener_can_hold_many_swaps() {
    let ledger = funded_ledger();
    let a = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);
    let b = open_native(&ledger, &wallet(1), 500_000, 1_000_000);
    assert_ne!(a, b);
    assert!(ledger.swap(a).is_some());
    assert!(ledger.swap(b).is_some());
}

#[test]
fn underfunded_open_leaves_no_trace() {
    let ledger = funded_ledger();
    let broke = Principal::new("wallet_broke");

    let err = ledger
        .open(&broke, SwapTerms::native(1_000_000, 2_000_000))
        .unwrap_err();
    assert_eq!(err, SwapError::TransferFailed);
    assert_eq!(err.code(), 102);
    assert_eq!(ledger.next_id(), SwapId(0));
    assert_eq!(ledger.open_swap_count(), 0);
    assert!(ledger.receipts().is_empty());

    // The id was not burned.
    assert_eq!(open_native(&ledger, &wallet(1), 1, 1), SwapId(0));
}

#[test]
fn non_positive_amounts_rejected_before_transfer() {
    let ledger = funded_ledger();
    ledger.with_transfers(|bank| bank.fail_next_transfers(1));

    // Would have hit the injected failure had a transfer been attempted.
    let err = ledger
        .open(&wallet(1), SwapTerms::native(0, 2_000_000))
        .unwrap_err();
    assert_eq!(err.code(), 103);

    let mut terms = SwapTerms::native(1, 1);
    terms.requested_amount = dec(-1);
    let err = ledger.open(&wallet(1), terms).unwrap_err();
    assert!(matches!(err, SwapError::InvalidAmount { .. }));

    // The injected failure is still pending: it hits the first real transfer.
    let err = ledger
        .open(&wallet(1), SwapTerms::native(1, 1))
        .unwrap_err();
    assert_eq!(err, SwapError::TransferFailed);
    assert_eq!(ledger.next_id(), SwapId(0));
}

// =============================================================================
// fulfill
// =============================================================================

#[test]
fn native_for_native_settles() {
    let ledger = funded_ledger();
    let w1_start = balance(&ledger, &wallet(1), &native());
    let w2_start = balance(&ledger, &wallet(2), &native());

    let id = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);
    assert_eq!(id, SwapId(0));
    assert_eq!(ledger.swap(id).unwrap().opener, wallet(1));

    let w1_before = balance(&ledger, &wallet(1), &native());
    let ok = ledger.fulfill(&wallet(2), id, &native(), &native()).unwrap();
    assert!(ok);

    assert_eq!(balance(&ledger, &wallet(1), &native()), w1_before + dec(2_000_000));
    assert_eq!(
        balance(&ledger, &wallet(2), &native()),
        w2_start - dec(2_000_000) + dec(1_000_000)
    );
    assert_eq!(
        balance(&ledger, &wallet(1), &native()),
        w1_start - dec(1_000_000) + dec(2_000_000)
    );
    assert!(ledger.swap(id).is_none());
    ledger.check_invariants().unwrap();
}

#[test]
fn underfunded_fulfiller_gets_transfer_failed() {
    let ledger = funded_ledger();
    open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);
    let id = ledger
        .open(&wallet(1), SwapTerms::native(1_000_000, 999_999_999_999_999))
        .unwrap();
    let w2_before = balance(&ledger, &wallet(2), &native());

    let err = ledger.fulfill(&wallet(2), id, &native(), &native()).unwrap_err();
    assert_eq!(err, SwapError::TransferFailed);
    assert_eq!(err.code(), 102);

    assert!(ledger.swap(id).is_some(), "failed fulfill must keep the swap open");
    assert_eq!(balance(&ledger, &wallet(2), &native()), w2_before);
    ledger.check_invariants().unwrap();
}

#[test]
fn failed_fulfill_leaves_swap_fulfillable() {
    let ledger = funded_ledger();
    let id = ledger
        .open(&wallet(1), SwapTerms::native(1_000_000, 999_999_999_999_999))
        .unwrap();
    let rich = Principal::new("wallet_whale");

    let err = ledger.fulfill(&rich, id, &native(), &native()).unwrap_err();
    assert_eq!(err, SwapError::TransferFailed);

    ledger.with_transfers(|bank| bank.deposit(&rich, &native(), dec(999_999_999_999_999)));
    assert!(ledger.fulfill(&rich, id, &native(), &native()).unwrap());
    assert_eq!(balance(&ledger, &rich, &native()), dec(1_000_000));
}

#[test]
fn fulfill_unknown_id() {
    let ledger = funded_ledger();
    open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);

    let err = ledger
        .fulfill(&wallet(2), SwapId(999), &native(), &native())
        .unwrap_err();
    assert_eq!(err, SwapError::SwapNotFound);
    assert_eq!(err.code(), 100);
}

#[test]
fn ids_never_reused_after_delete() {
    let ledger = funded_ledger();
    let first = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);
    let second = open_native(&ledger, &wallet(2), 500_000, 1_000_000);

    ledger.fulfill(&wallet(3), first, &native(), &native()).unwrap();
    assert!(ledger.swap(second).is_some());

    let third = open_native(&ledger, &wallet(1), 750_000, 1_500_000);
    assert_eq!(third, SwapId(2));

    assert!(ledger.swap(first).is_none());
    assert!(ledger.swap(second).is_some());
    assert!(ledger.swap(third).is_some());
}

#[test]
fn double_fulfill_returns_not_found() {
    let ledger = funded_ledger();
    let id = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);

    assert!(ledger.fulfill(&wallet(2), id, &native(), &native()).unwrap());
    let err = ledger.fulfill(&wallet(3), id, &native(), &native()).unwrap_err();
    assert_eq!(err, SwapError::SwapNotFound);
}

#[test]
fn fulfill_with_collaborator_failure_keeps_balances() {
    let ledger = funded_ledger();
    let id = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);
    let w1 = balance(&ledger, &wallet(1), &native());
    let w2 = balance(&ledger, &wallet(2), &native());

    ledger.with_transfers(|bank| bank.fail_next_transfers(1));
    let err = ledger.fulfill(&wallet(2), id, &native(), &native()).unwrap_err();
    assert_eq!(err, SwapError::TransferFailed);

    assert_eq!(balance(&ledger, &wallet(1), &native()), w1);
    assert_eq!(balance(&ledger, &wallet(2), &native()), w2);
    assert!(ledger.swap(id).is_some());
}

#[test]
fn fulfill_asset_mismatch_is_distinct_error() {
    let ledger = funded_ledger();
    let id = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);
    let token = AssetRef::token("SP000.usd", "usda");

    let err = ledger.fulfill(&wallet(2), id, &token, &native()).unwrap_err();
    assert!(matches!(err, SwapError::AssetMismatch { .. }));
    assert_eq!(err.code(), 101);
    assert!(ledger.swap(id).is_some());
    assert_eq!(balance(&ledger, &wallet(2), &native()), dec(STARTING_BALANCE));
}

// =============================================================================
// cancel
// =============================================================================

#[test]
fn cancel_by_opener_refunds_and_removes() {
    let ledger = funded_ledger();
    let before = balance(&ledger, &wallet(1), &native());
    let id = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);

    assert!(ledger.cancel(&wallet(1), id, &native()).unwrap());
    assert!(ledger.swap(id).is_none());
    assert_eq!(balance(&ledger, &wallet(1), &native()), before);
    assert_eq!(balance(&ledger, &ledger.custody(), &native()), Decimal::ZERO);
}

#[test]
fn cancel_unknown_id() {
    let ledger = funded_ledger();
    let err = ledger.cancel(&wallet(1), SwapId(999), &native()).unwrap_err();
    assert_eq!(err, SwapError::SwapNotFound);
}

#[test]
fn cancel_by_other_wallet_is_not_found() {
    let ledger = funded_ledger();
    let id = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);

    let err = ledger.cancel(&wallet(2), id, &native()).unwrap_err();
    assert_eq!(err, SwapError::SwapNotFound);
    assert_eq!(err.code(), 100);
    assert!(ledger.swap(id).is_some());
}

#[test]
fn cancel_twice_is_not_found() {
    let ledger = funded_ledger();
    let id = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);
    assert!(ledger.cancel(&wallet(1), id, &native()).unwrap());
    let err = ledger.cancel(&wallet(1), id, &native()).unwrap_err();
    assert_eq!(err, SwapError::SwapNotFound);
}

#[test]
fn cancel_after_fulfill_is_not_found() {
    let ledger = funded_ledger();
    let id = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);
    assert!(ledger.fulfill(&wallet(2), id, &native(), &native()).unwrap());
    let err = ledger.cancel(&wallet(1), id, &native()).unwrap_err();
    assert_eq!(err, SwapError::SwapNotFound);
}

#[test]
fn cancel_one_of_many() {
    let ledger = funded_ledger();
    let s0 = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);
    let s1 = open_native(&ledger, &wallet(1), 500_000, 1_000_000);
    let s2 = open_native(&ledger, &wallet(2), 750_000, 1_500_000);

    assert!(ledger.cancel(&wallet(1), s1, &native()).unwrap());

    assert!(ledger.swap(s0).is_some());
    assert!(ledger.swap(s1).is_none());
    assert!(ledger.swap(s2).is_some());
    ledger.check_invariants().unwrap();
}

#[test]
fn cancel_with_wrong_asset_by_opener_is_mismatch() {
    let ledger = funded_ledger();
    let id = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);

    let err = ledger
        .cancel(&wallet(1), id, &AssetRef::token("SP000.usd", "usda"))
        .unwrap_err();
    assert_eq!(err.code(), 101);
    assert!(ledger.swap(id).is_some());

    assert!(ledger.cancel(&wallet(1), id, &native()).unwrap());
}

// =============================================================================
// receipts
// =============================================================================

#[test]
fn receipts_only_for_commits() {
    let ledger = funded_ledger();
    let id = open_native(&ledger, &wallet(1), 1_000_000, 2_000_000);
    let _ = ledger.cancel(&wallet(2), id, &native());
    let _ = ledger.fulfill(&wallet(2), SwapId(7), &native(), &native());
    ledger.fulfill(&wallet(2), id, &native(), &native()).unwrap();

    let receipts = ledger.receipts();
    assert_eq!(receipts.len(), 2);
    assert_eq!(receipts[0].receipt_type, ReceiptType::SwapOpened);
    assert_eq!(receipts[0].actor, wallet(1));
    assert_eq!(receipts[1].receipt_type, ReceiptType::SwapFulfilled);
    assert_eq!(receipts[1].actor, wallet(2));
    assert_eq!(receipts[1].record.opener, wallet(1));
    assert!(receipts[0].id < receipts[1].id);
    assert!(receipts.iter().all(SwapReceipt::verify_digest));

    let json = serde_json::to_string(&receipts[1]).unwrap();
    assert!(json.contains("SwapFulfilled"));
}

// =============================================================================
// custody principal
// =============================================================================

#[test]
fn custody_principal_cannot_drain_escrow() {
    let ledger = funded_ledger();
    let custody = ledger.custody();
    let thief = Principal::new("thief");
    ledger.with_transfers(|bank| bank.deposit(&thief, &native(), dec(1)));
    let id = open_native(&ledger, &wallet(1), 1_000, 2_000);

    // Opening as custody would mint a record backed by someone else's escrow.
    let err = ledger.open(&custody, SwapTerms::native(1_000, 1)).unwrap_err();
    assert_eq!(err, SwapError::TransferFailed);
    assert_eq!(ledger.next_id(), SwapId(1));
    ledger.check_invariants().unwrap();

    let err = ledger.fulfill(&thief, SwapId(1), &native(), &native()).unwrap_err();
    assert_eq!(err, SwapError::SwapNotFound);
    let err = ledger.fulfill(&custody, id, &native(), &native()).unwrap_err();
    assert_eq!(err, SwapError::TransferFailed);
    let err = ledger.cancel(&custody, id, &native()).unwrap_err();
    assert_eq!(err, SwapError::TransferFailed);

    assert_eq!(balance(&ledger, &thief, &native()), dec(1));
    assert_eq!(balance(&ledger, &custody, &native()), dec(1_000));
    assert!(ledger.cancel(&wallet(1), id, &native()).unwrap());
    assert_eq!(balance(&ledger, &wallet(1), &native()), dec(STARTING_BALANCE));
    ledger.check_invariants().unwrap();
}
