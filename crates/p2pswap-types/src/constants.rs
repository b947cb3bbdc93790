//! System-wide constants for the P2PSwap escrow ledger.

/// The first identifier handed out by a fresh ledger.
pub const FIRST_SWAP_ID: u64 = 0;

/// Default principal that holds escrowed funds on behalf of open swaps.
pub const DEFAULT_CUSTODY_PRINCIPAL: &str = "swap-ledger";

/// Default number of receipts retained in the in-memory journal.
pub const DEFAULT_RECEIPT_CAPACITY: usize = 10_000;

/// Domain separator for receipt digests.
pub const RECEIPT_DIGEST_DOMAIN: &[u8] = b"p2pswap:receipt:v1:";
