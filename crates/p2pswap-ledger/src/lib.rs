//! # p2pswap-ledger
//!
//! **Escrow swap ledger**: two parties exchange fungible assets without a
//! trusted intermediary, settling atomically in one state transition.
//!
//! ## Architecture
//!
//! 1. **SwapIdAllocator**: strictly increasing identifiers, never reused
//! 2. **SwapBook**: the state machine: open swaps keyed by id, the
//!    authorization rule, and the transfer protocol for each operation
//! 3. **ReceiptJournal**: bounded audit trail of committed operations
//! 4. **SwapLedger**: thread-safe facade; one lock covers the book and the
//!    transfer service so no caller observes a half-applied operation
//!
//! ## Operation Flow
//!
//! ```text
//! open    → escrow offered (caller → custody)            → insert record
//! fulfill → requested (caller → opener) + offered (custody → caller), atomically
//!                                                         → delete record
//! cancel  → opener only; refund offered (custody → opener) → delete record
//! ```
//!
//! A swap exists in the book exactly while it is open. Any failure leaves
//! the book and every balance as they were.

pub mod allocator;
pub mod book;
pub mod journal;
pub mod ledger;

pub use allocator::SwapIdAllocator;
pub use book::SwapBook;
pub use journal::ReceiptJournal;
pub use ledger::SwapLedger;
