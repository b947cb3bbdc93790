//! # p2pswap-transfer
//!
//! **Asset transfer seam** for the swap ledger: the trait the ledger calls
//! to move funds, plus an in-memory reference implementation.
//!
//! ## Architecture
//!
//! 1. **AssetTransfer**: move a fixed amount of one asset between two
//!    principals, all-or-nothing; optionally several legs as one unit
//! 2. **InMemoryBank**: per-(principal, asset) balances implementing
//!    `AssetTransfer` with staged multi-leg commits
//! 3. **SupplyConservation**: proves transfers never mint or burn value
//!
//! ```text
//! SwapLedger ──transfer / transfer_atomic──▶ AssetTransfer (InMemoryBank, chain adapter, ...)
//! ```

pub mod bank;
pub mod service;
pub mod supply_conservation;

pub use bank::InMemoryBank;
pub use service::{AssetTransfer, TransferLeg, TransferResult};
pub use supply_conservation::SupplyConservation;
