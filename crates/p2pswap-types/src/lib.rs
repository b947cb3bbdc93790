//! # p2pswap-types
//!
//! Shared types, errors, and configuration for the **P2PSwap** escrow ledger.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`SwapId`], [`Principal`], [`ReceiptId`]
//! - **Asset model**: [`AssetRef`]
//! - **Swap model**: [`SwapRecord`], [`SwapTerms`]
//! - **Receipt model**: [`SwapReceipt`], [`ReceiptType`]
//! - **Configuration**: [`LedgerConfig`]
//! - **Errors**: [`SwapError`] with `SWAP_ERR_` prefix codes, [`TransferError`]
//! - **Constants**: system-wide limits and defaults

pub mod asset;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod receipt;
pub mod swap;

// Re-export all primary types at crate root for ergonomic imports:
//   use p2pswap_types::{AssetRef, SwapRecord, SwapError, ...};

pub use asset::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use receipt::*;
pub use swap::*;

// Constants are accessed via `p2pswap_types::constants::FOO`
// (not re-exported to avoid name collisions).
