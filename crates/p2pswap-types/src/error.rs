//! Error types for the P2PSwap escrow ledger.
//!
//! Ledger errors use the `SWAP_ERR_` prefix convention for easy grepping in
//! logs. Codes are grouped:
//! - 1xx: Swap operation errors (externally visible result codes)
//! - 9xx: General / internal errors
//!
//! Collaborator failures are modelled separately as [`TransferError`] and
//! collapse into [`SwapError::TransferFailed`] at the ledger boundary, so
//! callers never see the transfer service's internal detail.

use rust_decimal::Decimal;
use thiserror::Error;

/// Central error enum for all ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    // =================================================================
    // Swap Errors (1xx)
    // =================================================================
    /// The swap does not exist, is already closed, or belongs to someone
    /// else. These causes are deliberately indistinguishable.
    #[error("SWAP_ERR_100: Swap not found")]
    SwapNotFound,

    /// The asset named by the caller differs from the one stored on the swap.
    #[error("SWAP_ERR_101: Asset mismatch: {reason}")]
    AssetMismatch { reason: String },

    /// An underlying asset transfer failed. No balance changed.
    #[error("SWAP_ERR_102: Transfer failed")]
    TransferFailed,

    /// Swap amounts must be strictly positive whole units.
    #[error("SWAP_ERR_103: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("SWAP_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Unrecoverable internal error.
    #[error("SWAP_ERR_901: Internal error: {0}")]
    Internal(String),
}

impl SwapError {
    /// Numeric result code exposed to callers.
    #[must_use]
    pub fn code(&self) -> u32 {
        match self {
            Self::SwapNotFound => 100,
            Self::AssetMismatch { .. } => 101,
            Self::TransferFailed => 102,
            Self::InvalidAmount { .. } => 103,
            Self::Configuration(_) => 900,
            Self::Internal(_) => 901,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SwapError>;

/// Failure reported by an asset transfer service.
///
/// A failing transfer must leave every balance exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The sender does not hold enough of the asset.
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// The amount is zero, negative, or otherwise unusable.
    #[error("invalid transfer amount: {0}")]
    InvalidAmount(Decimal),

    /// Any other refusal by the transfer service.
    #[error("transfer rejected: {reason}")]
    Rejected { reason: String },
}

// The ledger surfaces every collaborator failure as one opaque code.
impl From<TransferError> for SwapError {
    fn from(_: TransferError) -> Self {
        Self::TransferFailed
    }
}
