//! Receipt types for the P2PSwap audit trail.
//!
//! Every committed ledger operation (swap opened, fulfilled, cancelled)
//! produces a [`SwapReceipt`] whose SHA-256 digest can be recomputed by
//! anyone holding the receipt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Principal, ReceiptId, SwapId, SwapRecord, constants};

/// The type of action this receipt proves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiptType {
    /// Offered funds moved into custody and the swap was recorded.
    SwapOpened,
    /// Both legs settled and the swap was removed.
    SwapFulfilled,
    /// Escrow refunded to the opener and the swap was removed.
    SwapCancelled,
}

impl std::fmt::Display for ReceiptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SwapOpened => write!(f, "SWAP_OPENED"),
            Self::SwapFulfilled => write!(f, "SWAP_FULFILLED"),
            Self::SwapCancelled => write!(f, "SWAP_CANCELLED"),
        }
    }
}

/// Proof that a ledger operation committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub id: ReceiptId,
    pub receipt_type: ReceiptType,
    pub swap_id: SwapId,
    /// Who invoked the operation: the opener for open/cancel, the
    /// fulfiller for fulfill.
    pub actor: Principal,
    /// The swap as it was when the operation committed.
    pub record: SwapRecord,
    pub issued_at: DateTime<Utc>,
    /// SHA-256 over [`SwapReceipt::digest_payload`].
    pub digest: [u8; 32],
}

impl SwapReceipt {
    /// Issue a receipt for a committed transition, digest included.
    #[must_use]
    pub fn issue(
        receipt_type: ReceiptType,
        swap_id: SwapId,
        actor: Principal,
        record: SwapRecord,
    ) -> Self {
        let mut receipt = Self {
            id: ReceiptId::new(),
            receipt_type,
            swap_id,
            actor,
            record,
            issued_at: Utc::now(),
            digest: [0u8; 32],
        };
        receipt.digest = receipt.compute_digest();
        receipt
    }

    /// Canonical payload:
    /// `domain || receipt_id || type || swap_id || actor || record || issued_at`.
    #[must_use]
    pub fn digest_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(256);
        payload.extend_from_slice(constants::RECEIPT_DIGEST_DOMAIN);
        payload.extend_from_slice(self.id.0.as_bytes());
        payload.extend_from_slice(self.receipt_type.to_string().as_bytes());
        payload.extend_from_slice(&self.swap_id.0.to_le_bytes());
        payload.extend_from_slice(self.actor.as_str().as_bytes());
        payload.extend_from_slice(&self.record.canonical_bytes());
        payload.extend_from_slice(&self.issued_at.timestamp_micros().to_le_bytes());
        payload
    }

    /// SHA-256 over the domain-separated payload.
    #[must_use]
    pub fn compute_digest(&self) -> [u8; 32] {
        Sha256::digest(self.digest_payload()).into()
    }

    /// Whether the stored digest still matches the receipt contents.
    #[must_use]
    pub fn verify_digest(&self) -> bool {
        self.digest == self.compute_digest()
    }

    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}
