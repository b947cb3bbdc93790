//! Monotonic swap identifier allocator.

use p2pswap_types::{Result, SwapError, SwapId};

/// Hands out strictly increasing swap identifiers.
///
/// The counter only moves forward, by exactly one per allocation. An id
/// is consumed only when the caller commits an allocation, so a failed
/// open leaves no gap.
#[derive(Debug, Clone)]
pub struct SwapIdAllocator {
    next: SwapId,
}

impl SwapIdAllocator {
    /// Start at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(SwapId(0))
    }

    /// Resume from a known counter value.
    #[must_use]
    pub fn starting_at(next: SwapId) -> Self {
        Self { next }
    }

    /// The id the next allocation will return.
    #[must_use]
    pub fn peek(&self) -> SwapId {
        self.next
    }

    /// Fail early if no further id can be allocated.
    ///
    /// # Errors
    /// Returns `Internal` once the `u64` space is exhausted.
    pub fn ensure_capacity(&self) -> Result<()> {
        self.next
            .checked_next()
            .map(|_| ())
            .ok_or_else(|| SwapError::Internal(format!("swap id space exhausted at {}", self.next)))
    }

    /// Return the current id and advance the counter by one.
    ///
    /// # Errors
    /// Returns `Internal` once the `u64` space is exhausted; the counter is
    /// left unchanged.
    pub fn allocate(&mut self) -> Result<SwapId> {
        self.ensure_capacity()?;
        let id = self.next;
        self.next = SwapId(id.0 + 1);
        Ok(id)
    }
}

impl Default for SwapIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
