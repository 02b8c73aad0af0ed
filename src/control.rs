//! Control allocation: split traffic evenly, ignoring feedback.
//!
//! This is the baseline a bandit is compared against.  Each step, every model
//! receives `floor(n / k)` observations and the remainder goes one apiece to
//! the lowest-indexed models.  The reward content of the batch is never read,
//! so the output depends only on the batch size and the model count.

use rand::Rng;

use crate::allocation::{Algorithm, AllocationCounts, AllocationStrategy};
use crate::error::{Error, Result};
use crate::reward::RewardBatch;

/// Split `total` observations across `model_count` models as evenly as possible.
///
/// Returns an empty allocation when `model_count == 0`.
///
/// ```rust
/// use mabcalc::even_split;
///
/// let c = even_split(10, 3);
/// assert_eq!((c.get(0), c.get(1), c.get(2)), (4, 3, 3));
/// ```
#[must_use]
pub fn even_split(total: u64, model_count: usize) -> AllocationCounts {
    if model_count == 0 {
        return AllocationCounts::new();
    }
    let k = model_count as u64;
    let base = total / k;
    let remainder = (total - base * k) as usize;
    (0..model_count)
        .map(|i| (i, base + u64::from(i < remainder)))
        .collect()
}

/// Stateless even-split allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlAllocator;

impl ControlAllocator {
    /// New even-split allocator.
    pub fn new() -> Self {
        Self
    }

    /// Allocate every observation of `batch` across `model_count` models.
    ///
    /// Fails when `model_count` is zero or disagrees with the batch's columns.
    pub fn allocate(&self, batch: &RewardBatch, model_count: usize) -> Result<AllocationCounts> {
        if model_count == 0 {
            return Err(Error::invalid("model_count", "must be at least 1"));
        }
        if model_count != batch.model_count() {
            return Err(Error::invalid(
                "model_count",
                format!(
                    "{model_count} models requested but the reward batch has {} columns",
                    batch.model_count()
                ),
            ));
        }
        Ok(even_split(batch.batch_size() as u64, model_count))
    }
}

impl AllocationStrategy for ControlAllocator {
    type State = ();

    fn algorithm(&self) -> Algorithm {
        Algorithm::Control
    }

    fn initial_state(&self, _model_count: usize) -> Self::State {}

    fn allocate_step<R: Rng + ?Sized>(
        &self,
        batch: &RewardBatch,
        _state: (),
        _rng: &mut R,
    ) -> Result<(AllocationCounts, ())> {
        Ok((self.allocate(batch, batch.model_count())?, ()))
    }
}
