//! Per-step allocation counts and the common allocator interface.
//!
//! An allocator looks at one [`RewardBatch`] and decides how many of its
//! observations each model would have served.  [`ControlAllocator`] and
//! [`ThompsonAllocator`] both implement [`AllocationStrategy`], so the time
//! series driver can be written once for any strategy.
//!
//! [`ControlAllocator`]: crate::ControlAllocator
//! [`ThompsonAllocator`]: crate::ThompsonAllocator

use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::reward::RewardBatch;

/// Which allocation strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Even split regardless of feedback.
    Control,
    /// Beta-Bernoulli Thompson sampling.
    ThompsonSampling,
}

impl Algorithm {
    /// Display label used in chart tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::Control => "Control",
            Self::ThompsonSampling => "Thompson Sampling",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Number of observations routed to each model during one time step.
///
/// Keys are model indices.  Allocators in this crate always emit every index
/// `0..model_count`, but tables built by hand may be sparse; see
/// [`AllocationTable::normalize`](crate::AllocationTable::normalize).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationCounts(BTreeMap<usize, u64>);

impl AllocationCounts {
    /// Empty allocation with no model keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts with every model in `0..model_count` present and zero.
    pub fn zeroed(model_count: usize) -> Self {
        Self((0..model_count).map(|i| (i, 0)).collect())
    }

    /// Tally a sequence of chosen model indices over `0..model_count`.
    ///
    /// Indices outside the range are still counted (and so appear as extra keys).
    pub fn tally<I: IntoIterator<Item = usize>>(selections: I, model_count: usize) -> Self {
        let mut out = Self::zeroed(model_count);
        for i in selections {
            out.increment(i);
        }
        out
    }

    /// Count for `model` (0 when absent).
    pub fn get(&self, model: usize) -> u64 {
        self.0.get(&model).copied().unwrap_or(0)
    }

    /// Add one observation to `model`.
    pub fn increment(&mut self, model: usize) {
        let c = self.0.entry(model).or_insert(0);
        *c = c.saturating_add(1);
    }

    /// Sum over all models.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Number of model keys present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no model keys are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Model indices present, ascending.
    pub fn models(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }

    /// `(model, count)` pairs, ascending by model.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }

    /// Underlying `model -> count` map.
    pub fn as_map(&self) -> &BTreeMap<usize, u64> {
        &self.0
    }
}

impl FromIterator<(usize, u64)> for AllocationCounts {
    fn from_iter<I: IntoIterator<Item = (usize, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<usize, u64>> for AllocationCounts {
    fn from(m: BTreeMap<usize, u64>) -> Self {
        Self(m)
    }
}

/// Common interface for allocation strategies driven over a time series.
///
/// State is passed in by value and handed back after every step, so the
/// caller (normally [`run_strategy`](crate::run_strategy)) is the only owner
/// of sequencing.  Stateless strategies use `()`.
pub trait AllocationStrategy {
    /// Learned state carried from one step to the next.
    type State;

    /// Label attached to this strategy's results.
    fn algorithm(&self) -> Algorithm;

    /// State at step 0.
    fn initial_state(&self, model_count: usize) -> Self::State;

    /// Allocate one batch, returning the counts and the state for the next step.
    fn allocate_step<R: Rng + ?Sized>(
        &self,
        batch: &RewardBatch,
        state: Self::State,
        rng: &mut R,
    ) -> Result<(AllocationCounts, Self::State)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_covers_every_model() {
        let c = AllocationCounts::tally([0, 2, 2, 0, 2], 4);
        assert_eq!(c.len(), 4);
        assert_eq!(c.get(0), 2);
        assert_eq!(c.get(1), 0);
        assert_eq!(c.get(2), 3);
        assert_eq!(c.get(3), 0);
        assert_eq!(c.total(), 5);
    }

    #[test]
    fn missing_key_reads_as_zero() {
        let c: AllocationCounts = [(1, 4)].into_iter().collect();
        assert_eq!(c.get(0), 0);
        assert_eq!(c.models().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn algorithm_labels() {
        assert_eq!(Algorithm::Control.to_string(), "Control");
        assert_eq!(Algorithm::ThompsonSampling.to_string(), "Thompson Sampling");
    }
}
