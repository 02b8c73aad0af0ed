//! Thompson sampling allocation over a reward batch.
//!
//! Every observation in a batch is routed by sampling each model's
//! Beta-Bernoulli posterior and picking the largest draw.  The chosen model's
//! reward cell is then revealed and folded back into its counts, so the
//! posterior sharpens row by row and step by step.
//!
//! Notes:
//! - Posteriors are Laplace-smoothed: `Beta(rewards + 1, penalties + 1)`.
//! - Ties keep the lowest model index (strict `>` scan in index order).
//! - Randomness is injected, so a seeded RNG gives reproducible allocations.

use rand::Rng;
use rand_distr::{Beta, Distribution};

use crate::allocation::{Algorithm, AllocationCounts, AllocationStrategy};
use crate::error::{Error, Result};
use crate::reward::RewardBatch;

/// Reward and penalty counts for one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmCounts {
    pub rewards: u64,
    pub penalties: u64,
}

impl ArmCounts {
    /// Observations folded into this arm so far.
    pub fn pulls(&self) -> u64 {
        self.rewards.saturating_add(self.penalties)
    }

    /// Posterior shape parameters `(alpha, beta)`.
    pub fn posterior(&self) -> (f64, f64) {
        (self.rewards as f64 + 1.0, self.penalties as f64 + 1.0)
    }

    /// Posterior mean of the success probability.
    pub fn posterior_mean(&self) -> f64 {
        let (a, b) = self.posterior();
        a / (a + b)
    }

    fn record(&mut self, reward: u8) {
        if reward == 1 {
            self.rewards = self.rewards.saturating_add(1);
        } else {
            self.penalties = self.penalties.saturating_add(1);
        }
    }
}

/// Per-model counts carried across the whole time series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BanditState {
    arms: Vec<ArmCounts>,
}

impl BanditState {
    /// All-zero state for `model_count` models.
    pub fn new(model_count: usize) -> Self {
        Self {
            arms: vec![ArmCounts::default(); model_count],
        }
    }

    /// State seeded with existing per-model counts, e.g. from an earlier run.
    pub fn from_arms(arms: Vec<ArmCounts>) -> Self {
        Self { arms }
    }

    /// Number of models tracked.
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// True when no models are tracked.
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Counts for every model, in index order.
    pub fn arms(&self) -> &[ArmCounts] {
        &self.arms
    }

    /// Counts for one model.
    pub fn get(&self, model: usize) -> Option<ArmCounts> {
        self.arms.get(model).copied()
    }

    /// `rewards + penalties` per model.
    pub fn pulls(&self) -> Vec<u64> {
        self.arms.iter().map(ArmCounts::pulls).collect()
    }
}

/// Index of the largest value, keeping the first one on ties.
///
/// Returns `None` for an empty slice.  A later value only replaces the
/// incumbent when it is strictly greater.
#[must_use]
pub fn argmax_first(samples: &[f64]) -> Option<usize> {
    let (&first, rest) = samples.split_first()?;
    let mut best = 0;
    let mut best_sample = first;
    for (i, &x) in rest.iter().enumerate() {
        if x > best_sample {
            best_sample = x;
            best = i + 1;
        }
    }
    Some(best)
}

fn posterior_dist(arm: ArmCounts, model: usize) -> Result<Beta<f64>> {
    let (a, b) = arm.posterior();
    Beta::new(a, b).map_err(|e| Error::invalid("bandit_state", format!("model {model}: {e}")))
}

/// Beta-Bernoulli Thompson sampling allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThompsonAllocator;

impl ThompsonAllocator {
    /// Stateless handle; learned counts live in [`BanditState`].
    pub fn new() -> Self {
        Self
    }

    /// Route every row of `batch`, updating `state` as rewards are revealed.
    ///
    /// Each row draws one sample per model from `rng`, in model order.
    /// Returns the selection tally (every model present) and the updated state.
    pub fn allocate<R: Rng + ?Sized>(
        &self,
        batch: &RewardBatch,
        mut state: BanditState,
        rng: &mut R,
    ) -> Result<(AllocationCounts, BanditState)> {
        let k = batch.model_count();
        if k != state.len() {
            return Err(Error::invalid(
                "model_count",
                format!("reward batch has {k} models but bandit state tracks {}", state.len()),
            ));
        }

        // Only the chosen arm's posterior changes per row; rebuild just that one.
        let mut dists = state
            .arms
            .iter()
            .enumerate()
            .map(|(i, &a)| posterior_dist(a, i))
            .collect::<Result<Vec<_>>>()?;
        let mut samples = vec![0.0; k];
        let mut chosen_per_row = Vec::with_capacity(batch.batch_size());

        for row in 0..batch.batch_size() {
            for (s, d) in samples.iter_mut().zip(&dists) {
                *s = d.sample(rng);
            }
            let Some(chosen) = argmax_first(&samples) else {
                break;
            };
            let arm = &mut state.arms[chosen];
            arm.record(batch.reward(row, chosen));
            dists[chosen] = posterior_dist(*arm, chosen)?;
            chosen_per_row.push(chosen);
        }
        Ok((AllocationCounts::tally(chosen_per_row, k), state))
    }
}

impl AllocationStrategy for ThompsonAllocator {
    type State = BanditState;

    fn algorithm(&self) -> Algorithm {
        Algorithm::ThompsonSampling
    }

    fn initial_state(&self, model_count: usize) -> BanditState {
        BanditState::new(model_count)
    }

    fn allocate_step<R: Rng + ?Sized>(
        &self,
        batch: &RewardBatch,
        state: BanditState,
        rng: &mut R,
    ) -> Result<(AllocationCounts, BanditState)> {
        self.allocate(batch, state, rng)
    }
}
