//! Time series driver.
//!
//! Runs an allocation strategy for a fixed number of steps.  Each step draws a
//! fresh [`RewardBatch`] and allocates it; the strategy's state (the bandit
//! counts, for Thompson sampling) is threaded explicitly from one step to the
//! next.  Steps are strictly sequential: step `t + 1` reads what step `t` wrote.

use rand::Rng;

use crate::allocation::{Algorithm, AllocationCounts, AllocationStrategy};
use crate::control::ControlAllocator;
use crate::error::{validate_accuracies, Error, Result};
use crate::reward::RewardBatch;
use crate::thompson::{BanditState, ThompsonAllocator};

/// Shape of one simulated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesShape {
    /// Number of time steps (must be >= 1).
    pub time_steps: usize,
    /// Reward observations drawn per step (must be >= 1).
    pub rewards_per_step: usize,
}

impl SeriesShape {
    pub fn validate(&self) -> Result<()> {
        if self.time_steps < 1 {
            return Err(Error::invalid("time_series_length", "must be at least 1"));
        }
        if self.rewards_per_step < 1 {
            return Err(Error::invalid("rewards_per_step", "must be at least 1"));
        }
        Ok(())
    }
}

/// Run `strategy` over `shape.time_steps` steps.
///
/// Returns the per-step allocations and the strategy state after the last step.
pub fn run_strategy<S, R>(
    strategy: &S,
    accuracies: &[f64],
    shape: SeriesShape,
    rng: &mut R,
) -> Result<(Vec<AllocationCounts>, S::State)>
where
    S: AllocationStrategy,
    R: Rng + ?Sized,
{
    shape.validate()?;
    validate_accuracies(accuracies)?;

    let algorithm = strategy.algorithm();
    let mut state = strategy.initial_state(accuracies.len());
    let mut out = Vec::with_capacity(shape.time_steps);
    for step in 0..shape.time_steps {
        let batch = RewardBatch::generate(accuracies, shape.rewards_per_step, rng)?;
        let (counts, next) = strategy.allocate_step(&batch, state, rng)?;
        tracing::debug!(step, %algorithm, counts = ?counts.as_map(), "allocated step");
        state = next;
        out.push(counts);
    }
    Ok((out, state))
}

/// Run the selected strategy and return its per-step allocations.
///
/// The result has exactly `time_steps` entries.
pub fn run<R: Rng + ?Sized>(
    accuracies: &[f64],
    time_steps: usize,
    rewards_per_step: usize,
    algorithm: Algorithm,
    rng: &mut R,
) -> Result<Vec<AllocationCounts>> {
    let shape = SeriesShape {
        time_steps,
        rewards_per_step,
    };
    match algorithm {
        Algorithm::Control => Ok(run_strategy(&ControlAllocator, accuracies, shape, rng)?.0),
        Algorithm::ThompsonSampling => {
            Ok(run_strategy(&ThompsonAllocator, accuracies, shape, rng)?.0)
        }
    }
}

/// Thompson sampling run that also returns the final bandit state.
pub fn run_thompson<R: Rng + ?Sized>(
    accuracies: &[f64],
    shape: SeriesShape,
    rng: &mut R,
) -> Result<(Vec<AllocationCounts>, BanditState)> {
    run_strategy(&ThompsonAllocator, accuracies, shape, rng)
}
