//! Synthetic reward data for one simulated time step.
//!
//! A [`RewardBatch`] holds, for every model, the binary feedback that model
//! *would* have received for each reward observation in the step: `1` when its
//! prediction was correct, `0` otherwise.  Draws are independent
//! `Bernoulli(accuracy)` samples.

use rand::Rng;
use rand_distr::{Bernoulli, Distribution};

use crate::error::{validate_accuracies, Error, Result};

/// Rectangular table of 0/1 rewards: one column per model, one row per observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardBatch {
    // columns[model][row]
    columns: Vec<Vec<u8>>,
    rows: usize,
}

impl RewardBatch {
    /// Draw `batch_size` rewards per model from `rng`.
    ///
    /// Columns are filled model by model, in index order.
    pub fn generate<R: Rng + ?Sized>(
        accuracies: &[f64],
        batch_size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if batch_size < 1 {
            return Err(Error::invalid("batch_size", "must be at least 1"));
        }
        validate_accuracies(accuracies)?;

        let mut columns: Vec<Vec<u8>> = Vec::with_capacity(accuracies.len());
        for (i, &p) in accuracies.iter().enumerate() {
            let dist = Bernoulli::new(p).map_err(|e| {
                Error::invalid("model_accuracies", format!("model {i}: {e}"))
            })?;
            columns.push((0..batch_size).map(|_| u8::from(dist.sample(rng))).collect());
        }
        Ok(Self {
            columns,
            rows: batch_size,
        })
    }

    /// Draw a batch from a fresh, OS-seeded thread-local source.
    ///
    /// Results are not reproducible; use [`RewardBatch::generate`] with a seeded
    /// RNG when that matters.
    pub fn generate_unseeded(accuracies: &[f64], batch_size: usize) -> Result<Self> {
        Self::generate(accuracies, batch_size, &mut rand::rng())
    }

    /// Build a batch from explicit columns (`columns[model][row]`).
    ///
    /// All columns must be the same non-zero length and contain only 0 or 1.
    pub fn from_columns(columns: Vec<Vec<u8>>) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Err(Error::invalid("columns", "at least one model column is required"));
        };
        let rows = first.len();
        if rows == 0 {
            return Err(Error::invalid("batch_size", "must be at least 1"));
        }
        for (i, c) in columns.iter().enumerate() {
            if c.len() != rows {
                return Err(Error::invalid(
                    "columns",
                    format!("column {i} has {} rows, expected {rows}", c.len()),
                ));
            }
            if c.iter().any(|&v| v > 1) {
                return Err(Error::invalid("columns", format!("column {i} holds a non-binary reward")));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Number of observations (rows).
    pub fn batch_size(&self) -> usize {
        self.rows
    }

    /// Number of models (columns).
    pub fn model_count(&self) -> usize {
        self.columns.len()
    }

    /// Reward for `model` at observation `row`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn reward(&self, row: usize, model: usize) -> u8 {
        self.columns[model][row]
    }

    /// All rewards for one model.
    pub fn column(&self, model: usize) -> Option<&[u8]> {
        self.columns.get(model).map(Vec::as_slice)
    }

    /// Number of `1` cells per model.
    pub fn successes(&self) -> Vec<u64> {
        self.columns
            .iter()
            .map(|c| c.iter().map(|&v| u64::from(v)).sum())
            .collect()
    }
}
