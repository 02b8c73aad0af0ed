//! Aggregation of per-step allocations into tables, costs and totals.
//!
//! The pipeline is:
//!
//! ```text
//! Vec<AllocationCounts> --normalize--> AllocationTable (steps × models + Totals)
//!                       --misclassifications--> MisclassificationTable
//!                       --cumulative_cost--> CostSeries
//! ```
//!
//! Both tables share [`CountTable`].  In an allocation table the `Totals` row
//! is the exact column sum.  In a misclassification table the `Totals` row is
//! the misclassification formula applied to the allocation totals, so it can
//! differ from the sum of the rounded per-step cells by rounding.

use crate::allocation::{Algorithm, AllocationCounts};
use crate::error::{Error, Result};

/// Label of a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLabel {
    /// Zero-based time step.
    Step(usize),
    /// Column sums over every step.
    Totals,
}

/// A time-step × model matrix of counts plus a `Totals` row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CountTable {
    models: Vec<usize>,
    steps: Vec<Vec<u64>>,
    totals: Vec<u64>,
}

/// Routed observations per step and model.
pub type AllocationTable = CountTable;

/// Misclassifications per step and model, projected onto full request volume.
pub type MisclassificationTable = CountTable;

impl CountTable {
    /// Normalize a series whose steps may carry different model keys.
    ///
    /// Columns are the sorted union of keys seen in any step; missing entries
    /// become 0.
    pub fn normalize(series: &[AllocationCounts]) -> Self {
        let mut models: Vec<usize> = series.iter().flat_map(|c| c.models()).collect();
        models.sort_unstable();
        models.dedup();
        Self::with_columns(series, models)
    }

    /// Like [`CountTable::normalize`], but always includes columns `0..model_count`.
    pub fn normalize_with_models(series: &[AllocationCounts], model_count: usize) -> Self {
        let mut models: Vec<usize> = (0..model_count)
            .chain(series.iter().flat_map(|c| c.models()))
            .collect();
        models.sort_unstable();
        models.dedup();
        Self::with_columns(series, models)
    }

    fn with_columns(series: &[AllocationCounts], models: Vec<usize>) -> Self {
        let steps: Vec<Vec<u64>> = series
            .iter()
            .map(|c| models.iter().map(|&m| c.get(m)).collect())
            .collect();
        let totals = column_sums(&steps, models.len());
        Self {
            models,
            steps,
            totals,
        }
    }

    /// Model index of each column, ascending.
    pub fn models(&self) -> &[usize] {
        &self.models
    }

    /// Per-step rows, Totals excluded.
    pub fn steps(&self) -> &[Vec<u64>] {
        &self.steps
    }

    /// The `Totals` row.
    pub fn totals(&self) -> &[u64] {
        &self.totals
    }

    /// Number of per-step rows, excluding `Totals`.
    pub fn time_steps(&self) -> usize {
        self.steps.len()
    }

    /// Cell for `model` at `row` (0 when the model has no column).
    pub fn get(&self, row: RowLabel, model: usize) -> u64 {
        let Some(col) = self.models.iter().position(|&m| m == model) else {
            return 0;
        };
        match row {
            RowLabel::Step(t) => self.steps.get(t).map(|r| r[col]).unwrap_or(0),
            RowLabel::Totals => self.totals[col],
        }
    }

    /// Totals-row value for `model`.
    pub fn total_for(&self, model: usize) -> u64 {
        self.get(RowLabel::Totals, model)
    }

    /// Sum of the `Totals` row.
    pub fn grand_total(&self) -> u64 {
        self.totals.iter().sum()
    }

    /// Sum of each step row across models.
    pub fn step_sums(&self) -> Vec<u64> {
        self.steps.iter().map(|r| r.iter().sum()).collect()
    }

    /// Rows in display order, `Totals` last.
    pub fn rows(&self) -> impl Iterator<Item = (RowLabel, &[u64])> + '_ {
        self.steps
            .iter()
            .enumerate()
            .map(|(t, r)| (RowLabel::Step(t), r.as_slice()))
            .chain(std::iter::once((RowLabel::Totals, self.totals.as_slice())))
    }
}

fn column_sums(rows: &[Vec<u64>], width: usize) -> Vec<u64> {
    let mut out = vec![0u64; width];
    for r in rows {
        for (acc, &v) in out.iter_mut().zip(r) {
            *acc = acc.saturating_add(v);
        }
    }
    out
}

/// Expected misclassifications for `count` requests at `accuracy`, rounded
/// half-to-even.
#[must_use]
pub fn expected_misclassifications(count: u64, accuracy: f64) -> u64 {
    let x = (count as f64 * (1.0 - accuracy)).round_ties_even();
    if x <= 0.0 {
        0
    } else {
        x as u64
    }
}

/// Ratio of inference requests to reward observations in one window.
///
/// `total_requests / model_count / rewards_per_step`, flooring at each step.
/// A result of 0 is valid and zeroes every projected misclassification.
pub fn scale_factor(total_requests: u64, model_count: usize, rewards_per_step: usize) -> Result<u64> {
    if model_count == 0 {
        return Err(Error::invalid("model_count", "must be at least 1"));
    }
    if rewards_per_step == 0 {
        return Err(Error::invalid("rewards_per_step", "must be at least 1"));
    }
    Ok(total_requests / model_count as u64 / rewards_per_step as u64)
}

/// Project an allocation table onto misclassification counts.
///
/// Every cell, the `Totals` row included, becomes
/// `round(count × (1 − accuracy)) × scale_factor`.
pub fn misclassifications(
    table: &AllocationTable,
    accuracies: &[f64],
    scale_factor: u64,
) -> Result<MisclassificationTable> {
    let mut accs = Vec::with_capacity(table.models.len());
    for &m in &table.models {
        match accuracies.get(m) {
            Some(&p) if (0.0..=1.0).contains(&p) => accs.push(p),
            Some(&p) => {
                return Err(Error::invalid(
                    "model_accuracies",
                    format!("accuracy of model {m} is {p}, expected a value in [0, 1]"),
                ))
            }
            None => {
                return Err(Error::invalid(
                    "model_accuracies",
                    format!("no accuracy for model {m} ({} provided)", accuracies.len()),
                ))
            }
        }
    }
    let project = |row: &[u64]| -> Vec<u64> {
        row.iter()
            .zip(&accs)
            .map(|(&c, &p)| expected_misclassifications(c, p).saturating_mul(scale_factor))
            .collect()
    };
    Ok(CountTable {
        models: table.models.clone(),
        steps: table.steps.iter().map(|r| project(r)).collect(),
        totals: project(&table.totals),
    })
}

/// Running cost of misclassification over time steps (Totals row excluded).
pub fn cumulative_cost(table: &MisclassificationTable, cost_per_failure: f64) -> Vec<f64> {
    let mut running = 0u64;
    table
        .step_sums()
        .into_iter()
        .map(|s| {
            running = running.saturating_add(s);
            running as f64 * cost_per_failure
        })
        .collect()
}

/// Headline value: cost avoided by the bandit relative to control.
///
/// Negative when the bandit misclassified more than control.
#[must_use]
pub fn financial_benefit(control_total: u64, thompson_total: u64, cost_per_failure: f64) -> f64 {
    (i128::from(control_total) - i128::from(thompson_total)) as f64 * cost_per_failure
}

/// Cumulative cost series tagged with the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostSeries {
    pub algorithm: Algorithm,
    pub values: Vec<f64>,
}

impl CostSeries {
    pub fn from_table(
        algorithm: Algorithm,
        table: &MisclassificationTable,
        cost_per_failure: f64,
    ) -> Self {
        Self {
            algorithm,
            values: cumulative_cost(table, cost_per_failure),
        }
    }

    /// Final cumulative value (0 for an empty series).
    pub fn last(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }
}

/// One row of the long-format chart table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostPoint {
    pub time_step: usize,
    pub cost_of_failure: f64,
    pub algorithm: Algorithm,
}

/// Stack series into `[time_step, cost_of_failure, algorithm]` rows, in order.
pub fn cost_chart_rows<'a, I>(series: I) -> Vec<CostPoint>
where
    I: IntoIterator<Item = &'a CostSeries>,
{
    series
        .into_iter()
        .flat_map(|s| {
            s.values.iter().enumerate().map(move |(t, &v)| CostPoint {
                time_step: t,
                cost_of_failure: v,
                algorithm: s.algorithm,
            })
        })
        .collect()
}
