//! End-to-end calculator: one parameter set in, one [`Report`] out.
//!
//! This is the surface a front end talks to.  It runs the Thompson sampling
//! and control strategies over the same configuration, projects both onto
//! misclassification counts at full request volume and prices the difference.

use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::aggregate::{
    cost_chart_rows, financial_benefit, misclassifications, scale_factor, AllocationTable,
    CostPoint, CostSeries, MisclassificationTable,
};
use crate::allocation::Algorithm;
use crate::control::ControlAllocator;
use crate::error::{validate_accuracies, Error, Result};
use crate::series::{run_strategy, SeriesShape};
use crate::thompson::{BanditState, ThompsonAllocator};

/// Smallest number of models a comparison accepts.
pub const MIN_MODELS: usize = 2;
/// Largest number of models a comparison accepts.
pub const MAX_MODELS: usize = 10;

/// Adaptive routing algorithm compared against the control split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoutingAlgorithm {
    #[default]
    ThompsonSampling,
}

impl RoutingAlgorithm {
    pub fn algorithm(self) -> Algorithm {
        match self {
            Self::ThompsonSampling => Algorithm::ThompsonSampling,
        }
    }
}

impl fmt::Display for RoutingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.algorithm(), f)
    }
}

impl FromStr for RoutingAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thompson sampling" | "thompson" | "thompson_sampling" | "ts" => {
                Ok(Self::ThompsonSampling)
            }
            other => Err(Error::invalid(
                "routing_algorithm",
                format!("unsupported algorithm {other:?}; only Thompson Sampling is available"),
            )),
        }
    }
}

/// Parameters supplied by the caller for one calculation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalculatorConfig {
    /// Cost of one misclassification, in currency units (finite, > 0).
    pub cost_of_failure: f64,
    /// Display label for a time step ("seconds" … "years").  Never used in computation.
    pub time_unit: String,
    /// Number of simulated time steps.
    pub time_series_length: usize,
    /// Reward observations fed back per time step.
    pub rewards_per_step: usize,
    /// Inference requests served per time step.
    pub total_requests: u64,
    /// True accuracy of each model, in index order.
    pub model_accuracies: Vec<f64>,
    pub routing_algorithm: RoutingAlgorithm,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            cost_of_failure: 25.0,
            time_unit: "seconds".to_string(),
            time_series_length: 100,
            rewards_per_step: 50,
            total_requests: 1_000,
            model_accuracies: vec![0.9, 0.9],
            routing_algorithm: RoutingAlgorithm::ThompsonSampling,
        }
    }
}

impl CalculatorConfig {
    /// Number of models, one per accuracy.
    pub fn model_count(&self) -> usize {
        self.model_accuracies.len()
    }

    /// Time-series dimensions for the driver.
    pub fn shape(&self) -> SeriesShape {
        SeriesShape {
            time_steps: self.time_series_length,
            rewards_per_step: self.rewards_per_step,
        }
    }

    /// Axis label for the time dimension, e.g. `Time step (weeks)`.
    pub fn time_axis_label(&self) -> String {
        format!("Time step ({})", self.time_unit)
    }

    /// Check every parameter, naming the first offending one.
    pub fn validate(&self) -> Result<()> {
        if !(self.cost_of_failure.is_finite() && self.cost_of_failure > 0.0) {
            return Err(Error::invalid(
                "cost_of_failure",
                format!("{} is not a positive amount", self.cost_of_failure),
            ));
        }
        let k = self.model_count();
        if !(MIN_MODELS..=MAX_MODELS).contains(&k) {
            return Err(Error::invalid(
                "model_count",
                format!("{k} models given, expected {MIN_MODELS} to {MAX_MODELS}"),
            ));
        }
        validate_accuracies(&self.model_accuracies)?;
        if self.total_requests < 1 {
            return Err(Error::invalid("total_requests", "must be at least 1"));
        }
        self.shape().validate()
    }
}

/// Everything one strategy produced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrategyOutcome {
    pub algorithm: Algorithm,
    pub allocations: AllocationTable,
    pub misclassifications: MisclassificationTable,
    pub cost: CostSeries,
}

impl StrategyOutcome {
    fn build(
        algorithm: Algorithm,
        allocations: AllocationTable,
        accuracies: &[f64],
        scale: u64,
        cost_of_failure: f64,
    ) -> Result<Self> {
        let misclassifications = misclassifications(&allocations, accuracies, scale)?;
        let cost = CostSeries::from_table(algorithm, &misclassifications, cost_of_failure);
        Ok(Self {
            algorithm,
            allocations,
            misclassifications,
            cost,
        })
    }

    /// Misclassifications summed over the `Totals` row.
    pub fn total_misclassifications(&self) -> u64 {
        self.misclassifications.grand_total()
    }
}

/// Misclassification totals for one model under both strategies.
///
/// Values are read from each misclassification table's `Totals` row only;
/// per-step rows are not added on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelMisclassifications {
    pub model: usize,
    pub control: u64,
    pub thompson: u64,
}

/// Result of one calculation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Report {
    pub time_unit: String,
    pub cost_of_failure: f64,
    /// Requests per reward observation; 0 zeroes every projected cost.
    pub scale_factor: u64,
    pub thompson: StrategyOutcome,
    pub control: StrategyOutcome,
    pub per_model: Vec<ModelMisclassifications>,
    /// `(control − thompson) × cost_of_failure`.
    pub financial_benefit: f64,
    /// Bandit counts after the last step.
    pub final_state: BanditState,
}

impl Report {
    /// Errors avoided by the bandit (negative if it made more).
    pub fn error_reduction(&self) -> i64 {
        let c = i64::try_from(self.control.total_misclassifications()).unwrap_or(i64::MAX);
        let t = i64::try_from(self.thompson.total_misclassifications()).unwrap_or(i64::MAX);
        c.saturating_sub(t)
    }

    /// Long-format chart rows: Thompson sampling first, then control.
    pub fn chart_rows(&self) -> Vec<CostPoint> {
        cost_chart_rows([&self.thompson.cost, &self.control.cost])
    }

    /// True when the scale factor floored to zero.
    pub fn is_degenerate(&self) -> bool {
        self.scale_factor == 0
    }
}

/// Run both strategies for `cfg`, drawing all randomness from `rng`.
pub fn calculate<R: Rng + ?Sized>(cfg: &CalculatorConfig, rng: &mut R) -> Result<Report> {
    cfg.validate()?;
    let k = cfg.model_count();
    let accs = cfg.model_accuracies.as_slice();
    let shape = cfg.shape();

    let scale = scale_factor(cfg.total_requests, k, cfg.rewards_per_step)?;
    if scale == 0 {
        tracing::warn!(
            total_requests = cfg.total_requests,
            model_count = k,
            rewards_per_step = cfg.rewards_per_step,
            "scale factor floors to zero; projected misclassification costs will all be zero"
        );
    }

    let adaptive = cfg.routing_algorithm.algorithm();
    let (ts_series, final_state) = match cfg.routing_algorithm {
        RoutingAlgorithm::ThompsonSampling => run_strategy(&ThompsonAllocator, accs, shape, rng)?,
    };
    let (ctl_series, ()) = run_strategy(&ControlAllocator, accs, shape, rng)?;

    let thompson = StrategyOutcome::build(
        adaptive,
        AllocationTable::normalize_with_models(&ts_series, k),
        accs,
        scale,
        cfg.cost_of_failure,
    )?;
    let control = StrategyOutcome::build(
        Algorithm::Control,
        AllocationTable::normalize_with_models(&ctl_series, k),
        accs,
        scale,
        cfg.cost_of_failure,
    )?;

    let per_model = (0..k)
        .map(|m| ModelMisclassifications {
            model: m,
            control: control.misclassifications.total_for(m),
            thompson: thompson.misclassifications.total_for(m),
        })
        .collect();
    let benefit = financial_benefit(
        control.total_misclassifications(),
        thompson.total_misclassifications(),
        cfg.cost_of_failure,
    );

    tracing::info!(
        control = control.total_misclassifications(),
        thompson = thompson.total_misclassifications(),
        benefit,
        scale,
        "calculation complete"
    );

    Ok(Report {
        time_unit: cfg.time_unit.clone(),
        cost_of_failure: cfg.cost_of_failure,
        scale_factor: scale,
        thompson,
        control,
        per_model,
        financial_benefit: benefit,
        final_state,
    })
}

/// [`calculate`] with a fresh OS-seeded source (non-reproducible).
pub fn calculate_unseeded(cfg: &CalculatorConfig) -> Result<Report> {
    calculate(cfg, &mut rand::rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::RowLabel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn default_config_is_valid() {
        CalculatorConfig::default().validate().unwrap();
    }

    #[test]
    fn validation_names_parameter() {
        let bad = |f: fn(&mut CalculatorConfig)| {
            let mut c = CalculatorConfig::default();
            f(&mut c);
            c.validate().unwrap_err().param()
        };
        assert_eq!(bad(|c| c.cost_of_failure = 0.0), "cost_of_failure");
        assert_eq!(bad(|c| c.cost_of_failure = f64::INFINITY), "cost_of_failure");
        assert_eq!(bad(|c| c.model_accuracies = vec![0.9]), "model_count");
        assert_eq!(bad(|c| c.model_accuracies = vec![0.5; 11]), "model_count");
        assert_eq!(bad(|c| c.model_accuracies = vec![0.5, 1.2]), "model_accuracies");
        assert_eq!(bad(|c| c.time_series_length = 0), "time_series_length");
        assert_eq!(bad(|c| c.rewards_per_step = 0), "rewards_per_step");
        assert_eq!(bad(|c| c.total_requests = 0), "total_requests");
    }

    #[test]
    fn routing_algorithm_parses_form_label() {
        assert_eq!(
            "Thompson Sampling".parse::<RoutingAlgorithm>().unwrap(),
            RoutingAlgorithm::ThompsonSampling
        );
        assert_eq!(
            "epsilon-greedy".parse::<RoutingAlgorithm>().unwrap_err().param(),
            "routing_algorithm"
        );
        assert_eq!(RoutingAlgorithm::ThompsonSampling.to_string(), "Thompson Sampling");
    }

    #[test]
    fn time_unit_is_label_only() {
        let mut a = CalculatorConfig {
            time_series_length: 5,
            ..CalculatorConfig::default()
        };
        let mut b = a.clone();
        a.time_unit = "weeks".into();
        b.time_unit = "years".into();
        let ra = calculate(&a, &mut StdRng::seed_from_u64(3)).unwrap();
        let rb = calculate(&b, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(ra.financial_benefit, rb.financial_benefit);
        assert_eq!(ra.thompson.allocations, rb.thompson.allocations);
        assert_eq!(a.time_axis_label(), "Time step (weeks)");
    }

    #[test]
    fn report_is_consistent() {
        let cfg = CalculatorConfig {
            time_series_length: 20,
            model_accuracies: vec![0.6, 0.95, 0.8],
            ..CalculatorConfig::default()
        };
        let r = calculate(&cfg, &mut StdRng::seed_from_u64(17)).unwrap();

        assert_eq!(r.scale_factor, 1000 / 3 / 50);
        assert_eq!(r.per_model.len(), 3);
        let ctl: u64 = r.per_model.iter().map(|m| m.control).sum();
        let ts: u64 = r.per_model.iter().map(|m| m.thompson).sum();
        assert_eq!(ctl, r.control.total_misclassifications());
        assert_eq!(ts, r.thompson.total_misclassifications());
        assert_eq!(r.financial_benefit, r.error_reduction() as f64 * cfg.cost_of_failure);

        assert_eq!(r.chart_rows().len(), 40);
        assert_eq!(r.thompson.cost.values.len(), 20);
        assert_eq!(r.final_state.pulls().iter().sum::<u64>(), 20 * 50);
        assert!(!r.is_degenerate());
    }

    #[test]
    fn per_model_reads_totals_row() {
        let cfg = CalculatorConfig {
            time_series_length: 6,
            model_accuracies: vec![0.5, 0.9],
            ..CalculatorConfig::default()
        };
        let r = calculate(&cfg, &mut StdRng::seed_from_u64(8)).unwrap();
        for m in &r.per_model {
            let ctl = &r.control.misclassifications;
            let ts = &r.thompson.misclassifications;
            assert_eq!(m.control, ctl.get(RowLabel::Totals, m.model));
            assert_eq!(m.thompson, ts.get(RowLabel::Totals, m.model));
        }
    }

    #[test]
    fn small_request_volume_zeroes_costs() {
        let cfg = CalculatorConfig {
            total_requests: 10,
            time_series_length: 4,
            model_accuracies: vec![0.2, 0.4],
            ..CalculatorConfig::default()
        };
        let r = calculate(&cfg, &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(r.is_degenerate());
        assert_eq!(r.financial_benefit, 0.0);
        assert!(r.control.cost.values.iter().all(|&v| v == 0.0));
        assert!(r.thompson.cost.values.iter().all(|&v| v == 0.0));
    }
}
