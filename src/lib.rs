//! `mabcalc`: what is adaptive traffic routing worth?
//!
//! Given a handful of model variants with known accuracies, this crate
//! simulates routing reward-feedback traffic to them in two ways and prices
//! the difference:
//!
//! - **Control**: split every time step's traffic evenly, ignoring feedback.
//! - **Thompson sampling**: route each observation to the model whose
//!   Beta-Bernoulli posterior draw is highest, then learn from the revealed
//!   reward.
//!
//! Misclassifications observed on the reward sample are projected onto the
//! full request volume and multiplied by a cost per failure.  The headline
//! number is `(control − thompson) × cost`.
//!
//! **Pipeline:**
//! - [`RewardBatch`]: synthetic 0/1 rewards, one column per model.
//! - [`ControlAllocator`] / [`ThompsonAllocator`]: the two [`AllocationStrategy`]s.
//! - [`run`] / [`run_strategy`]: the time series driver; it alone threads
//!   [`BanditState`] from step to step.
//! - [`AllocationTable`], [`misclassifications`], [`cumulative_cost`]:
//!   aggregation into tables and cost series.
//! - [`calculate`]: everything above for one [`CalculatorConfig`].
//!
//! **Randomness:** every random draw comes from a caller-supplied
//! [`rand::Rng`].  Pass a seeded `StdRng` for reproducible runs, or use the
//! `*_unseeded` helpers for fresh OS entropy.
//!
//! ```rust
//! use mabcalc::{calculate, CalculatorConfig};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let cfg = CalculatorConfig {
//!     model_accuracies: vec![0.7, 0.95],
//!     time_series_length: 30,
//!     ..CalculatorConfig::default()
//! };
//! let report = calculate(&cfg, &mut StdRng::seed_from_u64(7)).unwrap();
//! assert_eq!(report.thompson.cost.values.len(), 30);
//! println!("benefit: ${}", report.financial_benefit);
//! ```
//!
//! **Non-goals:** persistence, real traffic ingestion, bandit algorithms other
//! than Thompson sampling, and presentation (charts, forms).

#![forbid(unsafe_code)]

mod error;
pub use error::{Error, Result};

mod reward;
pub use reward::*;

mod allocation;
pub use allocation::*;

mod control;
pub use control::*;

mod thompson;
pub use thompson::*;

mod series;
pub use series::*;

mod aggregate;
pub use aggregate::*;

mod calculator;
pub use calculator::*;
