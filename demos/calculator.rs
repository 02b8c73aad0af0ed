//! Command-line front end for the calculator.
//!
//! ```text
//! cargo run --example calculator -- --accuracies 0.75 0.9 --steps 52 --time-unit weeks
//! ```
//!
//! Use `--log mabcalc=debug` to trace every simulated step.

use clap::Parser;
use mabcalc::{calculate_unseeded, CalculatorConfig, RoutingAlgorithm};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "calculator")]
#[command(about = "Estimate the value of Thompson-sampling routing versus an even traffic split")]
struct Args {
    /// Cost of one misclassification, in currency units.
    #[arg(long, default_value_t = 25.0)]
    cost_of_failure: f64,

    /// Label for one time step (display only).
    #[arg(long, default_value = "seconds")]
    time_unit: String,

    /// Number of simulated time steps.
    #[arg(long, default_value_t = 100)]
    steps: usize,

    /// Reward observations fed back per time step.
    #[arg(long, default_value_t = 50)]
    rewards_per_step: usize,

    /// Inference requests served per time step.
    #[arg(long, default_value_t = 1_000)]
    total_requests: u64,

    /// Accuracy of each model, in order (2 to 10 values).
    #[arg(long, num_args = 1.., default_values_t = [0.9, 0.9])]
    accuracies: Vec<f64>,

    /// Adaptive routing algorithm.
    #[arg(long, default_value = "Thompson Sampling")]
    routing_algorithm: String,

    #[arg(long, default_value = "info")]
    log: String,
}

impl Args {
    fn to_config(&self) -> mabcalc::Result<CalculatorConfig> {
        Ok(CalculatorConfig {
            cost_of_failure: self.cost_of_failure,
            time_unit: self.time_unit.clone(),
            time_series_length: self.steps,
            rewards_per_step: self.rewards_per_step,
            total_requests: self.total_requests,
            model_accuracies: self.accuracies.clone(),
            routing_algorithm: self.routing_algorithm.parse::<RoutingAlgorithm>()?,
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .init();

    let cfg = args.to_config()?;
    let report = calculate_unseeded(&cfg)?;

    println!("Cumulative financial impact: ${}", report.financial_benefit);
    println!();
    println!("{:>6} {:>10} {:>18}", "model", "Control", "Thompson Sampling");
    for m in &report.per_model {
        println!("{:>6} {:>10} {:>18}", m.model + 1, m.control, m.thompson);
    }
    println!();
    println!(
        "Control misclassifies {} predictions, the bandit {}; the bandit avoids {} errors.",
        report.control.total_misclassifications(),
        report.thompson.total_misclassifications(),
        report.error_reduction()
    );
    println!();
    println!("{:>20} {:>16} {:>18}", cfg.time_axis_label(), "Cost of failure", "Algorithm");
    let stride = (cfg.time_series_length / 10).max(1);
    for p in report.chart_rows().iter().filter(|p| p.time_step % stride == 0) {
        println!("{:>20} {:>16.2} {:>18}", p.time_step, p.cost_of_failure, p.algorithm);
    }
    Ok(())
}
