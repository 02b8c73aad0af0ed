use mabcalc::{
    calculate, misclassifications, run, AllocationTable, Algorithm, CalculatorConfig,
    ControlAllocator, RewardBatch,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn control_splits_two_perfect_models_evenly_and_never_misclassifies() {
    let accs = [1.0, 1.0];
    let batch = RewardBatch::generate_unseeded(&accs, 10).unwrap();
    let c = ControlAllocator.allocate(&batch, 2).unwrap();
    assert_eq!(c.iter().collect::<Vec<_>>(), vec![(0, 5), (1, 5)]);

    let mut rng = StdRng::seed_from_u64(0);
    for alg in [Algorithm::Control, Algorithm::ThompsonSampling] {
        let series = run(&accs, 8, 10, alg, &mut rng).unwrap();
        let table = AllocationTable::normalize_with_models(&series, 2);
        let m = misclassifications(&table, &accs, 10).unwrap();
        assert_eq!(m.grand_total(), 0, "{alg}");
        assert!(m.steps().iter().flatten().all(|&v| v == 0));
    }
}

#[test]
fn control_remainder_lands_on_first_model() {
    let batch = RewardBatch::generate_unseeded(&[0.3, 0.6, 0.9], 10).unwrap();
    let c = ControlAllocator.allocate(&batch, 3).unwrap();
    assert_eq!(c.iter().collect::<Vec<_>>(), vec![(0, 4), (1, 3), (2, 3)]);
}

fn better_arm_share(series: &[mabcalc::AllocationCounts]) -> f64 {
    let table = AllocationTable::normalize_with_models(series, 2);
    let totals = table.totals();
    totals[1] as f64 / (totals[0] + totals[1]) as f64
}

#[test]
fn thompson_concentrates_on_more_accurate_model() {
    let mut rng = StdRng::seed_from_u64(2024);
    let series = run(&[0.5, 0.9], 60, 100, Algorithm::ThompsonSampling, &mut rng).unwrap();
    let share = better_arm_share(&series);
    assert!(share > 0.8, "share of 0.9 model = {share}");

    // Later steps should lean harder on the better model than the first one.
    let first = series[0].get(1) as f64 / 100.0;
    let late: f64 = series[50..].iter().map(|c| c.get(1) as f64).sum::<f64>() / 1000.0;
    assert!(late >= first, "first={first} late={late}");
}

#[test]
fn thompson_trend_holds_without_a_seed() {
    let series = run(
        &[0.5, 0.9],
        50,
        100,
        Algorithm::ThompsonSampling,
        &mut rand::rng(),
    )
    .unwrap();
    let share = better_arm_share(&series);
    assert!(share > 0.6, "share of 0.9 model = {share}");
}

#[test]
fn bandit_beats_control_when_models_differ() {
    let cfg = CalculatorConfig {
        cost_of_failure: 25.0,
        time_series_length: 60,
        rewards_per_step: 50,
        total_requests: 1_000,
        model_accuracies: vec![0.5, 0.9],
        ..CalculatorConfig::default()
    };
    let r = calculate(&cfg, &mut StdRng::seed_from_u64(99)).unwrap();
    assert!(r.financial_benefit > 0.0, "benefit={}", r.financial_benefit);
    assert!(r.error_reduction() > 0);
    assert!(r.thompson.cost.last() < r.control.cost.last());

    // Control is deterministic: 25 rows per model per step, 60 steps.
    assert_eq!(r.control.allocations.totals(), &[1500, 1500]);
    // round(1500 * 0.5) * 10 + round(1500 * 0.1) * 10
    assert_eq!(r.control.total_misclassifications(), 7500 + 1500);
}

#[test]
fn chart_rows_pair_each_step_with_both_algorithms() {
    let cfg = CalculatorConfig {
        time_series_length: 12,
        ..CalculatorConfig::default()
    };
    let r = calculate(&cfg, &mut StdRng::seed_from_u64(5)).unwrap();
    let rows = r.chart_rows();
    assert_eq!(rows.len(), 24);
    assert!(rows[..12].iter().all(|p| p.algorithm == Algorithm::ThompsonSampling));
    assert!(rows[12..].iter().all(|p| p.algorithm == Algorithm::Control));
    assert_eq!(
        rows[..12].iter().map(|p| p.time_step).collect::<Vec<_>>(),
        (0..12).collect::<Vec<_>>()
    );
}
