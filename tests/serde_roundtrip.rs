#![cfg(feature = "serde")]

use mabcalc::{calculate, CalculatorConfig, Report, RoutingAlgorithm};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn partial_config_fills_defaults() {
    let cfg: CalculatorConfig = serde_json::from_str(
        r#"{"cost_of_failure": 40.0, "time_unit": "weeks", "model_accuracies": [0.6, 0.8, 0.9]}"#,
    )
    .unwrap();
    assert_eq!(cfg.cost_of_failure, 40.0);
    assert_eq!(cfg.model_count(), 3);
    assert_eq!(cfg.time_series_length, CalculatorConfig::default().time_series_length);
    assert_eq!(cfg.routing_algorithm, RoutingAlgorithm::ThompsonSampling);
    cfg.validate().unwrap();
}

#[test]
fn report_survives_json() {
    let cfg = CalculatorConfig {
        time_series_length: 6,
        ..CalculatorConfig::default()
    };
    let r = calculate(&cfg, &mut StdRng::seed_from_u64(4)).unwrap();
    let json = serde_json::to_string(&r).unwrap();
    let back: Report = serde_json::from_str(&json).unwrap();
    assert_eq!(back.thompson.allocations, r.thompson.allocations);
    assert_eq!(back.control.misclassifications, r.control.misclassifications);
    assert_eq!(back.per_model, r.per_model);
    assert_eq!(back.final_state, r.final_state);
}
