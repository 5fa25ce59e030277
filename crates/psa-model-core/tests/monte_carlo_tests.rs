#![cfg(feature = "monte_carlo")]

use approx::assert_abs_diff_eq;

use psa_model_core::monte_carlo::{
    run_monte_carlo, sample_trial_factors, simulate, simulate_parallel, summarize_outcomes,
    MonteCarloConfig, TrialFactors, WorkerPool,
};
use psa_model_core::scenario::ScenarioInputs;
use psa_model_core::PsaModelError;

#[test]
fn test_identity_trial_matches_golden_ioc_results() {
    let base = ScenarioInputs::reference();
    let out = simulate(&base, &[TrialFactors::identity(0, base.len())]).unwrap();
    assert_abs_diff_eq!(out[0].npv, 62_797.966_808_917, epsilon = 1e-4);
    assert_abs_diff_eq!(out[0].irr_pct, 19.549_366_175, epsilon = 1e-6);
}

#[test]
fn test_price_shock_moves_npv_both_ways() {
    let base = ScenarioInputs::reference();
    let mut low = TrialFactors::identity(0, base.len());
    low.price = 0.5;
    let mut high = TrialFactors::identity(1, base.len());
    high.price = 1.5;

    let out = simulate(&base, &[low, high]).unwrap();
    assert!(out[0].npv < 62_797.0);
    assert!(out[1].npv > 62_798.0);
    assert!(out[1].irr_pct > out[0].irr_pct);
}

#[test]
fn test_sampled_run_parallel_equals_sequential() {
    let base = ScenarioInputs::reference();
    let config = MonteCarloConfig {
        num_trials: 300,
        seed: Some(99),
        ..MonteCarloConfig::default()
    };
    let trials = sample_trial_factors(&config, base.len()).unwrap();

    let pool = WorkerPool::new(Some(4), 16).unwrap();
    let parallel = simulate_parallel(&base, &trials, &pool).unwrap();
    let sequential = simulate(&base, &trials).unwrap();
    assert_eq!(parallel, sequential);

    let ids: Vec<usize> = parallel.iter().map(|o| o.trial_id).collect();
    assert_eq!(ids, (0..300).collect::<Vec<_>>());
}

#[test]
fn test_sampled_distribution_centres_on_base_case() {
    let base = ScenarioInputs::reference();
    let config = MonteCarloConfig {
        num_trials: 500,
        seed: Some(7),
        ..MonteCarloConfig::default()
    };
    let out = run_monte_carlo(&base, &config).unwrap();
    let s = &out.result.summary;

    assert_eq!(s.num_trials, 500);
    assert_eq!(out.result.outcomes.len(), 500);
    assert!(s.npv.percentiles.p5 < s.npv.median);
    assert!(s.npv.median < s.npv.percentiles.p95);
    assert!(s.npv.std_dev > 0.0);
    // 10% noise on every input keeps the median within a broad band of the base case
    assert!(s.npv.median > 0.0 && s.npv.median < 150_000.0, "median {}", s.npv.median);
    assert!((0.0..=1.0).contains(&s.probability_positive_npv));
    assert_eq!(s.npv.histogram.iter().map(|b| b.count as usize).sum::<usize>(), s.num_valid);
}

#[test]
fn test_summary_of_simulated_outcomes() {
    let base = ScenarioInputs::reference();
    let trials: Vec<TrialFactors> = (0..5).map(|i| TrialFactors::identity(i, base.len())).collect();
    let outcomes = simulate(&base, &trials).unwrap();
    let s = summarize_outcomes(&outcomes).unwrap();
    assert_abs_diff_eq!(s.npv.mean, 62_797.966_808_917, epsilon = 1e-4);
    assert_abs_diff_eq!(s.npv.std_dev, 0.0, epsilon = 1e-6);
    assert_eq!(s.probability_positive_npv, 1.0);
}

#[test]
fn test_wrong_horizon_is_dimension_error() {
    let base = ScenarioInputs::reference();
    let err = simulate(&base, &[TrialFactors::identity(0, 3)]).unwrap_err();
    assert!(matches!(err, PsaModelError::DimensionMismatch { expected: 19, actual: 3, .. }));
}
