use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, info_span, warn};

use crate::monte_carlo::driver::TrialOutcome;
use crate::monte_carlo::pool::{simulate_parallel, WorkerPool};
use crate::monte_carlo::sampling::{sample_trial_factors, MonteCarloConfig};
use crate::monte_carlo::statistics::{summarize_outcomes, MonteCarloSummary};
use crate::scenario::ScenarioInputs;
use crate::types::{with_metadata, ComputationOutput};
use crate::PsaModelResult;

/// Output of an end-to-end Monte Carlo run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloOutput {
    pub summary: MonteCarloSummary,
    /// Per-trial results, in trial order
    pub outcomes: Vec<TrialOutcome>,
    pub workers: usize,
}

#[derive(Serialize)]
struct Assumptions<'a> {
    scenario: &'a ScenarioInputs,
    config: &'a MonteCarloConfig,
}

/// Sample factors, run the trials on a worker pool and summarize IOC NPV
/// and IRR.
pub fn run_monte_carlo(
    base: &ScenarioInputs,
    config: &MonteCarloConfig,
) -> PsaModelResult<ComputationOutput<MonteCarloOutput>> {
    let start = Instant::now();
    let _span = info_span!("run_monte_carlo", trials = config.num_trials).entered();
    let mut warnings: Vec<String> = Vec::new();

    base.validate()?;
    let trials = sample_trial_factors(config, base.len())?;

    let negative = trials
        .iter()
        .flat_map(|t| {
            std::iter::once(t.price).chain(t.periods.iter().flat_map(|p| {
                [p.production, p.capital_expenditure, p.unit_operating_cost]
            }))
        })
        .filter(|f| *f < 0.0)
        .count();
    if negative > 0 {
        warn!(negative, "negative perturbation factors sampled");
        warnings.push(format!(
            "{negative} sampled factors were negative; affected inputs became negative"
        ));
    }

    let pool = WorkerPool::new(config.workers, config.batch_size)?;
    let outcomes = simulate_parallel(base, &trials, &pool)?;
    let summary = summarize_outcomes(&outcomes)?;

    if summary.num_valid < summary.num_trials {
        warnings.push(format!(
            "{} trials produced non-finite results and were excluded from the summary",
            summary.num_trials - summary.num_valid
        ));
    }

    info!(
        npv_mean = summary.npv.mean,
        irr_mean = summary.irr_pct.mean,
        "monte carlo complete"
    );

    let output = MonteCarloOutput {
        summary,
        outcomes,
        workers: pool.workers(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monte Carlo PSA simulation (multiplicative price, production, capex and opex factors; IOC NPV and IRR)",
        &Assumptions {
            scenario: base,
            config,
        },
        warnings,
        elapsed,
        output,
    ))
}
