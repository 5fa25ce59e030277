use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::monte_carlo::factors::TrialFactors;
use crate::projection::project;
use crate::scenario::ScenarioInputs;
use crate::time_value::irr_or_zero;
use crate::PsaModelResult;

/// IOC result of one perturbed projection.
///
/// Values are not rounded: `npv` is the raw sum of the IOC discounted cash
/// flow and `irr_pct` is the IOC IRR in percent (0 when no root exists).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub trial_id: usize,
    pub npv: f64,
    pub irr_pct: f64,
}

/// Project one perturbed copy of `base` and extract the IOC NPV and IRR.
pub fn run_trial(base: &ScenarioInputs, trial: &TrialFactors) -> PsaModelResult<TrialOutcome> {
    let scenario = trial.apply(base)?;
    let table = project(&scenario);

    let npv: f64 = table.ioc_discounted().iter().sum();
    let irr_pct = irr_or_zero(&table.ioc_cash_flows()) * 100.0;

    debug!(trial_id = trial.trial_id, npv, irr_pct, "trial projected");
    Ok(TrialOutcome {
        trial_id: trial.trial_id,
        npv,
        irr_pct,
    })
}

/// Run every trial against the base scenario, in order.
///
/// The base scenario is never mutated; each trial works on its own copy.
/// Fails on the first trial whose factor matrix does not match the horizon.
pub fn simulate(base: &ScenarioInputs, trials: &[TrialFactors]) -> PsaModelResult<Vec<TrialOutcome>> {
    let _span = info_span!("simulate", trials = trials.len(), periods = base.len()).entered();
    trials.iter().map(|t| run_trial(base, t)).collect()
}
