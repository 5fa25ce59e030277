use serde::{Deserialize, Serialize};

use crate::error::PsaModelError;
use crate::scenario::ScenarioInputs;
use crate::PsaModelResult;

/// Multipliers for one period's operating inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodFactors {
    pub production: f64,
    pub capital_expenditure: f64,
    pub unit_operating_cost: f64,
}

impl PeriodFactors {
    pub const IDENTITY: PeriodFactors = PeriodFactors {
        production: 1.0,
        capital_expenditure: 1.0,
        unit_operating_cost: 1.0,
    };
}

/// The random perturbation of one Monte Carlo trial: a scalar oil-price
/// multiplier and an N × 3 matrix of per-period multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialFactors {
    pub trial_id: usize,
    pub price: f64,
    pub periods: Vec<PeriodFactors>,
}

impl TrialFactors {
    /// All multipliers equal to 1.
    pub fn identity(trial_id: usize, num_periods: usize) -> Self {
        Self {
            trial_id,
            price: 1.0,
            periods: vec![PeriodFactors::IDENTITY; num_periods],
        }
    }

    /// A perturbed copy of `base`. The base scenario is left untouched.
    pub fn apply(&self, base: &ScenarioInputs) -> PsaModelResult<ScenarioInputs> {
        if self.periods.len() != base.len() {
            return Err(PsaModelError::DimensionMismatch {
                context: format!("trial {} period factors", self.trial_id),
                expected: base.len(),
                actual: self.periods.len(),
            });
        }

        let mut scenario = base.clone();
        scenario.parameters.oil_price *= self.price;
        for (p, f) in scenario.periods.iter_mut().zip(&self.periods) {
            p.production *= f.production;
            p.capital_expenditure *= f.capital_expenditure;
            p.unit_operating_cost *= f.unit_operating_cost;
        }
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_leaves_scenario_unchanged() {
        let base = ScenarioInputs::reference();
        let applied = TrialFactors::identity(0, base.len()).apply(&base).unwrap();
        assert_eq!(applied, base);
    }

    #[test]
    fn test_apply_scales_elementwise() {
        let base = ScenarioInputs::reference();
        let mut factors = TrialFactors::identity(3, base.len());
        factors.price = 1.5;
        factors.periods[5] = PeriodFactors {
            production: 0.5,
            capital_expenditure: 2.0,
            unit_operating_cost: 2.0,
        };
        factors.periods[0].capital_expenditure = 0.0;

        let applied = factors.apply(&base).unwrap();
        assert_eq!(applied.parameters.oil_price, 30.0);
        assert_eq!(applied.periods[5].production, 6_200.0);
        assert_eq!(applied.periods[5].capital_expenditure, 0.0);
        assert_eq!(applied.periods[5].unit_operating_cost, 4.6);
        assert_eq!(applied.periods[0].capital_expenditure, 0.0);
        // Base untouched
        assert_eq!(base.parameters.oil_price, 20.0);
        assert_eq!(base.periods[0].capital_expenditure, 30_000.0);
    }

    #[test]
    fn test_apply_rejects_wrong_horizon() {
        let base = ScenarioInputs::reference();
        let err = TrialFactors::identity(7, 10).apply(&base).unwrap_err();
        assert!(matches!(
            err,
            PsaModelError::DimensionMismatch { expected: 19, actual: 10, .. }
        ));
    }
}
