use serde::{Deserialize, Serialize};

use crate::error::PsaModelError;
use crate::types::{Money, Rate, Volume};
use crate::PsaModelResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Operating inputs for a single period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodInputs {
    /// Production (1,000 bbl)
    pub production: Volume,
    /// Capital expenditure ($ thousand)
    pub capital_expenditure: Money,
    /// Operating cost per unit of production ($/bbl, i.e. $ thousand per 1,000 bbl)
    pub unit_operating_cost: Money,
}

/// Fiscal terms of the production-sharing agreement.
///
/// Every field falls back to the reference terms when omitted from a
/// serialized scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractParameters {
    /// Oil price ($/bbl), constant across the horizon
    pub oil_price: Money,
    /// Royalty as a fraction of gross revenue
    pub royalty_rate: Rate,
    /// Cost recovery cap as a fraction of gross revenue
    pub cost_recovery_limit: Rate,
    /// IOC share of profit oil; the State takes the remainder
    pub ioc_profit_oil_split: Rate,
    /// Corporate income tax rate on IOC taxable income
    pub income_tax_rate: Rate,
    /// Signature bonus paid by the IOC in period 1 ($ thousand)
    pub signature_bonus: Money,
    /// Straight-line depreciation term (periods)
    pub depreciation_term: u32,
    /// Discount rate for the half-year DCF convention
    pub discount_rate: Rate,
}

impl Default for ContractParameters {
    fn default() -> Self {
        Self {
            oil_price: 20.0,
            royalty_rate: 0.10,
            cost_recovery_limit: 0.50,
            ioc_profit_oil_split: 0.40,
            income_tax_rate: 0.30,
            signature_bonus: 10_000.0,
            depreciation_term: 5,
            discount_rate: 0.12,
        }
    }
}

/// Base yearly operating series plus contract parameters.
///
/// Periods are implicitly 1-indexed and contiguous: `periods[0]` is period 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInputs {
    pub periods: Vec<PeriodInputs>,
    #[serde(default)]
    pub parameters: ContractParameters,
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

const REFERENCE_PRODUCTION: [Volume; 19] = [
    0.0, 0.0, 578.0, 6100.0, 9420.0, 12400.0, 10850.0, 9494.0, 8307.0, 7269.0, 6360.0, 5565.0,
    4869.0, 4261.0, 3728.0, 3262.0, 2854.0, 2498.0, 2185.0,
];

const REFERENCE_CAPEX: [Money; 19] = [
    30000.0, 40000.0, 100000.0, 60000.0, 70000.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0, 0.0, 0.0,
];

const REFERENCE_UNIT_OPEX: [Money; 19] = [
    0.0, 0.0, 5.5, 2.6, 2.4, 2.3, 2.36, 2.4, 2.46, 2.54, 2.64, 2.72, 2.82, 2.94, 3.08, 3.24, 3.4,
    3.6, 3.4,
];

impl ScenarioInputs {
    pub fn new(periods: Vec<PeriodInputs>, parameters: ContractParameters) -> Self {
        Self {
            periods,
            parameters,
        }
    }

    /// Build a scenario from three parallel columns.
    pub fn from_columns(
        production: &[Volume],
        capital_expenditure: &[Money],
        unit_operating_cost: &[Money],
        parameters: ContractParameters,
    ) -> PsaModelResult<Self> {
        let n = production.len();
        for (field, len) in [
            ("capital_expenditure", capital_expenditure.len()),
            ("unit_operating_cost", unit_operating_cost.len()),
        ] {
            if len != n {
                return Err(PsaModelError::DimensionMismatch {
                    context: field.into(),
                    expected: n,
                    actual: len,
                });
            }
        }

        let periods = production
            .iter()
            .zip(capital_expenditure)
            .zip(unit_operating_cost)
            .map(|((&production, &capital_expenditure), &unit_operating_cost)| PeriodInputs {
                production,
                capital_expenditure,
                unit_operating_cost,
            })
            .collect();

        Ok(Self::new(periods, parameters))
    }

    /// The 19-period reference development: five years of capital spend,
    /// first oil in period 3, plateau in period 6 and decline thereafter.
    pub fn reference() -> Self {
        let periods = REFERENCE_PRODUCTION
            .iter()
            .zip(REFERENCE_CAPEX.iter())
            .zip(REFERENCE_UNIT_OPEX.iter())
            .map(|((&production, &capital_expenditure), &unit_operating_cost)| PeriodInputs {
                production,
                capital_expenditure,
                unit_operating_cost,
            })
            .collect();
        Self::new(periods, ContractParameters::default())
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn total_capital_expenditure(&self) -> Money {
        self.periods.iter().map(|p| p.capital_expenditure).sum()
    }

    /// Check the caller-side preconditions of the projection engine.
    ///
    /// The engine itself never calls this; loaders use it to reject malformed
    /// scenarios before they turn into NaN-laden tables.
    pub fn validate(&self) -> PsaModelResult<()> {
        if self.periods.is_empty() {
            return Err(PsaModelError::InsufficientData(
                "Scenario must contain at least one period".into(),
            ));
        }

        for (i, p) in self.periods.iter().enumerate() {
            let period = i + 1;
            for (field, value) in [
                ("production", p.production),
                ("capital_expenditure", p.capital_expenditure),
                ("unit_operating_cost", p.unit_operating_cost),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(PsaModelError::InvalidInput {
                        field: format!("periods[{period}].{field}"),
                        reason: format!("Must be a non-negative number, got {value}"),
                    });
                }
            }
        }

        let p = &self.parameters;
        for (field, value) in [
            ("oil_price", p.oil_price),
            ("signature_bonus", p.signature_bonus),
            ("discount_rate", p.discount_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PsaModelError::InvalidInput {
                    field: field.into(),
                    reason: format!("Must be a non-negative number, got {value}"),
                });
            }
        }
        for (field, value) in [
            ("royalty_rate", p.royalty_rate),
            ("cost_recovery_limit", p.cost_recovery_limit),
            ("ioc_profit_oil_split", p.ioc_profit_oil_split),
            ("income_tax_rate", p.income_tax_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PsaModelError::InvalidInput {
                    field: field.into(),
                    reason: format!("Must be a fraction between 0 and 1, got {value}"),
                });
            }
        }
        if p.depreciation_term == 0 {
            return Err(PsaModelError::InvalidInput {
                field: "depreciation_term".into(),
                reason: "Depreciation term must be at least 1 period".into(),
            });
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scenario_shape() {
        let s = ScenarioInputs::reference();
        assert_eq!(s.len(), 19);
        assert_eq!(s.total_capital_expenditure(), 300_000.0);
        assert_eq!(s.periods[2].production, 578.0);
        assert_eq!(s.periods[2].unit_operating_cost, 5.5);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_default_parameters_are_reference_terms() {
        let p = ContractParameters::default();
        assert_eq!(p.oil_price, 20.0);
        assert_eq!(p.signature_bonus, 10_000.0);
        assert_eq!(p.depreciation_term, 5);
        assert_eq!(p.discount_rate, 0.12);
    }

    #[test]
    fn test_from_columns_dimension_mismatch() {
        let err = ScenarioInputs::from_columns(
            &[1.0, 2.0],
            &[1.0],
            &[1.0, 1.0],
            ContractParameters::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PsaModelError::DimensionMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_validate_rejects_empty() {
        let s = ScenarioInputs::new(vec![], ContractParameters::default());
        assert!(matches!(s.validate(), Err(PsaModelError::InsufficientData(_))));
    }

    #[test]
    fn test_validate_rejects_negative_production() {
        let mut s = ScenarioInputs::reference();
        s.periods[4].production = -1.0;
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("periods[5].production"));
    }

    #[test]
    fn test_validate_rejects_fraction_out_of_range() {
        let mut s = ScenarioInputs::reference();
        s.parameters.royalty_rate = 1.5;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_partial_parameters_deserialize_with_defaults() {
        let json = serde_json::json!({
            "periods": [
                { "production": 0.0, "capital_expenditure": 100.0, "unit_operating_cost": 0.0 },
                { "production": 10.0, "capital_expenditure": 0.0, "unit_operating_cost": 1.0 }
            ],
            "parameters": { "oil_price": 55.0 }
        });
        let s: ScenarioInputs = serde_json::from_value(json).unwrap();
        assert_eq!(s.parameters.oil_price, 55.0);
        assert_eq!(s.parameters.royalty_rate, 0.10);
        assert_eq!(s.len(), 2);
    }
}
