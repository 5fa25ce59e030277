use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::kpi::{summarize_projection, KpiResult, KpiRow};
use crate::projection::{project, ProjectionTable, ProjectionTotals};
use crate::scenario::ScenarioInputs;
use crate::time_value::irr;
use crate::types::{with_metadata, ComputationOutput};
use crate::PsaModelResult;

/// Projection plus KPIs for a single scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsaEvaluation {
    pub projection: ProjectionTable,
    pub totals: ProjectionTotals,
    pub kpis: KpiResult,
    /// The KPI table laid out as 6 metric rows × 3 stakeholder columns
    pub kpi_table: Vec<KpiRow>,
}

/// Validate a scenario, project it and derive its KPIs.
///
/// Unlike [`project`], this rejects scenarios that break the engine's
/// preconditions, and reports numeric conventions that were applied (IRR
/// fallback, undefined payback) as warnings.
pub fn evaluate_scenario(
    inputs: &ScenarioInputs,
) -> PsaModelResult<ComputationOutput<PsaEvaluation>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    inputs.validate()?;

    let projection = project(inputs);
    let kpis = summarize_projection(&projection);

    let series = [
        ("IOC", projection.ioc_cash_flows()),
        ("State", projection.state_cash_flows()),
        ("Project", projection.project_cash_flows()),
    ];
    for (label, cf) in &series {
        if irr(cf).is_none() {
            warnings.push(format!("{label} IRR has no real root; reported as 0"));
        }
    }
    for (label, k) in [("IOC", &kpis.ioc), ("State", &kpis.state), ("Project", &kpis.project)] {
        if k.payback_period.is_nan() {
            warnings.push(format!(
                "{label} cumulative cash flow is negative at the end of the horizon; payback undefined"
            ));
        } else if k.discounted_payback_period.is_nan() {
            warnings.push(format!(
                "{label} cumulative discounted cash flow is negative at the end of the horizon; discounted payback undefined"
            ));
        }
    }

    let last = projection.records.last();
    if last.is_some_and(|r| r.cost_recovery_carry_forward > 0.0) {
        warnings.push("Unrecovered cost remains at the end of the horizon".into());
    }

    let totals = projection.totals();
    let kpi_table = kpis.rows();
    let output = PsaEvaluation {
        projection,
        totals,
        kpis,
        kpi_table,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "PSA cash-flow projection (royalty, capped cost recovery, profit-oil split, CIT with loss carry-forward; mid-year discounting)",
        &inputs.parameters,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_evaluation() {
        let out = evaluate_scenario(&ScenarioInputs::reference()).unwrap();
        assert_eq!(out.result.projection.len(), 19);
        assert_eq!(out.result.kpi_table.len(), 6);
        assert_eq!(out.result.kpis.ioc.npv, 62_798.0);
        // State flows never change sign
        assert!(out.warnings.iter().any(|w| w.starts_with("State IRR")));
        assert!(!out.warnings.iter().any(|w| w.starts_with("IOC IRR")));
        assert_eq!(out.metadata.precision, "ieee754_f64");
    }

    #[test]
    fn test_invalid_scenario_rejected() {
        let mut s = ScenarioInputs::reference();
        s.parameters.depreciation_term = 0;
        assert!(evaluate_scenario(&s).is_err());
    }

    #[test]
    fn test_unrecovered_project_warns() {
        let mut s = ScenarioInputs::reference();
        s.parameters.oil_price = 2.0;
        let out = evaluate_scenario(&s).unwrap();
        assert!(out.result.kpis.ioc.payback_period.is_nan());
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("IOC cumulative cash flow")));
    }
}
