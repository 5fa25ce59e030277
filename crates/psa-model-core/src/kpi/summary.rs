use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::kpi::metrics::{payback_period, profitability_index};
use crate::projection::ProjectionTable;
use crate::time_value::{irr_or_zero, round_dp1};
use crate::types::{Money, Stakeholder};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The six investment decision metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KpiMetric {
    CumulativeCashFlow,
    NetPresentValue,
    InternalRateOfReturn,
    PaybackPeriod,
    DiscountedPaybackPeriod,
    ProfitabilityIndex,
}

impl KpiMetric {
    pub const ALL: [KpiMetric; 6] = [
        KpiMetric::CumulativeCashFlow,
        KpiMetric::NetPresentValue,
        KpiMetric::InternalRateOfReturn,
        KpiMetric::PaybackPeriod,
        KpiMetric::DiscountedPaybackPeriod,
        KpiMetric::ProfitabilityIndex,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            KpiMetric::CumulativeCashFlow => "CCF ($k)",
            KpiMetric::NetPresentValue => "NPV ($k)",
            KpiMetric::InternalRateOfReturn => "IRR (%)",
            KpiMetric::PaybackPeriod => "PP (y)",
            KpiMetric::DiscountedPaybackPeriod => "DPP (y)",
            KpiMetric::ProfitabilityIndex => "PI",
        }
    }
}

/// Metrics for one cash-flow series. All values are rounded to 1 decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeholderKpis {
    /// Undiscounted sum of the series
    pub cumulative_cash_flow: Money,
    /// Sum of the discounted series
    pub npv: Money,
    /// Internal rate of return in percent; 0 when no real root exists
    pub irr_pct: f64,
    /// NaN when the cumulative series never recovers
    #[serde(with = "non_finite")]
    pub payback_period: f64,
    #[serde(with = "non_finite")]
    pub discounted_payback_period: f64,
    /// +inf when the cumulative discounted series never goes negative
    #[serde(with = "non_finite")]
    pub profitability_index: f64,
}

impl StakeholderKpis {
    /// Compute the six metrics from a cash-flow series and its discounted twin.
    pub fn from_series(cash_flows: &[Money], discounted: &[Money]) -> Self {
        Self {
            cumulative_cash_flow: round_dp1(cash_flows.iter().sum()),
            npv: round_dp1(discounted.iter().sum()),
            irr_pct: round_dp1(irr_or_zero(cash_flows) * 100.0),
            payback_period: payback_period(cash_flows),
            discounted_payback_period: payback_period(discounted),
            profitability_index: profitability_index(discounted),
        }
    }

    pub fn get(&self, metric: KpiMetric) -> f64 {
        match metric {
            KpiMetric::CumulativeCashFlow => self.cumulative_cash_flow,
            KpiMetric::NetPresentValue => self.npv,
            KpiMetric::InternalRateOfReturn => self.irr_pct,
            KpiMetric::PaybackPeriod => self.payback_period,
            KpiMetric::DiscountedPaybackPeriod => self.discounted_payback_period,
            KpiMetric::ProfitabilityIndex => self.profitability_index,
        }
    }
}

/// 3 stakeholders × 6 metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiResult {
    pub ioc: StakeholderKpis,
    pub state: StakeholderKpis,
    pub project: StakeholderKpis,
}

/// One metric across the three stakeholders, for tabular output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRow {
    pub metric: String,
    #[serde(rename = "IOC", with = "non_finite")]
    pub ioc: f64,
    #[serde(rename = "State", with = "non_finite")]
    pub state: f64,
    #[serde(rename = "Project", with = "non_finite")]
    pub project: f64,
}

impl KpiResult {
    pub fn stakeholder(&self, stakeholder: Stakeholder) -> &StakeholderKpis {
        match stakeholder {
            Stakeholder::Ioc => &self.ioc,
            Stakeholder::State => &self.state,
            Stakeholder::Project => &self.project,
        }
    }

    pub fn get(&self, stakeholder: Stakeholder, metric: KpiMetric) -> f64 {
        self.stakeholder(stakeholder).get(metric)
    }

    /// The 6 × 3 table, one row per metric.
    pub fn rows(&self) -> Vec<KpiRow> {
        KpiMetric::ALL
            .iter()
            .map(|&metric| KpiRow {
                metric: metric.label().to_string(),
                ioc: self.ioc.get(metric),
                state: self.state.get(metric),
                project: self.project.get(metric),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive the KPI table from the IOC and State cash-flow series.
///
/// The Project column is computed on the elementwise sum of the two
/// stakeholders' series. The four inputs are expected to share one horizon.
pub fn summarize(
    ioc_cf: &[Money],
    ioc_dcf: &[Money],
    state_cf: &[Money],
    state_dcf: &[Money],
) -> KpiResult {
    let project_cf: Vec<Money> = ioc_cf.iter().zip(state_cf).map(|(a, b)| a + b).collect();
    let project_dcf: Vec<Money> = ioc_dcf.iter().zip(state_dcf).map(|(a, b)| a + b).collect();

    KpiResult {
        ioc: StakeholderKpis::from_series(ioc_cf, ioc_dcf),
        state: StakeholderKpis::from_series(state_cf, state_dcf),
        project: StakeholderKpis::from_series(&project_cf, &project_dcf),
    }
}

/// `summarize` over the cash-flow columns of a projection.
pub fn summarize_projection(table: &ProjectionTable) -> KpiResult {
    summarize(
        &table.ioc_cash_flows(),
        &table.ioc_discounted(),
        &table.state_cash_flows(),
        &table.state_discounted(),
    )
}

// ---------------------------------------------------------------------------
// Serde: keep NaN / ±inf distinguishable in JSON
// ---------------------------------------------------------------------------

mod non_finite {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(v),
            Repr::Text(s) => match s.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(serde::de::Error::custom(format!(
                    "expected a number, \"NaN\", \"inf\" or \"-inf\", got \"{other}\""
                ))),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flat_non_negative_series() {
        let cf = [10.0, 10.0, 10.0];
        let k = StakeholderKpis::from_series(&cf, &cf);
        assert_eq!(k.cumulative_cash_flow, 30.0);
        assert_eq!(k.payback_period, 0.0);
        assert_eq!(k.discounted_payback_period, 0.0);
        assert_eq!(k.profitability_index, f64::INFINITY);
        // No sign change, no IRR
        assert_eq!(k.irr_pct, 0.0);
    }

    #[test]
    fn test_simple_investment() {
        let cf = [-100.0, 60.0, 60.0];
        let dcf = [-100.0, 50.0, 40.0];
        let k = StakeholderKpis::from_series(&cf, &dcf);
        assert_eq!(k.cumulative_cash_flow, 20.0);
        assert_eq!(k.npv, -10.0);
        // -100 + 60/(1+r) + 60/(1+r)^2 = 0 -> r ≈ 13.07%
        assert_abs_diff_eq!(k.irr_pct, 13.1, epsilon = 1e-9);
        // Cumulative: -100, -40, 20 -> 2 + 40/60
        assert_abs_diff_eq!(k.payback_period, 2.7, epsilon = 1e-9);
        assert!(k.discounted_payback_period.is_nan());
        // Discounted cumulative: -100, -50, -10 -> best recovery 1 - (-10/-100)
        assert_abs_diff_eq!(k.profitability_index, 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_project_column_is_elementwise_sum() {
        let ioc = [-100.0, 30.0, 90.0];
        let state = [10.0, 20.0, 30.0];
        let k = summarize(&ioc, &ioc, &state, &state);
        let expected = StakeholderKpis::from_series(&[-90.0, 50.0, 120.0], &[-90.0, 50.0, 120.0]);
        assert_eq!(k.project, expected);
    }

    #[test]
    fn test_lookup_by_stakeholder_and_metric() {
        let ioc = [-100.0, 60.0, 60.0];
        let state = [5.0, 5.0, 5.0];
        let k = summarize(&ioc, &ioc, &state, &state);
        assert_eq!(k.get(Stakeholder::Ioc, KpiMetric::CumulativeCashFlow), 20.0);
        assert_eq!(k.get(Stakeholder::State, KpiMetric::CumulativeCashFlow), 15.0);
        assert_eq!(k.get(Stakeholder::State, KpiMetric::ProfitabilityIndex), f64::INFINITY);
        assert_eq!(k.get(Stakeholder::Project, KpiMetric::CumulativeCashFlow), 35.0);
    }

    #[test]
    fn test_rows_layout() {
        let cf = [-10.0, 20.0];
        let k = summarize(&cf, &cf, &cf, &cf);
        let rows = k.rows();
        assert_eq!(rows.len(), 6);
        let labels: Vec<&str> = rows.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(labels, vec!["CCF ($k)", "NPV ($k)", "IRR (%)", "PP (y)", "DPP (y)", "PI"]);
    }

    #[test]
    fn test_non_finite_values_serialize_as_strings() {
        let cf = [-100.0, 10.0];
        let state = [1.0, 1.0];
        let k = summarize(&cf, &cf, &state, &state);
        let json = serde_json::to_value(&k).unwrap();
        assert_eq!(json["ioc"]["payback_period"], "NaN");
        assert_eq!(json["state"]["profitability_index"], "inf");

        let back: KpiResult = serde_json::from_value(json).unwrap();
        assert!(back.ioc.payback_period.is_nan());
        assert_eq!(back.state.profitability_index, f64::INFINITY);
    }
}
