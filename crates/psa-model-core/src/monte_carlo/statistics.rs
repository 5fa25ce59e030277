use serde::{Deserialize, Serialize};

use crate::error::PsaModelError;
use crate::monte_carlo::driver::TrialOutcome;
use crate::PsaModelResult;

const HISTOGRAM_BINS: usize = 20;

/// Percentile summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// A single histogram bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
    pub frequency: f64,
}

/// Descriptive statistics of one outcome across trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeStatistics {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
    pub histogram: Vec<HistogramBin>,
}

/// Distribution of IOC NPV and IRR over a set of trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub num_trials: usize,
    /// Trials whose NPV and IRR were both finite
    pub num_valid: usize,
    pub npv: OutcomeStatistics,
    pub irr_pct: OutcomeStatistics,
    /// Share of valid trials with NPV > 0
    pub probability_positive_npv: f64,
}

/// Linear-interpolated percentile of a non-empty, sorted slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let i = rank.floor() as usize;
    let next = sorted[(i + 1).min(sorted.len() - 1)];
    sorted[i] + rank.fract() * (next - sorted[i])
}

/// Equal-width bins over `[min, max]` of a sorted sample; the last bin is
/// closed on the right. Counts come from binary searches on the sorted values.
/// A sample without spread (every trial hit the same NPV) gets one bin.
fn histogram(sorted: &[f64], num_bins: usize) -> Vec<HistogramBin> {
    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
    let num_bins = if max > min { num_bins } else { 1 };
    let width = (max - min) / num_bins as f64;
    let n = sorted.len() as f64;

    let mut counted = 0;
    (0..num_bins)
        .map(|i| {
            let last = i + 1 == num_bins;
            let lower = min + i as f64 * width;
            let upper = if last { max } else { lower + width };
            let end = if last {
                sorted.len()
            } else {
                sorted.partition_point(|v| *v < upper)
            };
            let count = end - counted;
            counted = end;
            HistogramBin {
                lower,
                upper,
                count: count as u32,
                frequency: count as f64 / n,
            }
        })
        .collect()
}

/// Statistics of a non-empty sample of finite values. Sorts in place.
fn describe(values: &mut [f64]) -> OutcomeStatistics {
    values.sort_by(f64::total_cmp);
    let n = values.len() as f64;

    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    OutcomeStatistics {
        mean,
        median: percentile(values, 50.0),
        std_dev: variance.sqrt(),
        min: values[0],
        max: values[values.len() - 1],
        percentiles: Percentiles {
            p5: percentile(values, 5.0),
            p10: percentile(values, 10.0),
            p25: percentile(values, 25.0),
            p50: percentile(values, 50.0),
            p75: percentile(values, 75.0),
            p90: percentile(values, 90.0),
            p95: percentile(values, 95.0),
        },
        histogram: histogram(values, HISTOGRAM_BINS),
    }
}

/// Summarize trial outcomes. Trials with a non-finite NPV or IRR are
/// excluded; at least one finite trial is required.
pub fn summarize_outcomes(outcomes: &[TrialOutcome]) -> PsaModelResult<MonteCarloSummary> {
    let (mut npvs, mut irrs): (Vec<f64>, Vec<f64>) = outcomes
        .iter()
        .filter(|o| o.npv.is_finite() && o.irr_pct.is_finite())
        .map(|o| (o.npv, o.irr_pct))
        .unzip();

    if npvs.is_empty() {
        return Err(PsaModelError::InsufficientData(
            "No trial produced a finite NPV and IRR".into(),
        ));
    }

    let positive = npvs.iter().filter(|v| **v > 0.0).count();
    let num_valid = npvs.len();

    Ok(MonteCarloSummary {
        num_trials: outcomes.len(),
        num_valid,
        probability_positive_npv: positive as f64 / num_valid as f64,
        npv: describe(&mut npvs),
        irr_pct: describe(&mut irrs),
    })
}
