use crate::time_value::round_dp1;
use crate::types::Money;

/// Running total of a series.
pub fn cumulative_sum(series: &[Money]) -> Vec<Money> {
    series
        .iter()
        .scan(0.0, |acc, cf| {
            *acc += cf;
            Some(*acc)
        })
        .collect()
}

/// Payback period in periods, rounded to 1 decimal.
///
/// - cumulative never negative: `0.0`
/// - negative up to period `t` and non-negative afterwards:
///   `t + (-C(t) / cf(t + 1))`, with a zero `cf(t + 1)` giving fraction 0
/// - still negative in the final period: `NaN`
///
/// Apply to the discounted series for the discounted payback period.
pub fn payback_period(series: &[Money]) -> f64 {
    let cumulative = cumulative_sum(series);

    let Some(last_negative) = cumulative.iter().rposition(|c| *c < 0.0) else {
        return 0.0;
    };

    let Some(&next_flow) = series.get(last_negative + 1) else {
        return f64::NAN;
    };

    let fraction = if next_flow == 0.0 {
        0.0
    } else {
        -cumulative[last_negative] / next_flow
    };

    round_dp1((last_negative + 1) as f64 + fraction)
}

/// Profitability index of a discounted series, rounded to 1 decimal.
///
/// The largest recovery of the maximum cumulative drawdown,
/// `1 - C(t) / min C`, over periods with positive discounted flow. Periods
/// without a positive flow count as 0. A cumulative series that never goes
/// negative has no capital at risk and yields `+inf`.
pub fn profitability_index(discounted: &[Money]) -> f64 {
    let cumulative = cumulative_sum(discounted);
    let min_cumulative = cumulative.iter().copied().fold(f64::INFINITY, f64::min);

    if min_cumulative >= 0.0 {
        return f64::INFINITY;
    }

    let best = discounted
        .iter()
        .zip(&cumulative)
        .map(|(cf, c)| if *cf > 0.0 { 1.0 - c / min_cumulative } else { 0.0 })
        .fold(0.0, f64::max);

    round_dp1(best)
}
