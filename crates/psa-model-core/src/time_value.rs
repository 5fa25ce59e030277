use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Money, Rate};

/// Lower edge of the IRR search bracket (-99%).
pub const IRR_LOWER_BOUND: Rate = -0.99;
/// Upper edge of the first IRR search bracket (1000%).
pub const IRR_UPPER_BOUND: Rate = 10.0;
/// The bracket's upper edge is doubled up to this rate before giving up.
pub const IRR_MAX_UPPER_BOUND: Rate = 10_240.0;

const IRR_GRID_STEPS: usize = 400;
const MAX_BISECTION_ITERATIONS: u32 = 200;
const CONVERGENCE_THRESHOLD: f64 = 1e-12;

/// Mid-period discount factor for a 1-indexed period: `(1 + r)^(period - 0.5)`.
///
/// Cash is assumed to arrive in the middle of each period.
pub fn mid_period_discount_factor(rate: Rate, period: u32) -> f64 {
    (1.0 + rate).powf(period as f64 - 0.5)
}

/// Net Present Value of a series of cash flows, the first flow undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> Money {
    let one_plus_r = 1.0 + rate;
    let mut discount = 1.0;
    let mut result = 0.0;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        result += cf / discount;
    }

    result
}

/// Internal Rate of Return: the rate `r` solving `npv(r, cash_flows) == 0`.
///
/// The bracket `[IRR_LOWER_BOUND, IRR_UPPER_BOUND]` is scanned on a fixed grid.
/// Every sign change between grid points is refined by bisection. A grid cell
/// whose ends share a sign but whose slope changes sign may hide a pair of
/// roots, so its turning point is located and any sign change on either side
/// is bisected too. When several roots exist the one closest to zero is
/// returned.
///
/// With no root in the bracket, the upper edge is doubled up to
/// `IRR_MAX_UPPER_BOUND` and each new window is scanned the same way. The work
/// is bounded; `None` means no root was found.
pub fn irr(cash_flows: &[Money]) -> Option<Rate> {
    if cash_flows.len() < 2 || cash_flows.iter().any(|cf| !cf.is_finite()) {
        return None;
    }

    let mut best = scan_window(cash_flows, IRR_LOWER_BOUND, IRR_UPPER_BOUND);

    let mut lo = IRR_UPPER_BOUND;
    while best.is_none() && lo < IRR_MAX_UPPER_BOUND {
        let hi = (lo * 2.0).min(IRR_MAX_UPPER_BOUND);
        best = scan_window(cash_flows, lo, hi);
        lo = hi;
    }

    if best.is_none() {
        tracing::debug!(periods = cash_flows.len(), "IRR has no real root in range");
    } else if lo > IRR_UPPER_BOUND {
        tracing::debug!(upper = lo, "IRR found after widening the bracket");
    }
    best
}

/// IRR with the documented fallback: no real root reports 0.
pub fn irr_or_zero(cash_flows: &[Money]) -> Rate {
    irr(cash_flows).unwrap_or(0.0)
}

/// Root closest to zero inside `[lower, upper]`, from an `IRR_GRID_STEPS` scan.
fn scan_window(cash_flows: &[Money], lower: Rate, upper: Rate) -> Option<Rate> {
    let step = (upper - lower) / IRR_GRID_STEPS as f64;
    let mut best: Option<Rate> = None;
    let mut keep = |r: Rate| {
        best = match best {
            Some(b) if b.abs() <= r.abs() => Some(b),
            _ => Some(r),
        };
    };

    let mut lo = lower;
    let mut f_lo = npv(lo, cash_flows);
    let mut d_lo = npv_slope(lo, cash_flows);

    for i in 1..=IRR_GRID_STEPS {
        let hi = if i == IRR_GRID_STEPS { upper } else { lower + step * i as f64 };
        let f_hi = npv(hi, cash_flows);
        let d_hi = npv_slope(hi, cash_flows);

        if f_lo == 0.0 {
            keep(lo);
        } else if f_lo.signum() != f_hi.signum() {
            keep(bisect(cash_flows, lo, hi, f_lo));
        } else if d_lo.signum() != d_hi.signum() {
            // Same sign at both ends, turning point inside
            let turn = turning_point(cash_flows, lo, hi, d_lo);
            let f_turn = npv(turn, cash_flows);
            if f_turn == 0.0 {
                keep(turn);
            } else if f_turn.signum() != f_lo.signum() {
                keep(bisect(cash_flows, lo, turn, f_lo));
                keep(bisect(cash_flows, turn, hi, f_turn));
            }
        }

        lo = hi;
        f_lo = f_hi;
        d_lo = d_hi;
    }

    if f_lo == 0.0 {
        keep(lo);
    }
    best
}

/// Derivative of [`npv`] with respect to the rate.
fn npv_slope(rate: Rate, cash_flows: &[Money]) -> f64 {
    let one_plus_r = 1.0 + rate;
    let mut discount = one_plus_r;
    let mut result = 0.0;

    for (t, cf) in cash_flows.iter().enumerate().skip(1) {
        discount *= one_plus_r;
        result -= t as f64 * cf / discount;
    }

    result
}

/// Bisection on `[lo, hi]`, where `f_lo` and `npv(hi)` have opposite signs.
fn bisect(cash_flows: &[Money], mut lo: Rate, mut hi: Rate, mut f_lo: f64) -> Rate {
    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        let f_mid = npv(mid, cash_flows);

        if f_mid == 0.0 || (hi - lo) < CONVERGENCE_THRESHOLD {
            return mid;
        }

        if f_lo.signum() == f_mid.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Bisection on the slope: the stationary point of `npv` in `[lo, hi]`, where
/// `d_lo` and the slope at `hi` have opposite signs.
fn turning_point(cash_flows: &[Money], mut lo: Rate, mut hi: Rate, d_lo: f64) -> Rate {
    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if (hi - lo) < CONVERGENCE_THRESHOLD {
            return mid;
        }
        if npv_slope(mid, cash_flows).signum() == d_lo.signum() {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Round to one decimal place, half-to-even on the exact binary value.
///
/// Non-finite values pass through unchanged.
pub fn round_dp1(value: f64) -> f64 {
    match Decimal::from_f64_retain(value) {
        Some(d) => d
            .round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven)
            .to_f64()
            .unwrap_or(value),
        None => value,
    }
}
