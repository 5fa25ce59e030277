use crate::scenario::PeriodInputs;
use crate::types::Money;

/// Straight-line depreciation schedule over the whole horizon.
///
/// Each period with positive capital spend opens a tranche of
/// `capex / term` per period. A tranche starts at the later of its spend
/// period and the first period with positive production (its own spend period
/// when the field never produces). Tranche amounts that would fall past the
/// last period are written off in the last period, so the schedule always sums
/// to total capital expenditure.
///
/// A term of 0 is treated as 1.
pub fn depreciation_schedule(periods: &[PeriodInputs], term: u32) -> Vec<Money> {
    let n = periods.len();
    let mut schedule = vec![0.0; n];
    if n == 0 {
        return schedule;
    }

    let term = term.max(1) as usize;
    let first_production = periods.iter().position(|p| p.production > 0.0);
    let mut written_off = 0.0;

    for (spend_idx, p) in periods.iter().enumerate() {
        let capex = p.capital_expenditure;
        if capex.is_nan() || capex <= 0.0 {
            continue;
        }

        let start = first_production.map_or(spend_idx, |fp| fp.max(spend_idx));
        let annual = capex / term as f64;
        // last slice takes the remainder so the tranche sums to capex
        let last = capex - annual * (term - 1) as f64;

        for k in 0..term {
            let amount = if k + 1 == term { last } else { annual };
            match schedule.get_mut(start + k) {
                Some(slot) => *slot += amount,
                None => written_off += amount,
            }
        }
    }

    if written_off > 0.0 {
        tracing::debug!(
            amount = written_off,
            "depreciation beyond horizon written off in final period"
        );
        schedule[n - 1] += written_off;
    }

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn periods(production: &[f64], capex: &[f64]) -> Vec<PeriodInputs> {
        production
            .iter()
            .zip(capex)
            .map(|(&production, &capital_expenditure)| PeriodInputs {
                production,
                capital_expenditure,
                unit_operating_cost: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_reference_schedule() {
        let s = crate::scenario::ScenarioInputs::reference();
        let dep = depreciation_schedule(&s.periods, 5);
        // Years 1-3 spend (170,000) all start in year 3 (first oil)
        assert_eq!(dep[0], 0.0);
        assert_eq!(dep[1], 0.0);
        assert_relative_eq!(dep[2], 34_000.0, max_relative = 1e-12);
        // Year 4 adds 12,000, year 5 adds 14,000
        assert_relative_eq!(dep[3], 46_000.0, max_relative = 1e-12);
        assert_relative_eq!(dep[4], 60_000.0, max_relative = 1e-12);
        assert_relative_eq!(dep[6], 60_000.0, max_relative = 1e-12);
        // Year-3 tranches end in year 7, year-4 in 8, year-5 in 9
        assert_relative_eq!(dep[7], 26_000.0, max_relative = 1e-12);
        assert_relative_eq!(dep[8], 14_000.0, max_relative = 1e-12);
        assert_eq!(dep[9], 0.0);
        assert_relative_eq!(dep.iter().sum::<f64>(), 300_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_spend_after_first_production_starts_in_spend_period() {
        let p = periods(&[10.0, 10.0, 10.0, 10.0], &[0.0, 0.0, 100.0, 0.0]);
        let dep = depreciation_schedule(&p, 2);
        assert_eq!(dep, vec![0.0, 0.0, 50.0, 50.0]);
    }

    #[test]
    fn test_overflow_written_off_in_final_period() {
        let p = periods(&[0.0, 5.0, 5.0], &[90.0, 0.0, 0.0]);
        let dep = depreciation_schedule(&p, 5);
        assert_eq!(dep[0], 0.0);
        assert_relative_eq!(dep[1], 18.0, max_relative = 1e-12);
        assert_relative_eq!(dep[2], 72.0, max_relative = 1e-12);
    }

    #[test]
    fn test_no_production_starts_at_spend_period() {
        let p = periods(&[0.0, 0.0, 0.0], &[30.0, 0.0, 0.0]);
        let dep = depreciation_schedule(&p, 3);
        assert_eq!(dep, vec![10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_zero_term_expensed_immediately() {
        let p = periods(&[1.0, 1.0], &[40.0, 0.0]);
        assert_eq!(depreciation_schedule(&p, 0), vec![40.0, 0.0]);
    }

    #[test]
    fn test_empty_horizon() {
        assert!(depreciation_schedule(&[], 5).is_empty());
    }

    proptest! {
        #[test]
        fn prop_schedule_conserves_capex(
            rows in prop::collection::vec((0.0f64..20_000.0, 0.0f64..150_000.0, prop::bool::ANY), 1..30),
            term in 0u32..12,
        ) {
            // Zero out roughly half the spend and production cells
            let production: Vec<f64> = rows.iter().map(|(p, _, on)| if *on { *p } else { 0.0 }).collect();
            let capex: Vec<f64> = rows.iter().map(|(_, c, on)| if *on { 0.0 } else { *c }).collect();
            let p = periods(&production, &capex);
            let dep = depreciation_schedule(&p, term);
            let total_capex: f64 = capex.iter().sum();
            let total_dep: f64 = dep.iter().sum();
            prop_assert_eq!(dep.len(), p.len());
            prop_assert!((total_dep - total_capex).abs() <= 1e-9 * total_capex.max(1.0));
            prop_assert!(dep.iter().all(|d| *d >= 0.0));
        }
    }
}
