use serde::{Deserialize, Serialize};

use crate::projection::depreciation::depreciation_schedule;
use crate::scenario::ScenarioInputs;
use crate::time_value::mid_period_discount_factor;
use crate::types::{Money, Volume};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One row of the cash-flow projection. Monetary columns are in $ thousand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// Period number (1-based)
    pub period: u32,
    pub production: Volume,
    pub oil_price: Money,
    /// production × price
    pub gross_revenue: Money,
    pub royalty: Money,
    /// gross revenue − royalty
    pub net_revenue: Money,
    pub capital_costs: Money,
    pub depreciation: Money,
    pub unit_operating_cost: Money,
    /// production × unit operating cost
    pub operating_expense: Money,
    /// operating expense + depreciation
    pub total_expenses: Money,
    pub cost_recovery_limit: Money,
    /// Unrecovered cost carried into the next period
    pub cost_recovery_carry_forward: Money,
    pub cost_recovery: Money,
    /// net revenue − cost recovery
    pub total_profit_oil: Money,
    pub state_profit_oil: Money,
    pub ioc_profit_oil: Money,
    pub signature_bonus: Money,
    /// Operating income after loss carry-forward
    pub taxable_income: Money,
    pub income_tax: Money,
    pub ioc_net_cash_flow: Money,
    /// IOC net cash flow discounted at mid-period
    pub ioc_discounted_cash_flow: Money,
    pub state_net_cash_flow: Money,
    /// State net cash flow discounted at mid-period
    pub state_discounted_cash_flow: Money,
}

/// Column sums over the whole horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTotals {
    pub gross_revenue: Money,
    pub royalty: Money,
    pub capital_costs: Money,
    pub depreciation: Money,
    pub operating_expense: Money,
    pub cost_recovery: Money,
    pub state_profit_oil: Money,
    pub ioc_profit_oil: Money,
    pub income_tax: Money,
    pub ioc_net_cash_flow: Money,
    pub state_net_cash_flow: Money,
}

/// The full period-by-period projection, in period order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTable {
    pub records: Vec<PeriodRecord>,
}

impl ProjectionTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeriodRecord> {
        self.records.iter()
    }

    /// Extract one column as a series.
    pub fn column(&self, f: impl Fn(&PeriodRecord) -> Money) -> Vec<Money> {
        self.records.iter().map(f).collect()
    }

    pub fn ioc_cash_flows(&self) -> Vec<Money> {
        self.column(|r| r.ioc_net_cash_flow)
    }

    pub fn ioc_discounted(&self) -> Vec<Money> {
        self.column(|r| r.ioc_discounted_cash_flow)
    }

    pub fn state_cash_flows(&self) -> Vec<Money> {
        self.column(|r| r.state_net_cash_flow)
    }

    pub fn state_discounted(&self) -> Vec<Money> {
        self.column(|r| r.state_discounted_cash_flow)
    }

    pub fn project_cash_flows(&self) -> Vec<Money> {
        self.column(|r| r.ioc_net_cash_flow + r.state_net_cash_flow)
    }

    pub fn project_discounted(&self) -> Vec<Money> {
        self.column(|r| r.ioc_discounted_cash_flow + r.state_discounted_cash_flow)
    }

    pub fn totals(&self) -> ProjectionTotals {
        let sum = |f: fn(&PeriodRecord) -> Money| self.records.iter().map(f).sum::<Money>();
        ProjectionTotals {
            gross_revenue: sum(|r| r.gross_revenue),
            royalty: sum(|r| r.royalty),
            capital_costs: sum(|r| r.capital_costs),
            depreciation: sum(|r| r.depreciation),
            operating_expense: sum(|r| r.operating_expense),
            cost_recovery: sum(|r| r.cost_recovery),
            state_profit_oil: sum(|r| r.state_profit_oil),
            ioc_profit_oil: sum(|r| r.ioc_profit_oil),
            income_tax: sum(|r| r.income_tax),
            ioc_net_cash_flow: sum(|r| r.ioc_net_cash_flow),
            state_net_cash_flow: sum(|r| r.state_net_cash_flow),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project the PSA cash flow of a scenario, period by period.
///
/// Single forward pass carrying two accumulators: the cumulative cost-recovery
/// excess (whose positive part is the carry-forward) and the taxable-income
/// carry-forward. Period `t` reads only finalised state from period `t - 1`.
///
/// Total over any input: malformed values surface as NaN or out-of-range
/// numbers in the table rather than as errors.
pub fn project(inputs: &ScenarioInputs) -> ProjectionTable {
    let params = &inputs.parameters;
    let depreciation = depreciation_schedule(&inputs.periods, params.depreciation_term);

    let mut records = Vec::with_capacity(inputs.periods.len());
    let mut cumulative_cost_excess: Money = 0.0;
    let mut prior_carry_forward: Money = 0.0;
    let mut prior_taxable_income: Money = 0.0;

    for (idx, (p, &period_depreciation)) in inputs.periods.iter().zip(&depreciation).enumerate() {
        let period = idx as u32 + 1;

        // Revenue
        let gross_revenue = p.production * params.oil_price;
        let royalty = gross_revenue * params.royalty_rate;
        let net_revenue = gross_revenue - royalty;

        // Costs
        let operating_expense = p.production * p.unit_operating_cost;
        let total_expenses = operating_expense + period_depreciation;

        // Cost recovery
        let cost_recovery_limit = gross_revenue * params.cost_recovery_limit;
        cumulative_cost_excess += total_expenses - cost_recovery_limit;
        let carry_forward = floor_at_zero(cumulative_cost_excess);
        let cost_recovery =
            min_propagating_nan(total_expenses + prior_carry_forward, cost_recovery_limit);
        prior_carry_forward = carry_forward;

        // Profit oil
        let total_profit_oil = net_revenue - cost_recovery;
        let ioc_profit_oil = total_profit_oil * params.ioc_profit_oil_split;
        let state_profit_oil = total_profit_oil * (1.0 - params.ioc_profit_oil_split);

        // Bonus and tax
        let signature_bonus = if period == 1 { params.signature_bonus } else { 0.0 };
        let operating_income =
            (cost_recovery + ioc_profit_oil) - (total_expenses + signature_bonus);
        let taxable_income = carry_loss(prior_taxable_income, operating_income);
        prior_taxable_income = taxable_income;
        let income_tax = floor_at_zero(taxable_income * params.income_tax_rate);

        // Net cash flows
        let ioc_net_cash_flow = (cost_recovery + ioc_profit_oil)
            - (p.capital_expenditure + operating_expense + signature_bonus + income_tax);
        let state_net_cash_flow = signature_bonus + royalty + state_profit_oil + income_tax;

        let discount = mid_period_discount_factor(params.discount_rate, period);

        records.push(PeriodRecord {
            period,
            production: p.production,
            oil_price: params.oil_price,
            gross_revenue,
            royalty,
            net_revenue,
            capital_costs: p.capital_expenditure,
            depreciation: period_depreciation,
            unit_operating_cost: p.unit_operating_cost,
            operating_expense,
            total_expenses,
            cost_recovery_limit,
            cost_recovery_carry_forward: carry_forward,
            cost_recovery,
            total_profit_oil,
            state_profit_oil,
            ioc_profit_oil,
            signature_bonus,
            taxable_income,
            income_tax,
            ioc_net_cash_flow,
            ioc_discounted_cash_flow: ioc_net_cash_flow / discount,
            state_net_cash_flow,
            state_discounted_cash_flow: state_net_cash_flow / discount,
        });
    }

    ProjectionTable { records }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Loss carry-forward step: a prior loss is absorbed into this period's
/// income, otherwise the period starts from its own income. No expiry.
fn carry_loss(prior: Money, operating_income: Money) -> Money {
    if prior < 0.0 {
        prior + operating_income
    } else {
        operating_income
    }
}

/// `max(0, x)` that keeps NaN.
fn floor_at_zero(x: Money) -> Money {
    if x < 0.0 {
        0.0
    } else {
        x
    }
}

/// `min(a, b)` that returns NaN when either side is NaN.
fn min_propagating_nan(a: Money, b: Money) -> Money {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
