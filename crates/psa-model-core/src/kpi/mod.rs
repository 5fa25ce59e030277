pub mod metrics;
pub mod summary;

pub use metrics::{cumulative_sum, payback_period, profitability_index};
pub use summary::{summarize, summarize_projection, KpiMetric, KpiResult, KpiRow, StakeholderKpis};
