pub mod depreciation;
pub mod engine;

pub use depreciation::depreciation_schedule;
pub use engine::{project, PeriodRecord, ProjectionTable, ProjectionTotals};
