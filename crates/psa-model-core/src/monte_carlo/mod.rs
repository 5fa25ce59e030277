pub mod driver;
pub mod factors;
pub mod pool;
pub mod sampling;
pub mod simulation;
pub mod statistics;

pub use driver::{run_trial, simulate, TrialOutcome};
pub use factors::{PeriodFactors, TrialFactors};
pub use pool::{simulate_parallel, WorkerPool};
pub use sampling::{sample_trial_factors, FactorDistribution, FactorDistributions, MonteCarloConfig};
pub use simulation::{run_monte_carlo, MonteCarloOutput};
pub use statistics::{summarize_outcomes, HistogramBin, MonteCarloSummary, OutcomeStatistics, Percentiles};
