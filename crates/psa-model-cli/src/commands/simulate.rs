use clap::Args;
use serde_json::Value;

use psa_model_core::monte_carlo::{run_monte_carlo, MonteCarloConfig};

use crate::commands::scenario::{load_scenario, ScenarioSource};
use crate::input;

/// Arguments for the Monte Carlo simulation
#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub scenario: ScenarioSource,

    /// Path to a JSON or YAML Monte Carlo config (trials, seed, factor distributions)
    #[arg(long)]
    pub config: Option<String>,

    /// Number of trials
    #[arg(long)]
    pub trials: Option<u32>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Trials per worker batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Include per-trial NPV and IRR in the output
    #[arg(long)]
    pub outcomes: bool,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = load_scenario(&args.scenario)?;

    let mut config: MonteCarloConfig = match args.config {
        Some(ref path) => input::file::read_document(path)?,
        None => MonteCarloConfig::default(),
    };
    if let Some(n) = args.trials {
        config.num_trials = n;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.workers.is_some() {
        config.workers = args.workers;
    }
    if let Some(b) = args.batch_size {
        config.batch_size = b;
    }

    let result = run_monte_carlo(&scenario, &config)?;
    let mut value = serde_json::to_value(result)?;
    if !args.outcomes {
        if let Some(Value::Object(res)) = value.get_mut("result") {
            res.remove("outcomes");
        }
    }
    Ok(value)
}
