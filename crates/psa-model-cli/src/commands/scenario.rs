use clap::Args;
use serde_json::Value;

use psa_model_core::evaluation::evaluate_scenario;
use psa_model_core::scenario::ScenarioInputs;

use crate::input;

/// Where the scenario comes from, plus quick parameter overrides.
#[derive(Args)]
pub struct ScenarioSource {
    /// Path to a JSON or YAML scenario file (stdin is read when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Use the built-in 19-period reference scenario
    #[arg(long, conflicts_with = "input")]
    pub reference: bool,

    /// Override the oil price ($/bbl)
    #[arg(long)]
    pub oil_price: Option<f64>,

    /// Override the discount rate (e.g. 0.12 for 12%)
    #[arg(long)]
    pub discount_rate: Option<f64>,
}

/// Arguments for the cash-flow projection
#[derive(Args)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub scenario: ScenarioSource,
}

/// Arguments for the KPI table
#[derive(Args)]
pub struct KpiArgs {
    #[command(flatten)]
    pub scenario: ScenarioSource,
}

pub fn load_scenario(source: &ScenarioSource) -> Result<ScenarioInputs, Box<dyn std::error::Error>> {
    let mut scenario: ScenarioInputs = if source.reference {
        ScenarioInputs::reference()
    } else if let Some(ref path) = source.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <scenario.json|yaml>, --reference or stdin required".into());
    };

    if let Some(price) = source.oil_price {
        scenario.parameters.oil_price = price;
    }
    if let Some(rate) = source.discount_rate {
        scenario.parameters.discount_rate = rate;
    }
    Ok(scenario)
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = load_scenario(&args.scenario)?;
    let evaluation = evaluate_scenario(&scenario)?;

    let mut value = serde_json::to_value(&evaluation)?;
    value["result"] = serde_json::to_value(&evaluation.result.projection.records)?;
    Ok(value)
}

pub fn run_kpi(args: KpiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = load_scenario(&args.scenario)?;
    let evaluation = evaluate_scenario(&scenario)?;

    let mut value = serde_json::to_value(&evaluation)?;
    value["result"] = serde_json::to_value(&evaluation.result.kpi_table)?;
    Ok(value)
}
