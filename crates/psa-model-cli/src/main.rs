mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::prelude::*;

use commands::scenario::{KpiArgs, ProjectArgs};
use commands::simulate::SimulateArgs;

/// PSA fiscal-regime cash-flow model
#[derive(Parser)]
#[command(
    name = "psa",
    version,
    about = "Cash-flow model for oil-field production-sharing agreements",
    long_about = "Projects the yearly cash flows of an oil field under a production-sharing \
                  agreement, splits them between the IOC and the State, derives the KPI \
                  table (CCF, NPV, IRR, PP, DPP, PI) and runs Monte Carlo simulations on \
                  price, production, capex and opex."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug events to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Project the yearly PSA cash-flow table
    Project(ProjectArgs),
    /// Compute the KPI table for the IOC, the State and the project
    Kpi(KpiArgs),
    /// Run a Monte Carlo simulation of IOC NPV and IRR
    Simulate(SimulateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::scenario::run_project(args),
        Commands::Kpi(args) => commands::scenario::run_kpi(args),
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Version => {
            println!("psa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
