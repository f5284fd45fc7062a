//! Demonstration CLI for the dynobj runtime: runs the dispatch scenarios
//! the object model is built around and prints what each one observed.

mod commands;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dynobj", about = "Prototype-based object runtime demonstrations", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one dispatch scenario and print its trace.
    Run {
        /// Which scenario to run.
        scenario: Scenario,
    },
    /// Run every scenario in order.
    RunAll,
    /// List the available scenario names.
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum Scenario {
    BasicDispatch,
    DelegatePrecedence,
    CycleTolerance,
    InitializeOrder,
    FinalizeOrder,
    CopyFidelity,
}

impl Scenario {
    fn name(self) -> &'static str {
        match self {
            Scenario::BasicDispatch => "basic-dispatch",
            Scenario::DelegatePrecedence => "delegate-precedence",
            Scenario::CycleTolerance => "cycle-tolerance",
            Scenario::InitializeOrder => "initialize-order",
            Scenario::FinalizeOrder => "finalize-order",
            Scenario::CopyFidelity => "copy-fidelity",
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { scenario } => run_one(scenario.name()),
        Commands::RunAll => {
            for name in commands::ALL {
                run_one(name)?;
                println!();
            }
            Ok(())
        }
        Commands::List => {
            for name in commands::ALL {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn run_one(name: &str) -> Result<()> {
    if !commands::ALL.contains(&name) {
        bail!("unknown scenario: {name}");
    }
    println!("== {name} ==");
    for line in commands::run(name) {
        println!("  {line}");
    }
    Ok(())
}
