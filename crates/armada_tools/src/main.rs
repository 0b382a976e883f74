//! Armada - Development Tools
//!
//! # Usage
//!
//! ```bash
//! # Validate the shipped catalog and engine config
//! armada-tools validate assets/data
//!
//! # Run the built-in skirmish against the shipped data
//! armada-tools simulate
//!
//! # Run a scenario file and print a JSON report
//! armada-tools simulate --scenario duel.ron --json
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use armada_tools::scenario::Scenario;
use armada_tools::{simulate, validate, ToolResult};

#[derive(Parser)]
#[command(name = "armada-tools")]
#[command(about = "Development tools for the Armada combat engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },

    /// Run a headless skirmish
    Simulate {
        /// Path to data directory
        #[arg(short, long, default_value = "assets/data")]
        data: PathBuf,

        /// Scenario file (defaults to the built-in skirmish)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Override the scenario's tick budget
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Logs go to stderr; stdout is kept for reports.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Validate { path } => cmd_validate(&path),
        Commands::Simulate {
            data,
            scenario,
            ticks,
            json,
        } => cmd_simulate(&data, scenario.as_deref(), ticks, json),
    };

    if let Err(e) = outcome {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn cmd_validate(path: &Path) -> ToolResult<()> {
    tracing::info!("Validating data files in: {}", path.display());
    validate::validate_data_directory(path)?;
    tracing::info!("Validation passed");
    Ok(())
}

fn cmd_simulate(data: &Path, scenario: Option<&Path>, ticks: Option<u64>, json: bool) -> ToolResult<()> {
    let catalog = validate::load_catalog(data)?;
    let config = validate::load_config(data)?;
    validate::check_config(&config, &catalog)?;

    let scenario = match scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::skirmish(),
    };
    let mut prepared = scenario.build(catalog, config)?;
    if let Some(ticks) = ticks {
        prepared.ticks = ticks;
    }

    let report = simulate::run(prepared);
    if json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!("Scenario:  {}", scenario.name);
    println!("Ticks run: {}", report.ticks_run);
    println!("Hash:      {:016x}", report.state_hash);
    match report.winner {
        Some(team) => println!("Winner:    team {team}"),
        None => println!("Winner:    undecided"),
    }
    println!("Effects:");
    for (name, count) in &report.effects {
        println!("  {name:<20} {count}");
    }
    println!("Destroyed: {}", report.destroyed.len());
    for flash in &report.flashes {
        println!("  [{}] unit {}: {}", flash.tick, flash.unit, flash.text);
    }
    println!("Survivors:");
    for s in &report.survivors {
        println!(
            "  #{:<4} {:<10} team {} health {:.1} energy {:.1} cargo {:.1}",
            s.id, s.hull, s.team, s.health, s.energy, s.cargo
        );
    }
    Ok(())
}
