//! Orrery Command-Line Interface
//!
//! Runs the simulation core against a QASM2 file and prints the per-qubit
//! Bloch report as JSON.

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{info, run};
use orrery_sim::PipelineKind;

/// Orrery: quantum circuit simulation for Bloch-sphere visualization
#[derive(Parser)]
#[command(name = "orrery")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a circuit and print the per-qubit report
    Run {
        /// Input QASM2 file
        #[arg(short, long)]
        input: String,

        /// Number of shots (trajectory pipeline only)
        #[arg(short, long, default_value = "1024")]
        shots: u32,

        /// Force a pipeline instead of automatic routing
        #[arg(short, long)]
        pipeline: Option<PipelineKind>,

        /// Master seed for reproducible trajectory runs
        #[arg(long)]
        seed: Option<u64>,

        /// Compact single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Parse and validate a circuit, printing its metadata
    Info {
        /// Input QASM2 file
        #[arg(short, long)]
        input: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run {
            input,
            shots,
            pipeline,
            seed,
            compact,
        } => run::execute(&input, shots, pipeline, seed, compact),

        Commands::Info { input } => info::execute(&input),
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}
