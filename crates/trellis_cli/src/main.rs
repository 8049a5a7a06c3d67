//! Trellis CLI — the command-line front end for the Trellis logic simulator.
//!
//! Provides `trellis check` for validating circuit documents, `trellis
//! terminals` for listing component terminals, and `trellis sim` for running
//! a clocked simulation in batch or interactive mode.

#![warn(missing_docs)]

mod check;
mod pipeline;
mod sim;
mod terminals;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use trellis_common::DisplayFormat;

/// Trellis — an interactive digital-logic simulator.
#[derive(Parser, Debug)]
#[command(name = "trellis", version, about = "Trellis Logic Simulator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `trellis.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a circuit document and report wiring problems.
    Check {
        /// Path to the circuit JSON file.
        circuit: String,
    },
    /// List every component's terminals with direction and width.
    Terminals {
        /// Path to the circuit JSON file.
        circuit: String,
    },
    /// Simulate a circuit and print terminal values.
    Sim(SimArgs),
}

/// Arguments for the `trellis sim` subcommand.
#[derive(Parser, Debug)]
pub struct SimArgs {
    /// Path to the circuit JSON file.
    pub circuit: String,

    /// Clock edges to apply after the initial settle.
    #[arg(short, long, default_value_t = 0)]
    pub steps: u64,

    /// Fixed seed for the sweep-order shuffle.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the propagation pass cap.
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Value format (defaults to the configured format).
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Print the result as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Launch the interactive REPL after settling.
    #[arg(short, long)]
    pub interactive: bool,

    /// Free-run the clock at the configured interval, printing after every edge.
    /// Runs `--steps` edges, or until interrupted when `--steps` is 0.
    #[arg(short, long, conflicts_with = "interactive")]
    pub watch: bool,
}

/// Value format selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Binary, padded to width.
    Bin,
    /// Decimal.
    Dec,
    /// Hexadecimal with `0x` prefix.
    Hex,
}

impl From<FormatArg> for DisplayFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Bin => DisplayFormat::Bin,
            FormatArg::Dec => DisplayFormat::Dec,
            FormatArg::Hex => DisplayFormat::Hex,
        }
    }
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Check { ref circuit } => check::run(circuit, &global),
        Command::Terminals { ref circuit } => terminals::run(circuit, &global),
        Command::Sim(ref args) => sim::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs `env_logger`. `RUST_LOG` wins over the flag-derived default.
fn init_logger(quiet: bool, verbose: bool) {
    let default = log_filter(quiet, verbose);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn log_filter(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}
