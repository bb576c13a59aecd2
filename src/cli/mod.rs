use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod calc;
mod config;
mod inspect;
mod list;
mod run;

/// dumpcalc - Trajectory analysis for LAMMPS-style dump files
#[derive(Parser)]
#[command(name = "dumpcalc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch plan of calculations
    Run {
        /// Plan file (TOML with `types` and `files`)
        #[arg(value_name = "PLAN")]
        plan: PathBuf,
    },

    /// Run a single calculation
    Calc {
        /// Calculation name (see `dumpcalc list`)
        #[arg(value_name = "TYPE")]
        name: String,

        /// Parameter file holding the calculation's table
        #[arg(value_name = "PARAMS")]
        params: PathBuf,
    },

    /// Display the layout of a trajectory
    Inspect {
        /// Trajectory path (plain or .gz)
        #[arg(value_name = "TRAJECTORY")]
        trajectory: PathBuf,

        /// Print a JSON document instead of a report
        #[arg(long)]
        json: bool,

        /// Count frames to the end of the trajectory
        #[arg(long)]
        frames: bool,
    },

    /// List the available calculations
    List,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { plan } => run::run(plan),
        Commands::Calc { name, params } => calc::run(&name, params),
        Commands::Inspect {
            trajectory,
            json,
            frames,
        } => inspect::run(trajectory, json, frames),
        Commands::List => list::run(),
    }
}
