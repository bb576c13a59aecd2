//! # dumpcalc
//!
//! A command-line tool for analysing LAMMPS dump trajectories.
//!
//! ## Usage
//!
//! ```bash
//! # Run one calculation
//! dumpcalc calc rdf gr.toml
//!
//! # Run a batch plan
//! dumpcalc -v run plan.toml
//!
//! # Inspect a trajectory
//! dumpcalc inspect water.lammpstrj.gz --frames
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
