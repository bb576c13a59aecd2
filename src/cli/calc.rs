use anyhow::{Context, Result};
use std::path::PathBuf;

use dumpcalc::calc::launch;

/// Run one calculation by name
pub fn run(name: &str, params: PathBuf) -> Result<()> {
    let report = launch(name, &params)
        .with_context(|| format!("{name} ({}) failed", params.display()))?;

    println!(
        "{name}: {} frames in {:.2?} -> {}",
        report.frames,
        report.elapsed,
        report.output.display()
    );
    Ok(())
}
