use anyhow::{bail, Result};
use log::{info, warn};
use std::path::PathBuf;

use super::config::Plan;

/// Execute a batch plan
pub fn run(plan_path: PathBuf) -> Result<()> {
    let plan = Plan::from_file(&plan_path)?;
    if plan.is_empty() {
        warn!("{}: the plan launches no calculation", plan_path.display());
        return Ok(());
    }

    info!(
        "Running {} calculations in {} steps from {}",
        plan.len(),
        plan.types.len(),
        plan_path.display()
    );
    let outcome = plan.execute();
    if outcome.failed > 0 {
        bail!(
            "{} of {} calculations failed",
            outcome.failed,
            outcome.launched
        );
    }

    info!("All {} calculations finished", outcome.launched);
    Ok(())
}
