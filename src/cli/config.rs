//! Batch plan files.
//!
//! A plan lists calculations step by step. Calculations of one step run
//! concurrently; steps run one after the other:
//!
//! ```toml
//! # plan.toml
//! types = [["unwrap"], ["distance", "gyration", "rdf"]]
//! files = [["unwrap.toml"], ["distance.toml", "gyration.toml", "rdf.toml"]]
//! ```

use anyhow::{bail, Context, Result};
use log::{error, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::thread;

use dumpcalc::calc::{launch, CalcError, CalcReport};

/// Root structure of a plan file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    /// Calculation names, one list per step.
    pub types: Vec<Vec<String>>,

    /// Parameter files, parallel to `types`.
    pub files: Vec<Vec<PathBuf>>,
}

/// Tally of a finished batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Calculations launched.
    pub launched: usize,

    /// Calculations that returned an error.
    pub failed: usize,
}

impl Plan {
    /// Load a plan from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse and validate a plan from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let plan: Plan = toml::from_str(content).context("Failed to parse TOML plan")?;
        plan.validate()?;
        Ok(plan)
    }

    /// Both lists must have the same shape.
    pub fn validate(&self) -> Result<()> {
        if self.files.len() != self.types.len() {
            bail!(
                "length of files isn't equal to types ({} vs {})",
                self.files.len(),
                self.types.len()
            );
        }
        for (step, (types, files)) in self.types.iter().zip(&self.files).enumerate() {
            if files.len() != types.len() {
                bail!(
                    "length of files isn't equal to types ({} vs {}, step {step})",
                    files.len(),
                    types.len()
                );
            }
        }
        Ok(())
    }

    /// Number of calculations in the plan.
    pub fn len(&self) -> usize {
        self.types.iter().map(Vec::len).sum()
    }

    /// Whether the plan launches nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every step with the default launcher.
    pub fn execute(&self) -> BatchOutcome {
        self.execute_with(launch)
    }

    /// Run every step, launching each calculation with `launcher`.
    ///
    /// A failed calculation is logged and counted; the batch goes on.
    pub fn execute_with<F>(&self, launcher: F) -> BatchOutcome
    where
        F: Fn(&str, &Path) -> Result<CalcReport, CalcError> + Sync,
    {
        let mut outcome = BatchOutcome::default();
        for (step, (types, files)) in self.types.iter().zip(&self.files).enumerate() {
            if types.is_empty() {
                continue;
            }
            info!("step {step}: {}", types.join(", "));
            let launcher = &launcher;
            let results: Vec<Result<CalcReport, CalcError>> = thread::scope(|scope| {
                let handles: Vec<_> = types
                    .iter()
                    .zip(files)
                    .map(|(name, file)| scope.spawn(move || launcher(name.as_str(), file.as_path())))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| {
                        handle.join().unwrap_or_else(|_| {
                            Err(CalcError::Output("calculation thread panicked".to_string()))
                        })
                    })
                    .collect()
            });

            for (routine, (result, name)) in results.into_iter().zip(types).enumerate() {
                outcome.launched += 1;
                if let Err(e) = result {
                    outcome.failed += 1;
                    error!("Launch (step {step}, routine {routine}): {name}: {e}");
                }
            }
        }
        outcome
    }
}
