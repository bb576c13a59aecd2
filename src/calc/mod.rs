//! # Calculations
//!
//! Every calculation reads its parameters from a TOML table named after it,
//! validates them, streams the trajectory and writes one output table.
//!
//! ```text
//! params.toml ──▶ [section] ──▶ Params::validate ──▶ DumpReader ──▶ kernel ──▶ table
//! ```
//!
//! | Name       | Aliases          | Frames           | Output                     |
//! |------------|------------------|------------------|----------------------------|
//! | `distance` | `dist_two_atoms` | sequential       | `cfg t x y z dist`         |
//! | `gyration` | `radius_gyration`| sequential       | `cfg t radius`             |
//! | `unwrap`   | `no_pbc`         | sequential, EOF  | unwrapped trajectory       |
//! | `rdf`      | `gr`             | worker pool      | `dist A-B(i)-intg ...`     |
//! | `volume`   |                  | worker pool      | `cfg t vol(atoms) vol(other)` + XYZ |
//!
//! Calculations are looked up by name in a fixed registry, see [`lookup`] and
//! [`launch`].

pub mod distance;
mod error;
pub mod gyration;
pub mod output;
pub mod rdf;
pub mod sink;
pub mod unwrap;
pub mod volume;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::dump::{ColumnRequest, CoordKind, DumpError, DumpReader, TrajectoryInput};
use crate::pipeline::default_workers;

pub use distance::{Distance, DistanceParams};
pub use error::CalcError;
pub use gyration::{Gyration, GyrationParams};
pub use output::TableWriter;
pub use rdf::{Rdf, RdfParams};
pub use sink::RowSink;
pub use unwrap::{Unwrap, UnwrapParams};
pub use volume::{Volume, VolumeParams};

/// Outcome of a finished calculation
#[derive(Debug, Clone, PartialEq)]
pub struct CalcReport {
    /// Frames processed
    pub frames: usize,
    /// Main output file
    pub output: PathBuf,
    /// Wall time of the run
    pub elapsed: Duration,
}

/// A named trajectory calculation
pub trait Calculation: Sync {
    /// Registry name, also the TOML table name
    fn name(&self) -> &'static str;

    /// Other accepted names, also accepted as table names
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// One-line description
    fn summary(&self) -> &'static str;

    /// Load parameters from `params` and run to completion
    fn run(&self, params: &Path) -> Result<CalcReport, CalcError>;
}

/// Parameters of one calculation
pub trait Params: DeserializeOwned + Serialize {
    /// Reject inconsistent values before any frame is read
    fn validate(&self) -> Result<(), CalcError>;
}

static REGISTRY: [&dyn Calculation; 5] = [&Distance, &Gyration, &Unwrap, &Rdf, &Volume];

/// Every registered calculation
pub fn registry() -> &'static [&'static dyn Calculation] {
    &REGISTRY
}

/// Find a calculation by name or alias
pub fn lookup(name: &str) -> Option<&'static dyn Calculation> {
    REGISTRY
        .iter()
        .copied()
        .find(|calc| calc.name() == name || calc.aliases().contains(&name))
}

/// Run the calculation `name` with the parameter file `params`
pub fn launch(name: &str, params: &Path) -> Result<CalcReport, CalcError> {
    let calc = lookup(name).ok_or_else(|| CalcError::UnknownCalculation(name.to_string()))?;
    info!("{}: starting with {}", calc.name(), params.display());
    let report = calc.run(params)?;
    info!(
        "{}: {} frames in {:.2?}, written to {}",
        calc.name(),
        report.frames,
        report.elapsed,
        report.output.display()
    );
    Ok(report)
}

/// Read the table of `calc` from a parameter file and validate it
pub fn load_params<P: Params>(path: &Path, calc: &dyn Calculation) -> Result<P, CalcError> {
    let text = fs::read_to_string(path).map_err(|source| CalcError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let params: P = parse_params(&text, calc.name(), calc.aliases()).map_err(|e| match e {
        CalcError::MissingSection { section, .. } => CalcError::MissingSection {
            section,
            path: path.to_path_buf(),
        },
        other => other,
    })?;
    params.validate()?;
    Ok(params)
}

/// Extract and deserialize the first table found among `name` and `aliases`
pub fn parse_params<P: DeserializeOwned>(
    text: &str,
    name: &str,
    aliases: &[&str],
) -> Result<P, CalcError> {
    let mut document: toml::Table = toml::from_str(text)?;
    let section = std::iter::once(name)
        .chain(aliases.iter().copied())
        .find_map(|key| document.remove(key))
        .ok_or_else(|| CalcError::MissingSection {
            section: name.to_string(),
            path: PathBuf::new(),
        })?;
    Ok(section.try_into::<P>()?)
}

/// Open a trajectory, attaching the path to I/O failures
pub fn open_reader(
    path: &Path,
    request: ColumnRequest,
) -> Result<DumpReader<TrajectoryInput>, CalcError> {
    DumpReader::open(path, request).map_err(|e| match e {
        DumpError::Io(source) => CalcError::io(path, source),
        other => CalcError::Dump(other),
    })
}

/// Worker count for a concurrent calculation
pub fn resolve_workers(threads: Option<usize>) -> usize {
    threads.unwrap_or_else(default_workers).max(1)
}

pub(crate) fn unwrapped() -> CoordKind {
    CoordKind::Unwrapped
}

pub(crate) fn check_frames(cfg_start: usize, cfg_end: usize) -> Result<(), CalcError> {
    check_order("cfg_start", cfg_start, "cfg_end", cfg_end)
}

pub(crate) fn check_order(
    low_name: &str,
    low: usize,
    high_name: &str,
    high: usize,
) -> Result<(), CalcError> {
    if low >= high {
        return Err(CalcError::InvalidConfig(format!(
            "{low_name} ({low}) is greater or equal than {high_name} ({high})"
        )));
    }
    Ok(())
}

pub(crate) fn check_threads(threads: Option<usize>) -> Result<(), CalcError> {
    if threads == Some(0) {
        return Err(CalcError::InvalidConfig(
            "threads must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Elapsed time since `started`, as stored in [`CalcReport`]
pub(crate) fn report(frames: usize, output: &Path, started: Instant) -> CalcReport {
    CalcReport {
        frames,
        output: output.to_path_buf(),
        elapsed: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names_are_unique() {
        let mut names: Vec<&str> = registry()
            .iter()
            .flat_map(|calc| std::iter::once(calc.name()).chain(calc.aliases().iter().copied()))
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_lookup_by_alias() {
        assert_eq!(lookup("gr").map(|c| c.name()), Some("rdf"));
        assert_eq!(lookup("no_pbc").map(|c| c.name()), Some("unwrap"));
        assert_eq!(lookup("volume").map(|c| c.name()), Some("volume"));
        assert!(lookup("msd").is_none());
    }

    #[test]
    fn test_launch_unknown() {
        let err = launch("msd", Path::new("params.toml")).unwrap_err();
        assert!(matches!(err, CalcError::UnknownCalculation(ref name) if name == "msd"));
        assert_eq!(err.to_string(), "calculation `msd` doesn't exist");
    }

    #[test]
    fn test_parse_params_section_and_alias() {
        let text = r#"
            [gr]
            file_in = "in"
            file_out = "out"
            cfg_end = 10
            rmax = 5.0
            dr = 0.1

            [gr.atoms]
            O = ["H"]
        "#;
        let params: RdfParams = parse_params(text, "rdf", &["gr"]).unwrap();
        assert_eq!(params.cfg_end, 10);
        assert_eq!(params.atoms["O"], vec!["H".to_string()]);

        let err = parse_params::<RdfParams>(text, "volume", &[]).unwrap_err();
        assert!(matches!(err, CalcError::MissingSection { ref section, .. } if section == "volume"));
    }

    #[test]
    fn test_load_params_missing_file() {
        let err = load_params::<DistanceParams>(Path::new("/nonexistent/params.toml"), &Distance)
            .unwrap_err();
        assert!(matches!(err, CalcError::ConfigRead { .. }));
    }

    #[test]
    fn test_order_checks() {
        assert!(check_frames(0, 1).is_ok());
        assert!(matches!(check_frames(3, 3), Err(CalcError::InvalidConfig(_))));
        assert!(check_threads(None).is_ok());
        assert!(check_threads(Some(0)).is_err());
        assert_eq!(resolve_workers(Some(3)), 3);
        assert!(resolve_workers(None) >= 1);
    }
}
