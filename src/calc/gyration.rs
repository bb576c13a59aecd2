//! Radius of gyration of a contiguous atom range over time

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::output::TableWriter;
use super::{
    check_frames, check_order, load_params, open_reader, report, CalcError, CalcReport,
    Calculation, Params,
};
use crate::dump::{ColumnRequest, CoordKind, Need};
use crate::kernels::{radius_of_gyration, KernelError};

/// `[gyration]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GyrationParams {
    /// Trajectory to read
    pub file_in: PathBuf,
    /// Output table
    pub file_out: PathBuf,
    /// First frame (inclusive)
    #[serde(default)]
    pub cfg_start: usize,
    /// Last frame (exclusive)
    pub cfg_end: usize,
    /// First atom of the range (inclusive, 0-based)
    pub atom_start: usize,
    /// End of the range (exclusive)
    pub atom_end: usize,
    /// Time between two frames
    pub dt: f64,
    /// Coordinate columns to read
    #[serde(default = "super::unwrapped")]
    pub coords: CoordKind,
    /// Mass of every atom type found in the range
    pub masses: BTreeMap<String, f64>,
}

impl Params for GyrationParams {
    fn validate(&self) -> Result<(), CalcError> {
        check_frames(self.cfg_start, self.cfg_end)?;
        check_order("atom_start", self.atom_start, "atom_end", self.atom_end)
    }
}

/// Radius of gyration, one row per frame
pub struct Gyration;

impl Calculation for Gyration {
    fn name(&self) -> &'static str {
        "gyration"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["radius_gyration"]
    }

    fn summary(&self) -> &'static str {
        "radius of gyration of an atom range over time"
    }

    fn run(&self, params: &Path) -> Result<CalcReport, CalcError> {
        let params: GyrationParams = load_params(params, self)?;
        compute(&params)
    }
}

/// Run the gyration calculation
pub fn compute(params: &GyrationParams) -> Result<CalcReport, CalcError> {
    let started = Instant::now();
    let request = ColumnRequest::coords(params.coords).with_species(Need::Required);
    let mut reader = open_reader(&params.file_in, request)?;
    let mut table = TableWriter::create(&params.file_out, params, &["cfg", "t", "radius"])?;

    reader.skip_frames(params.cfg_start)?;
    for _ in params.cfg_start..params.cfg_end {
        let frame = reader.next_records()?;
        let atoms = frame
            .atoms
            .get(params.atom_start..params.atom_end)
            .ok_or_else(|| {
                CalcError::kernel(
                    frame.index,
                    KernelError::AtomOutOfRange {
                        index: params.atom_end - 1,
                        atoms: frame.atoms.len(),
                    },
                )
            })?;
        let radius =
            radius_of_gyration(atoms, &params.masses).map_err(|e| CalcError::kernel(frame.index, e))?;
        table.row(frame.index, &[frame.index as f64 * params.dt, radius])?;
    }

    let frames = table.rows();
    table.finish()?;
    Ok(report(frames, &params.file_out, started))
}
