//! Distance between two atoms over time

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::debug;
use serde::{Deserialize, Serialize};

use super::output::TableWriter;
use super::{
    check_frames, check_order, load_params, open_reader, report, CalcError, CalcReport,
    Calculation, Params,
};
use crate::dump::{ColumnRequest, CoordKind};
use crate::kernels::separation;

/// `[distance]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistanceParams {
    /// Trajectory to read
    pub file_in: PathBuf,
    /// Output table
    pub file_out: PathBuf,
    /// First frame (inclusive)
    #[serde(default)]
    pub cfg_start: usize,
    /// Last frame (exclusive)
    pub cfg_end: usize,
    /// Row ordinal of the first atom (0-based)
    pub atom_1: usize,
    /// Row ordinal of the second atom, greater than `atom_1`
    pub atom_2: usize,
    /// Time between two frames
    pub dt: f64,
    /// Coordinate columns to read
    #[serde(default = "super::unwrapped")]
    pub coords: CoordKind,
}

impl Params for DistanceParams {
    fn validate(&self) -> Result<(), CalcError> {
        check_frames(self.cfg_start, self.cfg_end)?;
        check_order("atom_1", self.atom_1, "atom_2", self.atom_2)
    }
}

/// Separation vector and distance of two atoms, one row per frame
pub struct Distance;

impl Calculation for Distance {
    fn name(&self) -> &'static str {
        "distance"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["dist_two_atoms"]
    }

    fn summary(&self) -> &'static str {
        "distance between two atoms over time"
    }

    fn run(&self, params: &Path) -> Result<CalcReport, CalcError> {
        let params: DistanceParams = load_params(params, self)?;
        compute(&params)
    }
}

/// Run the distance calculation
pub fn compute(params: &DistanceParams) -> Result<CalcReport, CalcError> {
    let started = Instant::now();
    let mut reader = open_reader(&params.file_in, ColumnRequest::coords(params.coords))?;
    let mut table = TableWriter::create(
        &params.file_out,
        params,
        &["cfg", "t", "x", "y", "z", "dist"],
    )?;

    reader.skip_frames(params.cfg_start)?;
    for _ in params.cfg_start..params.cfg_end {
        let frame = reader.next_records()?;
        let sep = separation(&frame.atoms, params.atom_1, params.atom_2)
            .map_err(|e| CalcError::kernel(frame.index, e))?;
        debug!("frame {}: distance {}", frame.index, sep.distance);
        let [x, y, z] = sep.vector;
        table.row(
            frame.index,
            &[frame.index as f64 * params.dt, x, y, z, sep.distance],
        )?;
    }

    let frames = table.rows();
    table.finish()?;
    Ok(report(frames, &params.file_out, started))
}
