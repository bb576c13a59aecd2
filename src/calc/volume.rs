//! Analyte and solvent volumes from grid occupancy, computed by a worker pool

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::output::{create_output, TableWriter};
use super::sink::{RowSink, DEFAULT_SINK_CAPACITY};
use super::{
    check_frames, check_threads, load_params, open_reader, report, resolve_workers, CalcError,
    CalcReport, Calculation, Params,
};
use crate::dump::{ColumnRequest, CoordKind, Need, TypedFrame, Vec3};
use crate::kernels::{GridCell, VolumeGrid, VolumeSpecies};
use crate::pipeline::{BoxError, FrameProcessor, FrameWorker, ProcessorConfig, TypedSource};

/// `[volume]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VolumeParams {
    /// Trajectory to read
    pub file_in: PathBuf,
    /// Output table
    pub file_out: PathBuf,
    /// Point cloud of the first processed frame
    pub file_out_xyz: PathBuf,
    /// First frame (inclusive)
    #[serde(default)]
    pub cfg_start: usize,
    /// Last frame (exclusive)
    pub cfg_end: usize,
    /// Frames skipped between two processed frames
    #[serde(default)]
    pub cfg_spacing: usize,
    /// Cell size along each axis
    pub bloc: Vec3,
    /// Neighbourhood half-width around each analyte atom, in cells
    pub blocs: [usize; 3],
    /// Time between two frames
    pub dt: f64,
    /// Workers, the calling thread included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    /// Coordinate columns to read
    #[serde(default)]
    pub coords: CoordKind,
    /// Analyte atom types
    pub atoms: Vec<String>,
    /// Characteristic radius of every analyte and solvent type
    pub sigma: BTreeMap<String, f64>,
}

impl Params for VolumeParams {
    fn validate(&self) -> Result<(), CalcError> {
        check_frames(self.cfg_start, self.cfg_end)?;
        check_threads(self.threads)?;
        if self.bloc.iter().any(|&b| b.is_nan() || b <= 0.0) {
            return Err(CalcError::InvalidConfig(format!(
                "bloc {:?} must be positive on every axis",
                self.bloc
            )));
        }
        if self.atoms.is_empty() {
            return Err(CalcError::InvalidConfig(
                "atoms must name at least one analyte type".to_string(),
            ));
        }
        if let Some(missing) = self.atoms.iter().find(|a| !self.sigma.contains_key(*a)) {
            return Err(CalcError::InvalidConfig(format!(
                "sigma for atom type `{missing}` doesn't exist"
            )));
        }
        Ok(())
    }
}

/// Grid-occupancy volumes, one row per processed frame
pub struct Volume;

impl Calculation for Volume {
    fn name(&self) -> &'static str {
        "volume"
    }

    fn summary(&self) -> &'static str {
        "analyte and solvent volumes from grid occupancy"
    }

    fn run(&self, params: &Path) -> Result<CalcReport, CalcError> {
        let params: VolumeParams = load_params(params, self)?;
        compute(&params)
    }
}

/// Samples a frame and hands its row to the writer thread
struct VolumeWorker<'a> {
    grid: &'a VolumeGrid,
    species: &'a VolumeSpecies,
    sink: &'a RowSink,
    dt: f64,
}

impl FrameWorker<TypedFrame> for VolumeWorker<'_> {
    type Partial = ();

    fn partial(&self) -> Self::Partial {}

    fn process(&self, _partial: &mut (), index: usize, frame: TypedFrame) -> Result<(), BoxError> {
        let sample = self
            .grid
            .sample(self.species, &frame.box_dims, &frame.atoms, false);
        debug!(
            "frame {index}: analyte {} solvent {}",
            sample.analyte_volume, sample.solvent_volume
        );
        self.sink.send(
            index,
            vec![
                index as f64 * self.dt,
                sample.analyte_volume,
                sample.solvent_volume,
            ],
        )?;
        Ok(())
    }
}

/// Run the volume calculation.
///
/// Rows are written in completion order. The first frame is sampled on the
/// calling thread and its cells go to the point cloud.
pub fn compute(params: &VolumeParams) -> Result<CalcReport, CalcError> {
    let started = Instant::now();
    let species = VolumeSpecies::new(&params.atoms, &params.sigma)
        .map_err(|e| CalcError::InvalidConfig(e.to_string()))?;
    let grid = VolumeGrid {
        bloc: params.bloc,
        reach: params.blocs,
    };
    let request = ColumnRequest::coords(params.coords).with_species(Need::Required);
    let mut reader = open_reader(&params.file_in, request)?;
    let table = TableWriter::create(
        &params.file_out,
        params,
        &["cfg", "t", "vol(atoms)", "vol(other)"],
    )?;
    let sink = RowSink::spawn(table, DEFAULT_SINK_CAPACITY)?;

    reader.skip_frames(params.cfg_start)?;
    let first = reader.next_typed(species.filter())?;
    let sample = grid.sample(&species, &first.box_dims, &first.atoms, true);
    write_point_cloud(&params.file_out_xyz, &sample.cells)?;
    sink.send(
        first.index,
        vec![
            first.index as f64 * params.dt,
            sample.analyte_volume,
            sample.solvent_volume,
        ],
    )?;
    let first_elapsed = started.elapsed();

    let stride = params.cfg_spacing + 1;
    let processor = FrameProcessor::new(ProcessorConfig {
        workers: resolve_workers(params.threads),
        start: params.cfg_start + stride,
        end: params.cfg_end,
        stride,
    });
    let worker = VolumeWorker {
        grid: &grid,
        species: &species,
        sink: &sink,
        dt: params.dt,
    };
    let others = Instant::now();
    let (outcome, _source) = processor.run(TypedSource::new(reader, species.filter().clone()), &worker);
    let others_elapsed = others.elapsed();

    // Rows already queued are written even when the run failed.
    let rows = sink.finish()?;
    info!(
        "volume: first frame {:.2?}, other frames {:.2?}, total {:.2?}",
        first_elapsed,
        others_elapsed,
        first_elapsed + others_elapsed
    );
    outcome.into_result()?;
    Ok(report(rows, &params.file_out, started))
}

/// XYZ point cloud: `O` for analyte cells, `C` for solvent candidates
pub fn write_point_cloud(path: &Path, cells: &[GridCell]) -> Result<(), CalcError> {
    let mut out = create_output(path)?;
    format_point_cloud(&mut out, cells)
        .and_then(|()| out.flush())
        .map_err(|e| CalcError::io(path, e))
}

fn format_point_cloud(out: &mut impl Write, cells: &[GridCell]) -> std::io::Result<()> {
    writeln!(out, "{}", cells.len())?;
    writeln!(out, "grid cells (O: analyte, C: solvent)")?;
    for cell in cells {
        let tag = if cell.analyte { "O" } else { "C" };
        let [x, y, z] = cell.center;
        writeln!(out, "{tag} {x} {y} {z}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> VolumeParams {
        VolumeParams {
            file_in: "in".into(),
            file_out: "out".into(),
            file_out_xyz: "out.xyz".into(),
            cfg_start: 0,
            cfg_end: 2,
            cfg_spacing: 0,
            bloc: [0.5; 3],
            blocs: [2; 3],
            dt: 1.0,
            threads: None,
            coords: CoordKind::Wrapped,
            atoms: vec!["C".to_string()],
            sigma: BTreeMap::from([("C".to_string(), 1.7), ("OW".to_string(), 1.5)]),
        }
    }

    #[test]
    fn test_validate() {
        assert!(params().validate().is_ok());

        let mut missing = params();
        missing.atoms.push("N".to_string());
        let err = missing.validate().unwrap_err();
        assert!(err.to_string().contains("`N`"));

        let mut flat = params();
        flat.bloc[2] = 0.0;
        assert!(matches!(flat.validate(), Err(CalcError::InvalidConfig(_))));
    }

    #[test]
    fn test_point_cloud_format() {
        let cells = [
            GridCell {
                index: [0, 0, 0],
                center: [0.25, 0.25, 0.25],
                analyte: true,
            },
            GridCell {
                index: [1, 0, 0],
                center: [0.75, 0.25, 0.25],
                analyte: false,
            },
        ];
        let mut out = Vec::new();
        format_point_cloud(&mut out, &cells).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "2");
        assert_eq!(lines[2], "O 0.25 0.25 0.25");
        assert_eq!(lines[3], "C 0.75 0.25 0.25");
    }
}
