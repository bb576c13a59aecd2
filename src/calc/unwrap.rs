//! Rewrite a wrapped trajectory with unwrapped coordinates

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::output::create_output;
use super::{load_params, open_reader, report, CalcError, CalcReport, Calculation, Params};
use crate::dump::{AtomRow, ColumnRequest, CoordKind, Frame, Need, Vec3};
use crate::pbc::Unwrapper;

/// `[unwrap]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnwrapParams {
    /// Wrapped trajectory
    pub file_in: PathBuf,
    /// Unwrapped trajectory to write
    pub file_out: PathBuf,
    /// Coordinate columns to read
    #[serde(default)]
    pub coords: CoordKind,
    /// Per-molecule crossing thresholds, overriding half the box
    #[serde(default)]
    pub size: BTreeMap<String, Vec3>,
}

impl Params for UnwrapParams {
    fn validate(&self) -> Result<(), CalcError> {
        for (molecule, size) in &self.size {
            if size.iter().any(|&s| s.is_nan() || s <= 0.0) {
                return Err(CalcError::InvalidConfig(format!(
                    "size of molecule `{molecule}` must be positive on every axis"
                )));
            }
        }
        Ok(())
    }
}

/// Unwraps every frame until the end of the trajectory
pub struct Unwrap;

impl Calculation for Unwrap {
    fn name(&self) -> &'static str {
        "unwrap"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["no_pbc"]
    }

    fn summary(&self) -> &'static str {
        "rewrite a trajectory with unwrapped coordinates"
    }

    fn run(&self, params: &Path) -> Result<CalcReport, CalcError> {
        let params: UnwrapParams = load_params(params, self)?;
        compute(&params)
    }
}

/// Run the unwrap calculation
pub fn compute(params: &UnwrapParams) -> Result<CalcReport, CalcError> {
    let started = Instant::now();
    let request = ColumnRequest::coords(params.coords).with_molecule(Need::Optional);
    let mut reader = open_reader(&params.file_in, request)?;
    let mut out = create_output(&params.file_out)?;
    let mut unwrapper = Unwrapper::new(
        params
            .size
            .iter()
            .map(|(molecule, size)| (molecule.clone(), *size))
            .collect(),
    );

    let mut columns: Option<String> = None;
    let mut frames = 0;
    while !reader.is_at_end()? {
        let frame = reader.next_rows()?;
        let positions = unwrapper.unwrap_frame(frame.index, &frame.box_dims, &frame.atoms)?;
        let schema = reader.schema().ok_or_else(|| {
            CalcError::Output("column schema unresolved after decoding a frame".to_string())
        })?;
        let header = columns.get_or_insert_with(|| schema.unwrapped_header());
        write_frame(&mut out, &frame, header, schema.axes, &positions)
            .map_err(|e| CalcError::io(&params.file_out, e))?;
        frames += 1;
    }

    out.flush().map_err(|e| CalcError::io(&params.file_out, e))?;
    Ok(report(frames, &params.file_out, started))
}

/// Header lines verbatim except the column header, rows verbatim except
/// the coordinate fields
fn write_frame(
    out: &mut impl Write,
    frame: &Frame<Vec<AtomRow>>,
    columns: &str,
    axes: [usize; 3],
    positions: &[Vec3],
) -> std::io::Result<()> {
    if let Some((_, preamble)) = frame.header_lines.split_last() {
        for line in preamble {
            writeln!(out, "{line}")?;
        }
    }
    writeln!(out, "{columns}")?;

    for (row, position) in frame.atoms.iter().zip(positions) {
        let mut line = String::with_capacity(16 * row.fields.len());
        for (idx, field) in row.fields.iter().enumerate() {
            if idx > 0 {
                line.push(' ');
            }
            match axes.iter().position(|&a| a == idx) {
                Some(axis) => line.push_str(&position[axis].to_string()),
                None => line.push_str(field),
            }
        }
        writeln!(out, "{line}")?;
    }
    Ok(())
}
