//! Radial distribution function over a frame range, computed by a worker pool

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::output::TableWriter;
use super::{
    check_frames, check_threads, load_params, open_reader, report, resolve_workers, CalcError,
    CalcReport, Calculation, Params,
};
use crate::dump::{ColumnRequest, CoordKind, Need, TypedFrame};
use crate::kernels::{RdfHistogram, RdfLayout};
use crate::pipeline::{BoxError, FrameProcessor, FrameWorker, ProcessorConfig, TypedSource};

/// `[rdf]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RdfParams {
    /// Trajectory to read
    pub file_in: PathBuf,
    /// Output table
    pub file_out: PathBuf,
    /// First frame (inclusive)
    #[serde(default)]
    pub cfg_start: usize,
    /// Last frame (exclusive)
    pub cfg_end: usize,
    /// Frames skipped between two processed frames
    #[serde(default)]
    pub cfg_spacing: usize,
    /// Cutoff radius
    pub rmax: f64,
    /// Bin width
    pub dr: f64,
    /// Workers, the calling thread included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    /// Coordinate columns to read
    #[serde(default)]
    pub coords: CoordKind,
    /// Target types of every source type
    pub atoms: BTreeMap<String, Vec<String>>,
}

impl Params for RdfParams {
    fn validate(&self) -> Result<(), CalcError> {
        check_frames(self.cfg_start, self.cfg_end)?;
        check_threads(self.threads)?;
        if self.dr.is_nan() || self.dr <= 0.0 {
            return Err(CalcError::InvalidConfig(format!(
                "dr ({}) must be positive",
                self.dr
            )));
        }
        if self.rmax.is_nan() || (self.rmax / self.dr).floor() <= 1.0 {
            return Err(CalcError::InvalidConfig(format!(
                "rmax ({}) must span more than one bin of width dr ({})",
                self.rmax, self.dr
            )));
        }
        if self.atoms.values().all(Vec::is_empty) {
            return Err(CalcError::InvalidConfig(
                "atoms must name at least one source and target".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pair distribution of configured type pairs
pub struct Rdf;

impl Calculation for Rdf {
    fn name(&self) -> &'static str {
        "rdf"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["gr"]
    }

    fn summary(&self) -> &'static str {
        "radial distribution function of atom type pairs"
    }

    fn run(&self, params: &Path) -> Result<CalcReport, CalcError> {
        let params: RdfParams = load_params(params, self)?;
        compute(&params)
    }
}

/// Accumulates one histogram per worker
struct RdfWorker<'a> {
    layout: &'a RdfLayout,
}

impl FrameWorker<TypedFrame> for RdfWorker<'_> {
    type Partial = RdfHistogram;

    fn partial(&self) -> RdfHistogram {
        RdfHistogram::new(self.layout)
    }

    fn process(
        &self,
        histogram: &mut RdfHistogram,
        index: usize,
        frame: TypedFrame,
    ) -> Result<(), BoxError> {
        histogram.accumulate(self.layout, index, &frame.box_dims, &frame.atoms)?;
        debug!("frame {index}: binned");
        Ok(())
    }
}

/// Run the RDF calculation.
///
/// The first frame fixes the row layout and is processed on the calling
/// thread; the rest of the range is shared by the worker pool.
pub fn compute(params: &RdfParams) -> Result<CalcReport, CalcError> {
    let started = Instant::now();
    let mut layout = RdfLayout::new(&params.atoms, params.dr, params.rmax);
    let request = ColumnRequest::coords(params.coords).with_species(Need::Required);
    let mut reader = open_reader(&params.file_in, request)?;

    reader.skip_frames(params.cfg_start)?;
    let first = reader.next_typed(layout.filter())?;
    layout.bind(&first.atoms);
    for (slot, count) in first.atoms.counts().into_iter().enumerate() {
        if count == 0 {
            warn!(
                "frame {}: no atom of type `{}`",
                first.index,
                layout.filter().name(slot)
            );
        }
    }

    let mut histogram = RdfHistogram::new(&layout);
    histogram
        .accumulate(&layout, first.index, &first.box_dims, &first.atoms)
        .map_err(|e| CalcError::kernel(first.index, e))?;

    let stride = params.cfg_spacing + 1;
    let processor = FrameProcessor::new(ProcessorConfig {
        workers: resolve_workers(params.threads),
        start: params.cfg_start + stride,
        end: params.cfg_end,
        stride,
    });
    let source = TypedSource::new(reader, layout.filter().clone());
    let (outcome, _source) = processor.run(source, &RdfWorker { layout: &layout });
    for partial in outcome.into_result()? {
        histogram.merge(partial);
    }

    let frames = histogram.frames();
    let table = histogram.finalize(&layout);
    let mut writer = TableWriter::create(&params.file_out, params, &table.header)?;
    for row in &table.rows {
        writer.values(row)?;
    }
    writer.finish()?;
    Ok(report(frames, &params.file_out, started))
}
