//! Radial distribution function.
//!
//! One histogram row is kept per source atom and configured target type.
//! Counts are integers, so histograms built by different workers can be
//! merged in any order without changing the result. Box volumes are tagged
//! with their frame index and summed in frame order at the end.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use log::warn;

use super::error::KernelError;
use super::geometry::min_image_dist2;
use crate::dump::{BoxDims, SpeciesFilter, TypedAtoms};

/// One configured `(source, target)` type pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdfPair {
    /// Slot of the source type in the layout's filter
    pub source: usize,
    /// Slot of the target type in the layout's filter
    pub target: usize,
}

/// Binning parameters and the row layout fixed by the first frame
#[derive(Debug, Clone)]
pub struct RdfLayout {
    filter: SpeciesFilter,
    pairs: Vec<RdfPair>,
    dr: f64,
    rmax2: f64,
    bins: usize,
    /// Atoms per slot in the first frame
    first_counts: Vec<usize>,
    /// Source slot of every source atom of the first frame, in stream order
    source_order: Vec<usize>,
}

impl RdfLayout {
    /// Build the layout from a `source -> targets` map.
    ///
    /// Repeated targets of one source are collapsed. `bins` is
    /// `floor(rmax / dr)`.
    pub fn new(pairs: &BTreeMap<String, Vec<String>>, dr: f64, rmax: f64) -> Self {
        let mut filter = SpeciesFilter::default();
        let mut layout_pairs = Vec::new();
        for (source, targets) in pairs {
            let source_slot = filter.insert(source.clone());
            for target in targets {
                let target_slot = filter.insert(target.clone());
                let pair = RdfPair {
                    source: source_slot,
                    target: target_slot,
                };
                if !layout_pairs.contains(&pair) {
                    layout_pairs.push(pair);
                }
            }
        }

        Self {
            filter,
            pairs: layout_pairs,
            dr,
            rmax2: rmax * rmax,
            bins: (rmax / dr) as usize,
            first_counts: Vec::new(),
            source_order: Vec::new(),
        }
    }

    /// Every atom type the calculation reads
    pub fn filter(&self) -> &SpeciesFilter {
        &self.filter
    }

    /// Configured pairs
    pub fn pairs(&self) -> &[RdfPair] {
        &self.pairs
    }

    /// Number of distance bins
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Bin width
    pub fn dr(&self) -> f64 {
        self.dr
    }

    /// Fix row counts and row order from the first frame
    pub fn bind(&mut self, first: &TypedAtoms) {
        self.first_counts = first.counts();
        let is_source = |slot: usize| self.pairs.iter().any(|pair| pair.source == slot);
        self.source_order = first
            .order
            .iter()
            .copied()
            .filter(|&slot| is_source(slot))
            .collect();
    }

    /// Histogram rows of a pair (source atoms of the first frame)
    pub fn rows(&self, pair: usize) -> usize {
        self.first_counts
            .get(self.pairs[pair].source)
            .copied()
            .unwrap_or(0)
    }

    /// Bin of a distance, or `None` past the last bin
    pub fn bin_of(&self, distance: f64) -> Option<usize> {
        let bin = (distance / self.dr) as usize;
        (bin < self.bins).then_some(bin)
    }

    /// Volume of the spherical shell of bin `i`
    pub fn shell_volume(&self, i: usize) -> f64 {
        let outer = (i + 1) as f64 * self.dr;
        let inner = i as f64 * self.dr;
        4.0 / 3.0 * PI * (outer.powi(3) - inner.powi(3))
    }

    /// `(pair, row)` of every output column, in first-frame stream order
    fn columns(&self) -> Vec<(usize, usize)> {
        let mut seen = vec![0usize; self.filter.len()];
        let mut columns = Vec::new();
        for &slot in &self.source_order {
            let row = seen[slot];
            seen[slot] += 1;
            for (p, pair) in self.pairs.iter().enumerate() {
                if pair.source == slot {
                    columns.push((p, row));
                }
            }
        }
        columns
    }
}

/// Partial g(r) accumulation over some frames
#[derive(Debug, Clone, Default)]
pub struct RdfHistogram {
    /// Per pair, `rows * bins` counts
    counts: Vec<Vec<u64>>,
    /// `(frame index, box volume)` of every accumulated frame
    volumes: Vec<(usize, f64)>,
    /// Pairs within the cutoff whose bin lies past the last one
    discarded: u64,
}

impl RdfHistogram {
    /// Empty histogram shaped after a bound layout
    pub fn new(layout: &RdfLayout) -> Self {
        let counts = (0..layout.pairs.len())
            .map(|p| vec![0; layout.rows(p) * layout.bins])
            .collect();
        Self {
            counts,
            volumes: Vec::new(),
            discarded: 0,
        }
    }

    /// Number of frames accumulated
    pub fn frames(&self) -> usize {
        self.volumes.len()
    }

    /// Raw count of one bin
    pub fn count(&self, layout: &RdfLayout, pair: usize, row: usize, bin: usize) -> u64 {
        self.counts[pair][row * layout.bins + bin]
    }

    /// Add one frame's pair distances
    pub fn accumulate(
        &mut self,
        layout: &RdfLayout,
        frame: usize,
        box_dims: &BoxDims,
        atoms: &TypedAtoms,
    ) -> Result<(), KernelError> {
        for (p, pair) in layout.pairs.iter().enumerate() {
            let sources = atoms.group(pair.source);
            let expected = layout.rows(p);
            if sources.len() != expected {
                return Err(KernelError::RowCountMismatch {
                    species: layout.filter.name(pair.source).to_string(),
                    expected,
                    got: sources.len(),
                });
            }
            let targets = atoms.group(pair.target);
            let counts = &mut self.counts[p];
            for (row, &a) in sources.iter().enumerate() {
                let base = row * layout.bins;
                for &b in targets {
                    let d2 = min_image_dist2(a, b, box_dims);
                    if d2 <= layout.rmax2 {
                        match layout.bin_of(d2.sqrt()) {
                            Some(bin) => counts[base + bin] += 1,
                            None => self.discarded += 1,
                        }
                    }
                }
            }
        }
        self.volumes.push((frame, box_dims.volume()));
        Ok(())
    }

    /// Fold another partial histogram into this one
    pub fn merge(&mut self, other: RdfHistogram) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts) {
            for (a, b) in mine.iter_mut().zip(theirs) {
                *a += b;
            }
        }
        self.volumes.extend(other.volumes);
        self.discarded += other.discarded;
    }

    /// Normalise into the output table
    pub fn finalize(mut self, layout: &RdfLayout) -> RdfTable {
        if self.discarded > 0 {
            warn!(
                "{} pair distances fell on the cutoff edge and were not binned",
                self.discarded
            );
        }
        self.volumes.sort_by_key(|&(frame, _)| frame);
        let frames = self.volumes.len() as f64;
        let average_volume = self.volumes.iter().map(|&(_, v)| v).sum::<f64>() / frames;

        let columns = layout.columns();
        let mut header = vec!["dist".to_string()];
        for &(p, row) in &columns {
            let pair = &layout.pairs[p];
            let label = format!(
                "{}-{}({row})",
                layout.filter.name(pair.source),
                layout.filter.name(pair.target)
            );
            header.push(format!("{label}-intg"));
            header.push(format!("{label}-hstg"));
        }

        // Per column: (integral, normalised histogram) for every bin.
        let series: Vec<(Vec<f64>, Vec<f64>)> = columns
            .iter()
            .map(|&(p, row)| {
                let target = layout.pairs[p].target;
                let density = layout.first_counts.get(target).copied().unwrap_or(0) as f64
                    / average_volume;
                let mut integral = Vec::with_capacity(layout.bins);
                let mut histogram = Vec::with_capacity(layout.bins);
                let mut running = 0.0;
                for bin in 0..layout.bins {
                    let per_frame = self.count(layout, p, row, bin) as f64 / frames;
                    histogram.push(per_frame / (layout.shell_volume(bin) * density));
                    running += per_frame;
                    integral.push(running);
                }
                (integral, histogram)
            })
            .collect();

        let rows = (0..layout.bins)
            .map(|bin| {
                let mut values = Vec::with_capacity(1 + 2 * series.len());
                values.push((bin as f64 + 0.5) * layout.dr);
                for (integral, histogram) in &series {
                    values.push(integral[bin]);
                    values.push(histogram[bin]);
                }
                values
            })
            .collect();

        RdfTable { header, rows }
    }
}

/// Final g(r) table: one row per bin
#[derive(Debug, Clone, PartialEq)]
pub struct RdfTable {
    /// Column names
    pub header: Vec<String>,
    /// Bin centre followed by `(integral, g(r))` per column
    pub rows: Vec<Vec<f64>>,
}
