//! Grid-occupancy volume of a solute in a solvent.
//!
//! The box is cut into cells of size `bloc`. Cells within `reach` cells of an
//! analyte atom are candidates. A candidate belongs to the analyte when its
//! centre is closer (relative to the atom radii) to an analyte atom than to
//! any solvent atom.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::error::KernelError;
use super::geometry::min_image_dist2;
use crate::dump::{BoxDims, SpeciesFilter, TypedAtoms, Vec3};

/// Atom types read by the volume calculation, analytes first
#[derive(Debug, Clone)]
pub struct VolumeSpecies {
    filter: SpeciesFilter,
    analytes: usize,
    sigma: Vec<f64>,
}

impl VolumeSpecies {
    /// Analyte types plus every other type that has a radius.
    ///
    /// Every analyte type needs a radius.
    pub fn new(analytes: &[String], sigma: &BTreeMap<String, f64>) -> Result<Self, KernelError> {
        let mut filter = SpeciesFilter::default();
        let mut radii = Vec::new();
        for name in analytes {
            let radius = sigma
                .get(name)
                .copied()
                .ok_or_else(|| KernelError::MissingRadius {
                    species: name.clone(),
                })?;
            if filter.slot(name).is_none() {
                filter.insert(name.clone());
                radii.push(radius);
            }
        }
        let analyte_slots = filter.len();
        for (name, &radius) in sigma {
            if filter.slot(name).is_none() {
                filter.insert(name.clone());
                radii.push(radius);
            }
        }
        Ok(Self {
            filter,
            analytes: analyte_slots,
            sigma: radii,
        })
    }

    /// Every atom type the calculation reads
    pub fn filter(&self) -> &SpeciesFilter {
        &self.filter
    }

    /// Whether a slot holds an analyte type
    pub fn is_analyte(&self, slot: usize) -> bool {
        slot < self.analytes
    }
}

/// One candidate cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridCell {
    /// Cell index along x, y and z
    pub index: [i64; 3],
    /// Cell centre
    pub center: Vec3,
    /// Whether the cell counts toward the analyte volume
    pub analyte: bool,
}

/// Result of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSample {
    /// Cell volume times the number of analyte cells
    pub analyte_volume: f64,
    /// Box volume minus the analyte volume
    pub solvent_volume: f64,
    /// Candidate cells, kept only when requested
    pub cells: Vec<GridCell>,
}

/// Cell geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeGrid {
    /// Cell edge lengths
    pub bloc: Vec3,
    /// Neighbourhood half-width around every analyte atom, in cells
    pub reach: [usize; 3],
}

impl VolumeGrid {
    /// Cell volume
    pub fn cell_volume(&self) -> f64 {
        self.bloc[0] * self.bloc[1] * self.bloc[2]
    }

    /// Number of cells along each axis of a box (at least one)
    pub fn cells_per_axis(&self, box_dims: &BoxDims) -> [i64; 3] {
        let mut n = [1i64; 3];
        for axis in 0..3 {
            n[axis] = ((box_dims.lengths[axis] / self.bloc[axis]).round() as i64).max(1);
        }
        n
    }

    /// Centre of a cell
    pub fn center(&self, index: [i64; 3]) -> Vec3 {
        let mut c = [0.0; 3];
        for axis in 0..3 {
            c[axis] = self.bloc[axis] * index[axis] as f64 + self.bloc[axis] / 2.0;
        }
        c
    }

    /// Candidate cells: the union of the neighbourhoods of every analyte atom
    pub fn candidates(
        &self,
        species: &VolumeSpecies,
        box_dims: &BoxDims,
        atoms: &TypedAtoms,
    ) -> BTreeSet<[i64; 3]> {
        let n = self.cells_per_axis(box_dims);
        let reach = self.reach.map(|r| r as i64);
        let mut cells = BTreeSet::new();
        for slot in 0..species.analytes {
            for position in atoms.group(slot) {
                // Fold before offsetting; the cast saturates on huge coordinates.
                let mut home = [0i64; 3];
                for axis in 0..3 {
                    home[axis] = ((position[axis] / self.bloc[axis]) as i64).rem_euclid(n[axis]);
                }
                for dx in -reach[0]..=reach[0] {
                    for dy in -reach[1]..=reach[1] {
                        for dz in -reach[2]..=reach[2] {
                            cells.insert([
                                (home[0] + dx).rem_euclid(n[0]),
                                (home[1] + dy).rem_euclid(n[1]),
                                (home[2] + dz).rem_euclid(n[2]),
                            ]);
                        }
                    }
                }
            }
        }
        cells
    }

    /// Compute the analyte and solvent volumes of one frame
    pub fn sample(
        &self,
        species: &VolumeSpecies,
        box_dims: &BoxDims,
        atoms: &TypedAtoms,
        keep_cells: bool,
    ) -> VolumeSample {
        let mut analyte_cells = 0usize;
        let mut cells = Vec::new();
        for index in self.candidates(species, box_dims, atoms) {
            let center = self.center(index);
            let analyte = self.is_analyte_cell(species, box_dims, atoms, center);
            if analyte {
                analyte_cells += 1;
            }
            if keep_cells {
                cells.push(GridCell {
                    index,
                    center,
                    analyte,
                });
            }
        }

        let analyte_volume = self.cell_volume() * analyte_cells as f64;
        VolumeSample {
            analyte_volume,
            solvent_volume: box_dims.volume() - analyte_volume,
            cells,
        }
    }

    /// Analyte scores are `d² / σ²`, solvent scores `d / σ`; the analyte
    /// must win strictly.
    fn is_analyte_cell(
        &self,
        species: &VolumeSpecies,
        box_dims: &BoxDims,
        atoms: &TypedAtoms,
        center: Vec3,
    ) -> bool {
        let mut best_analyte = f64::INFINITY;
        for slot in 0..species.analytes {
            let sigma2 = species.sigma[slot] * species.sigma[slot];
            for &position in atoms.group(slot) {
                let score = min_image_dist2(position, center, box_dims) / sigma2;
                best_analyte = best_analyte.min(score);
            }
        }

        for slot in species.analytes..species.filter.len() {
            let sigma = species.sigma[slot];
            for &position in atoms.group(slot) {
                let score = min_image_dist2(position, center, box_dims).sqrt() / sigma;
                if score <= best_analyte {
                    return false;
                }
            }
        }
        best_analyte.is_finite()
    }
}
