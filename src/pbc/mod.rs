//! # Periodic Boundary Unwrapping
//!
//! [`Unwrapper`] turns wrapped coordinates into continuous trajectories. It is
//! a one-pass filter: every frame is unwrapped against the previous one and
//! emitted immediately, so a run can only be restarted from the first frame.
//!
//! ## State
//!
//! - **First frame**: molecules are made whole. Atoms that share a molecule
//!   tag on consecutive rows are unwrapped against the previous atom of the
//!   same molecule; the first atom of each molecule keeps its raw position.
//! - **Later frames**: every atom is unwrapped against its own previous
//!   unwrapped position. The image shift applied so far is accumulated per
//!   atom, so repeated crossings of the same face keep adding box lengths.
//!
//! The per-axis threshold is half of the current box length unless the
//! molecule has an override.

use std::borrow::Borrow;
use std::collections::HashMap;

use log::debug;

use crate::dump::{AtomRecord, BoxDims, Vec3};


/// Errors raised while unwrapping
#[derive(Debug, thiserror::Error)]
pub enum PbcError {
    /// A frame does not hold as many atoms as the first one
    #[error("frame {frame}: expected {expected} atoms, got {got}")]
    AtomCountChanged {
        /// Absolute frame index
        frame: usize,
        /// Atom count of the first frame
        expected: usize,
        /// Atom count of this frame
        got: usize,
    },
}

/// Image shift for one axis of `raw` relative to `previous`.
///
/// A jump larger than `threshold` is taken as a crossing: one box length is
/// added (lower face crossed) or removed (upper face crossed).
pub fn image_shift(previous: f64, raw: f64, length: f64, threshold: f64) -> f64 {
    let dist = previous - raw;
    if dist > threshold {
        length
    } else if dist < -threshold {
        -length
    } else {
        0.0
    }
}

/// Unwrap one axis of `raw` against `previous`
pub fn unwrap_axis(previous: f64, raw: f64, length: f64, threshold: f64) -> f64 {
    match image_shift(previous, raw, length, threshold) {
        shift if shift == 0.0 => raw,
        shift => raw + shift,
    }
}

#[derive(Debug, Clone)]
struct Tracks {
    last: Vec<Vec3>,
    shift: Vec<Vec3>,
    thresholds: Vec<Option<Vec3>>,
}

/// Stateful unwrapping filter over consecutive frames
#[derive(Debug, Clone, Default)]
pub struct Unwrapper {
    overrides: HashMap<String, Vec3>,
    tracks: Option<Tracks>,
}

impl Unwrapper {
    /// Unwrapper with per-molecule threshold overrides
    pub fn new(overrides: HashMap<String, Vec3>) -> Self {
        Self {
            overrides,
            tracks: None,
        }
    }

    /// Whether the first frame has been seen
    pub fn is_primed(&self) -> bool {
        self.tracks.is_some()
    }

    /// Unwrap the next frame, returning one position per atom in row order
    pub fn unwrap_frame<A: Borrow<AtomRecord>>(
        &mut self,
        frame: usize,
        box_dims: &BoxDims,
        atoms: &[A],
    ) -> Result<Vec<Vec3>, PbcError> {
        match self.tracks.as_mut() {
            None => {
                let tracks = self.first_frame(box_dims, atoms);
                let positions = tracks.last.clone();
                debug!("frame {frame}: tracking {} atoms", positions.len());
                self.tracks = Some(tracks);
                Ok(positions)
            }
            Some(tracks) => {
                if atoms.len() != tracks.last.len() {
                    return Err(PbcError::AtomCountChanged {
                        frame,
                        expected: tracks.last.len(),
                        got: atoms.len(),
                    });
                }
                Ok(Self::next_frame(tracks, box_dims, atoms))
            }
        }
    }

    fn threshold(&self, molecule: Option<&str>) -> Option<Vec3> {
        molecule.and_then(|mol| self.overrides.get(mol).copied())
    }

    fn first_frame<A: Borrow<AtomRecord>>(&self, box_dims: &BoxDims, atoms: &[A]) -> Tracks {
        let half = box_dims.half();
        let mut last = Vec::with_capacity(atoms.len());
        let mut thresholds = Vec::with_capacity(atoms.len());
        let mut current: Option<&str> = None;
        let mut previous = [0.0; 3];
        let mut threshold = half;

        for atom in atoms {
            let atom = atom.borrow();
            let molecule = atom.molecule.as_deref();
            let override_threshold = self.threshold(molecule);
            if molecule.is_some() && molecule == current {
                for axis in 0..3 {
                    previous[axis] = unwrap_axis(
                        previous[axis],
                        atom.position[axis],
                        box_dims.lengths[axis],
                        threshold[axis],
                    );
                }
            } else {
                current = molecule;
                previous = atom.position;
                threshold = override_threshold.unwrap_or(half);
            }
            last.push(previous);
            thresholds.push(override_threshold);
        }

        Tracks {
            shift: vec![[0.0; 3]; last.len()],
            last,
            thresholds,
        }
    }

    fn next_frame<A: Borrow<AtomRecord>>(
        tracks: &mut Tracks,
        box_dims: &BoxDims,
        atoms: &[A],
    ) -> Vec<Vec3> {
        let half = box_dims.half();
        for (i, atom) in atoms.iter().map(Borrow::borrow).enumerate() {
            let threshold = tracks.thresholds[i].unwrap_or(half);
            for axis in 0..3 {
                let shifted = atom.position[axis] + tracks.shift[i][axis];
                let shift = image_shift(
                    tracks.last[i][axis],
                    shifted,
                    box_dims.lengths[axis],
                    threshold[axis],
                );
                tracks.shift[i][axis] += shift;
                tracks.last[i][axis] = shifted + shift;
            }
        }
        tracks.last.clone()
    }
}
