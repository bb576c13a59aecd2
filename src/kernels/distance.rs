//! Separation of two atoms
use serde::Serialize;

use super::error::KernelError;
use super::geometry::{norm2, sub};
use crate::dump::{AtomRecord, Vec3};

/// Separation between two atoms of one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Separation {
    /// `first - second`
    pub vector: Vec3,
    /// Euclidean norm of `vector`
    pub distance: f64,
}

impl Separation {
    /// Separation of two positions, without periodic folding
    pub fn between(first: Vec3, second: Vec3) -> Self {
        let vector = sub(first, second);
        Self {
            vector,
            distance: norm2(vector).sqrt(),
        }
    }
}

/// Separation between the atoms at two row ordinals
pub fn separation(
    atoms: &[AtomRecord],
    first: usize,
    second: usize,
) -> Result<Separation, KernelError> {
    let at = |index: usize| {
        atoms
            .get(index)
            .map(|atom| atom.position)
            .ok_or(KernelError::AtomOutOfRange {
                index,
                atoms: atoms.len(),
            })
    };
    Ok(Separation::between(at(first)?, at(second)?))
}
