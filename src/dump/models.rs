//! Data model for decoded dump frames

use std::borrow::Borrow;
use std::collections::HashMap;

/// Cartesian coordinate triple
pub type Vec3 = [f64; 3];

/// Orthorhombic box edge lengths of one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxDims {
    /// Edge lengths along x, y and z (`hi - lo` of each bounds line)
    pub lengths: Vec3,
}

impl BoxDims {
    /// Create box dimensions from edge lengths
    pub fn new(lengths: Vec3) -> Self {
        Self { lengths }
    }

    /// Box volume
    pub fn volume(&self) -> f64 {
        self.lengths[0] * self.lengths[1] * self.lengths[2]
    }

    /// Half edge lengths, the default unwrapping threshold
    pub fn half(&self) -> Vec3 {
        [
            self.lengths[0] / 2.0,
            self.lengths[1] / 2.0,
            self.lengths[2] / 2.0,
        ]
    }
}

/// One decoded atom row.
///
/// Atoms carry no explicit identifier: their row position within the frame
/// is their identity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtomRecord {
    /// Coordinates taken from the schema's x/y/z columns
    pub position: Vec3,
    /// Verbatim content of the `type` column, when resolved
    pub species: Option<String>,
    /// Verbatim content of the `mol` column, when resolved
    pub molecule: Option<String>,
}

/// A decoded atom row together with all of its raw fields
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRow {
    /// Whitespace-separated fields of the row, verbatim
    pub fields: Vec<String>,
    /// Decoded view of the row
    pub record: AtomRecord,
}

impl Borrow<AtomRecord> for AtomRow {
    fn borrow(&self) -> &AtomRecord {
        &self.record
    }
}

/// A decoded frame
#[derive(Debug, Clone)]
pub struct Frame<T> {
    /// Absolute index of the frame in the trajectory (0-based)
    pub index: usize,
    /// Box dimensions of this frame
    pub box_dims: BoxDims,
    /// Raw header lines of this frame, column-header line included
    pub header_lines: Vec<String>,
    /// Decoded atom payload
    pub atoms: T,
}

/// Set of atom types a calculation cares about, each mapped to a dense slot
#[derive(Debug, Clone, Default)]
pub struct SpeciesFilter {
    names: Vec<String>,
    slots: HashMap<String, usize>,
}

impl SpeciesFilter {
    /// Build a filter from type names; duplicates are collapsed
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = Self::default();
        for name in names {
            filter.insert(name.into());
        }
        filter
    }

    /// Add a type, returning its slot
    pub fn insert(&mut self, name: String) -> usize {
        if let Some(&slot) = self.slots.get(&name) {
            return slot;
        }
        let slot = self.names.len();
        self.slots.insert(name.clone(), slot);
        self.names.push(name);
        slot
    }

    /// Slot of a type, if it is of interest
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    /// Type name stored in a slot
    pub fn name(&self, slot: usize) -> &str {
        &self.names[slot]
    }

    /// Type names in slot order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of types of interest
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no type is of interest
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Atoms of interest grouped by type slot
#[derive(Debug, Clone, Default)]
pub struct TypedAtoms {
    /// Coordinates per slot, in stream order within each slot
    pub groups: Vec<Vec<Vec3>>,
    /// Slot of every retained atom, in stream order
    pub order: Vec<usize>,
}

impl TypedAtoms {
    /// Empty grouping for `slots` types
    pub fn with_slots(slots: usize) -> Self {
        Self {
            groups: vec![Vec::new(); slots],
            order: Vec::new(),
        }
    }

    /// Coordinates of one slot
    pub fn group(&self, slot: usize) -> &[Vec3] {
        &self.groups[slot]
    }

    /// Number of atoms retained for each slot
    pub fn counts(&self) -> Vec<usize> {
        self.groups.iter().map(Vec::len).collect()
    }
}

/// A frame decoded in select-by-type mode
pub type TypedFrame = Frame<TypedAtoms>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_filter_dedup() {
        let filter = SpeciesFilter::new(["O", "H", "O"]);
        assert_eq!(filter.len(), 2);
        assert_eq!(filter.slot("O"), Some(0));
        assert_eq!(filter.slot("H"), Some(1));
        assert_eq!(filter.slot("C"), None);
        assert_eq!(filter.name(1), "H");
    }

    #[test]
    fn test_box_volume() {
        let dims = BoxDims::new([2.0, 3.0, 4.0]);
        assert_eq!(dims.volume(), 24.0);
        assert_eq!(dims.half(), [1.0, 1.5, 2.0]);
    }
}
