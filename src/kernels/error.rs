/// Errors raised by the numeric kernels
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// An atom type has no configured mass
    #[error("mass for atom type `{species}` doesn't exist")]
    MissingMass {
        /// Atom type
        species: String,
    },

    /// An atom type has no configured characteristic radius
    #[error("radius (sigma) for atom type `{species}` doesn't exist")]
    MissingRadius {
        /// Atom type
        species: String,
    },

    /// A frame holds a different number of source atoms than the first frame
    #[error("number of `{species}` atoms changed: {got} (expected {expected})")]
    RowCountMismatch {
        /// Source atom type
        species: String,
        /// Count fixed by the first frame
        expected: usize,
        /// Count found in this frame
        got: usize,
    },

    /// An atom ordinal lies outside the frame
    #[error("atom {index} is out of range (the trajectory has {atoms} atoms)")]
    AtomOutOfRange {
        /// Requested ordinal (0-based)
        index: usize,
        /// Atom count per frame
        atoms: usize,
    },
}
