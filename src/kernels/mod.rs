//! # Numeric Kernels
//!
//! Pure per-frame computations. Each kernel turns one decoded frame into a
//! contribution to its calculation's output:
//!
//! - [`distance`]: separation of two atoms picked by row ordinal
//! - [`gyration`]: radius of gyration of a contiguous atom range
//! - [`rdf`]: pair-distance histograms and their g(r) normalisation
//! - [`volume`]: grid-occupancy analyte and solvent volumes

pub mod distance;
mod error;
pub mod geometry;
pub mod gyration;
pub mod rdf;
pub mod volume;

pub use distance::{separation, Separation};
pub use error::KernelError;
pub use gyration::radius_of_gyration;
pub use rdf::{RdfHistogram, RdfLayout, RdfPair, RdfTable};
pub use volume::{GridCell, VolumeGrid, VolumeSample, VolumeSpecies};
