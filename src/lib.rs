//! # dumpcalc - Trajectory Analysis for LAMMPS Dump Files
//!
//! `dumpcalc` streams molecular-dynamics trajectories written in the LAMMPS
//! text dump layout and computes time series and distributions from them,
//! one frame at a time and without ever loading the whole trajectory.
//!
//! ## Key Features
//!
//! - **Streaming Reader**: Forward-only frame reader with a column schema
//!   resolved once from the first frame; plain and gzip input.
//!
//! - **Cheap Frame Skipping**: Frames before the range of interest are
//!   skipped as whole line blocks, never decoded.
//!
//! - **Concurrent Processing**: Expensive per-frame kernels (RDF, volume) run
//!   on a worker pool sharing one stream; reads are serialized, numeric work
//!   is not.
//!
//! - **Deterministic Output**: Worker-count-independent results for the RDF,
//!   shortest round-trip number formatting everywhere.
//!
//! ## Quick Start - Running a Calculation
//!
//! Parameters live in a TOML table named after the calculation:
//!
//! ```toml
//! [rdf]
//! file_in = "water.lammpstrj"
//! file_out = "gr.dat"
//! cfg_start = 100
//! cfg_end = 1100
//! rmax = 8.0
//! dr = 0.05
//!
//! [rdf.atoms]
//! O = ["O", "H"]
//! ```
//!
//! ```rust,no_run
//! use dumpcalc::calc::launch;
//! use std::path::Path;
//!
//! let report = launch("rdf", Path::new("gr.toml"))?;
//! println!("{} frames processed", report.frames);
//! # Ok::<(), dumpcalc::calc::CalcError>(())
//! ```
//!
//! ## Reading Frames
//!
//! ```rust,no_run
//! use dumpcalc::dump::{ColumnRequest, CoordKind, DumpReader};
//!
//! let mut reader = DumpReader::open(
//!     "water.lammpstrj",
//!     ColumnRequest::coords(CoordKind::Wrapped),
//! )?;
//! reader.skip_frames(10)?;
//! let frame = reader.next_records()?;
//! println!("frame {}: {} atoms", frame.index, frame.atoms.len());
//! # Ok::<(), dumpcalc::dump::DumpError>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`dump`]: Line cursor, header parsing, column schema and frame decoding
//! - [`pbc`]: Periodic-boundary unwrapping across frames
//! - [`pipeline`]: Worker pool sharing one frame stream
//! - [`kernels`]: Per-frame numeric kernels (distance, gyration, RDF, volume)
//! - [`calc`]: The named calculations, their parameters and table output
//!
//! ## Calculations
//!
//! | Name | Output columns |
//! |------|----------------|
//! | `distance` | `cfg t x y z dist` |
//! | `gyration` | `cfg t radius` |
//! | `unwrap` | full trajectory with `xu yu zu` |
//! | `rdf` | `dist` then `A-B(i)-intg A-B(i)-hstg` per source atom and target type |
//! | `volume` | `cfg t vol(atoms) vol(other)` plus an XYZ point cloud |

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod calc;
pub mod dump;
pub mod kernels;
pub mod pbc;
pub mod pipeline;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::calc::{launch, lookup, registry, CalcError, CalcReport, Calculation};
    pub use crate::dump::{
        AtomRecord, BoxDims, ColumnRequest, ColumnSchema, CoordKind, DumpError, DumpReader, Frame,
        Need, SpeciesFilter, TypedAtoms, TypedFrame, Vec3,
    };
    pub use crate::kernels::{KernelError, RdfHistogram, RdfLayout, VolumeGrid, VolumeSpecies};
    pub use crate::pbc::{PbcError, Unwrapper};
    pub use crate::pipeline::{
        FrameProcessor, FrameSource, FrameWorker, PipelineError, ProcessorConfig, TypedSource,
    };
}
