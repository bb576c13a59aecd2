//! # Dump Trajectory Parser Module
//!
//! Streaming parsing of text dump trajectories: a sequence of frames, each one
//! describing an orthorhombic simulation box followed by a per-atom table.
//!
//! ## Design Goals
//!
//! - **Streaming**: frames are decoded one at a time from a forward-only stream
//! - **Schema once**: column positions are resolved from the first decoded frame
//!   and reused without re-parsing
//! - **Strict rows, lenient numbers**: a row with the wrong field count is fatal,
//!   a malformed numeric token reads as zero
//!
//! ## Frame Structure
//!
//! ```text
//! trajectory
//! └── frame* (many)
//!     ├── preamble (timestep, atom count on the first frame)
//!     ├── box bounds (3 lines, `lo hi`)
//!     ├── column header (`ITEM: ATOMS` + field names)
//!     └── atom row* (atoms, one per line)
//! ```

mod cursor;
mod decoder;
mod error;
pub mod header;
mod models;
mod open;
mod reader;
mod schema;

#[cfg(test)]
mod tests;

pub use cursor::LineCursor;
pub use decoder::FrameDecoder;
pub use error::DumpError;
pub use header::{parse_lenient, FirstHeader, FrameHeader};
pub use models::*;
pub use open::{is_gzip, open_input, open_input_with_buffer_size, TrajectoryInput};
pub use reader::DumpReader;
pub use schema::{ColumnRequest, ColumnSchema, CoordKind, Need};
