//! Opening trajectory files, plain or gzip
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::reader::DumpReader;
use super::schema::ColumnRequest;
use super::DumpError;

/// Default input buffer size for trajectory parsing (256KB)
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 256 * 1024;

/// Buffered byte stream of a trajectory file, plain or decompressed
pub type TrajectoryInput = BufReader<Box<dyn Read + Send>>;

/// Whether a path names a gzip-compressed trajectory
pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Open a trajectory file, decompressing `.gz` files on the fly
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<TrajectoryInput, DumpError> {
    open_input_with_buffer_size(path, DEFAULT_INPUT_BUFFER_SIZE)
}

/// Open a trajectory file with a custom buffer size
pub fn open_input_with_buffer_size<P: AsRef<Path>>(
    path: P,
    buffer_size: usize,
) -> Result<TrajectoryInput, DumpError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let inner: Box<dyn Read + Send> = if is_gzip(path) {
        gzip_stream(file)?
    } else {
        Box::new(file)
    };
    Ok(BufReader::with_capacity(buffer_size, inner))
}

#[cfg(feature = "gzip")]
fn gzip_stream(file: File) -> Result<Box<dyn Read + Send>, DumpError> {
    Ok(Box::new(flate2::read::MultiGzDecoder::new(file)))
}

#[cfg(not(feature = "gzip"))]
fn gzip_stream(_file: File) -> Result<Box<dyn Read + Send>, DumpError> {
    Err(DumpError::Io(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "gzip support is disabled (enable the `gzip` feature)",
    )))
}

impl DumpReader<TrajectoryInput> {
    /// Open a trajectory file for streaming
    pub fn open<P: AsRef<Path>>(path: P, request: ColumnRequest) -> Result<Self, DumpError> {
        Ok(Self::new(open_input(path)?, request))
    }
}
