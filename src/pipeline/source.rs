//! Frame sources shared by the workers of a [`super::FrameProcessor`]
use std::io::BufRead;

use crate::dump::{DumpError, DumpReader, SpeciesFilter, TypedFrame};

/// A forward-only stream of frames shared by the workers
pub trait FrameSource: Send {
    /// Decoded frame type
    type Frame: Send;

    /// Absolute index of the next frame the source would return
    fn position(&self) -> usize;

    /// Consume `n` frames without decoding them
    fn skip_frames(&mut self, n: usize) -> Result<(), DumpError>;

    /// Read and decode the next frame
    fn read_frame(&mut self) -> Result<Self::Frame, DumpError>;
}

/// Frames decoded in select-by-type mode
pub struct TypedSource<R: BufRead> {
    reader: DumpReader<R>,
    filter: SpeciesFilter,
}

impl<R: BufRead> TypedSource<R> {
    /// Wrap a reader whose schema is already resolved
    pub fn new(reader: DumpReader<R>, filter: SpeciesFilter) -> Self {
        Self { reader, filter }
    }
}

impl<R: BufRead + Send> FrameSource for TypedSource<R> {
    type Frame = TypedFrame;

    fn position(&self) -> usize {
        self.reader.frame_index()
    }

    fn skip_frames(&mut self, n: usize) -> Result<(), DumpError> {
        self.reader.skip_frames(n)
    }

    fn read_frame(&mut self) -> Result<TypedFrame, DumpError> {
        self.reader.next_typed(&self.filter)
    }
}
