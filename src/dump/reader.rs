//! Streaming frame reader.
//!
//! [`DumpReader`] ties the line cursor, the header parsers, the column schema
//! and the row decoder together. The schema is resolved lazily from the first
//! frame that is actually decoded and is reused, never re-parsed, for every
//! later frame.

use std::io::BufRead;

use log::debug;

use super::cursor::LineCursor;
use super::decoder::FrameDecoder;
use super::error::DumpError;
use super::header::{
    read_atom_count, read_first_header, read_frame_header, HEADER_LINES, PREAMBLE_LINES,
};
use super::models::{AtomRecord, AtomRow, Frame, SpeciesFilter, TypedFrame};
use super::schema::{ColumnRequest, ColumnSchema};

/// Schema and atom count fixed by the first decoded frame
#[derive(Debug, Clone)]
struct Layout {
    schema: ColumnSchema,
    atoms: usize,
}

/// Forward-only reader producing decoded frames
pub struct DumpReader<R: BufRead> {
    cursor: LineCursor<R>,
    request: ColumnRequest,
    layout: Option<Layout>,
    /// Atom count learned while skipping, before any frame was decoded
    skipped_atoms: Option<usize>,
    next_frame: usize,
}

impl<R: BufRead> DumpReader<R> {
    /// Create a reader that resolves `request` against the first frame
    pub fn new(reader: R, request: ColumnRequest) -> Self {
        Self {
            cursor: LineCursor::new(reader),
            request,
            layout: None,
            skipped_atoms: None,
            next_frame: 0,
        }
    }

    /// Resolved schema, once a frame has been decoded
    pub fn schema(&self) -> Option<&ColumnSchema> {
        self.layout.as_ref().map(|layout| &layout.schema)
    }

    /// Atom count per frame, once known
    pub fn atoms(&self) -> Option<usize> {
        self.layout
            .as_ref()
            .map(|layout| layout.atoms)
            .or(self.skipped_atoms)
    }

    /// Absolute index of the next frame to be read
    pub fn frame_index(&self) -> usize {
        self.next_frame
    }

    /// Whether the stream is exhausted (nothing is consumed)
    pub fn is_at_end(&mut self) -> Result<bool, DumpError> {
        Ok(self.cursor.at_end()?)
    }

    /// Skip `n` whole frames without decoding them.
    ///
    /// Only the atom count of the very first frame is parsed, when it is not
    /// known yet; every frame is then skipped as `9 + atoms` lines.
    pub fn skip_frames(&mut self, n: usize) -> Result<(), DumpError> {
        for _ in 0..n {
            let index = self.next_frame;
            let (atoms, remaining) = match self.atoms() {
                Some(atoms) => (atoms, HEADER_LINES + atoms),
                None => {
                    let atoms = read_atom_count(&mut self.cursor, index)?;
                    self.skipped_atoms = Some(atoms);
                    (atoms, HEADER_LINES - PREAMBLE_LINES - 1 + atoms)
                }
            };
            let skipped = self.cursor.skip_lines(remaining)?;
            if skipped < remaining {
                return Err(DumpError::UnexpectedEof {
                    frame: index,
                    line: self.cursor.line_number() + 1,
                });
            }
            debug!("skipped frame {index} ({atoms} atoms)");
            self.next_frame += 1;
        }
        Ok(())
    }

    /// Decode the next frame in select-all mode
    pub fn next_records(&mut self) -> Result<Frame<Vec<AtomRecord>>, DumpError> {
        self.next_with(|decoder, cursor| decoder.decode_all(cursor))
    }

    /// Decode the next frame keeping every raw field of every row
    pub fn next_rows(&mut self) -> Result<Frame<Vec<AtomRow>>, DumpError> {
        self.next_with(|decoder, cursor| decoder.decode_rows(cursor))
    }

    /// Decode the next frame in select-by-type mode
    pub fn next_typed(&mut self, filter: &SpeciesFilter) -> Result<TypedFrame, DumpError> {
        self.next_with(|decoder, cursor| decoder.decode_by_type(cursor, filter))
    }

    fn next_with<T, F>(&mut self, decode: F) -> Result<Frame<T>, DumpError>
    where
        F: FnOnce(&FrameDecoder<'_>, &mut LineCursor<R>) -> Result<T, DumpError>,
    {
        let index = self.next_frame;
        let (layout, box_dims, header_lines) = match self.layout {
            Some(ref layout) => {
                let header = read_frame_header(&mut self.cursor, index)?;
                (layout, header.box_dims, header.lines)
            }
            None => {
                let first = read_first_header(&mut self.cursor, index)?;
                let schema = ColumnSchema::resolve(&first.columns, &self.request)?;
                debug!(
                    "frame {index}: {} atoms, {} columns, coordinates at {:?}",
                    first.atoms,
                    schema.cols_len(),
                    schema.axes
                );
                let layout = self.layout.insert(Layout {
                    schema,
                    atoms: first.atoms,
                });
                (&*layout, first.box_dims, first.lines)
            }
        };

        let decoder = FrameDecoder::new(&layout.schema, layout.atoms, index);
        let atoms = decode(&decoder, &mut self.cursor)?;
        self.next_frame += 1;
        Ok(Frame {
            index,
            box_dims,
            header_lines,
            atoms,
        })
    }
}
