//! Frame header parsing.
//!
//! Layout of one frame:
//!
//! ```text
//! ITEM: TIMESTEP            ┐
//! 1000                      │ preamble
//! ITEM: NUMBER OF ATOMS     ┘
//! 128                         atom count (parsed on the first frame only)
//! ITEM: BOX BOUNDS pp pp pp
//! 0.0 12.4                  ┐
//! 0.0 12.4                  │ box bounds, `lo hi` per axis
//! 0.0 12.4                  ┘
//! ITEM: ATOMS id type x y z   column header
//! ...                         `atoms` rows
//! ```

use std::io::BufRead;

use super::cursor::LineCursor;
use super::error::DumpError;
use super::models::BoxDims;

/// Lines before the atom count on the first frame
pub const PREAMBLE_LINES: usize = 3;
/// Lines between the atom count and the box bounds
pub const BOUNDS_ITEM_LINES: usize = 1;
/// Lines before the box bounds on every later frame
pub const LATER_PREAMBLE_LINES: usize = PREAMBLE_LINES + 1 + BOUNDS_ITEM_LINES;
/// Number of header lines of every frame
pub const HEADER_LINES: usize = LATER_PREAMBLE_LINES + 3 + 1;

/// Header of the first parsed frame
#[derive(Debug, Clone)]
pub struct FirstHeader {
    /// Atom count, fixed for the rest of the trajectory
    pub atoms: usize,
    /// Box dimensions
    pub box_dims: BoxDims,
    /// Column-header line, verbatim
    pub columns: String,
    /// Every header line read, verbatim (column header included)
    pub lines: Vec<String>,
}

/// Header of any later frame
#[derive(Debug, Clone)]
pub struct FrameHeader {
    /// Box dimensions
    pub box_dims: BoxDims,
    /// Every header line read, verbatim (column header included)
    pub lines: Vec<String>,
}

/// Reads header lines while remembering them
struct HeaderLines<'a, R: BufRead> {
    cursor: &'a mut LineCursor<R>,
    frame: usize,
    lines: Vec<String>,
}

impl<'a, R: BufRead> HeaderLines<'a, R> {
    fn new(cursor: &'a mut LineCursor<R>, frame: usize) -> Self {
        Self {
            cursor,
            frame,
            lines: Vec::with_capacity(HEADER_LINES),
        }
    }

    fn next(&mut self) -> Result<&str, DumpError> {
        let frame = self.frame;
        let line_number = self.cursor.line_number() + 1;
        let line = match self
            .cursor
            .next_line()
            .map_err(|e| DumpError::reading(frame, line_number, e))?
        {
            Some(line) => line.to_string(),
            None => {
                return Err(DumpError::UnexpectedEof {
                    frame,
                    line: line_number,
                })
            }
        };
        self.lines.push(line);
        Ok(self.lines.last().map(String::as_str).unwrap_or_default())
    }

    fn skip(&mut self, n: usize) -> Result<(), DumpError> {
        for _ in 0..n {
            self.next()?;
        }
        Ok(())
    }

    fn bounds(&mut self) -> Result<BoxDims, DumpError> {
        let frame = self.frame;
        let mut lengths = [0.0; 3];
        for (axis, length) in lengths.iter_mut().enumerate() {
            let line = self.next()?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(DumpError::InvalidBoxLine {
                    frame,
                    axis,
                    fields: fields.len(),
                });
            }
            *length = parse_lenient(fields[1]) - parse_lenient(fields[0]);
        }
        Ok(BoxDims::new(lengths))
    }
}

/// Parse the header of the first frame: atom count, box and column header
pub fn read_first_header<R: BufRead>(
    cursor: &mut LineCursor<R>,
    frame: usize,
) -> Result<FirstHeader, DumpError> {
    let mut header = HeaderLines::new(cursor, frame);
    header.skip(PREAMBLE_LINES)?;
    let atoms = parse_atom_count(header.next()?, frame)?;
    header.skip(BOUNDS_ITEM_LINES)?;
    let box_dims = header.bounds()?;
    let columns = header.next()?.to_string();
    Ok(FirstHeader {
        atoms,
        box_dims,
        columns,
        lines: header.lines,
    })
}

/// Parse the header of a later frame; the column header is consumed, not re-parsed
pub fn read_frame_header<R: BufRead>(
    cursor: &mut LineCursor<R>,
    frame: usize,
) -> Result<FrameHeader, DumpError> {
    let mut header = HeaderLines::new(cursor, frame);
    header.skip(LATER_PREAMBLE_LINES)?;
    let box_dims = header.bounds()?;
    header.skip(1)?;
    Ok(FrameHeader {
        box_dims,
        lines: header.lines,
    })
}

/// Read only the atom count of a frame, leaving the cursor right after it
pub fn read_atom_count<R: BufRead>(
    cursor: &mut LineCursor<R>,
    frame: usize,
) -> Result<usize, DumpError> {
    let mut header = HeaderLines::new(cursor, frame);
    header.skip(PREAMBLE_LINES)?;
    let line = header.next()?;
    parse_atom_count(line, frame)
}

fn parse_atom_count(line: &str, frame: usize) -> Result<usize, DumpError> {
    line.trim()
        .parse()
        .map_err(|_| DumpError::InvalidAtomCount {
            frame,
            value: line.to_string(),
        })
}

/// Parse a float, mapping malformed tokens to zero.
///
/// Malformed numeric tokens never abort a run; changing this would silently
/// change numerical output on existing trajectories.
pub fn parse_lenient(token: &str) -> f64 {
    token.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const FIRST: &str = "ITEM: TIMESTEP\n0\nITEM: NUMBER OF ATOMS\n2\nITEM: BOX BOUNDS pp pp pp\n-1.0 9.0\n0 5\n0.5 2.5\nITEM: ATOMS id type x y z\n";

    #[test]
    fn test_first_header() {
        let mut cursor = LineCursor::new(Cursor::new(FIRST));
        let header = read_first_header(&mut cursor, 0).unwrap();
        assert_eq!(header.atoms, 2);
        assert_eq!(header.box_dims.lengths, [10.0, 5.0, 2.0]);
        assert_eq!(header.columns, "ITEM: ATOMS id type x y z");
        assert_eq!(header.lines.len(), HEADER_LINES);
    }

    #[test]
    fn test_later_header_ignores_atom_count() {
        let text = FIRST.replace("\n2\nITEM: BOX", "\nnot-a-number\nITEM: BOX");
        let mut cursor = LineCursor::new(Cursor::new(text));
        let header = read_frame_header(&mut cursor, 3).unwrap();
        assert_eq!(header.box_dims.lengths, [10.0, 5.0, 2.0]);
    }

    #[test]
    fn test_invalid_atom_count() {
        let text = FIRST.replace("\n2\n", "\ntwo\n");
        let mut cursor = LineCursor::new(Cursor::new(text));
        let err = read_first_header(&mut cursor, 4).unwrap_err();
        assert!(matches!(err, DumpError::InvalidAtomCount { frame: 4, .. }));
    }

    #[test]
    fn test_invalid_box_line() {
        let text = FIRST.replace("0 5\n", "0 5 0.0\n");
        let mut cursor = LineCursor::new(Cursor::new(text));
        let err = read_first_header(&mut cursor, 0).unwrap_err();
        assert!(matches!(
            err,
            DumpError::InvalidBoxLine {
                axis: 1,
                fields: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_header() {
        let mut cursor = LineCursor::new(Cursor::new("ITEM: TIMESTEP\n0\n"));
        let err = read_first_header(&mut cursor, 7).unwrap_err();
        assert!(matches!(err, DumpError::UnexpectedEof { frame: 7, line: 3 }));
    }

    #[test]
    fn test_lenient_float() {
        assert_eq!(parse_lenient("1.5"), 1.5);
        assert_eq!(parse_lenient("abc"), 0.0);
        assert_eq!(parse_lenient("-2e3"), -2000.0);
    }
}
