//! Atom row decoding against a resolved [`ColumnSchema`]

use std::io::BufRead;

use super::cursor::LineCursor;
use super::error::DumpError;
use super::header::parse_lenient;
use super::models::{AtomRecord, AtomRow, SpeciesFilter, TypedAtoms, Vec3};
use super::schema::ColumnSchema;

/// Decodes the atom rows of one frame
#[derive(Debug, Clone)]
pub struct FrameDecoder<'s> {
    schema: &'s ColumnSchema,
    atoms: usize,
    frame: usize,
}

impl<'s> FrameDecoder<'s> {
    /// Decoder for `atoms` rows of frame `frame`
    pub fn new(schema: &'s ColumnSchema, atoms: usize, frame: usize) -> Self {
        Self {
            schema,
            atoms,
            frame,
        }
    }

    /// Decode one row into a record
    pub fn decode_line(&self, line: &str, atom: usize) -> Result<AtomRecord, DumpError> {
        let fields = self.split(line, atom)?;
        Ok(self.record(&fields))
    }

    /// Select-all mode: one record per atom, in stream order
    pub fn decode_all<R: BufRead>(
        &self,
        cursor: &mut LineCursor<R>,
    ) -> Result<Vec<AtomRecord>, DumpError> {
        let mut records = Vec::with_capacity(self.atoms);
        for atom in 0..self.atoms {
            let line = self.line(cursor)?;
            let fields = self.split(line, atom)?;
            records.push(self.record(&fields));
        }
        Ok(records)
    }

    /// Select-all mode keeping the raw fields of every row
    pub fn decode_rows<R: BufRead>(
        &self,
        cursor: &mut LineCursor<R>,
    ) -> Result<Vec<AtomRow>, DumpError> {
        let mut rows = Vec::with_capacity(self.atoms);
        for atom in 0..self.atoms {
            let line = self.line(cursor)?;
            let fields = self.split(line, atom)?;
            let record = self.record(&fields);
            rows.push(AtomRow {
                fields: fields.into_iter().map(str::to_string).collect(),
                record,
            });
        }
        Ok(rows)
    }

    /// Select-by-type mode: coordinates grouped by the filter's slots.
    ///
    /// Every row is still checked against the schema width; rows whose type
    /// is not in `filter` are dropped after that check.
    pub fn decode_by_type<R: BufRead>(
        &self,
        cursor: &mut LineCursor<R>,
        filter: &SpeciesFilter,
    ) -> Result<TypedAtoms, DumpError> {
        let mut typed = TypedAtoms::with_slots(filter.len());
        let Some(species_col) = self.schema.species else {
            // Without a type column nothing can be selected; rows are still validated.
            for atom in 0..self.atoms {
                let line = self.line(cursor)?;
                self.split(line, atom)?;
            }
            return Ok(typed);
        };

        for atom in 0..self.atoms {
            let line = self.line(cursor)?;
            let fields = self.split(line, atom)?;
            let Some(slot) = filter.slot(fields[species_col]) else {
                continue;
            };
            typed.groups[slot].push(self.position(&fields));
            typed.order.push(slot);
        }
        Ok(typed)
    }

    fn line<'c, R: BufRead>(&self, cursor: &'c mut LineCursor<R>) -> Result<&'c str, DumpError> {
        let line_number = cursor.line_number() + 1;
        cursor
            .next_line()
            .map_err(|e| DumpError::reading(self.frame, line_number, e))?
            .ok_or(DumpError::UnexpectedEof {
                frame: self.frame,
                line: line_number,
            })
    }

    fn split<'l>(&self, line: &'l str, atom: usize) -> Result<Vec<&'l str>, DumpError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != self.schema.cols_len() {
            return Err(DumpError::ColumnCountMismatch {
                frame: self.frame,
                atom,
                got: fields.len(),
                expected: self.schema.cols_len(),
            });
        }
        Ok(fields)
    }

    fn position(&self, fields: &[&str]) -> Vec3 {
        let [x, y, z] = self.schema.axes;
        [
            parse_lenient(fields[x]),
            parse_lenient(fields[y]),
            parse_lenient(fields[z]),
        ]
    }

    fn record(&self, fields: &[&str]) -> AtomRecord {
        AtomRecord {
            position: self.position(fields),
            species: self.schema.species.map(|col| fields[col].to_string()),
            molecule: self.schema.molecule.map(|col| fields[col].to_string()),
        }
    }
}
