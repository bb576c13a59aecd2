//! Whitespace-separated table output.
//!
//! Every table starts with a preamble echoing the run:
//!
//! ```text
//! Date: 2024-05-02 14:03:11 +0200
//! file_in = "dump.lammpstrj"     ┐
//! cfg_start = 0                  │ parameters, as TOML
//! ...                            ┘
//!                                  blank line
//! cfg t x y z dist                 column header
//! 0 0 1.5 -0.25 0.125 1.5258...    rows
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use super::error::CalcError;

/// Format of the `Date:` preamble line.
///
/// The offset is numeric: the local zone has no abbreviation to print.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Create `path` for buffered writing
pub fn create_output(path: &Path) -> Result<BufWriter<File>, CalcError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| CalcError::io(path, e))
}

/// Render the preamble: date line, parameters and a blank line
pub fn preamble<P: Serialize>(params: &P) -> Result<String, CalcError> {
    let body = toml::to_string(params).map_err(|e| CalcError::Output(e.to_string()))?;
    let mut text = format!("Date: {}\n", Local::now().format(DATE_FORMAT));
    text.push_str(&body);
    if !body.is_empty() && !body.ends_with('\n') {
        text.push('\n');
    }
    text.push('\n');
    Ok(text)
}

/// Join numeric fields with single spaces, shortest round-trip form
pub fn format_row(frame: Option<usize>, values: &[f64]) -> String {
    let mut line = String::with_capacity(16 * (values.len() + 1));
    if let Some(frame) = frame {
        line.push_str(&frame.to_string());
    }
    for value in values {
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&value.to_string());
    }
    line
}

/// Writer of one output table
pub struct TableWriter<W: Write> {
    out: W,
    path: PathBuf,
    rows: usize,
}

impl TableWriter<BufWriter<File>> {
    /// Create the output file and write preamble and column header
    pub fn create<P, S>(path: &Path, params: &P, header: &[S]) -> Result<Self, CalcError>
    where
        P: Serialize,
        S: AsRef<str>,
    {
        let mut writer = Self::new(create_output(path)?, path);
        writer.begin(params, header)?;
        Ok(writer)
    }
}

impl<W: Write> TableWriter<W> {
    /// Wrap a writer; `path` is only used in error messages
    pub fn new(out: W, path: impl Into<PathBuf>) -> Self {
        Self {
            out,
            path: path.into(),
            rows: 0,
        }
    }

    /// Write preamble and column header
    pub fn begin<P, S>(&mut self, params: &P, header: &[S]) -> Result<(), CalcError>
    where
        P: Serialize,
        S: AsRef<str>,
    {
        let text = preamble(params)?;
        let columns: Vec<&str> = header.iter().map(AsRef::as_ref).collect();
        self.write_line(&format!("{text}{}", columns.join(" ")))
    }

    /// Write a row led by a frame index
    pub fn row(&mut self, frame: usize, values: &[f64]) -> Result<(), CalcError> {
        self.rows += 1;
        self.write_line(&format_row(Some(frame), values))
    }

    /// Write a row of plain values
    pub fn values(&mut self, values: &[f64]) -> Result<(), CalcError> {
        self.rows += 1;
        self.write_line(&format_row(None, values))
    }

    /// Write an already formatted line
    pub fn write_line(&mut self, line: &str) -> Result<(), CalcError> {
        writeln!(self.out, "{line}").map_err(|e| CalcError::io(&self.path, e))
    }

    /// Rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and hand the writer back
    pub fn finish(mut self) -> Result<W, CalcError> {
        self.out
            .flush()
            .map_err(|e| CalcError::io(&self.path, e))?;
        Ok(self.out)
    }
}
