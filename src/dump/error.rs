/// Errors that can occur while reading a dump trajectory
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    /// I/O error while reading the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended in the middle of a frame
    #[error("frame {frame}: unexpected end of stream at line {line}")]
    UnexpectedEof {
        /// Absolute frame index
        frame: usize,
        /// 1-based line number where more input was expected
        line: u64,
    },

    /// A line of a frame is not valid UTF-8
    #[error("frame {frame}: line {line} is not valid UTF-8")]
    InvalidUtf8 {
        /// Absolute frame index
        frame: usize,
        /// 1-based line number of the offending line
        line: u64,
    },

    /// The atom-count line is not an integer
    #[error("frame {frame}: invalid atom count `{value}`")]
    InvalidAtomCount {
        /// Absolute frame index
        frame: usize,
        /// Offending line content
        value: String,
    },

    /// A box-bounds line does not hold exactly two values
    #[error("frame {frame}: unable to get the size of the box along axis {axis} (got {fields} fields, expected 2)")]
    InvalidBoxLine {
        /// Absolute frame index
        frame: usize,
        /// Axis (0 = x, 1 = y, 2 = z)
        axis: usize,
        /// Number of tokens found
        fields: usize,
    },

    /// The column-header line carries no field names
    #[error("not enough columns (at least 3; got {got})")]
    TooFewColumns {
        /// Number of tokens found on the header line
        got: usize,
    },

    /// Required columns are absent from the column-header line
    #[error("cannot find the columns {}", missing.join(", "))]
    MissingColumns {
        /// Names of the missing columns
        missing: Vec<String>,
    },

    /// An atom row does not have the same number of fields as the header
    #[error("frame {frame}: number of columns don't match for atom {atom}: {got} (expected {expected})")]
    ColumnCountMismatch {
        /// Absolute frame index
        frame: usize,
        /// Row index of the atom within the frame
        atom: usize,
        /// Number of fields found
        got: usize,
        /// Number of fields declared by the header
        expected: usize,
    },
}

impl DumpError {
    /// Tag a failed line read of `frame` with its position
    pub(crate) fn reading(frame: usize, line: u64, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::InvalidData => DumpError::InvalidUtf8 { frame, line },
            _ => DumpError::Io(source),
        }
    }

    /// Absolute frame index the error refers to, if any
    pub fn frame(&self) -> Option<usize> {
        match self {
            DumpError::UnexpectedEof { frame, .. }
            | DumpError::InvalidUtf8 { frame, .. }
            | DumpError::InvalidAtomCount { frame, .. }
            | DumpError::InvalidBoxLine { frame, .. }
            | DumpError::ColumnCountMismatch { frame, .. } => Some(*frame),
            _ => None,
        }
    }
}
