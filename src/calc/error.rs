use std::io;
use std::path::PathBuf;

use crate::dump::DumpError;
use crate::kernels::KernelError;
use crate::pbc::PbcError;
use crate::pipeline::PipelineError;

/// Errors that can occur while setting up or running a calculation
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    /// No calculation is registered under this name
    #[error("calculation `{0}` doesn't exist")]
    UnknownCalculation(String),

    /// The parameter file could not be read
    #[error("cannot read parameters from {}: {source}", path.display())]
    ConfigRead {
        /// Parameter file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The parameter file is not valid TOML or does not match the section layout
    #[error("invalid parameter file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The parameter file has no table for the calculation
    #[error("no `[{section}]` table in {}", path.display())]
    MissingSection {
        /// Expected table name
        section: String,
        /// Parameter file
        path: PathBuf,
    },

    /// Parameters are well-formed but inconsistent
    #[error("invalid parameters: {0}")]
    InvalidConfig(String),

    /// An input or output path could not be opened or written
    #[error("{}: {source}", path.display())]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The trajectory is malformed
    #[error(transparent)]
    Dump(#[from] DumpError),

    /// A kernel rejected a frame
    #[error("frame {frame}: {source}")]
    Kernel {
        /// Absolute frame index
        frame: usize,
        /// Kernel error
        #[source]
        source: KernelError,
    },

    /// Unwrapping failed
    #[error(transparent)]
    Pbc(#[from] PbcError),

    /// The concurrent processor stopped on an error
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Output could not be produced
    #[error("output error: {0}")]
    Output(String),
}

impl CalcError {
    /// Wrap an I/O error with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CalcError::Io {
            path: path.into(),
            source,
        }
    }

    /// Tag a kernel error with its frame
    pub fn kernel(frame: usize, source: KernelError) -> Self {
        CalcError::Kernel { frame, source }
    }

    /// Absolute frame index the error refers to, if any
    pub fn frame(&self) -> Option<usize> {
        match self {
            CalcError::Dump(err) => err.frame(),
            CalcError::Kernel { frame, .. } => Some(*frame),
            CalcError::Pbc(PbcError::AtomCountChanged { frame, .. }) => Some(*frame),
            CalcError::Pipeline(err) => err.frame(),
            _ => None,
        }
    }
}
