use crate::dump::DumpError;

/// Boxed error returned by frame workers
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while processing frames concurrently
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Reading or decoding a frame failed
    #[error("read frame {frame}: {source}")]
    Read {
        /// Absolute frame index
        frame: usize,
        /// Underlying parse error
        #[source]
        source: DumpError,
    },

    /// The numeric work on a frame failed
    #[error("process frame {frame}: {source}")]
    Process {
        /// Absolute frame index
        frame: usize,
        /// Error raised by the worker
        #[source]
        source: BoxError,
    },

    /// A worker thread panicked
    #[error("a worker thread panicked")]
    WorkerPanicked,
}

impl PipelineError {
    /// Absolute frame index the error refers to, if any
    pub fn frame(&self) -> Option<usize> {
        match self {
            PipelineError::Read { frame, .. } | PipelineError::Process { frame, .. } => {
                Some(*frame)
            }
            PipelineError::WorkerPanicked => None,
        }
    }
}
