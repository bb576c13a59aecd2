//! # Concurrent Frame Processing
//!
//! A pool of workers shares one forward-only [`FrameSource`]. Reading is
//! serialized and computing is not:
//!
//! ```text
//!            ┌──────────── Mutex<StreamState> ────────────┐
//!  worker ──▶│ claim index │ skip │ read + decode │ unlock │──▶ process (unlocked)
//!  worker ──▶│   (next += stride, first error wins)       │──▶ process (unlocked)
//!  caller ──▶│                                            │──▶ process (unlocked)
//!            └────────────────────────────────────────────┘
//! ```
//!
//! Frames are read in increasing index order and exactly once each, whichever
//! worker reads them. Every worker accumulates into its own partial result;
//! the partials are handed back once all workers have joined, so the caller
//! merges them after the fact.
//!
//! The first error (read or process) is latched. Once it is set no worker
//! claims a new frame, but frames already claimed are processed to the end.

mod error;
mod source;


use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;

use log::{debug, warn};

pub use error::{BoxError, PipelineError};
pub use source::{FrameSource, TypedSource};

/// Default number of workers: the available hardware parallelism
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Per-frame numeric work
pub trait FrameWorker<F>: Sync {
    /// Result accumulated by one worker
    type Partial: Send;

    /// Fresh accumulator for one worker
    fn partial(&self) -> Self::Partial;

    /// Fold one frame into `partial`
    fn process(&self, partial: &mut Self::Partial, index: usize, frame: F)
        -> Result<(), BoxError>;
}

/// Scheduling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Number of workers, the caller's thread included (at least 1)
    pub workers: usize,
    /// First frame index to claim
    pub start: usize,
    /// Frame indices at or past `end` are never claimed
    pub end: usize,
    /// Distance between claimed indices (1 = every frame)
    pub stride: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            start: 0,
            end: usize::MAX,
            stride: 1,
        }
    }
}

/// Outcome of a run
#[derive(Debug)]
pub struct ProcessorReport<P> {
    /// One partial per worker that ran
    pub partials: Vec<P>,
    /// Frames processed successfully
    pub frames: usize,
    /// First error latched, if any
    pub error: Option<PipelineError>,
}

impl<P> ProcessorReport<P> {
    /// Partials, or the latched error
    pub fn into_result(self) -> Result<Vec<P>, PipelineError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.partials),
        }
    }
}

struct StreamState<S> {
    source: S,
    next: usize,
    error: Option<PipelineError>,
}

/// Shared context of one run: the stream, the frame counter and the error latch
pub struct ProcessorContext<S: FrameSource> {
    state: Mutex<StreamState<S>>,
    end: usize,
    stride: usize,
}

impl<S: FrameSource> ProcessorContext<S> {
    fn new(source: S, config: &ProcessorConfig) -> Self {
        Self {
            state: Mutex::new(StreamState {
                source,
                next: config.start,
                error: None,
            }),
            end: config.end,
            stride: config.stride.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StreamState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn latch(&self, err: PipelineError) {
        let mut state = self.lock();
        if state.error.is_none() {
            state.error = Some(err);
        }
    }

    /// Claim the next index and read its frame while holding the lock
    fn claim(&self) -> Option<(usize, S::Frame)> {
        let mut state = self.lock();
        if state.error.is_some() || state.next >= self.end {
            return None;
        }
        let index = state.next;
        state.next = index.saturating_add(self.stride);

        let gap = index.saturating_sub(state.source.position());
        let read = state
            .source
            .skip_frames(gap)
            .and_then(|()| state.source.read_frame());
        match read {
            Ok(frame) => Some((index, frame)),
            Err(source) => {
                state.error = Some(PipelineError::Read {
                    frame: index,
                    source,
                });
                None
            }
        }
    }

    fn work<W: FrameWorker<S::Frame>>(&self, worker: &W) -> (W::Partial, usize) {
        let mut partial = worker.partial();
        let mut frames = 0;
        while let Some((index, frame)) = self.claim() {
            if let Err(source) = worker.process(&mut partial, index, frame) {
                self.latch(PipelineError::Process {
                    frame: index,
                    source,
                });
                break;
            }
            frames += 1;
        }
        (partial, frames)
    }

    fn into_parts(self) -> (S, Option<PipelineError>) {
        let state = self.state.into_inner().unwrap_or_else(PoisonError::into_inner);
        (state.source, state.error)
    }
}

/// Runs a [`FrameWorker`] over a [`FrameSource`] with a pool of threads
#[derive(Debug, Clone, Default)]
pub struct FrameProcessor {
    config: ProcessorConfig,
}

impl FrameProcessor {
    /// Processor with the given scheduling
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// Process every claimed frame, blocking until all workers have stopped.
    ///
    /// The caller's thread is one of the workers. The source is handed back
    /// with the report.
    pub fn run<S, W>(&self, source: S, worker: &W) -> (ProcessorReport<W::Partial>, S)
    where
        S: FrameSource,
        W: FrameWorker<S::Frame>,
    {
        let context = ProcessorContext::new(source, &self.config);
        let workers = self.config.workers.max(1);
        debug!(
            "processing frames {}..{} (stride {}) with {workers} workers",
            self.config.start, self.config.end, context.stride
        );

        let mut partials = Vec::with_capacity(workers);
        let mut frames = 0;
        thread::scope(|scope| {
            let context = &context;
            let mut handles = Vec::with_capacity(workers - 1);
            for id in 1..workers {
                let spawned = thread::Builder::new()
                    .name(format!("dumpcalc-worker-{id}"))
                    .spawn_scoped(scope, move || context.work(worker));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        warn!("could not spawn worker {id}: {e}; continuing with {id} workers");
                        break;
                    }
                }
            }

            let (partial, count) = context.work(worker);
            partials.push(partial);
            frames += count;

            for handle in handles {
                match handle.join() {
                    Ok((partial, count)) => {
                        partials.push(partial);
                        frames += count;
                    }
                    Err(_panic) => context.latch(PipelineError::WorkerPanicked),
                }
            }
        });

        let (source, error) = context.into_parts();
        (
            ProcessorReport {
                partials,
                frames,
                error,
            },
            source,
        )
    }
}
