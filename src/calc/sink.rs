//! Background row writer.
//!
//! Workers of a concurrent calculation hand finished rows to [`RowSink`],
//! which formats and writes them on a dedicated thread:
//!
//! ```text
//! ┌─────────────┐     bounded channel      ┌─────────────────┐
//! │  Workers    │ ──── (frame, row) ────▶  │ Background      │
//! │             │                          │ writer thread   │
//! │             │ ◀──── error slot ─────   │ (format + I/O)  │
//! └─────────────┘   Arc<Mutex<Option>>     └─────────────────┘
//! ```
//!
//! Rows are written in the order they are received.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Sender};
use log::warn;

use super::error::CalcError;
use super::output::TableWriter;

/// Rows buffered between the workers and the writer thread
pub const DEFAULT_SINK_CAPACITY: usize = 256;

type Row = (usize, Vec<f64>);

/// Table writer running on its own thread
pub struct RowSink {
    /// Channel sender (None after finish() is called)
    sender: Option<Sender<Row>>,
    /// Writer thread, returns the number of rows written
    handle: Option<JoinHandle<Result<usize, String>>>,
    /// First error hit by the writer thread
    first_error: Arc<Mutex<Option<String>>>,
}

impl RowSink {
    /// Move `table` to a background thread
    pub fn spawn<W>(table: TableWriter<W>, capacity: usize) -> Result<Self, CalcError>
    where
        W: Write + Send + 'static,
    {
        let (sender, receiver) = bounded::<Row>(capacity.max(1));
        let first_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&first_error);

        let handle = thread::Builder::new()
            .name("dumpcalc-writer".to_string())
            .spawn(move || {
                let mut table = table;
                let fail = |e: CalcError| {
                    let message = e.to_string();
                    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.clone());
                    message
                };
                for (frame, values) in receiver {
                    table.row(frame, &values).map_err(fail)?;
                }
                let rows = table.rows();
                table.finish().map_err(fail)?;
                Ok(rows)
            })
            .map_err(|e| CalcError::Output(format!("failed to spawn writer thread: {e}")))?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
            first_error,
        })
    }

    /// Queue one row; blocks while the buffer is full
    pub fn send(&self, frame: usize, values: Vec<f64>) -> Result<(), CalcError> {
        self.check_error()?;
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| CalcError::Output("writer already finished".to_string()))?;
        sender.send((frame, values)).map_err(|_| {
            let message = self
                .first_error
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
                .unwrap_or_else(|| "writer thread exited unexpectedly".to_string());
            CalcError::Output(message)
        })
    }

    /// Whether the writer thread has failed
    pub fn check_error(&self) -> Result<(), CalcError> {
        match self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(message) => Err(CalcError::Output(message.clone())),
            None => Ok(()),
        }
    }

    /// Drain the queue, flush the table and return the number of rows written
    pub fn finish(mut self) -> Result<usize, CalcError> {
        self.sender.take();
        let handle = self
            .handle
            .take()
            .ok_or_else(|| CalcError::Output("finish() called twice".to_string()))?;
        match handle.join() {
            Ok(Ok(rows)) => Ok(rows),
            Ok(Err(message)) => Err(CalcError::Output(message)),
            Err(_panic) => Err(CalcError::Output("writer thread panicked".to_string())),
        }
    }
}

impl Drop for RowSink {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            warn!("RowSink dropped without calling finish(); output may be truncated");
            let _ = handle.join();
        }
    }
}
