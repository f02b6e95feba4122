//! Progress reporting for the fetch and composite phases.
//!
//! Completion counts are shared across concurrent workers, so the counter
//! is an atomic: a plain increment would lose updates under contention.
//! Events flow out through an optional unbounded channel to whatever
//! presentation layer the caller attaches; the engine never reads them
//! back.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc::UnboundedSender;

/// The phase a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    Compositing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Fetching => write!(f, "fetching"),
            Phase::Compositing => write!(f, "compositing"),
        }
    }
}

/// One completion event: `completed` of `total` items done in `phase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
    pub phase: Phase,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}/{}", self.phase, self.completed, self.total)
    }
}

/// Shared per-phase completion counter.
///
/// `tick` is safe to call from any number of concurrent workers.
#[derive(Debug)]
pub struct ProgressTracker {
    phase: Phase,
    total: usize,
    completed: AtomicUsize,
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressTracker {
    /// Creates a tracker for `total` items in `phase`.
    ///
    /// Events are pushed into `tx` when present; a closed receiver is
    /// ignored so progress consumers can disconnect freely.
    pub fn new(phase: Phase, total: usize, tx: Option<UnboundedSender<ProgressEvent>>) -> Self {
        Self {
            phase,
            total,
            completed: AtomicUsize::new(0),
            tx,
        }
    }

    /// Records one completed item and emits the corresponding event.
    pub fn tick(&self) -> ProgressEvent {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let event = ProgressEvent {
            completed,
            total: self.total,
            phase: self.phase,
        };
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
        event
    }

    /// Number of items completed so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Total number of items in this phase.
    pub fn total(&self) -> usize {
        self.total
    }
}
