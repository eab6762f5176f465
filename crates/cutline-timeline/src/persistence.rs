//! Debounced hand-off of settled timeline state to storage.
//!
//! Edits bump the editor revision many times a second during a gesture.
//! [`SnapshotDebouncer`] waits until the revision has been quiet for the
//! configured window, then writes one snapshot to its sink.

use cutline_core::Result;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::serialization::TimelineSnapshot;

/// Receives settled snapshots.
pub trait SnapshotSink {
    fn persist(&mut self, snapshot: &TimelineSnapshot) -> Result<()>;
}

/// Writes each snapshot to a JSON file, replacing the previous one.
#[derive(Debug, Clone)]
pub struct FileSnapshotSink {
    path: PathBuf,
}

impl FileSnapshotSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SnapshotSink for FileSnapshotSink {
    fn persist(&mut self, snapshot: &TimelineSnapshot) -> Result<()> {
        snapshot.save_to_file(&self.path)
    }
}

/// Trailing-edge debouncer keyed on the editor revision.
#[derive(Debug)]
pub struct SnapshotDebouncer<S: SnapshotSink> {
    sink: S,
    quiet: Duration,
    persisted_revision: u64,
    seen_revision: u64,
    last_change: Option<Instant>,
}

impl<S: SnapshotSink> SnapshotDebouncer<S> {
    pub fn new(sink: S, quiet: Duration) -> Self {
        Self {
            sink,
            quiet,
            persisted_revision: 0,
            seen_revision: 0,
            last_change: None,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Whether a change is waiting to be persisted.
    pub fn is_dirty(&self) -> bool {
        self.seen_revision != self.persisted_revision
    }

    /// Record the current revision. A new revision restarts the quiet window.
    pub fn note_revision(&mut self, revision: u64, now: Instant) {
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.last_change = Some(now);
        }
    }

    /// Persist when dirty and quiet long enough. Returns true when written.
    pub fn poll(
        &mut self,
        now: Instant,
        snapshot: impl FnOnce() -> TimelineSnapshot,
    ) -> Result<bool> {
        let settled = self
            .last_change
            .is_some_and(|at| now.saturating_duration_since(at) >= self.quiet);
        if !self.is_dirty() || !settled {
            return Ok(false);
        }
        self.write(snapshot())?;
        Ok(true)
    }

    /// Persist immediately if dirty, ignoring the quiet window.
    pub fn flush(&mut self, snapshot: impl FnOnce() -> TimelineSnapshot) -> Result<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        self.write(snapshot())?;
        Ok(true)
    }

    fn write(&mut self, snapshot: TimelineSnapshot) -> Result<()> {
        match self.sink.persist(&snapshot) {
            Ok(()) => {
                self.persisted_revision = self.seen_revision;
                tracing::debug!(
                    revision = self.seen_revision,
                    elements = snapshot.elements.len(),
                    "Snapshot persisted"
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Snapshot persist failed, will retry");
                Err(err)
            }
        }
    }
}
