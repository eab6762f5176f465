//! Rate-limited queue for pointer-driven gestures.
//!
//! Intermediate pointer events are buffered in a bounded queue and released
//! at most `max_updates_per_sec` times per second, always as the most recent
//! value. The terminal event of a gesture bypasses the rate limit and is
//! returned for synchronous application. Only one gesture is active at a
//! time; events addressed to any other gesture are ignored.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use crate::edit::EditCommand;
use crate::element::ElementId;
use crate::policy::GesturePolicy;

/// Identifies one gesture from begin to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GestureId(u64);

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gesture#{}", self.0)
    }
}

/// What a gesture manipulates. Pointer values are timeline seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureKind {
    /// Drag an element; `grab_offset` is the pointer's distance from the
    /// element start when the drag began.
    Drag { id: ElementId, grab_offset: f64 },
    /// Drag the left edge of an element.
    ResizeLeft { id: ElementId },
    /// Drag the right edge of an element.
    ResizeRight { id: ElementId },
}

impl GestureKind {
    /// The element the gesture manipulates.
    pub fn target(&self) -> ElementId {
        match *self {
            Self::Drag { id, .. } | Self::ResizeLeft { id } | Self::ResizeRight { id } => id,
        }
    }

    /// Edit command for a pointer position.
    pub fn command(&self, pointer_time: f64) -> EditCommand {
        match *self {
            Self::Drag { id, grab_offset } => EditCommand::Move {
                id,
                start: pointer_time - grab_offset,
            },
            Self::ResizeLeft { id } => EditCommand::TrimLeft {
                id,
                start: pointer_time,
            },
            Self::ResizeRight { id } => EditCommand::TrimRight {
                id,
                end: pointer_time,
            },
        }
    }
}

#[derive(Debug)]
struct ActiveGesture {
    id: GestureId,
    kind: GestureKind,
    pending: VecDeque<f64>,
    last_released: Option<Instant>,
}

/// Bounded, rate-limited gesture event queue.
#[derive(Debug)]
pub struct GestureQueue {
    min_interval: Duration,
    capacity: usize,
    active: Option<ActiveGesture>,
    next_id: u64,
}

impl GestureQueue {
    pub fn new(policy: &GesturePolicy) -> Self {
        Self {
            min_interval: policy.min_interval(),
            capacity: policy.queue_capacity.max(1),
            active: None,
            next_id: 1,
        }
    }

    /// Start a gesture, cancelling any gesture still in flight.
    pub fn begin(&mut self, kind: GestureKind) -> GestureId {
        if let Some(prev) = self.cancel() {
            tracing::debug!(gesture = %prev, "Gesture superseded");
        }
        let id = GestureId(self.next_id);
        self.next_id += 1;
        self.active = Some(ActiveGesture {
            id,
            kind,
            pending: VecDeque::with_capacity(self.capacity),
            last_released: None,
        });
        tracing::debug!(gesture = %id, target = %kind.target(), "Gesture started");
        id
    }

    /// Buffer an intermediate value. Returns false for a stale gesture.
    pub fn update(&mut self, id: GestureId, value: f64) -> bool {
        let capacity = self.capacity;
        match self.active.as_mut() {
            Some(active) if active.id == id => {
                if active.pending.len() == capacity {
                    active.pending.pop_front();
                }
                active.pending.push_back(value);
                true
            }
            _ => {
                tracing::trace!(gesture = %id, "Ignoring update for inactive gesture");
                false
            }
        }
    }

    /// Release the latest buffered value if the rate limit allows it.
    /// Older buffered values are dropped.
    pub fn drain_due(&mut self, now: Instant) -> Option<(GestureKind, f64)> {
        let min_interval = self.min_interval;
        let active = self.active.as_mut()?;
        let due = active
            .last_released
            .map_or(true, |last| now.saturating_duration_since(last) >= min_interval);
        if !due {
            return None;
        }
        let value = active.pending.pop_back()?;
        active.pending.clear();
        active.last_released = Some(now);
        Some((active.kind, value))
    }

    /// Finish a gesture. The terminal value is always returned for an
    /// active gesture, regardless of rate limiting.
    pub fn end(&mut self, id: GestureId, value: f64) -> Option<(GestureKind, f64)> {
        match self.active.take() {
            Some(active) if active.id == id => {
                tracing::debug!(gesture = %id, value, "Gesture ended");
                Some((active.kind, value))
            }
            other => {
                self.active = other;
                tracing::trace!(gesture = %id, "Ignoring end for inactive gesture");
                None
            }
        }
    }

    /// Drop the active gesture and its buffered values.
    pub fn cancel(&mut self) -> Option<GestureId> {
        self.active.take().map(|a| a.id)
    }

    /// Id of the gesture in flight.
    pub fn active(&self) -> Option<GestureId> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Kind of the gesture in flight.
    pub fn active_kind(&self) -> Option<GestureKind> {
        self.active.as_ref().map(|a| a.kind)
    }

    /// Buffered intermediate values.
    pub fn pending_len(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.pending.len())
    }
}

impl Default for GestureQueue {
    fn default() -> Self {
        Self::new(&GesturePolicy::default())
    }
}
