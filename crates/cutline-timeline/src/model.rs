//! The authoritative in-memory timeline state.

use cutline_core::{FrameRate, TIME_EPSILON};
use serde::{Deserialize, Serialize};

use crate::element::{ElementId, TimelineElement, TrackKind};

/// Default horizontal zoom.
pub const DEFAULT_ZOOM_PX_PER_SEC: f64 = 100.0;

/// Elements, cursor, frame rate and zoom of one editing session.
///
/// Storage order of elements carries no meaning; every ordered view is
/// recomputed by position. This type only maintains shape. Invariants are
/// enforced by [`crate::TimelineEditor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineModel {
    elements: Vec<TimelineElement>,
    frame_rate: FrameRate,
    zoom_px_per_sec: f64,
    cursor_time: f64,
}

impl TimelineModel {
    /// Create an empty timeline.
    pub fn new(frame_rate: FrameRate) -> Self {
        Self {
            elements: Vec::new(),
            frame_rate,
            zoom_px_per_sec: DEFAULT_ZOOM_PX_PER_SEC,
            cursor_time: 0.0,
        }
    }

    /// Rebuild a model from stored parts. The cursor is clamped into range.
    pub fn from_parts(
        elements: Vec<TimelineElement>,
        frame_rate: FrameRate,
        zoom_px_per_sec: f64,
        cursor_time: f64,
    ) -> Self {
        let mut model = Self {
            elements,
            frame_rate,
            zoom_px_per_sec,
            cursor_time,
        };
        model.recompute_duration();
        model
    }

    /// All elements in storage order.
    pub fn elements(&self) -> &[TimelineElement] {
        &self.elements
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the timeline has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    pub fn zoom(&self) -> f64 {
        self.zoom_px_per_sec
    }

    /// Set horizontal zoom. Non-positive values are ignored.
    pub fn set_zoom(&mut self, px_per_sec: f64) {
        if px_per_sec > 0.0 && px_per_sec.is_finite() {
            self.zoom_px_per_sec = px_per_sec;
        }
    }

    /// Timeline seconds to horizontal pixels at the current zoom.
    pub fn time_to_px(&self, seconds: f64) -> f64 {
        seconds * self.zoom_px_per_sec
    }

    /// Horizontal pixels to timeline seconds at the current zoom.
    pub fn px_to_time(&self, px: f64) -> f64 {
        px / self.zoom_px_per_sec
    }

    pub fn cursor_time(&self) -> f64 {
        self.cursor_time
    }

    /// Move the cursor, clamped into `[0, duration]`.
    pub fn set_cursor_time(&mut self, seconds: f64) {
        if seconds.is_finite() {
            self.cursor_time = seconds.clamp(0.0, self.duration());
        }
    }

    /// End of the last element, 0 when empty.
    pub fn duration(&self) -> f64 {
        self.elements
            .iter()
            .map(|e| e.position_end)
            .fold(0.0, f64::max)
    }

    /// Recompute the duration and pull the cursor back inside it.
    pub fn recompute_duration(&mut self) -> f64 {
        let duration = self.duration();
        self.cursor_time = self.cursor_time.clamp(0.0, duration);
        duration
    }

    /// Elements of one track, ordered by start (ties by end, then id).
    pub fn elements_by_track(&self, kind: TrackKind) -> Vec<&TimelineElement> {
        let mut track: Vec<&TimelineElement> = self
            .elements
            .iter()
            .filter(|e| e.track_kind == kind)
            .collect();
        track.sort_by(|a, b| {
            a.position_start
                .total_cmp(&b.position_start)
                .then(a.position_end.total_cmp(&b.position_end))
                .then(a.id.cmp(&b.id))
        });
        track
    }

    /// Ids of one track's elements in position order.
    pub fn track_ids(&self, kind: TrackKind) -> Vec<ElementId> {
        self.elements_by_track(kind).iter().map(|e| e.id).collect()
    }

    /// End of the last element on a track, 0 when the track is empty.
    pub fn track_extent(&self, kind: TrackKind) -> f64 {
        self.elements
            .iter()
            .filter(|e| e.track_kind == kind)
            .map(|e| e.position_end)
            .fold(0.0, f64::max)
    }

    /// Find an element by id.
    pub fn element_by_id(&self, id: ElementId) -> Option<&TimelineElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub(crate) fn element_by_id_mut(&mut self, id: ElementId) -> Option<&mut TimelineElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub(crate) fn elements_mut(&mut self) -> impl Iterator<Item = &mut TimelineElement> {
        self.elements.iter_mut()
    }

    /// Storage index of an element.
    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Replace the element with the same id, or append it.
    pub fn upsert(&mut self, element: TimelineElement) {
        match self.index_of(element.id) {
            Some(index) => self.elements[index] = element,
            None => self.elements.push(element),
        }
    }

    /// Insert right after another element in storage order (append if absent).
    pub fn insert_after(&mut self, anchor: ElementId, element: TimelineElement) {
        let index = self
            .index_of(anchor)
            .map(|i| i + 1)
            .unwrap_or(self.elements.len());
        self.elements.insert(index, element);
    }

    pub(crate) fn insert_at(&mut self, index: usize, element: TimelineElement) {
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
    }

    /// Remove an element. Returns the removed element.
    pub fn remove(&mut self, id: ElementId) -> Option<TimelineElement> {
        let index = self.index_of(id)?;
        Some(self.elements.remove(index))
    }

    /// Describe every broken invariant, empty when the model is consistent.
    pub fn invariant_violations(
        &self,
        min_duration: f64,
        exclusive: impl Fn(TrackKind) -> bool,
    ) -> Vec<String> {
        let mut problems = Vec::new();

        for el in &self.elements {
            if el.duration() < min_duration - TIME_EPSILON {
                problems.push(format!(
                    "{} is {:.4}s long, below the minimum {:.4}s",
                    el.id,
                    el.duration(),
                    min_duration
                ));
            }
            if el.position_start < -TIME_EPSILON {
                problems.push(format!("{} starts before zero", el.id));
            }
            if let Some(media) = &el.media {
                if media.source_out <= media.source_in {
                    problems.push(format!("{} has an empty source range", el.id));
                }
                if media.source_in < -TIME_EPSILON {
                    problems.push(format!("{} source starts before zero", el.id));
                }
            }
        }

        for kind in TrackKind::ALL.into_iter().filter(|k| exclusive(*k)) {
            let track = self.elements_by_track(kind);
            for pair in track.windows(2) {
                if pair[0].overlaps(pair[1]) {
                    problems.push(format!(
                        "{} and {} overlap on the {} track",
                        pair[0].id, pair[1].id, kind
                    ));
                }
            }
        }

        if self.cursor_time < 0.0 || self.cursor_time > self.duration() + TIME_EPSILON {
            problems.push(format!("cursor {:.3}s outside the timeline", self.cursor_time));
        }

        problems
    }
}

impl Default for TimelineModel {
    fn default() -> Self {
        Self::new(FrameRate::default())
    }
}
