//! Edit operations on the timeline.
//!
//! Every mutation is an [`EditCommand`] executed by [`TimelineEditor`]. A
//! command runs against a working copy of the model and is committed only
//! when it succeeds, so a rejected edit leaves the model exactly as it was.
//!
//! Sequential (exclusive) tracks never store overlap: moves, inserts and
//! duplicates make room by pushing later siblings right, deletes close the
//! gap by pulling later siblings left ("magnet"), and right-edge trims
//! ripple or stop at the next sibling according to the track policy.

use std::time::Instant;

use cutline_core::TIME_EPSILON;

use crate::element::{ElementId, TimelineElement, TrackKind};
use crate::error::{EditError, EditResult};
use crate::gesture::{GestureId, GestureKind, GestureQueue};
use crate::media::MediaSourceProvider;
use crate::model::TimelineModel;
use crate::policy::EditPolicy;
use crate::serialization::TimelineSnapshot;
use crate::snap::SnapResolver;

// ── Commands ────────────────────────────────────────────────────

/// An edit operation on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    /// Add an element at its own start position.
    Insert { element: TimelineElement },
    /// Add an element at the end of its track.
    Append { element: TimelineElement },
    /// Translate an element so it starts at `start` (duration fixed).
    Move { id: ElementId, start: f64 },
    /// Move an element's left edge.
    TrimLeft { id: ElementId, start: f64 },
    /// Move an element's right edge.
    TrimRight { id: ElementId, end: f64 },
    /// Cut an element in two at a timeline time.
    Split { id: ElementId, time: f64 },
    /// Copy an element with a new id.
    Duplicate { id: ElementId },
    /// Remove an element.
    Delete { id: ElementId },
    /// Move one element of a sequential track to another slot and relayout.
    Reorder {
        track: TrackKind,
        from: usize,
        to: usize,
    },
}

impl EditCommand {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Append { .. } => "append",
            Self::Move { .. } => "move",
            Self::TrimLeft { .. } => "trim_left",
            Self::TrimRight { .. } => "trim_right",
            Self::Split { .. } => "split",
            Self::Duplicate { .. } => "duplicate",
            Self::Delete { .. } => "delete",
            Self::Reorder { .. } => "reorder",
        }
    }

    /// The element a command addresses, if any.
    pub fn target(&self) -> Option<ElementId> {
        match self {
            Self::Insert { element } | Self::Append { element } => Some(element.id),
            Self::Move { id, .. }
            | Self::TrimLeft { id, .. }
            | Self::TrimRight { id, .. }
            | Self::Split { id, .. }
            | Self::Duplicate { id }
            | Self::Delete { id } => Some(*id),
            Self::Reorder { .. } => None,
        }
    }
}

/// What a committed command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// An element was added.
    Inserted(ElementId),
    /// An existing element changed in place.
    Updated(ElementId),
    /// The original was replaced by two halves.
    Split { first: ElementId, second: ElementId },
    /// A copy was added.
    Duplicated { original: ElementId, copy: ElementId },
    /// The element was removed.
    Deleted(TimelineElement),
    /// A track was relaid out.
    Reordered(TrackKind),
    /// Valid request with nothing to do.
    Unchanged,
}

// ── Editor ──────────────────────────────────────────────────────

/// Owns the timeline model and is the only component that mutates it.
pub struct TimelineEditor {
    model: TimelineModel,
    policy: EditPolicy,
    media: Option<Box<dyn MediaSourceProvider>>,
    selection: Option<ElementId>,
    gestures: GestureQueue,
    gesture_origin: Option<TimelineModel>,
    revision: u64,
}

impl TimelineEditor {
    /// Create an editor over a model.
    pub fn new(model: TimelineModel, policy: EditPolicy) -> Self {
        let gestures = GestureQueue::new(&policy.gesture);
        Self {
            model,
            policy,
            media: None,
            selection: None,
            gestures,
            gesture_origin: None,
            revision: 0,
        }
    }

    /// Attach a media source provider used to cap trims.
    pub fn with_media_provider(mut self, provider: Box<dyn MediaSourceProvider>) -> Self {
        self.media = Some(provider);
        self
    }

    pub fn model(&self) -> &TimelineModel {
        &self.model
    }

    pub fn policy(&self) -> &EditPolicy {
        &self.policy
    }

    /// Counter bumped whenever the model changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Effective minimum element duration.
    pub fn min_duration(&self) -> f64 {
        self.policy.min_duration(self.model.frame_rate())
    }

    /// Serializable snapshot of the current model.
    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot::capture(&self.model)
    }

    /// Replace the whole model (e.g. restoring a snapshot).
    pub fn restore(&mut self, model: TimelineModel) {
        self.gestures.cancel();
        self.gesture_origin = None;
        self.model = model;
        self.selection = self
            .selection
            .filter(|id| self.model.element_by_id(*id).is_some());
        self.revision += 1;
        tracing::debug!(elements = self.model.len(), "Model restored");
    }

    /// Broken invariants of the current model, under the current policy.
    ///
    /// With a media provider attached, source windows are also checked
    /// against the natural duration of their asset. Assets that cannot be
    /// resolved are skipped.
    pub fn invariant_violations(&self) -> Vec<String> {
        let policy = &self.policy;
        let mut problems = self
            .model
            .invariant_violations(self.min_duration(), |kind| policy.track(kind).exclusive);

        if let Some(provider) = self.media.as_deref() {
            for el in self.model.elements() {
                let Some(media) = el.media.as_ref() else {
                    continue;
                };
                if let Ok(info) = provider.probe(&media.asset) {
                    if media.source_out > info.duration_secs + TIME_EPSILON {
                        problems.push(format!(
                            "{} source out {} beyond natural duration {}",
                            el.id, media.source_out, info.duration_secs
                        ));
                    }
                }
            }
        }
        problems
    }

    // ── Cursor & zoom ───────────────────────────────────────────

    /// Move the cursor, clamped into the timeline.
    pub fn set_cursor_time(&mut self, seconds: f64) {
        let before = self.model.cursor_time();
        self.model.set_cursor_time(seconds);
        if self.model.cursor_time() != before {
            self.revision += 1;
        }
    }

    pub fn set_zoom(&mut self, px_per_sec: f64) {
        let before = self.model.zoom();
        self.model.set_zoom(px_per_sec);
        if self.model.zoom() != before {
            self.revision += 1;
        }
    }

    // ── Selection ───────────────────────────────────────────────

    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    /// Select an element.
    pub fn select(&mut self, id: ElementId) -> EditResult<()> {
        if self.model.element_by_id(id).is_none() {
            return Err(EditError::ElementNotFound(id));
        }
        self.selection = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn selected(&self) -> EditResult<ElementId> {
        self.selection.ok_or(EditError::NoSelection)
    }

    // ── Operations ──────────────────────────────────────────────

    /// Execute a command atomically.
    ///
    /// A gesture in flight is cancelled first: its replays start from the
    /// model captured at gesture start and would otherwise undo this edit.
    pub fn execute(&mut self, command: EditCommand) -> EditResult<EditOutcome> {
        if self.gestures.active().is_some() {
            self.cancel_gesture();
        }
        let (model, outcome) = self.run(&self.model, &command)?;
        self.commit(model, &outcome);
        Ok(outcome)
    }

    pub fn insert(&mut self, element: TimelineElement) -> EditResult<EditOutcome> {
        self.execute(EditCommand::Insert { element })
    }

    pub fn append(&mut self, element: TimelineElement) -> EditResult<EditOutcome> {
        self.execute(EditCommand::Append { element })
    }

    pub fn move_element(&mut self, id: ElementId, start: f64) -> EditResult<EditOutcome> {
        self.execute(EditCommand::Move { id, start })
    }

    pub fn trim_left(&mut self, id: ElementId, start: f64) -> EditResult<EditOutcome> {
        self.execute(EditCommand::TrimLeft { id, start })
    }

    pub fn trim_right(&mut self, id: ElementId, end: f64) -> EditResult<EditOutcome> {
        self.execute(EditCommand::TrimRight { id, end })
    }

    pub fn split(&mut self, id: ElementId, time: f64) -> EditResult<EditOutcome> {
        self.execute(EditCommand::Split { id, time })
    }

    pub fn duplicate(&mut self, id: ElementId) -> EditResult<EditOutcome> {
        self.execute(EditCommand::Duplicate { id })
    }

    pub fn delete(&mut self, id: ElementId) -> EditResult<EditOutcome> {
        self.execute(EditCommand::Delete { id })
    }

    pub fn reorder(&mut self, track: TrackKind, from: usize, to: usize) -> EditResult<EditOutcome> {
        self.execute(EditCommand::Reorder { track, from, to })
    }

    pub fn move_selected(&mut self, start: f64) -> EditResult<EditOutcome> {
        let id = self.selected()?;
        self.move_element(id, start)
    }

    pub fn trim_selected_left(&mut self, start: f64) -> EditResult<EditOutcome> {
        let id = self.selected()?;
        self.trim_left(id, start)
    }

    pub fn trim_selected_right(&mut self, end: f64) -> EditResult<EditOutcome> {
        let id = self.selected()?;
        self.trim_right(id, end)
    }

    pub fn split_selected(&mut self, time: f64) -> EditResult<EditOutcome> {
        let id = self.selected()?;
        self.split(id, time)
    }

    /// Split the selected element at the cursor.
    pub fn split_selected_at_cursor(&mut self) -> EditResult<EditOutcome> {
        let time = self.model.cursor_time();
        self.split_selected(time)
    }

    pub fn duplicate_selected(&mut self) -> EditResult<EditOutcome> {
        let id = self.selected()?;
        self.duplicate(id)
    }

    pub fn delete_selected(&mut self) -> EditResult<EditOutcome> {
        let id = self.selected()?;
        self.delete(id)
    }

    // ── Gestures ────────────────────────────────────────────────

    /// Start a drag or resize. Any gesture in flight is cancelled.
    pub fn begin_gesture(&mut self, kind: GestureKind) -> EditResult<GestureId> {
        let target = kind.target();
        if self.model.element_by_id(target).is_none() {
            return Err(EditError::ElementNotFound(target));
        }
        let id = self.gestures.begin(kind);
        self.gesture_origin = Some(self.model.clone());
        self.selection = Some(target);
        Ok(id)
    }

    /// Start dragging an element grabbed at `pointer_time`.
    pub fn begin_drag(&mut self, id: ElementId, pointer_time: f64) -> EditResult<GestureId> {
        let start = self
            .model
            .element_by_id(id)
            .map(|e| e.position_start)
            .ok_or(EditError::ElementNotFound(id))?;
        self.begin_gesture(GestureKind::Drag {
            id,
            grab_offset: pointer_time - start,
        })
    }

    /// Feed an intermediate pointer position. It is applied now only if the
    /// rate limit allows; otherwise it waits for [`Self::gesture_tick`].
    pub fn gesture_update(
        &mut self,
        gesture: GestureId,
        pointer_time: f64,
        now: Instant,
    ) -> EditResult<Option<EditOutcome>> {
        if !self.gestures.update(gesture, pointer_time) {
            return Ok(None);
        }
        self.gesture_tick(now)
    }

    /// Apply the latest buffered gesture value if it is due.
    pub fn gesture_tick(&mut self, now: Instant) -> EditResult<Option<EditOutcome>> {
        match self.gestures.drain_due(now) {
            Some((kind, value)) => self.apply_gesture(kind, value).map(Some),
            None => Ok(None),
        }
    }

    /// Finish a gesture; the final position is always applied.
    pub fn end_gesture(
        &mut self,
        gesture: GestureId,
        pointer_time: f64,
    ) -> EditResult<Option<EditOutcome>> {
        let Some((kind, value)) = self.gestures.end(gesture, pointer_time) else {
            return Ok(None);
        };
        let result = self.apply_gesture(kind, value);
        self.gesture_origin = None;
        result.map(Some)
    }

    /// Abandon the gesture in flight, keeping what was already applied.
    pub fn cancel_gesture(&mut self) {
        if let Some(id) = self.gestures.cancel() {
            tracing::debug!(gesture = %id, "Gesture cancelled");
        }
        self.gesture_origin = None;
    }

    pub fn active_gesture(&self) -> Option<GestureId> {
        self.gestures.active()
    }

    /// Gesture values are absolute, so each one is replayed against the
    /// model as it was when the gesture began.
    fn apply_gesture(&mut self, kind: GestureKind, value: f64) -> EditResult<EditOutcome> {
        let command = kind.command(value);
        let base = self
            .gesture_origin
            .clone()
            .unwrap_or_else(|| self.model.clone());
        let (model, outcome) = self.run(&base, &command)?;
        self.commit(model, &outcome);
        Ok(outcome)
    }

    // ── Execution ───────────────────────────────────────────────

    fn run(
        &self,
        base: &TimelineModel,
        command: &EditCommand,
    ) -> EditResult<(TimelineModel, EditOutcome)> {
        let mut working = base.clone();
        let ctx = EditContext {
            policy: &self.policy,
            media: self.media.as_deref(),
        };

        let result = match command {
            EditCommand::Insert { element } => ctx.insert(&mut working, element.clone(), false),
            EditCommand::Append { element } => ctx.insert(&mut working, element.clone(), true),
            EditCommand::Move { id, start } => ctx.move_element(&mut working, *id, *start),
            EditCommand::TrimLeft { id, start } => ctx.trim_left(&mut working, *id, *start),
            EditCommand::TrimRight { id, end } => ctx.trim_right(&mut working, *id, *end),
            EditCommand::Split { id, time } => ctx.split(&mut working, *id, *time),
            EditCommand::Duplicate { id } => ctx.duplicate(&mut working, *id),
            EditCommand::Delete { id } => ctx.delete(&mut working, *id),
            EditCommand::Reorder { track, from, to } => {
                Ok(ctx.reorder(&mut working, *track, *from, *to))
            }
        };

        match result {
            Ok(outcome) => {
                working.recompute_duration();
                tracing::debug!(
                    command = command.name(),
                    target = ?command.target(),
                    duration = working.duration(),
                    "Edit committed"
                );
                Ok((working, outcome))
            }
            Err(err) => {
                tracing::debug!(command = command.name(), error = %err, "Edit rejected");
                Err(err)
            }
        }
    }

    fn commit(&mut self, model: TimelineModel, outcome: &EditOutcome) {
        if self.model != model {
            self.model = model;
            self.revision += 1;
        }
        let dangling = self
            .selection
            .is_some_and(|id| self.model.element_by_id(id).is_none());
        match outcome {
            EditOutcome::Split { first, .. } if dangling => self.selection = Some(*first),
            EditOutcome::Duplicated { copy, .. } => self.selection = Some(*copy),
            _ if dangling => self.selection = None,
            _ => {}
        }
    }
}

// ── Operation bodies ────────────────────────────────────────────

struct EditContext<'a> {
    policy: &'a EditPolicy,
    media: Option<&'a dyn MediaSourceProvider>,
}

impl EditContext<'_> {
    fn snapper(&self, model: &TimelineModel) -> SnapResolver {
        SnapResolver::from_policy(self.policy, model.frame_rate())
    }

    fn exclusive(&self, kind: TrackKind) -> bool {
        self.policy.track(kind).exclusive
    }

    /// End of the reference track a track is bounded by, when non-empty.
    fn reference_extent(&self, model: &TimelineModel, kind: TrackKind) -> Option<f64> {
        self.policy
            .track(kind)
            .bounded_by
            .filter(|reference| *reference != kind)
            .map(|reference| model.track_extent(reference))
            .filter(|extent| *extent > 0.0)
    }

    fn extra_snap_points(&self, model: &TimelineModel, kind: TrackKind) -> Vec<f64> {
        self.reference_extent(model, kind).into_iter().collect()
    }

    /// Natural duration of an element's source, if it can be probed.
    fn natural_duration(&self, element: &TimelineElement) -> Option<f64> {
        let media = element.media.as_ref()?;
        let provider = self.media?;
        match provider.probe(&media.asset) {
            Ok(info) => Some(info.duration_secs),
            Err(err) => {
                tracing::warn!(
                    asset = %media.asset,
                    error = %err,
                    "Media probe failed, source is uncapped"
                );
                None
            }
        }
    }

    /// Shorten an element whose source window runs past the end of its
    /// asset, keeping the timeline-to-source ratio.
    fn clamp_to_natural(&self, element: &mut TimelineElement) -> EditResult<()> {
        let Some(natural) = self.natural_duration(element) else {
            return Ok(());
        };
        let id = element.id;
        let duration = element.duration();
        let start = element.position_start;
        let Some(media) = element.media.as_mut() else {
            return Ok(());
        };
        if media.source_in >= natural {
            return Err(EditError::EmptySourceRange(id));
        }
        if media.source_out <= natural {
            return Ok(());
        }

        let ratio = (natural - media.source_in) / media.span();
        tracing::debug!(
            asset = %media.asset,
            source_out = media.source_out,
            natural,
            "Insert clamped to natural duration"
        );
        media.source_out = natural;
        element.position_end = start + duration * ratio;
        Ok(())
    }

    fn min_duration(&self, model: &TimelineModel) -> f64 {
        self.policy.min_duration(model.frame_rate())
    }

    fn check_min(&self, model: &TimelineModel, duration: f64) -> EditResult<()> {
        let min = self.min_duration(model);
        if duration < min - TIME_EPSILON {
            return Err(EditError::BelowMinDuration { duration, min });
        }
        Ok(())
    }

    // ── insert / append ─────────────────────────────────────────

    fn insert(
        &self,
        model: &mut TimelineModel,
        mut element: TimelineElement,
        at_end: bool,
    ) -> EditResult<EditOutcome> {
        finite(element.position_start)?;
        finite(element.position_end)?;
        if let Some(media) = &element.media {
            if media.span().is_nan() || media.span() <= 0.0 {
                return Err(EditError::EmptySourceRange(element.id));
            }
        }
        self.clamp_to_natural(&mut element)?;
        self.check_min(model, element.duration())?;
        if model.element_by_id(element.id).is_some() {
            element.id = ElementId::new();
        }

        let kind = element.track_kind;
        let start = if at_end {
            model.track_extent(kind)
        } else {
            let peers = model.elements_by_track(kind);
            let extra = self.extra_snap_points(model, kind);
            self.snapper(model)
                .resolve_span(
                    element.position_start.max(0.0),
                    element.duration(),
                    None,
                    peers,
                    &extra,
                )
                .max(0.0)
        };
        element.shift(start - element.position_start);

        if self.exclusive(kind) {
            make_room(model, &mut element);
        }
        let id = element.id;
        model.upsert(element);
        Ok(EditOutcome::Inserted(id))
    }

    // ── move ────────────────────────────────────────────────────

    fn move_element(
        &self,
        model: &mut TimelineModel,
        id: ElementId,
        start: f64,
    ) -> EditResult<EditOutcome> {
        finite(start)?;
        let original = find(model, id)?;
        let kind = original.track_kind;

        let resolved = {
            let peers = model.elements_by_track(kind);
            let extra = self.extra_snap_points(model, kind);
            self.snapper(model)
                .resolve_span(start.max(0.0), original.duration(), Some(id), peers, &extra)
                .max(0.0)
        };

        let mut moved = original.clone();
        moved.shift(resolved - original.position_start);

        if self.exclusive(kind) {
            let index = model.index_of(id).unwrap_or(0);
            model.remove(id);
            make_room(model, &mut moved);
            model.insert_at(index, moved);
        } else {
            model.upsert(moved);
        }
        Ok(EditOutcome::Updated(id))
    }

    // ── trims ───────────────────────────────────────────────────

    fn trim_right(
        &self,
        model: &mut TimelineModel,
        id: ElementId,
        end: f64,
    ) -> EditResult<EditOutcome> {
        finite(end)?;
        let original = find(model, id)?;
        let kind = original.track_kind;
        let track_policy = self.policy.track(kind);

        let mut new_end = {
            let peers = model.elements_by_track(kind);
            let extra = self.extra_snap_points(model, kind);
            self.snapper(model).resolve(end, Some(id), peers, &extra)
        };

        let natural = self.natural_duration(&original);
        if let (Some(natural), Some(media)) = (natural, original.media.as_ref()) {
            if media.span() > 0.0 {
                let max_ratio = (natural - media.source_in) / media.span();
                let cap = original.position_start + original.duration() * max_ratio;
                new_end = clamp_max(new_end, cap, "natural duration");
            }
        }

        if let Some(extent) = self.reference_extent(model, kind) {
            new_end = clamp_max(new_end, extent, "reference track");
        }

        if track_policy.exclusive && !track_policy.ripple_on_resize {
            if let Some(next_start) = next_sibling_start(model, &original) {
                new_end = clamp_max(new_end, next_start, "next sibling");
            }
        }

        self.check_min(model, new_end - original.position_start)?;

        let delta = new_end - original.position_end;
        if delta.abs() <= TIME_EPSILON {
            return Ok(EditOutcome::Unchanged);
        }

        let mut trimmed = original.clone();
        trimmed.position_end = new_end;
        rescale_source(&mut trimmed, &original, false);
        if let Some(natural) = natural {
            if let Some(media) = trimmed.media.as_mut() {
                media.source_out = media.source_out.min(natural);
            }
        }

        if track_policy.exclusive && track_policy.ripple_on_resize {
            let boundary = original.position_end - TIME_EPSILON;
            for sibling in model.elements_mut() {
                if sibling.track_kind == kind && sibling.id != id && sibling.position_start >= boundary
                {
                    sibling.shift(delta);
                }
            }
        }

        model.upsert(trimmed);
        Ok(EditOutcome::Updated(id))
    }

    fn trim_left(
        &self,
        model: &mut TimelineModel,
        id: ElementId,
        start: f64,
    ) -> EditResult<EditOutcome> {
        finite(start)?;
        let original = find(model, id)?;
        let kind = original.track_kind;

        let mut new_start = {
            let peers = model.elements_by_track(kind);
            let extra = self.extra_snap_points(model, kind);
            self.snapper(model)
                .resolve(start.max(0.0), Some(id), peers, &extra)
                .max(0.0)
        };

        if let Some(media) = original.media.as_ref() {
            if media.span() > 0.0 {
                // source_in may not go below zero
                let max_ratio = media.source_out / media.span();
                let floor = original.position_end - original.duration() * max_ratio;
                new_start = clamp_min(new_start, floor, "source start");
            }
        }

        if self.exclusive(kind) {
            if let Some(prev_end) = previous_sibling_end(model, &original) {
                new_start = clamp_min(new_start, prev_end, "previous sibling");
            }
        }

        self.check_min(model, original.position_end - new_start)?;

        if (new_start - original.position_start).abs() <= TIME_EPSILON {
            return Ok(EditOutcome::Unchanged);
        }

        let mut trimmed = original.clone();
        trimmed.position_start = new_start;
        rescale_source(&mut trimmed, &original, true);
        if let Some(media) = trimmed.media.as_mut() {
            media.source_in = media.source_in.max(0.0);
        }

        model.upsert(trimmed);
        Ok(EditOutcome::Updated(id))
    }

    // ── split ───────────────────────────────────────────────────

    fn split(&self, model: &mut TimelineModel, id: ElementId, time: f64) -> EditResult<EditOutcome> {
        finite(time)?;
        let original = find(model, id)?;
        let (start, end) = (original.position_start, original.position_end);

        if time <= start || time >= end {
            return Err(EditError::SplitOutOfBounds {
                split: time,
                start,
                end,
            });
        }

        let epsilon = self.policy.split_epsilon_secs;
        let (lo, hi) = (start + epsilon, end - epsilon);
        if lo > hi {
            return Err(EditError::BelowMinDuration {
                duration: original.duration() / 2.0,
                min: self.min_duration(model),
            });
        }

        let split_at = {
            let peers = model.elements_by_track(original.track_kind);
            let extra = self.extra_snap_points(model, original.track_kind);
            self.snapper(model)
                .resolve(time, Some(id), peers, &extra)
                .clamp(lo, hi)
        };
        self.check_min(model, split_at - start)?;
        self.check_min(model, end - split_at)?;

        let ratio = (split_at - start) / (end - start);

        let mut first = original.duplicate();
        let mut second = original.duplicate();
        first.position_end = split_at;
        second.position_start = split_at;
        if let (Some(a), Some(b), Some(src)) =
            (first.media.as_mut(), second.media.as_mut(), original.media.as_ref())
        {
            let source_split = src.source_in + ratio * src.span();
            a.source_out = source_split;
            b.source_in = source_split;
        }

        let (first_id, second_id) = (first.id, second.id);
        let index = model.index_of(id).unwrap_or(0);
        model.remove(id);
        model.insert_at(index, second);
        model.insert_at(index, first);

        Ok(EditOutcome::Split {
            first: first_id,
            second: second_id,
        })
    }

    // ── duplicate ───────────────────────────────────────────────

    fn duplicate(&self, model: &mut TimelineModel, id: ElementId) -> EditResult<EditOutcome> {
        let original = find(model, id)?;
        let mut copy = original.duplicate();

        if self.exclusive(original.track_kind) {
            copy.shift(original.duration());
            make_room(model, &mut copy);
        }

        let copy_id = copy.id;
        model.insert_after(id, copy);
        Ok(EditOutcome::Duplicated {
            original: id,
            copy: copy_id,
        })
    }

    // ── delete ──────────────────────────────────────────────────

    fn delete(&self, model: &mut TimelineModel, id: ElementId) -> EditResult<EditOutcome> {
        let removed = model.remove(id).ok_or(EditError::ElementNotFound(id))?;

        if self.exclusive(removed.track_kind) {
            let gap = removed.duration();
            for sibling in model.elements_mut() {
                if sibling.track_kind == removed.track_kind
                    && sibling.position_start > removed.position_start
                {
                    let new_start = (sibling.position_start - gap).max(0.0);
                    sibling.shift(new_start - sibling.position_start);
                }
            }
        }

        Ok(EditOutcome::Deleted(removed))
    }

    // ── reorder ─────────────────────────────────────────────────

    fn reorder(&self, model: &mut TimelineModel, track: TrackKind, from: usize, to: usize) -> EditOutcome {
        if !self.exclusive(track) {
            tracing::debug!(%track, "Reorder ignored on overlay track");
            return EditOutcome::Unchanged;
        }

        let mut order = model.track_ids(track);
        if from >= order.len() || to >= order.len() || from == to {
            return EditOutcome::Unchanged;
        }
        let moved = order.remove(from);
        order.insert(to, moved);

        let mut cursor = 0.0;
        for id in order {
            if let Some(element) = model.element_by_id_mut(id) {
                let duration = element.duration();
                element.position_start = cursor;
                element.position_end = cursor + duration;
                cursor += duration;
            }
        }
        EditOutcome::Reordered(track)
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn finite(time: f64) -> EditResult<()> {
    if time.is_finite() {
        Ok(())
    } else {
        Err(EditError::NonFiniteTime(time))
    }
}

fn find(model: &TimelineModel, id: ElementId) -> EditResult<TimelineElement> {
    model
        .element_by_id(id)
        .cloned()
        .ok_or(EditError::ElementNotFound(id))
}

fn clamp_max(value: f64, cap: f64, reason: &'static str) -> f64 {
    if value > cap {
        tracing::debug!(value, cap, reason, "Trim clamped");
        cap
    } else {
        value
    }
}

fn clamp_min(value: f64, floor: f64, reason: &'static str) -> f64 {
    if value < floor {
        tracing::debug!(value, floor, reason, "Trim clamped");
        floor
    } else {
        value
    }
}

/// Recompute the source window proportionally to the new timeline length.
fn rescale_source(trimmed: &mut TimelineElement, original: &TimelineElement, left_edge: bool) {
    let ratio = trimmed.duration() / original.duration();
    if let (Some(media), Some(src)) = (trimmed.media.as_mut(), original.media.as_ref()) {
        if left_edge {
            media.source_in = src.source_out - src.span() * ratio;
        } else {
            media.source_out = src.source_in + src.span() * ratio;
        }
    }
}

/// Start of the closest sibling that begins at or after `element`'s end.
fn next_sibling_start(model: &TimelineModel, element: &TimelineElement) -> Option<f64> {
    model
        .elements_by_track(element.track_kind)
        .into_iter()
        .filter(|s| s.id != element.id && s.position_start >= element.position_end - TIME_EPSILON)
        .map(|s| s.position_start)
        .reduce(f64::min)
}

/// End of the closest sibling that finishes at or before `element`'s start.
fn previous_sibling_end(model: &TimelineModel, element: &TimelineElement) -> Option<f64> {
    model
        .elements_by_track(element.track_kind)
        .into_iter()
        .filter(|s| s.id != element.id && s.position_end <= element.position_start + TIME_EPSILON)
        .map(|s| s.position_end)
        .reduce(f64::max)
}

/// Fit `element` (not yet stored) into its exclusive track.
///
/// A start that lands inside a sibling moves to that sibling's end; every
/// sibling starting at or after the element is then pushed right just far
/// enough to clear it.
fn make_room(model: &mut TimelineModel, element: &mut TimelineElement) {
    let kind = element.track_kind;

    let host_end = model
        .elements_by_track(kind)
        .into_iter()
        .filter(|s| s.id != element.id)
        .find(|s| {
            s.position_start < element.position_start - TIME_EPSILON
                && element.position_start < s.position_end - TIME_EPSILON
        })
        .map(|s| s.position_end);
    if let Some(host_end) = host_end {
        element.shift(host_end - element.position_start);
    }

    let boundary = element.position_start - TIME_EPSILON;
    let first_later = model
        .elements_by_track(kind)
        .into_iter()
        .filter(|s| s.id != element.id && s.position_start >= boundary)
        .map(|s| s.position_start)
        .reduce(f64::min);

    if let Some(first_start) = first_later {
        let push = element.position_end - first_start;
        if push > TIME_EPSILON {
            for sibling in model.elements_mut() {
                if sibling.track_kind == kind
                    && sibling.id != element.id
                    && sibling.position_start >= boundary
                {
                    sibling.shift(push);
                }
            }
        }
    }
}
