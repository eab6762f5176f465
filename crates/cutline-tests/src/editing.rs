//! Integration tests for editing sessions.
//!
//! Exercises cutline-core time types together with the editor, snapping,
//! packing and the render list.

use cutline_core::FrameRate;
use cutline_timeline::{
    render, EditError, EditOutcome, EditPolicy, ElementId, GestureKind, MediaCatalog, MediaInfo,
    TimelineEditor, TimelineElement, TimelineModel, TrackKind,
};
use std::time::{Duration, Instant};

// ── Helpers ────────────────────────────────────────────────────

const EPS: f64 = 1e-9;

fn catalog() -> MediaCatalog {
    MediaCatalog::new()
        .with("intro.mp4", MediaInfo::video(8.0, 1920, 1080))
        .with("body.mp4", MediaInfo::video(30.0, 1920, 1080))
        .with("music.wav", MediaInfo::audio(120.0))
}

fn appended(editor: &mut TimelineEditor, element: TimelineElement) -> ElementId {
    match editor.append(element).unwrap() {
        EditOutcome::Inserted(id) => id,
        other => panic!("expected insert, got {other:?}"),
    }
}

fn bounds(editor: &TimelineEditor, id: ElementId) -> (f64, f64) {
    let el = editor.model().element_by_id(id).unwrap();
    (el.position_start, el.position_end)
}

fn assert_bounds(editor: &TimelineEditor, id: ElementId, start: f64, end: f64) {
    let (s, e) = bounds(editor, id);
    assert!(
        (s - start).abs() < EPS && (e - end).abs() < EPS,
        "expected [{start}, {end}], got [{s}, {e}]"
    );
}

struct Session {
    editor: TimelineEditor,
    intro: ElementId,
    body: ElementId,
    music: ElementId,
    title: ElementId,
    caption: ElementId,
}

fn build_session() -> Session {
    let mut editor = TimelineEditor::new(TimelineModel::new(FrameRate::FPS_30), EditPolicy::default())
        .with_media_provider(Box::new(catalog()));

    let intro = appended(
        &mut editor,
        TimelineElement::with_media(TrackKind::SequentialVideo, "intro.mp4", 0.0, 5.0),
    );
    let body = appended(
        &mut editor,
        TimelineElement::with_media(TrackKind::SequentialVideo, "body.mp4", 0.0, 10.0),
    );
    let music = appended(
        &mut editor,
        TimelineElement::with_media(TrackKind::SequentialAudio, "music.wav", 0.0, 12.0),
    );
    let title = appended(
        &mut editor,
        TimelineElement::new(TrackKind::OverlayText, 0.0, 4.0).named("Title"),
    );
    let caption = match editor
        .insert(TimelineElement::new(TrackKind::OverlayText, 2.0, 6.0).named("Caption"))
        .unwrap()
    {
        EditOutcome::Inserted(id) => id,
        other => panic!("expected insert, got {other:?}"),
    };

    Session {
        editor,
        intro,
        body,
        music,
        title,
        caption,
    }
}

// ── Assembly ───────────────────────────────────────────────────

#[test]
fn append_lays_out_sequential_tracks() {
    let s = build_session();
    assert_bounds(&s.editor, s.intro, 0.0, 5.0);
    assert_bounds(&s.editor, s.body, 5.0, 15.0);
    assert_bounds(&s.editor, s.music, 0.0, 12.0);
    assert_eq!(s.editor.model().duration(), 15.0);
    assert!(s.editor.invariant_violations().is_empty());
}

#[test]
fn render_list_assigns_overlay_lanes() {
    let s = build_session();
    let tracks = render::resolve(s.editor.model(), s.editor.policy());
    let kinds: Vec<TrackKind> = tracks.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TrackKind::SequentialVideo,
            TrackKind::SequentialAudio,
            TrackKind::OverlayText
        ]
    );

    let text = &tracks[2];
    assert_eq!(text.lane_count, 2);
    let lane_of = |id| text.elements.iter().find(|e| e.id == id).unwrap().lane;
    assert_eq!(lane_of(s.title), Some(0));
    assert_eq!(lane_of(s.caption), Some(1));
}

// ── Edits across tracks ────────────────────────────────────────

#[test]
fn video_ripple_does_not_move_audio() {
    let mut s = build_session();
    s.editor.trim_right(s.intro, 7.0).unwrap();
    assert_bounds(&s.editor, s.intro, 0.0, 7.0);
    assert_bounds(&s.editor, s.body, 7.0, 17.0);
    assert_bounds(&s.editor, s.music, 0.0, 12.0);
}

#[test]
fn intro_trim_capped_by_source_length() {
    let mut s = build_session();
    s.editor.trim_right(s.intro, 20.0).unwrap();
    // intro.mp4 is 8s long
    assert_bounds(&s.editor, s.intro, 0.0, 8.0);
    assert_bounds(&s.editor, s.body, 8.0, 18.0);
}

#[test]
fn music_growth_bounded_by_video_end() {
    let mut s = build_session();
    s.editor.trim_right(s.music, 40.0).unwrap();
    assert_bounds(&s.editor, s.music, 0.0, 15.0);
}

#[test]
fn delete_then_split_keeps_invariants() {
    let mut s = build_session();
    s.editor.delete(s.intro).unwrap();
    assert_bounds(&s.editor, s.body, 0.0, 10.0);

    let EditOutcome::Split { first, second } = s.editor.split(s.body, 3.0).unwrap() else {
        panic!("expected split");
    };
    assert_bounds(&s.editor, first, 0.0, 3.0);
    assert_bounds(&s.editor, second, 3.0, 10.0);

    let media = s.editor.model().element_by_id(second).unwrap().media.clone().unwrap();
    assert!((media.source_in - 3.0).abs() < EPS);
    assert!(s.editor.invariant_violations().is_empty());
}

#[test]
fn reorder_then_duplicate() {
    let mut s = build_session();
    s.editor.reorder(TrackKind::SequentialVideo, 1, 0).unwrap();
    assert_bounds(&s.editor, s.body, 0.0, 10.0);
    assert_bounds(&s.editor, s.intro, 10.0, 15.0);

    let EditOutcome::Duplicated { copy, .. } = s.editor.duplicate(s.body).unwrap() else {
        panic!("expected duplicate");
    };
    assert_bounds(&s.editor, copy, 10.0, 20.0);
    assert_bounds(&s.editor, s.intro, 20.0, 25.0);
    assert!(s.editor.invariant_violations().is_empty());
}

#[test]
fn failed_edit_is_atomic() {
    let mut s = build_session();
    let before = s.editor.model().clone();
    let revision = s.editor.revision();

    let err = s.editor.split(s.title, 4.0).unwrap_err();
    assert!(matches!(err, EditError::SplitOutOfBounds { .. }));
    let err = s.editor.trim_left(s.caption, 6.0).unwrap_err();
    assert!(matches!(err, EditError::BelowMinDuration { .. }));

    assert_eq!(s.editor.model(), &before);
    assert_eq!(s.editor.revision(), revision);
}

#[test]
fn overlay_move_snaps_to_sibling_edge() {
    let mut s = build_session();
    s.editor.move_element(s.caption, 4.03).unwrap();
    assert_bounds(&s.editor, s.caption, 4.0, 8.0);

    s.editor.move_element(s.caption, 4.3).unwrap();
    assert_bounds(&s.editor, s.caption, 4.3, 8.3);
}

// ── Gestures ───────────────────────────────────────────────────

#[test]
fn resize_gesture_applies_final_value() {
    let mut s = build_session();
    let t0 = Instant::now();
    let g = s
        .editor
        .begin_gesture(GestureKind::ResizeRight { id: s.title })
        .unwrap();

    for i in 0..10 {
        let at = t0 + Duration::from_millis(i * 5);
        s.editor.gesture_update(g, 4.0 + i as f64 * 0.1, at).unwrap();
    }
    s.editor.end_gesture(g, 6.5).unwrap();
    assert_bounds(&s.editor, s.title, 0.0, 6.5);
    assert_eq!(s.editor.selection(), Some(s.title));
}

#[test]
fn new_gesture_cancels_previous() {
    let mut s = build_session();
    let t0 = Instant::now();
    let first = s.editor.begin_drag(s.caption, 3.0).unwrap();
    let second = s
        .editor
        .begin_gesture(GestureKind::ResizeLeft { id: s.title })
        .unwrap();

    assert!(s.editor.gesture_update(first, 10.0, t0).unwrap().is_none());
    assert!(s.editor.end_gesture(first, 10.0).unwrap().is_none());
    assert_bounds(&s.editor, s.caption, 2.0, 6.0);

    s.editor.end_gesture(second, 1.0).unwrap();
    assert_bounds(&s.editor, s.title, 1.0, 4.0);
}
