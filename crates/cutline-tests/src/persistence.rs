//! Integration tests for snapshots on disk and debounced persistence.

use cutline_core::FrameRate;
use cutline_timeline::{
    pack, EditPolicy, FileSnapshotSink, SnapshotDebouncer, TimelineEditor, TimelineElement,
    TimelineModel, TimelineSnapshot, TrackKind,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cutline-{}-{}.json", label, uuid::Uuid::new_v4()))
}

fn editor() -> TimelineEditor {
    let mut model = TimelineModel::new(FrameRate::FPS_29_97);
    model.upsert(TimelineElement::with_media(
        TrackKind::SequentialVideo,
        "a.mp4",
        0.0,
        4.0,
    ));
    model.upsert(TimelineElement::new(TrackKind::OverlayImage, 0.5, 3.0).with_z_index(1));
    model.upsert(TimelineElement::new(TrackKind::OverlayImage, 1.0, 2.0));
    TimelineEditor::new(model, EditPolicy::default())
}

#[test]
fn snapshot_file_roundtrip() {
    let editor = editor();
    let path = temp_path("roundtrip");

    editor.snapshot().save_to_file(&path).unwrap();
    let restored = TimelineSnapshot::load_from_file(&path)
        .unwrap()
        .into_model()
        .unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(&restored, editor.model());
    assert_eq!(
        pack(restored.elements_by_track(TrackKind::OverlayImage)),
        pack(editor.model().elements_by_track(TrackKind::OverlayImage))
    );
}

#[test]
fn missing_snapshot_file_is_io_error() {
    let result = TimelineSnapshot::load_from_file(&temp_path("missing"));
    assert!(matches!(result, Err(cutline_core::CutlineError::Io(_))));
}

#[test]
fn debouncer_writes_settled_state_once() {
    let mut editor = editor();
    let path = temp_path("debounce");
    let quiet = editor.policy().persistence_debounce();
    let mut debouncer = SnapshotDebouncer::new(FileSnapshotSink::new(&path), quiet);
    let t0 = Instant::now();

    let image = editor.model().elements()[2].id;
    for (i, start) in [1.2, 1.4, 1.6].into_iter().enumerate() {
        editor.move_element(image, start).unwrap();
        let at = t0 + Duration::from_millis(i as u64 * 100);
        debouncer.note_revision(editor.revision(), at);
        assert!(!debouncer.poll(at, || editor.snapshot()).unwrap());
    }
    assert!(!path.exists());

    let settled = t0 + Duration::from_millis(200) + quiet;
    assert!(debouncer.poll(settled, || editor.snapshot()).unwrap());

    let written = TimelineSnapshot::load_from_file(&path)
        .unwrap()
        .into_model()
        .unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(&written, editor.model());
    assert!(!debouncer.is_dirty());
}
