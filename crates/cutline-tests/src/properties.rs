//! Property-based invariant tests for the editor and the lane packer.
//!
//! 1. Any sequence of edits leaves the model consistent: no overlap on
//!    sequential tracks, no element below the minimum duration, no negative
//!    start, cursor inside the timeline, and every source window non-empty,
//!    starting at or after zero and ending within its asset.
//! 2. A rejected edit leaves the model untouched.
//! 3. Packing never puts two overlapping elements in the same lane and
//!    assigns every element exactly once.
//! 4. Snapshot round-trips reproduce the model exactly.

use cutline_core::FrameRate;
use cutline_timeline::{
    pack, EditCommand, EditPolicy, MediaCatalog, MediaInfo, TimelineEditor, TimelineElement,
    TimelineModel, TimelineSnapshot, TrackKind,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────

fn track_kind() -> impl Strategy<Value = TrackKind> {
    prop_oneof![
        Just(TrackKind::SequentialVideo),
        Just(TrackKind::SequentialAudio),
        Just(TrackKind::OverlayText),
        Just(TrackKind::OverlayImage),
    ]
}

fn element() -> impl Strategy<Value = TimelineElement> {
    (track_kind(), 0.0f64..30.0, 0.1f64..8.0, -2i32..3).prop_map(|(kind, start, len, z)| {
        TimelineElement::new(kind, start, start + len).with_z_index(z)
    })
}

/// Assets known to [`catalog`], plus one it cannot resolve.
const ASSETS: [&str; 3] = ["short.mp4", "long.mp4", "offline.mp4"];

fn catalog() -> MediaCatalog {
    MediaCatalog::new()
        .with("short.mp4", MediaInfo::video(6.0, 1280, 720))
        .with("long.mp4", MediaInfo::video(20.0, 1920, 1080))
}

/// Media-backed element whose source window starts at `offset` and may run
/// past the end of its asset.
fn media_element() -> impl Strategy<Value = TimelineElement> {
    (
        track_kind(),
        0usize..ASSETS.len(),
        0.0f64..30.0,
        0.1f64..8.0,
        0.0f64..4.0,
    )
        .prop_map(|(kind, asset, start, len, offset)| {
            let mut el = TimelineElement::with_media(kind, ASSETS[asset], start, start + len);
            if let Some(media) = el.media.as_mut() {
                media.source_in = offset;
                media.source_out = offset + len;
            }
            el
        })
}

fn any_element() -> impl Strategy<Value = TimelineElement> {
    prop_oneof![element(), media_element()]
}

/// An edit addressed by element slot rather than id, resolved against the
/// model at execution time.
#[derive(Debug, Clone)]
enum Op {
    Insert(TimelineElement),
    Append(TimelineElement),
    Move(usize, f64),
    TrimLeft(usize, f64),
    TrimRight(usize, f64),
    Split(usize, f64),
    Duplicate(usize),
    Delete(usize),
    Reorder(TrackKind, usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any_element().prop_map(Op::Insert),
        any_element().prop_map(Op::Append),
        (any::<usize>(), -5.0f64..40.0).prop_map(|(i, t)| Op::Move(i, t)),
        (any::<usize>(), -5.0f64..40.0).prop_map(|(i, t)| Op::TrimLeft(i, t)),
        (any::<usize>(), -5.0f64..40.0).prop_map(|(i, t)| Op::TrimRight(i, t)),
        (any::<usize>(), 0.0f64..1.0).prop_map(|(i, f)| Op::Split(i, f)),
        any::<usize>().prop_map(Op::Duplicate),
        any::<usize>().prop_map(Op::Delete),
        (track_kind(), 0usize..6, 0usize..6).prop_map(|(k, a, b)| Op::Reorder(k, a, b)),
    ]
}

fn to_command(model: &TimelineModel, op: Op) -> Option<EditCommand> {
    let pick = move |slot: usize| {
        let elements = model.elements();
        (!elements.is_empty()).then(|| &elements[slot % elements.len()])
    };

    Some(match op {
        Op::Insert(element) => EditCommand::Insert { element },
        Op::Append(element) => EditCommand::Append { element },
        Op::Move(slot, start) => EditCommand::Move {
            id: pick(slot)?.id,
            start,
        },
        Op::TrimLeft(slot, start) => EditCommand::TrimLeft {
            id: pick(slot)?.id,
            start,
        },
        Op::TrimRight(slot, end) => EditCommand::TrimRight {
            id: pick(slot)?.id,
            end,
        },
        Op::Split(slot, fraction) => {
            let el = pick(slot)?;
            EditCommand::Split {
                id: el.id,
                time: el.position_start + fraction * el.duration(),
            }
        }
        Op::Duplicate(slot) => EditCommand::Duplicate { id: pick(slot)?.id },
        Op::Delete(slot) => EditCommand::Delete { id: pick(slot)?.id },
        Op::Reorder(track, from, to) => EditCommand::Reorder { track, from, to },
    })
}

fn editor() -> TimelineEditor {
    TimelineEditor::new(TimelineModel::new(FrameRate::FPS_30), EditPolicy::default())
        .with_media_provider(Box::new(catalog()))
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Edit sequences preserve invariants; rejections are atomic
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn edit_sequences_preserve_invariants(ops in proptest::collection::vec(op(), 1..40)) {
        let mut editor = editor();

        for op in ops {
            let Some(command) = to_command(editor.model(), op) else {
                continue;
            };
            let before = editor.model().clone();
            let revision = editor.revision();

            if editor.execute(command.clone()).is_err() {
                prop_assert_eq!(editor.model(), &before, "rejected {:?} changed the model", command);
                prop_assert_eq!(editor.revision(), revision);
            }

            let problems = editor.invariant_violations();
            prop_assert!(problems.is_empty(), "after {:?}: {:?}", command, problems);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Packing validity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn packed_lanes_never_overlap(
        elements in proptest::collection::vec(element(), 0..60)
    ) {
        let packed = pack(&elements);

        let mut assigned = 0;
        for lane in packed.lanes() {
            let members: Vec<&TimelineElement> = lane
                .iter()
                .map(|id| elements.iter().find(|e| e.id == *id).unwrap())
                .collect();
            for (i, a) in members.iter().enumerate() {
                for b in &members[i + 1..] {
                    prop_assert!(
                        a.position_end <= b.position_start || b.position_end <= a.position_start,
                        "{:?} and {:?} share a lane",
                        a.span(),
                        b.span()
                    );
                }
            }
            assigned += lane.len();
        }

        prop_assert_eq!(assigned, elements.len());
        prop_assert!(packed.lane_count() <= elements.len());
        for el in &elements {
            prop_assert!(packed.lane_of(el.id).is_some());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Snapshot round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn snapshot_roundtrip_is_exact(
        elements in proptest::collection::vec(element(), 0..20),
        cursor in 0.0f64..50.0,
        zoom in 1.0f64..500.0,
    ) {
        let model = TimelineModel::from_parts(elements, FrameRate::FPS_23_976, zoom, cursor);
        let json = TimelineSnapshot::capture(&model).to_json().unwrap();
        let restored = TimelineSnapshot::from_json(&json).unwrap().into_model().unwrap();
        prop_assert_eq!(restored, model);
    }
}
