//! Resolved per-track element lists handed to a renderer.

use serde::Serialize;

use crate::element::{ElementId, TimelineElement, TrackKind};
use crate::model::TimelineModel;
use crate::packer::pack;
use crate::policy::EditPolicy;

/// One element with absolute positions and, on overlay tracks, its lane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderElement {
    pub id: ElementId,
    pub start: f64,
    pub end: f64,
    pub asset: Option<String>,
    pub source_in: Option<f64>,
    pub source_out: Option<f64>,
    pub playback_speed: f64,
    pub z_index: i32,
    pub is_placeholder: bool,
    pub lane: Option<usize>,
}

impl RenderElement {
    fn from_element(el: &TimelineElement, lane: Option<usize>) -> Self {
        Self {
            id: el.id,
            start: el.position_start,
            end: el.position_end,
            asset: el.media.as_ref().map(|m| m.asset.clone()),
            source_in: el.media.as_ref().map(|m| m.source_in),
            source_out: el.media.as_ref().map(|m| m.source_out),
            playback_speed: el.media.as_ref().map_or(1.0, |m| m.playback_speed),
            z_index: el.z_index,
            is_placeholder: el.is_placeholder,
            lane,
        }
    }
}

/// Elements of one track, ordered by start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTrack {
    pub kind: TrackKind,
    pub lane_count: usize,
    pub elements: Vec<RenderElement>,
}

/// Resolve every non-empty track. Overlay tracks are lane-packed.
pub fn resolve(model: &TimelineModel, policy: &EditPolicy) -> Vec<RenderTrack> {
    TrackKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let track = model.elements_by_track(kind);
            if track.is_empty() {
                return None;
            }

            if policy.track(kind).exclusive {
                return Some(RenderTrack {
                    kind,
                    lane_count: 1,
                    elements: track
                        .iter()
                        .map(|el| RenderElement::from_element(el, None))
                        .collect(),
                });
            }

            let lanes = pack(track.iter().copied());
            Some(RenderTrack {
                kind,
                lane_count: lanes.lane_count(),
                elements: track
                    .iter()
                    .map(|el| RenderElement::from_element(el, lanes.lane_of(el.id)))
                    .collect(),
            })
        })
        .collect()
}
