//! Lane packing for free-overlap tracks.
//!
//! Elements are visited in `(z_index, start, id)` order and each goes into
//! the lowest lane where it overlaps nothing already placed. Touching edges
//! do not count as overlap.

use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;

use crate::element::{ElementId, TimelineElement};

/// Elements of one lane, in placement order.
pub type Lane = SmallVec<[ElementId; 8]>;

/// Result of packing a set of elements into lanes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneAssignment {
    lanes: Vec<Lane>,
    index: HashMap<ElementId, usize>,
}

impl LaneAssignment {
    /// Lane of an element, if it was packed.
    pub fn lane_of(&self, id: ElementId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Number of lanes used.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }
}

/// Pack elements into the fewest lanes a greedy first-fit finds.
pub fn pack<'a>(elements: impl IntoIterator<Item = &'a TimelineElement>) -> LaneAssignment {
    let mut order: Vec<&TimelineElement> = elements.into_iter().collect();
    order.sort_by(|a, b| {
        a.z_index
            .cmp(&b.z_index)
            .then(a.position_start.total_cmp(&b.position_start))
            .then(a.id.cmp(&b.id))
    });

    let mut placed: Vec<SmallVec<[&TimelineElement; 8]>> = Vec::new();

    for el in order {
        let free = placed
            .iter()
            .position(|lane| lane.iter().all(|other| fits_beside(el, other)));
        match free {
            Some(lane) => placed[lane].push(el),
            None => placed.push(smallvec![el]),
        }
    }

    let mut result = LaneAssignment::default();
    for (lane, members) in placed.into_iter().enumerate() {
        result.lanes.push(members.iter().map(|el| el.id).collect());
        result.index.extend(members.iter().map(|el| (el.id, lane)));
    }

    tracing::trace!(lanes = result.lane_count(), "Packed elements");
    result
}

fn fits_beside(a: &TimelineElement, b: &TimelineElement) -> bool {
    a.position_end <= b.position_start || b.position_end <= a.position_start
}
