//! Snapping of candidate times to frame boundaries and element edges.
//!
//! Frame accuracy is the default. A candidate is pulled onto the nearest
//! peer edge (or caller-supplied point) only when it lies strictly within
//! the snap threshold; otherwise it rounds to the nearest frame.

use cutline_core::FrameRate;

use crate::element::{ElementId, TimelineElement};
use crate::policy::EditPolicy;

/// A point on the timeline that can be snapped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapPoint {
    pub time: f64,
    pub kind: SnapKind,
}

/// Kind of snap point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapKind {
    ElementStart,
    ElementEnd,
    /// Supplied by the caller, e.g. the end of a reference track.
    Extra,
}

/// Pure, deterministic time resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResolver {
    pub frame_rate: FrameRate,
    /// Edge snapping distance in seconds (exclusive).
    pub threshold: f64,
    /// When false only frame quantization applies.
    pub enabled: bool,
}

impl SnapResolver {
    pub fn new(frame_rate: FrameRate, threshold: f64) -> Self {
        Self {
            frame_rate,
            threshold,
            enabled: true,
        }
    }

    /// Resolver configured from an editing policy.
    pub fn from_policy(policy: &EditPolicy, frame_rate: FrameRate) -> Self {
        Self {
            frame_rate,
            threshold: policy.snap_threshold_secs,
            enabled: policy.snapping_enabled,
        }
    }

    /// Edges of every peer except `self_id`, plus the extra points.
    pub fn collect_snap_points<'a>(
        self_id: Option<ElementId>,
        peers: impl IntoIterator<Item = &'a TimelineElement>,
        extra: &[f64],
    ) -> Vec<SnapPoint> {
        let mut points = Vec::new();

        for peer in peers.into_iter().filter(|p| Some(p.id) != self_id) {
            points.push(SnapPoint {
                time: peer.position_start,
                kind: SnapKind::ElementStart,
            });
            points.push(SnapPoint {
                time: peer.position_end,
                kind: SnapKind::ElementEnd,
            });
        }

        points.extend(extra.iter().map(|&time| SnapPoint {
            time,
            kind: SnapKind::Extra,
        }));

        points
    }

    /// Closest point strictly within the threshold. Earlier points win ties.
    pub fn find_snap(&self, candidate: f64, points: &[SnapPoint]) -> Option<SnapPoint> {
        if !self.enabled {
            return None;
        }

        let mut best: Option<(SnapPoint, f64)> = None;
        for sp in points {
            let dist = (sp.time - candidate).abs();
            if dist < self.threshold && best.map_or(true, |(_, d)| dist < d) {
                best = Some((*sp, dist));
            }
        }

        best.map(|(sp, _)| sp)
    }

    /// Round to the nearest frame boundary.
    #[inline]
    pub fn frame_snap(&self, candidate: f64) -> f64 {
        self.frame_rate.quantize(candidate)
    }

    /// Resolve one boundary time.
    pub fn resolve<'a>(
        &self,
        candidate: f64,
        self_id: Option<ElementId>,
        peers: impl IntoIterator<Item = &'a TimelineElement>,
        extra: &[f64],
    ) -> f64 {
        let points = Self::collect_snap_points(self_id, peers, extra);
        self.resolve_with(candidate, &points)
    }

    /// Resolve against a prepared point set.
    pub fn resolve_with(&self, candidate: f64, points: &[SnapPoint]) -> f64 {
        match self.find_snap(candidate, points) {
            Some(sp) => sp.time,
            None => self.frame_snap(candidate),
        }
    }

    /// Resolve the start of a rigid span of `duration` seconds.
    ///
    /// Both edges are tried against the snap points and the closer hit wins;
    /// without a hit the start is frame-quantized.
    pub fn resolve_span<'a>(
        &self,
        start: f64,
        duration: f64,
        self_id: Option<ElementId>,
        peers: impl IntoIterator<Item = &'a TimelineElement>,
        extra: &[f64],
    ) -> f64 {
        let points = Self::collect_snap_points(self_id, peers, extra);
        let end = start + duration;

        let left = self
            .find_snap(start, &points)
            .map(|sp| (sp.time, (sp.time - start).abs()));
        let right = self
            .find_snap(end, &points)
            .map(|sp| (sp.time - duration, (sp.time - end).abs()));

        match (left, right) {
            (Some((l, ld)), Some((r, rd))) => {
                if rd < ld {
                    r
                } else {
                    l
                }
            }
            (Some((l, _)), None) => l,
            (None, Some((r, _))) => r,
            (None, None) => self.frame_snap(start),
        }
    }
}
