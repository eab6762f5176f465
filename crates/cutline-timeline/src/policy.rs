//! Editing policy configuration.
//!
//! All tunable constants of the engine live here so they can be loaded from
//! a JSON file. Missing fields fall back to their defaults.

use cutline_core::{CutlineError, FrameRate, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::element::TrackKind;

/// Per-track-kind behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPolicy {
    /// Elements never overlap; edits cascade instead.
    pub exclusive: bool,
    /// Growing/shrinking an element's right edge shifts later siblings.
    /// When false, growth stops at the next sibling.
    pub ripple_on_resize: bool,
    /// Right edges may not pass the end of this reference track.
    pub bounded_by: Option<TrackKind>,
}

impl TrackPolicy {
    /// Sequential track that ripples on resize.
    pub const fn sequential() -> Self {
        Self {
            exclusive: true,
            ripple_on_resize: true,
            bounded_by: None,
        }
    }

    /// Free-overlap track, resolved by lane packing.
    pub const fn overlay() -> Self {
        Self {
            exclusive: false,
            ripple_on_resize: false,
            bounded_by: None,
        }
    }
}

/// Policies for every track kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackPolicies {
    pub video: TrackPolicy,
    pub audio: TrackPolicy,
    pub text: TrackPolicy,
    pub image: TrackPolicy,
}

impl TrackPolicies {
    /// Policy for a track kind.
    pub fn get(&self, kind: TrackKind) -> TrackPolicy {
        match kind {
            TrackKind::SequentialVideo => self.video,
            TrackKind::SequentialAudio => self.audio,
            TrackKind::OverlayText => self.text,
            TrackKind::OverlayImage => self.image,
        }
    }
}

impl Default for TrackPolicies {
    fn default() -> Self {
        Self {
            video: TrackPolicy::sequential(),
            audio: TrackPolicy {
                exclusive: true,
                ripple_on_resize: false,
                bounded_by: Some(TrackKind::SequentialVideo),
            },
            text: TrackPolicy::overlay(),
            image: TrackPolicy::overlay(),
        }
    }
}

/// Rate limiting for pointer-driven gestures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GesturePolicy {
    /// Maximum intermediate updates applied per second.
    pub max_updates_per_sec: u32,
    /// Buffered intermediate events before the oldest is dropped.
    pub queue_capacity: usize,
}

impl GesturePolicy {
    /// Minimum spacing between two applied intermediate updates.
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.max_updates_per_sec.max(1) as f64)
    }
}

impl Default for GesturePolicy {
    fn default() -> Self {
        Self {
            max_updates_per_sec: 15,
            queue_capacity: 8,
        }
    }
}

/// Cursor/renderer synchronization tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackPolicy {
    /// Renderer frame notifications are ignored this long after a seek.
    pub seek_cooldown_ms: u64,
    /// Minimum cursor advance before a playing frame update is published.
    pub cursor_coalesce_secs: f64,
}

impl PlaybackPolicy {
    pub fn seek_cooldown(&self) -> Duration {
        Duration::from_millis(self.seek_cooldown_ms)
    }
}

impl Default for PlaybackPolicy {
    fn default() -> Self {
        Self {
            seek_cooldown_ms: 150,
            cursor_coalesce_secs: 0.1,
        }
    }
}

/// Complete editing policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditPolicy {
    /// Policy minimum element length; one frame always applies as a floor.
    pub min_duration_secs: f64,
    /// Edge snapping distance.
    pub snap_threshold_secs: f64,
    /// Edge snapping on/off (frame quantization always applies).
    pub snapping_enabled: bool,
    /// Distance a split point keeps from either element boundary.
    pub split_epsilon_secs: f64,
    /// Per-track-kind behavior.
    pub tracks: TrackPolicies,
    /// Gesture rate limiting.
    pub gesture: GesturePolicy,
    /// Playback synchronization.
    pub playback: PlaybackPolicy,
    /// Quiet period before a settled snapshot is persisted.
    pub persistence_debounce_ms: u64,
}

impl EditPolicy {
    /// Effective minimum element duration at a frame rate.
    pub fn min_duration(&self, rate: FrameRate) -> f64 {
        rate.frame_duration().max(self.min_duration_secs)
    }

    /// Policy for a track kind.
    pub fn track(&self, kind: TrackKind) -> TrackPolicy {
        self.tracks.get(kind)
    }

    pub fn persistence_debounce(&self) -> Duration {
        Duration::from_millis(self.persistence_debounce_ms)
    }

    /// Parse a policy from JSON. Missing fields take their defaults.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let policy: Self = serde_json::from_slice(data)
            .map_err(|e| CutlineError::Serialization(format!("Invalid policy: {}", e)))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }

    fn validate(&self) -> Result<()> {
        if !self.min_duration_secs.is_finite() || self.min_duration_secs < 0.0 {
            return Err(CutlineError::InvalidParameter(format!(
                "min_duration_secs must be a non-negative number, got {}",
                self.min_duration_secs
            )));
        }
        if self.snap_threshold_secs.is_nan() || self.snap_threshold_secs < 0.0 {
            return Err(CutlineError::InvalidParameter(format!(
                "snap_threshold_secs must be non-negative, got {}",
                self.snap_threshold_secs
            )));
        }
        if self.gesture.queue_capacity == 0 {
            return Err(CutlineError::InvalidParameter(
                "gesture.queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for EditPolicy {
    fn default() -> Self {
        Self {
            min_duration_secs: 0.0,
            snap_threshold_secs: 0.05,
            snapping_enabled: true,
            split_epsilon_secs: 0.001,
            tracks: TrackPolicies::default(),
            gesture: GesturePolicy::default(),
            playback: PlaybackPolicy::default(),
            persistence_debounce_ms: 500,
        }
    }
}
