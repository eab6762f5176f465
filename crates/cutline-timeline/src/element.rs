//! Element types for the timeline.

use cutline_core::TimeSpan;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque unique key of a timeline element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of track an element lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    /// Main video track, one clip at a time.
    SequentialVideo,
    /// Main audio track, one clip at a time.
    SequentialAudio,
    /// Text overlays, may overlap.
    OverlayText,
    /// Image overlays, may overlap.
    OverlayImage,
}

impl TrackKind {
    /// Every track kind, in display order.
    pub const ALL: [TrackKind; 4] = [
        TrackKind::SequentialVideo,
        TrackKind::SequentialAudio,
        TrackKind::OverlayText,
        TrackKind::OverlayImage,
    ];

    /// Short display name.
    pub fn label(self) -> &'static str {
        match self {
            Self::SequentialVideo => "video",
            Self::SequentialAudio => "audio",
            Self::OverlayText => "text",
            Self::OverlayImage => "image",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Source trim of a media-backed element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSource {
    /// Reference to the underlying asset (path or key)
    pub asset: String,
    /// Source in point (seconds within the asset)
    pub source_in: f64,
    /// Source out point (seconds within the asset)
    pub source_out: f64,
    /// Source seconds consumed per timeline second
    pub playback_speed: f64,
}

impl MediaSource {
    /// Create a media source covering `[source_in, source_out]` at normal speed.
    pub fn new(asset: impl Into<String>, source_in: f64, source_out: f64) -> Self {
        Self {
            asset: asset.into(),
            source_in,
            source_out,
            playback_speed: 1.0,
        }
    }

    /// Length of the used source window.
    #[inline]
    pub fn span(&self) -> f64 {
        self.source_out - self.source_in
    }
}

/// An element on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineElement {
    /// Unique element ID
    pub id: ElementId,
    /// Track the element lives on
    pub track_kind: TrackKind,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Timeline start (seconds)
    pub position_start: f64,
    /// Timeline end (seconds)
    pub position_end: f64,
    /// Stacking order, primary key for lane packing
    #[serde(default)]
    pub z_index: i32,
    /// Placeholder awaiting real media
    #[serde(default)]
    pub is_placeholder: bool,
    /// Source trim for media-backed elements
    #[serde(default)]
    pub media: Option<MediaSource>,
}

impl TimelineElement {
    /// Create a new element with a fresh id.
    pub fn new(track_kind: TrackKind, position_start: f64, position_end: f64) -> Self {
        Self {
            id: ElementId::new(),
            track_kind,
            name: String::new(),
            position_start,
            position_end,
            z_index: 0,
            is_placeholder: false,
            media: None,
        }
    }

    /// Create a media-backed element whose source window matches its length.
    pub fn with_media(
        track_kind: TrackKind,
        asset: impl Into<String>,
        position_start: f64,
        position_end: f64,
    ) -> Self {
        let mut element = Self::new(track_kind, position_start, position_end);
        element.media = Some(MediaSource::new(asset, 0.0, position_end - position_start));
        element
    }

    /// Builder-style name setter.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder-style z-index setter.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Length on the timeline.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.position_end - self.position_start
    }

    /// Timeline span `[start, end)`.
    #[inline]
    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.position_start, self.position_end)
    }

    /// Whether two elements share any timeline time.
    pub fn overlaps(&self, other: &TimelineElement) -> bool {
        self.span().overlaps(other.span())
    }

    /// Translate by `delta` seconds, keeping the duration and source trim.
    pub fn shift(&mut self, delta: f64) {
        self.position_start += delta;
        self.position_end += delta;
    }

    /// Clone with a freshly generated id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: ElementId::new(),
            ..self.clone()
        }
    }
}
