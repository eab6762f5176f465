//! Cutline Timeline - Interval-editing engine
//!
//! Implements the editable timeline of time-positioned media and text:
//! - Timeline model with per-track query helpers
//! - Frame and edge snapping
//! - Edit operations (move, trim, split, duplicate, delete, reorder) with
//!   magnet cascades on sequential tracks
//! - Lane packing for overlapping overlay elements
//! - Playback/cursor synchronization with an external renderer
//! - Rate-limited gesture queue and debounced snapshot persistence

pub mod edit;
pub mod element;
pub mod error;
pub mod gesture;
pub mod media;
pub mod model;
pub mod packer;
pub mod persistence;
pub mod playback;
pub mod policy;
pub mod render;
pub mod serialization;
pub mod snap;

pub use edit::{EditCommand, EditOutcome, TimelineEditor};
pub use element::{ElementId, MediaSource, TimelineElement, TrackKind};
pub use error::{EditError, EditResult};
pub use gesture::{GestureId, GestureKind, GestureQueue};
pub use media::{MediaCatalog, MediaInfo, MediaSourceProvider};
pub use model::TimelineModel;
pub use packer::{pack, Lane, LaneAssignment};
pub use persistence::{FileSnapshotSink, SnapshotDebouncer, SnapshotSink};
pub use playback::{PlaybackRenderer, PlaybackState, PlaybackSync};
pub use policy::{EditPolicy, GesturePolicy, PlaybackPolicy, TrackPolicy};
pub use render::{RenderElement, RenderTrack};
pub use serialization::TimelineSnapshot;
pub use snap::{SnapKind, SnapPoint, SnapResolver};
