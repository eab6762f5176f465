//! Timeline snapshots with versioning and migration.
//!
//! A snapshot reproduces every field of the model: elements, cursor,
//! frame rate and zoom. It is JSON with a schema version field.

use cutline_core::{CutlineError, FrameRate, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::element::TimelineElement;
use crate::model::TimelineModel;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Versioned, self-contained copy of a [`TimelineModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    /// Schema version for migration.
    pub version: u32,
    /// Application version that wrote this snapshot.
    pub app_version: String,
    pub frame_rate: FrameRate,
    pub zoom_px_per_sec: f64,
    pub cursor_time: f64,
    pub elements: Vec<TimelineElement>,
}

impl TimelineSnapshot {
    /// Capture the current state of a model.
    pub fn capture(model: &TimelineModel) -> Self {
        Self {
            version: CURRENT_VERSION,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            frame_rate: model.frame_rate(),
            zoom_px_per_sec: model.zoom(),
            cursor_time: model.cursor_time(),
            elements: model.elements().to_vec(),
        }
    }

    /// Rebuild the model. Rejects a snapshot with an unusable frame rate,
    /// zoom or element bounds.
    pub fn into_model(self) -> Result<TimelineModel> {
        if !self.frame_rate.is_valid() {
            return Err(CutlineError::InvalidParameter(format!(
                "Invalid frame rate {}/{}",
                self.frame_rate.numerator, self.frame_rate.denominator
            )));
        }
        if !self.zoom_px_per_sec.is_finite() || self.zoom_px_per_sec <= 0.0 {
            return Err(CutlineError::InvalidParameter(format!(
                "Invalid zoom {}",
                self.zoom_px_per_sec
            )));
        }
        if let Some(bad) = self.elements.iter().find(|e| {
            !e.position_start.is_finite()
                || !e.position_end.is_finite()
                || e.position_end <= e.position_start
        }) {
            return Err(CutlineError::Timeline(format!(
                "Element {} has invalid bounds [{}, {}]",
                bad.id, bad.position_start, bad.position_end
            )));
        }

        let cursor = if self.cursor_time.is_finite() {
            self.cursor_time
        } else {
            0.0
        };
        Ok(TimelineModel::from_parts(
            self.elements,
            self.frame_rate,
            self.zoom_px_per_sec,
            cursor,
        ))
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            CutlineError::Serialization(format!("Failed to serialize snapshot: {}", e))
        })
    }

    /// Deserialize from JSON bytes, applying migrations if needed.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| CutlineError::Serialization(format!("Invalid JSON: {}", e)))?;

        let version = match raw.get("version") {
            None => 0,
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| {
                    CutlineError::Serialization(format!("Invalid snapshot version {}", v))
                })?,
        };

        if version > CURRENT_VERSION {
            return Err(CutlineError::Serialization(format!(
                "Snapshot version {} is newer than supported version {}",
                version, CURRENT_VERSION
            )));
        }

        let migrated = migrate(raw, version)?;

        serde_json::from_value(migrated)
            .map_err(|e| CutlineError::Serialization(format!("Failed to parse snapshot: {}", e)))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let data = self.to_json()?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}

/// Apply sequential migrations from `from_version` to [`CURRENT_VERSION`].
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0 is a bare model document without the header fields
                if let Some(obj) = data.as_object_mut() {
                    obj.insert("version".into(), 1.into());
                    obj.entry("app_version").or_insert_with(|| "0.0.0".into());
                    obj.entry("zoom_px_per_sec")
                        .or_insert_with(|| crate::model::DEFAULT_ZOOM_PX_PER_SEC.into());
                    obj.entry("cursor_time").or_insert_with(|| 0.0.into());
                }
                version = 1;
            }
            _ => {
                return Err(CutlineError::Serialization(format!(
                    "No migration path from version {}",
                    version
                )));
            }
        }
    }

    Ok(data)
}
