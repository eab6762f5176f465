//! Media source metadata used to cap trims.

use cutline_core::{CutlineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Information about a media asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Natural duration of the asset in seconds
    pub duration_secs: f64,
    /// Native width for visual media
    pub width: Option<u32>,
    /// Native height for visual media
    pub height: Option<u32>,
}

impl MediaInfo {
    /// Audio-only or otherwise non-visual media.
    pub fn audio(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            width: None,
            height: None,
        }
    }

    /// Visual media with native dimensions.
    pub fn video(duration_secs: f64, width: u32, height: u32) -> Self {
        Self {
            duration_secs,
            width: Some(width),
            height: Some(height),
        }
    }
}

/// Provides natural durations (and dimensions) for asset references.
pub trait MediaSourceProvider {
    /// Probe an asset. Errors mean the source is unavailable or unreadable.
    fn probe(&self, asset: &str) -> Result<MediaInfo>;
}

/// In-memory provider keyed by asset reference.
#[derive(Debug, Clone, Default)]
pub struct MediaCatalog {
    entries: HashMap<String, MediaInfo>,
}

impl MediaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an asset's metadata.
    pub fn insert(&mut self, asset: impl Into<String>, info: MediaInfo) {
        self.entries.insert(asset.into(), info);
    }

    /// Builder-style insert.
    pub fn with(mut self, asset: impl Into<String>, info: MediaInfo) -> Self {
        self.insert(asset, info);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MediaSourceProvider for MediaCatalog {
    fn probe(&self, asset: &str) -> Result<MediaInfo> {
        let info = self
            .entries
            .get(asset)
            .copied()
            .ok_or_else(|| CutlineError::NotFound(format!("Media not found: {}", asset)))?;

        if !info.duration_secs.is_finite() || info.duration_secs <= 0.0 {
            return Err(CutlineError::Media(format!(
                "Unreadable duration {} for {}",
                info.duration_secs, asset
            )));
        }
        Ok(info)
    }
}
