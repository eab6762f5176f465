//! Time representation for frame-accurate editing
//!
//! Timeline positions are plain `f64` seconds. Frame accuracy comes from
//! quantizing against a rational [`FrameRate`] whenever a time is committed,
//! so drift never accumulates across edits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when comparing two timeline seconds for equality.
pub const TIME_EPSILON: f64 = 1e-9;

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 30000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Create an integer frame rate (`fps` frames per second).
    #[inline]
    pub const fn from_fps(fps: u32) -> Self {
        Self::new(fps, 1)
    }

    /// A rate is usable only when both parts are non-zero.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Duration of a single frame in seconds.
    #[inline]
    pub fn frame_duration(self) -> f64 {
        self.denominator as f64 / self.numerator as f64
    }

    /// Nearest frame index for a time in seconds.
    #[inline]
    pub fn to_frame(self, seconds: f64) -> i64 {
        (seconds * self.numerator as f64 / self.denominator as f64).round() as i64
    }

    /// Start time in seconds of a frame index.
    #[inline]
    pub fn frame_to_seconds(self, frame: i64) -> f64 {
        frame as f64 * self.denominator as f64 / self.numerator as f64
    }

    /// Round a time to the nearest frame boundary.
    #[inline]
    pub fn quantize(self, seconds: f64) -> f64 {
        self.frame_to_seconds(self.to_frame(seconds))
    }

    /// Format seconds as a `HH:MM:SS:FF` timecode (non drop-frame).
    pub fn timecode(self, seconds: f64) -> String {
        let fps = self.to_fps_f64().round().max(1.0) as i64;
        let frames = self.to_frame(seconds.max(0.0));
        let ff = frames % fps;
        let total_secs = frames / fps;
        let ss = total_secs % 60;
        let mm = (total_secs / 60) % 60;
        let hh = total_secs / 3600;
        format!("{hh:02}:{mm:02}:{ss:02}:{ff:02}")
    }

    /// Common frame rates
    pub const FPS_23_976: Self = Self::new(24000, 1001);
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

/// A half-open span of timeline seconds, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    /// Start time (inclusive)
    pub start: f64,
    /// End time (exclusive)
    pub end: f64,
}

impl TimeSpan {
    /// Create a new span from start and end seconds.
    #[inline]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the span in seconds.
    #[inline]
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// Check if a time is within this span.
    #[inline]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Check if two spans share any time. Touching edges do not overlap.
    #[inline]
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end - TIME_EPSILON && other.start < self.end - TIME_EPSILON
    }

    /// The same span moved by `delta` seconds.
    #[inline]
    pub fn shifted(self, delta: f64) -> Self {
        Self::new(self.start + delta, self.end + delta)
    }
}
