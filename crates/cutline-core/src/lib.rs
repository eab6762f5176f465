//! Cutline Core - Foundation types for timeline editing
//!
//! This crate provides the fundamental types used throughout Cutline:
//! - Frame rates and frame quantization of timeline seconds
//! - Half-open time spans
//! - SMPTE-style timecode formatting
//! - The shared error type

pub mod error;
pub mod time;

pub use error::{CutlineError, Result};
pub use time::{FrameRate, TimeSpan, TIME_EPSILON};
