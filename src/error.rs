//! Error types for animation data loading and image loading.
//!
//! Playback itself never fails: index and name misses degrade to `None` or a
//! no-op. Errors only surface when a frame table is validated or an image
//! cannot be read.

use std::io;
use thiserror::Error;

/// Errors raised while building or loading an [`AnimationData`](crate::resources::animationdata::AnimationData).
#[derive(Debug, Error)]
pub enum AnimationError {
    /// I/O error while reading an animation document
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required top-level field is absent
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Frame rate is zero, negative or not finite
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f64),

    /// The table has no frames at all
    #[error("Animation has no frames")]
    EmptyFrames,

    /// A positional frame row could not be decoded
    #[error("Invalid record {record} in frame {frame}: {reason}")]
    InvalidRecord {
        frame: usize,
        record: usize,
        reason: String,
    },

    /// A record references a part that is not in the part list
    #[error("Part index {part_index} out of range in frame {frame} (part count {part_count})")]
    PartIndexOutOfRange {
        frame: usize,
        part_index: usize,
        part_count: usize,
    },

    /// A record carries trailing fields of a different layout than the table
    #[error("Record {record} in frame {frame} does not match the table layout")]
    MixedLayouts { frame: usize, record: usize },
}

/// Errors raised by an [`ImageLoader`](crate::resources::imageloader::ImageLoader).
#[derive(Debug, Error, Clone)]
pub enum ImageLoadError {
    /// The file could not be read
    #[error("Failed to read image '{path}': {reason}")]
    Io { path: String, reason: String },

    /// The bytes could not be turned into an image
    #[error("Failed to decode image '{path}': {reason}")]
    Decode { path: String, reason: String },
}

impl ImageLoadError {
    /// Path of the image that failed to load.
    pub fn path(&self) -> &str {
        match self {
            ImageLoadError::Io { path, .. } | ImageLoadError::Decode { path, .. } => path,
        }
    }
}
