//! Messages exchanged with the background image loader thread.
//!
//! An [`ImageSet`](crate::resources::imageset::ImageSet) sends
//! [`LoadRequest`]s and the loader thread answers each one with an
//! [`ImageLoadMessage`]. The `generation` echoes the entry's generation at
//! request time so that a load superseded by a later `set_image` can be told
//! apart and dropped.

use std::sync::Arc;

use crate::error::ImageLoadError;

/// Request sent *to* the loader thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub index: usize,
    pub generation: u64,
    pub path: String,
}

/// Result produced *by* the loader thread
#[derive(Debug)]
pub enum ImageLoadMessage<I> {
    Loaded {
        index: usize,
        generation: u64,
        image: Arc<I>,
    },
    Failed {
        index: usize,
        generation: u64,
        error: ImageLoadError,
    },
}

impl<I> ImageLoadMessage<I> {
    pub fn index(&self) -> usize {
        match self {
            ImageLoadMessage::Loaded { index, .. } | ImageLoadMessage::Failed { index, .. } => {
                *index
            }
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            ImageLoadMessage::Loaded { generation, .. }
            | ImageLoadMessage::Failed { generation, .. } => *generation,
        }
    }
}
