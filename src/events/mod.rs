//! Event and message types.
//!
//! Submodules:
//! - [`imageload`] – commands and results for the background image loader thread
//! - [`playback`] – observer event fired when a sprite entity finishes playing
pub mod imageload;
pub mod playback;
