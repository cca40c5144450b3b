//! Systems and threads driving playback.
//!
//! - [`imageload`] – background thread that performs image loads
//! - [`render`] – per-tick render pass over all sprite entities
pub mod imageload;
pub mod render;
