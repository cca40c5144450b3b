//! ssaplayer library.
//!
//! Plays part-based 2D animations exported from an animation editor as
//! per-frame tables of part transforms. Exposes the playback components,
//! animation resources, drawing surfaces, systems and events for use in
//! integration tests and as a reusable library.

pub mod components;
pub mod error;
pub mod events;
pub mod resources;
pub mod surface;
pub mod systems;
