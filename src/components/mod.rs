//! Components attached to sprite entities.
//!
//! Submodules overview:
//! - [`partstate`] – last resolved position of one animation part
//! - [`sprite`] – playback state machine for one animation
//! - [`zindex`] – draw order hint for the render pass

pub mod partstate;
pub mod sprite;
pub mod zindex;
