//! Playback end events.
//!
//! When [`render_pass`](crate::systems::render::render_pass) draws a sprite
//! whose loop budget runs out during that pass, a [`SpriteEndedEvent`] is
//! triggered for the entity, after the sprite's own end callback has run.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<SpriteEndedEvent>| {
//!     log::info!("sprite {:?} finished", trigger.event().entity);
//! });
//! ```

use bevy_ecs::prelude::*;

/// Event emitted when a sprite entity reaches the end of its loop budget.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteEndedEvent {
    /// The entity whose sprite finished.
    pub entity: Entity,
}
