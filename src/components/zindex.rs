//! Draw order for sprite entities.
//!
//! [`render_pass`](crate::systems::render::render_pass) draws sprites in
//! ascending [`ZIndex`]; entities without one draw at 0.

use bevy_ecs::prelude::Component;

/// Higher values are drawn later (on top).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZIndex(pub i32);
