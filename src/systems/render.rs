//! Sprite render pass over an ECS world.
//!
//! The sprite list is flat: every entity carrying a [`Sprite`] is advanced
//! and drawn once per pass, in ascending [`ZIndex`] order. Entities without a
//! `ZIndex` draw at 0; ties keep query order.

use bevy_ecs::prelude::*;

use crate::components::sprite::Sprite;
use crate::components::zindex::ZIndex;
use crate::events::playback::SpriteEndedEvent;
use crate::resources::imageloader::ImageLoader;
use crate::surface::DrawSurface;

/// Draw every sprite of `world` onto `surface` at `current_time` (ms).
///
/// A [`SpriteEndedEvent`] is triggered for each sprite that reached its loop
/// limit during this pass, after all sprites have been drawn.
pub fn render_pass<L, S>(world: &mut World, surface: &mut S, current_time: f64)
where
    L: ImageLoader,
    S: DrawSurface<Image = L::Image>,
{
    let mut to_draw: Vec<(Entity, i32)> = {
        let mut q = world.query_filtered::<(Entity, Option<&ZIndex>), With<Sprite<L>>>();
        q.iter(world)
            .map(|(entity, z)| (entity, z.map_or(0, |z| z.0)))
            .collect()
    };
    to_draw.sort_by_key(|(_, z)| *z);

    let mut ended = Vec::new();
    for (entity, _z) in to_draw {
        let Some(mut sprite) = world.get_mut::<Sprite<L>>(entity) else {
            continue;
        };
        let was_finished = sprite.is_finished();
        sprite.draw(surface, current_time);
        if !was_finished && sprite.is_finished() {
            ended.push(entity);
        }
    }

    for entity in ended {
        world.trigger(SpriteEndedEvent { entity });
    }
}
