//! Render pass integration tests over a bevy_ecs World.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bevy_ecs::prelude::*;
use glam::Vec2;

use ssaplayer::components::sprite::Sprite;
use ssaplayer::components::zindex::ZIndex;
use ssaplayer::error::ImageLoadError;
use ssaplayer::events::playback::SpriteEndedEvent;
use ssaplayer::resources::animation::Animation;
use ssaplayer::resources::animationdata::{AnimationData, FrameRecord, RecordLayout};
use ssaplayer::resources::imageloader::ImageLoader;
use ssaplayer::resources::imageset::ImageSet;
use ssaplayer::surface::Rect;
use ssaplayer::surface::recording::{DrawOp, RecordingSurface};
use ssaplayer::systems::render::render_pass;

struct PathLoader;

impl ImageLoader for PathLoader {
    type Image = String;

    fn load(&self, path: &str) -> Result<String, ImageLoadError> {
        Ok(path.to_string())
    }
}

/// One-part animation drawing `image`, `frame_count` frames at 10 fps.
fn make_animation(image: &str, frame_count: usize) -> Arc<Animation<PathLoader>> {
    let images = Arc::new(ImageSet::new(PathLoader, &[image], "", true, None));
    assert!(images.wait_for_all(Duration::from_secs(5)));
    let frames = (0..frame_count)
        .map(|_| {
            vec![FrameRecord::new(
                0,
                0,
                Rect::new(0.0, 0.0, 4.0, 4.0),
                Vec2::ZERO,
                0.0,
                Vec2::ONE,
            )]
        })
        .collect();
    let data = AnimationData::new(10.0, vec!["body".into()], frames, RecordLayout::Blend).unwrap();
    Arc::new(Animation::new(data, images))
}

fn drawn_images(surface: &RecordingSurface<String>) -> Vec<String> {
    surface
        .draws()
        .filter_map(|op| match op {
            DrawOp::DrawImage { image, .. } => Some((**image).clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn sprites_draw_in_zindex_order() {
    let mut world = World::new();
    world.spawn((Sprite::new(Some(make_animation("front.png", 1))), ZIndex(10)));
    world.spawn((Sprite::new(Some(make_animation("back.png", 1))), ZIndex(-5)));
    world.spawn(Sprite::new(Some(make_animation("middle.png", 1))));

    let mut surface = RecordingSurface::new();
    render_pass::<PathLoader, _>(&mut world, &mut surface, 0.0);

    assert_eq!(drawn_images(&surface), vec!["back.png", "middle.png", "front.png"]);
}

#[test]
fn unbound_sprites_are_skipped() {
    let mut world = World::new();
    world.spawn(Sprite::<PathLoader>::new(None));
    world.spawn(Sprite::new(Some(make_animation("a.png", 1))));

    let mut surface = RecordingSurface::new();
    render_pass::<PathLoader, _>(&mut world, &mut surface, 0.0);
    assert_eq!(drawn_images(&surface), vec!["a.png"]);
}

#[test]
fn pass_advances_every_sprite() {
    let mut world = World::new();
    let e = world.spawn(Sprite::new(Some(make_animation("a.png", 10)))).id();

    let mut surface = RecordingSurface::new();
    render_pass::<PathLoader, _>(&mut world, &mut surface, 0.0);
    render_pass::<PathLoader, _>(&mut world, &mut surface, 300.0);
    assert_eq!(world.get::<Sprite<PathLoader>>(e).unwrap().frame_no(), 3);
}

#[test]
fn finished_sprite_triggers_event_once() {
    let mut world = World::new();
    let ended = Arc::new(Mutex::new(Vec::new()));
    let ended_clone = Arc::clone(&ended);
    world.add_observer(move |trigger: On<SpriteEndedEvent>| {
        ended_clone.lock().unwrap().push(trigger.event().entity);
    });

    let mut sprite = Sprite::new(Some(make_animation("a.png", 5)));
    sprite.set_loop(1);
    let finite = world.spawn(sprite).id();
    world.spawn(Sprite::new(Some(make_animation("b.png", 5))));
    world.flush();

    let mut surface = RecordingSurface::new();
    render_pass::<PathLoader, _>(&mut world, &mut surface, 0.0);
    assert!(ended.lock().unwrap().is_empty());

    render_pass::<PathLoader, _>(&mut world, &mut surface, 1000.0);
    assert_eq!(*ended.lock().unwrap(), vec![finite]);

    // Pinned and still drawn, no new event
    surface.take_ops();
    render_pass::<PathLoader, _>(&mut world, &mut surface, 2000.0);
    assert_eq!(ended.lock().unwrap().len(), 1);
    assert_eq!(drawn_images(&surface).len(), 2);
}
