//! Sprite playback integration tests: time advancement, looping and end handling.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Vec2;

use ssaplayer::components::sprite::Sprite;
use ssaplayer::error::ImageLoadError;
use ssaplayer::resources::animation::Animation;
use ssaplayer::resources::animationdata::{AnimationData, FrameRecord, RecordLayout};
use ssaplayer::resources::imageloader::ImageLoader;
use ssaplayer::resources::imageset::ImageSet;
use ssaplayer::surface::Rect;
use ssaplayer::surface::recording::RecordingSurface;

struct NullLoader;

impl ImageLoader for NullLoader {
    type Image = ();

    fn load(&self, _path: &str) -> Result<(), ImageLoadError> {
        Ok(())
    }
}

/// `frame_count` frames, each moving part 0 to `x = frame index`.
fn make_animation(frame_rate: f64, frame_count: usize, parts: &[&str]) -> Arc<Animation<NullLoader>> {
    let frames = (0..frame_count)
        .map(|f| {
            (0..parts.len())
                .map(|p| {
                    FrameRecord::new(
                        p,
                        0,
                        Rect::new(0.0, 0.0, 8.0, 8.0),
                        Vec2::new(f as f32, p as f32),
                        0.0,
                        Vec2::ONE,
                    )
                })
                .collect()
        })
        .collect();
    let data = AnimationData::new(
        frame_rate,
        parts.iter().map(|p| p.to_string()).collect(),
        frames,
        RecordLayout::Blend,
    )
    .unwrap();
    let images = Arc::new(ImageSet::new(NullLoader, &["parts.png"], "", false, None));
    Arc::new(Animation::new(data, images))
}

fn counting_sprite(anim: Arc<Animation<NullLoader>>) -> (Sprite<NullLoader>, Arc<AtomicUsize>) {
    let ended = Arc::new(AtomicUsize::new(0));
    let ended_clone = Arc::clone(&ended);
    let mut sprite = Sprite::new(Some(anim));
    sprite.set_end_callback(move || {
        ended_clone.fetch_add(1, Ordering::SeqCst);
    });
    (sprite, ended)
}

#[test]
fn first_draw_only_sets_the_baseline() {
    let mut sprite = Sprite::new(Some(make_animation(10.0, 5, &["body"])));
    let mut surface = RecordingSurface::new();
    sprite.draw(&mut surface, 5000.0);
    assert_eq!(sprite.frame_no(), 0);
    sprite.draw(&mut surface, 5100.0);
    assert_eq!(sprite.frame_no(), 1);
}

#[test]
fn forward_playback_pins_last_frame_and_fires_once() {
    let (mut sprite, ended) = counting_sprite(make_animation(10.0, 5, &["body"]));
    sprite.set_step(1.0);
    sprite.set_loop(1);
    let mut surface = RecordingSurface::new();

    sprite.draw(&mut surface, 1000.0);
    assert_eq!(sprite.frame_no(), 0);

    sprite.draw(&mut surface, 2500.0);
    assert_eq!(sprite.frame_no(), 4);
    assert_eq!(sprite.loop_count(), 1);
    assert!(sprite.is_finished());
    assert_eq!(ended.load(Ordering::SeqCst), 1);

    // Finished: pinned and redrawn, callback not repeated
    sprite.draw(&mut surface, 4000.0);
    assert_eq!(sprite.frame_no(), 4);
    assert_eq!(ended.load(Ordering::SeqCst), 1);
    assert_eq!(sprite.part_state("body").unwrap().x, 4.0);
}

#[test]
fn backward_playback_counts_wraps() {
    let mut sprite = Sprite::new(Some(make_animation(10.0, 5, &["body"])));
    sprite.set_step(-1.0);
    sprite.set_frame_no(2.0);
    let mut surface = RecordingSurface::new();

    sprite.draw(&mut surface, 0.0);
    sprite.draw(&mut surface, 500.0);
    assert_eq!(sprite.loop_count(), 2);
    assert_eq!(sprite.frame_no(), 2);
    assert!(!sprite.is_finished());
}

#[test]
fn backward_playback_pins_first_frame() {
    let (mut sprite, ended) = counting_sprite(make_animation(10.0, 5, &["body"]));
    sprite.set_step(-1.0);
    sprite.set_loop(1);
    sprite.set_frame_no(2.0);
    let mut surface = RecordingSurface::new();

    sprite.draw(&mut surface, 0.0);
    sprite.draw(&mut surface, 300.0);
    assert_eq!(sprite.frame_no(), 0);
    assert_eq!(sprite.loop_count(), 1);
    assert_eq!(ended.load(Ordering::SeqCst), 1);
}

#[test]
fn infinite_loop_wraps_forever() {
    let (mut sprite, ended) = counting_sprite(make_animation(10.0, 5, &["body"]));
    let mut surface = RecordingSurface::new();

    sprite.draw(&mut surface, 0.0);
    sprite.draw(&mut surface, 1200.0);
    assert_eq!(sprite.frame_no(), 2);
    assert_eq!(sprite.loop_count(), 2);

    sprite.draw(&mut surface, 1500.0);
    assert_eq!(sprite.frame_no(), 0);
    assert_eq!(sprite.loop_count(), 3);
    assert!(!sprite.is_finished());
    assert_eq!(ended.load(Ordering::SeqCst), 0);
}

#[test]
fn step_scales_advancement() {
    let mut sprite = Sprite::new(Some(make_animation(10.0, 10, &["body"])));
    sprite.set_step(0.5);
    let mut surface = RecordingSurface::new();
    sprite.draw(&mut surface, 0.0);
    sprite.draw(&mut surface, 300.0);
    // 3 ticks at half speed
    assert_eq!(sprite.frame_no(), 1);
}

#[test]
fn negative_loop_is_ignored() {
    let mut sprite = Sprite::new(Some(make_animation(10.0, 5, &["body"])));
    sprite.set_loop(3);
    sprite.set_loop(-1);
    assert_eq!(sprite.loop_limit(), 3);
}

#[test]
fn clear_loop_count_restarts_budget() {
    let (mut sprite, ended) = counting_sprite(make_animation(10.0, 5, &["body"]));
    sprite.set_loop(1);
    let mut surface = RecordingSurface::new();
    sprite.draw(&mut surface, 0.0);
    sprite.draw(&mut surface, 600.0);
    assert!(sprite.is_finished());

    sprite.clear_loop_count();
    sprite.set_frame_no(0.0);
    assert!(!sprite.is_finished());
    sprite.draw(&mut surface, 1000.0);
    sprite.draw(&mut surface, 1600.0);
    assert_eq!(ended.load(Ordering::SeqCst), 2);
}

#[test]
fn set_frame_no_skips_one_advancement() {
    let mut sprite = Sprite::new(Some(make_animation(10.0, 10, &["body"])));
    let mut surface = RecordingSurface::new();
    sprite.draw(&mut surface, 0.0);
    sprite.draw(&mut surface, 100.0);
    assert_eq!(sprite.frame_no(), 1);

    sprite.set_frame_no(7.9);
    assert_eq!(sprite.frame_no(), 7);
    sprite.draw(&mut surface, 900.0);
    assert_eq!(sprite.frame_no(), 7);
    sprite.draw(&mut surface, 1000.0);
    assert_eq!(sprite.frame_no(), 8);
}

#[test]
fn rebinding_resets_part_states() {
    let mut sprite = Sprite::new(Some(make_animation(10.0, 5, &["body", "head"])));
    let mut surface = RecordingSurface::new();
    sprite.draw(&mut surface, 0.0);
    sprite.draw(&mut surface, 300.0);
    assert_eq!(sprite.part_state("head").unwrap().x, 3.0);

    sprite.set_animation(Some(make_animation(10.0, 5, &["arm", "leg", "tail"])));
    assert_eq!(sprite.part_states().len(), 3);
    assert!(sprite.part_states().iter().all(|s| s.x == 0.0 && s.y == 0.0));
    assert!(sprite.part_state("head").is_none());
    assert_eq!(sprite.part_state("tail").unwrap().name(), "tail");
    assert_eq!(sprite.frame_no(), 0);
    assert_eq!(sprite.loop_count(), 0);
}

#[test]
fn sprite_placement_offsets_part_states() {
    let mut sprite = Sprite::new(Some(make_animation(10.0, 5, &["body"])));
    sprite.x = 100.0;
    sprite.y = 50.0;
    let mut surface = RecordingSurface::new();
    sprite.draw(&mut surface, 0.0);
    let state = sprite.part_state("body").unwrap();
    assert_eq!((state.x, state.y), (100.0, 50.0));
}
