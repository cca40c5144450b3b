//! End-to-end: exported document on disk, images through FileLoader, playback.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use ssaplayer::components::sprite::Sprite;
use ssaplayer::resources::animation::Animation;
use ssaplayer::resources::animationdata::{AnimationDocument, RecordLayout};
use ssaplayer::resources::imageloader::FileLoader;
use ssaplayer::resources::imageset::ImageSet;
use ssaplayer::surface::BlendMode;
use ssaplayer::surface::recording::{DrawOp, RecordingSurface};

const DOCUMENT: &str = r#"{
  "comipo_images": ["comipo.png"],
  "name": "comipo",
  "animation": {
    "fps": 10,
    "parts": ["root", "head"],
    "ssa": [
      [[1, 0, 0, 0, 16, 16, 10, 20, 0, 1, 1, 0, 0, 0, 0, 1, 2]],
      [[1, 0, 0, 0, 16, 16, 12, 20, 0, 1, 1, 0, 0, 0, 0, 0.5, 0]]
    ]
  }
}"#;

#[test]
fn document_plays_from_disk() {
    let dir = std::env::temp_dir().join(format!("ssaplayer_document_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("comipo.json"), DOCUMENT).unwrap();
    std::fs::write(dir.join("comipo.png"), b"not really a png").unwrap();

    let doc = AnimationDocument::from_json_file(dir.join("comipo.json"), RecordLayout::Blend).unwrap();
    assert_eq!(doc.name.as_deref(), Some("comipo"));
    assert_eq!(doc.images, vec!["comipo.png".to_string()]);
    assert_eq!(doc.data.frame_count(), 2);

    let images = Arc::new(ImageSet::new(
        FileLoader,
        &doc.images,
        format!("{}/", dir.display()),
        true,
        None,
    ));
    assert!(images.wait_for_all(Duration::from_secs(5)));
    let animation = Arc::new(Animation::new(doc.data, Arc::clone(&images)));
    let mut sprite = Sprite::new(Some(animation));
    let mut surface = RecordingSurface::new();

    sprite.draw(&mut surface, 0.0);
    match surface.draws().next() {
        Some(DrawOp::DrawImage { image, blend, alpha, .. }) => {
            assert!(image.path.ends_with("comipo.png"));
            assert_eq!(*blend, BlendMode::Additive);
            assert_eq!(*alpha, 1.0);
        }
        _ => panic!("expected a draw"),
    }
    assert_eq!(sprite.part_state("head").unwrap().x, 10.0);

    surface.take_ops();
    sprite.draw(&mut surface, 100.0);
    assert_eq!(sprite.frame_no(), 1);
    assert_eq!(sprite.part_state("head").unwrap().x, 12.0);
    assert!(surface.ops().contains(&DrawOp::SetGlobalAlpha(0.5)));
    assert!(sprite.part_state("root").is_some());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn images_arrive_while_only_drawing() {
    let dir = std::env::temp_dir().join(format!("ssaplayer_draw_only_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("comipo.json"), DOCUMENT).unwrap();
    std::fs::write(dir.join("comipo.png"), b"not really a png").unwrap();

    let doc = AnimationDocument::from_json_file(dir.join("comipo.json"), RecordLayout::Blend).unwrap();
    let loaded = Arc::new(AtomicUsize::new(0));
    let loaded_clone = Arc::clone(&loaded);
    let images = Arc::new(ImageSet::new(
        FileLoader,
        &doc.images,
        format!("{}/", dir.display()),
        true,
        Some(Box::new(move || {
            loaded_clone.fetch_add(1, Ordering::SeqCst);
        })),
    ));
    let animation = Arc::new(Animation::new(doc.data, images));
    let mut sprite = Sprite::new(Some(animation));
    let mut surface = RecordingSurface::new();

    // No wait_for_all: drawing alone must pick up the loaded image
    let deadline = Instant::now() + Duration::from_secs(5);
    while surface.draws().next().is_none() && Instant::now() < deadline {
        sprite.draw(&mut surface, 0.0);
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(surface.draws().next().is_some());

    while loaded.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(loaded.load(Ordering::SeqCst), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_document_is_an_io_error() {
    let err = AnimationDocument::from_json_file("/nonexistent/anim.json", RecordLayout::Blend)
        .unwrap_err();
    assert!(err.to_string().starts_with("I/O error"));
}
