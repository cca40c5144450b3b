//! ssaplayer main entry point.
//!
//! Loads one exported animation document, binds it to its images and plays
//! it as a looping sprite.
//!
//! - With the `raylib` feature, opens a window and plays in real time.
//! - With `--dump <FRAMES>`, runs headless and prints the draw calls of each
//!   simulated frame as one JSON line.
//!
//! # Running
//!
//! ```sh
//! cargo run --release --features raylib -- assets/girl.json
//! cargo run -- assets/girl.json --dump 10
//! ```

mod components;
mod error;
mod events;
mod resources;
mod surface;
mod systems;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bevy_ecs::prelude::*;
use clap::Parser;
use log::{error, info, warn};
use serde::Serialize;

use crate::components::sprite::Sprite;
use crate::components::zindex::ZIndex;
use crate::events::playback::SpriteEndedEvent;
use crate::resources::animation::Animation;
use crate::resources::animationdata::{AnimationDocument, RecordLayout};
use crate::resources::imageloader::{FileLoader, ImageBytes};
use crate::resources::imageset::ImageSet;
use crate::resources::playerconfig::PlayerConfig;
use crate::surface::recording::{DrawOp, RecordingSurface};
use crate::systems::render::render_pass;

const DUMP_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Sprite animation player
#[derive(Parser)]
#[command(version, about = "Plays part-based sprite animations exported to JSON.")]
struct Cli {
    /// Animation document to play.
    animation: PathBuf,

    /// INI configuration file (default: ./player.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory prefix for image paths (default: the animation's directory).
    #[arg(long, value_name = "DIR")]
    images_root: Option<String>,

    /// Trailing record fields: "blend" or "vertex".
    #[arg(long)]
    layout: Option<RecordLayout>,

    /// Playback speed; negative plays backward.
    #[arg(long, allow_hyphen_values = true)]
    step: Option<f64>,

    /// Loops to play, 0 for infinite.
    #[arg(long = "loop", value_name = "COUNT")]
    loop_limit: Option<u32>,

    /// Sprite scale.
    #[arg(long)]
    scale: Option<f32>,

    /// Print the draw calls of this many frames as JSON lines and exit.
    #[arg(long, value_name = "FRAMES")]
    dump: Option<u32>,

    /// Simulated time between dumped frames, in milliseconds.
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    tick_ms: f64,

    /// Write the effective configuration back to the config file.
    #[arg(long)]
    save_config: bool,
}

#[derive(Serialize)]
struct DumpDraw {
    image: String,
    src: [f32; 4],
    dst: [f32; 4],
    /// Canvas order: a, b, c, d, e, f.
    transform: [f32; 6],
    alpha: f32,
    blend: &'static str,
}

#[derive(Serialize)]
struct DumpFrame {
    tick: u32,
    time_ms: f64,
    frame_no: i64,
    loop_count: u32,
    draws: Vec<DumpDraw>,
}

fn dump_draw(op: &DrawOp<ImageBytes>) -> Option<DumpDraw> {
    let DrawOp::DrawImage {
        image,
        src,
        dst,
        transform,
        alpha,
        blend,
    } = op
    else {
        return None;
    };
    let m = transform.matrix2;
    let t = transform.translation;
    Some(DumpDraw {
        image: image.path.clone(),
        src: [src.x, src.y, src.width, src.height],
        dst: [dst.x, dst.y, dst.width, dst.height],
        transform: [m.x_axis.x, m.x_axis.y, m.y_axis.x, m.y_axis.y, t.x, t.y],
        alpha: *alpha,
        blend: blend.composite_operation(),
    })
}

/// Directory of `path` as an image root prefix ("" or "dir/").
fn default_images_root(path: &Path) -> String {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => format!("{}/", dir.display()),
        _ => String::new(),
    }
}

fn load_config(cli: &Cli) -> PlayerConfig {
    let mut config = match &cli.config {
        Some(path) => PlayerConfig::with_path(path),
        None => PlayerConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        // Only an explicit config path is worth a warning.
        if cli.config.is_some() {
            warn!("{}", e);
        } else {
            info!("No config file, using defaults");
        }
    }

    if let Some(root) = &cli.images_root {
        config.images_root = Some(root.clone());
    }
    if let Some(layout) = cli.layout {
        config.layout = layout;
    }
    if let Some(step) = cli.step {
        config.step = step;
    }
    if let Some(loop_limit) = cli.loop_limit {
        config.loop_limit = loop_limit;
    }
    if let Some(scale) = cli.scale {
        config.scale = scale;
    }
    if cli.save_config {
        if let Err(e) = config.save_to_file() {
            warn!("{}", e);
        }
    }
    config
}

fn spawn_sprite(
    world: &mut World,
    animation: Arc<Animation<FileLoader>>,
    config: &PlayerConfig,
) -> Entity {
    let mut sprite = Sprite::new(Some(animation));
    sprite.x = config.x;
    sprite.y = config.y;
    sprite.scale = config.scale;
    sprite.set_step(config.step);
    sprite.set_loop(i64::from(config.loop_limit));
    sprite.set_end_callback(|| info!("Playback reached its loop limit"));
    world.spawn((sprite, ZIndex(0))).id()
}

fn run_dump(world: &mut World, entity: Entity, images: &ImageSet<FileLoader>, frames: u32, tick_ms: f64) {
    if !images.wait_for_all(DUMP_LOAD_TIMEOUT) {
        warn!("Not every image loaded; missing parts will not be drawn");
    }

    let mut surface = RecordingSurface::<ImageBytes>::new();
    for tick in 0..frames {
        let time_ms = f64::from(tick) * tick_ms;
        render_pass::<FileLoader, _>(world, &mut surface, time_ms);

        let (frame_no, loop_count) = world
            .get::<Sprite<FileLoader>>(entity)
            .map(|s| (s.frame_no(), s.loop_count()))
            .unwrap_or_default();
        let frame = DumpFrame {
            tick,
            time_ms,
            frame_no,
            loop_count,
            draws: surface.take_ops().iter().filter_map(dump_draw).collect(),
        };
        match serde_json::to_string(&frame) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to serialize frame {}: {}", tick, e),
        }
    }
}

#[cfg(feature = "raylib")]
fn run_window(world: &mut World, images: &ImageSet<FileLoader>, config: &PlayerConfig) {
    use crate::surface::raylib::{RaylibSurface, TextureCache};
    use raylib::prelude::*;

    let (width, height) = config.window_size();
    let (mut rl, thread) = raylib::init()
        .size(width as i32, height as i32)
        .resizable()
        .title(&config.title)
        .build();
    rl.set_target_fps(config.target_fps);

    let mut textures = TextureCache::new();
    while !rl.window_should_close() {
        textures.sync(&mut rl, &thread, &images.loaded_images());
        let now_ms = rl.get_time() * 1000.0;

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::BLACK);
        let mut surface = RaylibSurface::new(&mut d, &textures);
        render_pass::<FileLoader, _>(world, &mut surface, now_ms);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli);

    let document = match AnimationDocument::from_json_file(&cli.animation, config.layout) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error loading {}: {}", cli.animation.display(), e);
            std::process::exit(1);
        }
    };
    info!(
        "Loaded {} ({} frames at {} fps, {} parts, {} images)",
        document.name.as_deref().unwrap_or("animation"),
        document.data.frame_count(),
        document.data.frame_rate(),
        document.data.parts().len(),
        document.images.len()
    );

    let root = config
        .images_root
        .clone()
        .unwrap_or_else(|| default_images_root(&cli.animation));
    let image_count = document.images.len();
    let images = Arc::new(ImageSet::new(
        FileLoader,
        &document.images,
        root,
        true,
        Some(Box::new(move || info!("All {} images loaded", image_count))),
    ));
    info!("Loading {} images from '{}'", images.len(), images.root());
    let animation = Arc::new(Animation::new(document.data, Arc::clone(&images)));

    let mut world = World::new();
    world.add_observer(|trigger: On<SpriteEndedEvent>| {
        info!("Sprite {:?} finished", trigger.event().entity);
    });
    let entity = spawn_sprite(&mut world, animation, &config);
    world.flush();

    if let Some(frames) = cli.dump {
        run_dump(&mut world, entity, &images, frames, cli.tick_ms);
        return;
    }

    #[cfg(feature = "raylib")]
    run_window(&mut world, &images, &config);

    #[cfg(not(feature = "raylib"))]
    {
        let _ = entity;
        eprintln!("Error: built without the raylib feature; use --dump <FRAMES>");
        std::process::exit(1);
    }
}
