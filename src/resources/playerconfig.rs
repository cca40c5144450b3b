//! Player configuration.
//!
//! Settings for the `ssaplayer` binary, loaded from an INI file. Defaults
//! are safe to start with; missing keys keep them.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 960
//! height = 640
//! target_fps = 60
//! title = ssaplayer
//!
//! [playback]
//! step = 1.0
//! loop = 0
//! scale = 1.0
//! x = 480
//! y = 320
//! layout = blend
//!
//! [images]
//! root = assets/images/
//! ```

use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

use crate::resources::animationdata::RecordLayout;

const DEFAULT_WINDOW_WIDTH: u32 = 960;
const DEFAULT_WINDOW_HEIGHT: u32 = 640;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_TITLE: &str = "ssaplayer";
const DEFAULT_STEP: f64 = 1.0;
const DEFAULT_LOOP: u32 = 0;
const DEFAULT_SCALE: f32 = 1.0;
const DEFAULT_CONFIG_PATH: &str = "./player.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    pub target_fps: u32,
    pub title: String,
    /// Playback speed; negative plays backward.
    pub step: f64,
    /// Loops to play, 0 for infinite.
    pub loop_limit: u32,
    pub scale: f32,
    /// Sprite placement; defaults to the window center.
    pub x: f32,
    pub y: f32,
    pub layout: RecordLayout,
    /// Image directory prefix. When unset, the animation file's directory is used.
    pub images_root: Option<String>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            title: DEFAULT_TITLE.to_string(),
            step: DEFAULT_STEP,
            loop_limit: DEFAULT_LOOP,
            scale: DEFAULT_SCALE,
            x: DEFAULT_WINDOW_WIDTH as f32 / 2.0,
            y: DEFAULT_WINDOW_HEIGHT as f32 / 2.0,
            layout: RecordLayout::default(),
            images_root: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }
        if let Some(title) = config.get("window", "title") {
            self.title = title;
        }

        // [playback] section
        if let Some(step) = config.getfloat("playback", "step").ok().flatten() {
            self.step = step;
        }
        if let Some(loop_limit) = config.getuint("playback", "loop").ok().flatten() {
            self.loop_limit = loop_limit as u32;
        }
        if let Some(scale) = config.getfloat("playback", "scale").ok().flatten() {
            self.scale = scale as f32;
        }
        if let Some(x) = config.getfloat("playback", "x").ok().flatten() {
            self.x = x as f32;
        }
        if let Some(y) = config.getfloat("playback", "y").ok().flatten() {
            self.y = y as f32;
        }
        if let Some(layout) = config.get("playback", "layout") {
            match layout.parse() {
                Ok(layout) => self.layout = layout,
                Err(e) => warn!("Ignoring [playback] layout: {}", e),
            }
        }

        // [images] section
        if let Some(root) = config.get("images", "root") {
            self.images_root = Some(root);
        }

        info!(
            "Loaded config: {}x{} window, fps={}, step={}, loop={}, scale={}, layout={}",
            self.window_width,
            self.window_height,
            self.target_fps,
            self.step,
            self.loop_limit,
            self.scale,
            self.layout
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [window] section
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));
        config.set("window", "title", Some(self.title.clone()));

        // [playback] section
        config.set("playback", "step", Some(self.step.to_string()));
        config.set("playback", "loop", Some(self.loop_limit.to_string()));
        config.set("playback", "scale", Some(self.scale.to_string()));
        config.set("playback", "x", Some(self.x.to_string()));
        config.set("playback", "y", Some(self.y.to_string()));
        config.set("playback", "layout", Some(self.layout.to_string()));

        // [images] section
        if let Some(root) = &self.images_root {
            config.set("images", "root", Some(root.clone()));
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Get the window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}
