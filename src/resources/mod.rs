//! Shared, long-lived data.
//!
//! Overview
//! - `animation` – frame table bound to its images, plus frame composition
//! - `animationdata` – validated frame tables and exported document loading
//! - `imageloader` – image loading backends
//! - `imageset` – indexed images with aggregate load completion
//! - `playerconfig` – INI settings for the player binary
pub mod animation;
pub mod animationdata;
pub mod imageloader;
pub mod imageset;
pub mod playerconfig;
