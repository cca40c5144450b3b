//! Sprite playback component.
//!
//! A [`Sprite`] plays one [`Animation`] against wall-clock time. Each call to
//! [`Sprite::draw`] advances the playback position by the time elapsed since
//! the previous call, applies loop accounting, and composes the resulting
//! frame onto a surface.
//!
//! # States
//!
//! - **Unbound** – no animation; `draw` does nothing.
//! - **Playing** – loop limit is 0 (infinite) or not reached yet.
//! - **Finished** – loop limit reached; the position stays pinned on the last
//!   frame (forward) or the first frame (backward) and that frame is redrawn
//!   on every call.
//!
//! The first `draw` after binding an animation or repositioning with
//! [`Sprite::set_frame_no`] only records the time baseline.

use std::sync::Arc;

use bevy_ecs::prelude::Component;
use log::debug;

use crate::components::partstate::PartState;
use crate::resources::animation::{Animation, Placement};
use crate::resources::imageloader::ImageLoader;
use crate::surface::DrawSurface;

/// Callback fired when playback runs out of loops.
pub type EndCallback = Box<dyn FnMut() + Send + Sync>;

struct Playback {
    /// Fractional position; may leave `[0, frame_count)` between ticks.
    current_frame: f64,
    /// Time of the previous draw, in milliseconds.
    last_tick: Option<f64>,
    step: f64,
    /// 0 means infinite.
    loop_limit: u32,
    loop_count: u32,
    end_callback: Option<EndCallback>,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            current_frame: 0.0,
            last_tick: None,
            step: 1.0,
            loop_limit: 0,
            loop_count: 0,
            end_callback: None,
        }
    }
}

impl Playback {
    fn has_budget(&self) -> bool {
        self.loop_limit == 0 || self.loop_limit > self.loop_count
    }

    /// Move the position by the time elapsed since the last tick.
    fn advance(&mut self, frame_rate: f64, frame_count: usize, now: f64) {
        if !self.has_budget() {
            return;
        }
        let Some(last) = self.last_tick else {
            return;
        };
        let count = frame_count as f64;
        let ticks = (now - last) / (1000.0 / frame_rate);
        self.current_frame += ticks * self.step;
        let wraps = (self.current_frame / count).floor();

        if self.step >= 0.0 {
            if self.current_frame >= count {
                self.loop_count = self.loop_count.saturating_add(wraps as u32);
                if self.has_budget() {
                    self.current_frame %= count;
                } else {
                    self.current_frame = count - 1.0;
                    self.finish();
                }
            }
        } else if self.current_frame < 0.0 {
            self.loop_count = self.loop_count.saturating_add((1.0 - wraps) as u32);
            if self.has_budget() {
                self.current_frame %= count;
                if self.current_frame < 0.0 {
                    self.current_frame += count;
                }
            } else {
                self.current_frame = 0.0;
                self.finish();
            }
        }
    }

    fn finish(&mut self) {
        self.loop_count = self.loop_count.min(self.loop_limit);
        debug!("Playback finished after {} loops", self.loop_count);
        if let Some(callback) = self.end_callback.as_mut() {
            callback();
        }
    }
}

/// Playback state machine for one animation.
///
/// `x`, `y` and `scale` place the whole sprite on the surface. `flip_h` and
/// `flip_v` are carried through to composition but not applied yet.
#[derive(Component)]
pub struct Sprite<L: ImageLoader> {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub flip_h: bool,
    pub flip_v: bool,
    animation: Option<Arc<Animation<L>>>,
    part_states: Vec<PartState>,
    playback: Playback,
}

impl<L: ImageLoader> Default for Sprite<L> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<L: ImageLoader> Sprite<L> {
    pub fn new(animation: Option<Arc<Animation<L>>>) -> Self {
        let mut sprite = Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            flip_h: false,
            flip_v: false,
            animation: None,
            part_states: Vec::new(),
            playback: Playback::default(),
        };
        sprite.set_animation(animation);
        sprite
    }

    /// Bind (or unbind) an animation and restart from frame 0.
    ///
    /// Part states are rebuilt from the new animation's part list; the loop
    /// count is cleared. Step, loop limit and end callback are kept.
    pub fn set_animation(&mut self, animation: Option<Arc<Animation<L>>>) {
        self.part_states = animation
            .as_ref()
            .map(|a| a.parts().iter().map(PartState::new).collect())
            .unwrap_or_default();
        self.animation = animation;
        self.playback.current_frame = 0.0;
        self.playback.last_tick = None;
        self.clear_loop_count();
    }

    pub fn animation(&self) -> Option<&Arc<Animation<L>>> {
        self.animation.as_ref()
    }

    /// Jump to a frame. The next draw only re-baselines the time.
    pub fn set_frame_no(&mut self, frame_no: f64) {
        self.playback.current_frame = frame_no;
        self.playback.last_tick = None;
    }

    /// Current frame, truncated toward zero.
    pub fn frame_no(&self) -> i64 {
        self.playback.current_frame.trunc() as i64
    }

    /// Playback speed multiplier; negative plays backward.
    pub fn set_step(&mut self, step: f64) {
        self.playback.step = step;
    }

    pub fn step(&self) -> f64 {
        self.playback.step
    }

    /// Number of loops to play, 0 for infinite. Negative values are ignored.
    pub fn set_loop(&mut self, loop_limit: i64) {
        if loop_limit < 0 {
            return;
        }
        self.playback.loop_limit = u32::try_from(loop_limit).unwrap_or(u32::MAX);
    }

    pub fn loop_limit(&self) -> u32 {
        self.playback.loop_limit
    }

    pub fn loop_count(&self) -> u32 {
        self.playback.loop_count
    }

    pub fn clear_loop_count(&mut self) {
        self.playback.loop_count = 0;
    }

    pub fn set_end_callback(&mut self, callback: impl FnMut() + Send + Sync + 'static) {
        self.playback.end_callback = Some(Box::new(callback));
    }

    pub fn clear_end_callback(&mut self) {
        self.playback.end_callback = None;
    }

    /// True once the loop limit is reached.
    pub fn is_finished(&self) -> bool {
        self.animation.is_some() && !self.playback.has_budget()
    }

    /// State of the named part, if bound and known.
    pub fn part_state(&self, name: &str) -> Option<&PartState> {
        let animation = self.animation.as_ref()?;
        let index = animation.part_index(name)?;
        self.part_states.get(index)
    }

    pub fn part_states(&self) -> &[PartState] {
        &self.part_states
    }

    fn placement(&self) -> Placement {
        Placement {
            x: self.x,
            y: self.y,
            flip_h: self.flip_h,
            flip_v: self.flip_v,
            scale: self.scale,
        }
    }

    /// Advance to `current_time` (milliseconds) and draw the current frame.
    pub fn draw<S>(&mut self, surface: &mut S, current_time: f64)
    where
        S: DrawSurface<Image = L::Image>,
    {
        let placement = self.placement();
        let Some(animation) = self.animation.as_ref() else {
            return;
        };

        self.playback
            .advance(animation.frame_rate(), animation.frame_count(), current_time);
        self.playback.last_tick = Some(current_time);

        let frame_no = self.playback.current_frame.trunc();
        if frame_no < 0.0 {
            debug!("draw: negative frame {}", frame_no);
            return;
        }
        animation.compose_frame(surface, frame_no as usize, placement, &mut self.part_states);
    }
}
