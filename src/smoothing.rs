// src/smoothing.rs - Cursor smoothing with large-jump bypass
use nalgebra::Vector2;

use crate::config::SmoothingConfig;

/// Last emitted cursor position, kept at sub-pixel precision.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmoothingState {
    previous: Option<Vector2<f64>>,
}

impl SmoothingState {
    pub fn is_set(&self) -> bool {
        self.previous.is_some()
    }
}

pub struct MotionFilter {
    alpha: f64,
    jump_threshold: f64,
    state: SmoothingState,
}

impl MotionFilter {
    pub fn new(config: &SmoothingConfig) -> Self {
        Self {
            alpha: config.alpha,
            jump_threshold: config.jump_threshold_px,
            state: SmoothingState::default(),
        }
    }

    /// Maps a normalized coordinate onto the screen and smooths it.
    pub fn filter(&mut self, nx: f64, ny: f64, screen_w: u32, screen_h: u32) -> (i32, i32) {
        let target = Vector2::new(
            (nx.clamp(0.0, 1.0) * screen_w as f64).round(),
            (ny.clamp(0.0, 1.0) * screen_h as f64).round(),
        );

        let next = match self.state.previous {
            None => target,
            Some(prev) => {
                let delta = target - prev;
                if delta.x.abs() > self.jump_threshold || delta.y.abs() > self.jump_threshold {
                    // Re-acquisition after a glitch; chasing it would lag for many frames.
                    target
                } else {
                    prev + delta * self.alpha
                }
            }
        };

        self.state.previous = Some(next);
        (next.x.round() as i32, next.y.round() as i32)
    }

    pub fn reset(&mut self) {
        self.state = SmoothingState::default();
    }

    pub fn state(&self) -> &SmoothingState {
        &self.state
    }
}
