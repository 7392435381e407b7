// src/scroll.rs - Scroll tick generation
use crate::config::ScrollConfig;
use crate::error::Result;
use crate::landmarks::*;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollState {
    pub previous_y: Option<f64>,
    /// Travel in ticks not yet emitted; always within half a tick.
    pub carry: f64,
}

pub struct ScrollAccumulator {
    sensitivity: f64,
    down_margin: f64,
    state: ScrollState,
}

impl ScrollAccumulator {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            sensitivity: config.sensitivity,
            down_margin: config.down_margin,
            state: ScrollState::default(),
        }
    }

    /// Ticks from index fingertip travel since the previous scroll frame.
    /// Positive scrolls up. The anchor is updated even when no tick results,
    /// and the sub-tick remainder is kept so slow travel still adds up.
    pub fn displacement_ticks(&mut self, current_y: f64) -> i32 {
        let previous = self.state.previous_y.unwrap_or(current_y);
        self.state.previous_y = Some(current_y);
        self.state.carry += (previous - current_y) * self.sensitivity;
        let ticks = self.state.carry.round();
        self.state.carry -= ticks;
        ticks as i32
    }

    pub fn displacement_ticks_for(&mut self, frame: &HandFrame) -> Result<i32> {
        let y = frame.point(INDEX_TIP)?.y;
        Ok(self.displacement_ticks(y))
    }

    /// True when the pointing fingertips hang below the rest of the hand by
    /// more than the configured margin.
    pub fn wants_scroll_down(&self, frame: &HandFrame) -> Result<bool> {
        let pointing = (frame.point(INDEX_TIP)?.y + frame.point(MIDDLE_TIP)?.y) / 2.0;
        let rest =
            (frame.point(WRIST)?.y + frame.point(RING_TIP)?.y + frame.point(PINKY_TIP)?.y) / 3.0;
        Ok(pointing - rest > self.down_margin)
    }

    /// Drops the travel anchor so re-entering scroll does not jump.
    pub fn reset_anchor(&mut self) {
        self.state = ScrollState::default();
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }
}
