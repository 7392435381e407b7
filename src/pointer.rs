// src/pointer.rs - Host pointer injection
use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};
use serde::Serialize;
use tracing::debug;

use crate::error::{PointerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
}

/// Narrow interface onto the OS pointer.
pub trait PointerSink {
    fn set_cursor_position(&mut self, x: i32, y: i32) -> Result<()>;

    fn press_and_release(&mut self, button: MouseButton) -> Result<()>;

    /// Positive scrolls up, negative scrolls down.
    fn scroll(&mut self, delta: i32) -> Result<()>;

    fn screen_size(&self) -> Result<(u32, u32)>;
}

pub struct EnigoPointer {
    enigo: Enigo,
}

impl EnigoPointer {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            PointerError::Injection(format!("failed to connect to display: {:?}", e))
        })?;
        Ok(Self { enigo })
    }
}

impl PointerSink for EnigoPointer {
    fn set_cursor_position(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| PointerError::Injection(format!("{:?}", e)))
    }

    fn press_and_release(&mut self, button: MouseButton) -> Result<()> {
        let button = match button {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
        };
        self.enigo
            .button(button, Direction::Click)
            .map_err(|e| PointerError::Injection(format!("{:?}", e)))
    }

    fn scroll(&mut self, delta: i32) -> Result<()> {
        // enigo counts positive lengths downwards.
        self.enigo
            .scroll(-delta, Axis::Vertical)
            .map_err(|e| PointerError::Injection(format!("{:?}", e)))
    }

    fn screen_size(&self) -> Result<(u32, u32)> {
        let (w, h) = self
            .enigo
            .main_display()
            .map_err(|e| PointerError::Injection(format!("{:?}", e)))?;
        Ok((w.max(1) as u32, h.max(1) as u32))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PointerCall {
    Move { x: i32, y: i32 },
    Click(MouseButton),
    Scroll(i32),
}

/// Records calls instead of touching the OS. Used for dry runs and tests.
pub struct RecordingPointer {
    calls: Vec<PointerCall>,
    screen: (u32, u32),
    failing: bool,
}

impl RecordingPointer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { calls: Vec::new(), screen: (width, height), failing: false }
    }

    /// Makes every injection fail, as a disconnected display would.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn calls(&self) -> &[PointerCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<PointerCall> {
        std::mem::take(&mut self.calls)
    }

    fn record(&mut self, call: PointerCall) -> Result<()> {
        if self.failing {
            return Err(PointerError::Injection(format!("rejected {:?}", call)));
        }
        debug!(?call, "Recorded pointer call");
        self.calls.push(call);
        Ok(())
    }
}

impl PointerSink for RecordingPointer {
    fn set_cursor_position(&mut self, x: i32, y: i32) -> Result<()> {
        self.record(PointerCall::Move { x, y })
    }

    fn press_and_release(&mut self, button: MouseButton) -> Result<()> {
        self.record(PointerCall::Click(button))
    }

    fn scroll(&mut self, delta: i32) -> Result<()> {
        self.record(PointerCall::Scroll(delta))
    }

    fn screen_size(&self) -> Result<(u32, u32)> {
        Ok(self.screen)
    }
}

impl<P: PointerSink + ?Sized> PointerSink for Box<P> {
    fn set_cursor_position(&mut self, x: i32, y: i32) -> Result<()> {
        (**self).set_cursor_position(x, y)
    }

    fn press_and_release(&mut self, button: MouseButton) -> Result<()> {
        (**self).press_and_release(button)
    }

    fn scroll(&mut self, delta: i32) -> Result<()> {
        (**self).scroll(delta)
    }

    fn screen_size(&self) -> Result<(u32, u32)> {
        (**self).screen_size()
    }
}
