//! Hand-landmark driven pointer control.
//!
//! Frames flow through posture extraction, gesture classification, per-action
//! cooldowns, cursor smoothing and scroll accumulation before at most one
//! action reaches the host pointer.

pub mod config;
pub mod controller;
pub mod cooldown;
pub mod data;
pub mod error;
pub mod gesture;
pub mod handoff;
pub mod landmarks;
pub mod pointer;
pub mod posture;
pub mod scroll;
pub mod smoothing;
pub mod source;

pub use config::ControllerConfig;
pub use controller::{FrameOutcome, FrameStatus, GestureController, PointerAction, SessionStats};
pub use error::{PointerError, Result};
pub use gesture::{GestureProfile, GestureType};
pub use landmarks::HandFrame;
pub use pointer::{MouseButton, PointerSink};
pub use posture::FingerState;
pub use source::{Capture, FrameSource, TimedCapture};
