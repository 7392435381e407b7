// src/gesture.rs - Finger-state pattern rules
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::posture::FingerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureType {
    None,
    Move,
    LeftClick,
    RightClick,
    Scroll,
    ScrollUp,
    Unknown,
    /// Classification skipped while the global suppression interval runs.
    Wait,
}

impl GestureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureType::None => "none",
            GestureType::Move => "move",
            GestureType::LeftClick => "left_click",
            GestureType::RightClick => "right_click",
            GestureType::Scroll => "scroll",
            GestureType::ScrollUp => "scroll_up",
            GestureType::Unknown => "unknown",
            GestureType::Wait => "wait",
        }
    }
}

impl fmt::Display for GestureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule set used to label finger states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureProfile {
    /// Index+middle raised is a two-way `Scroll` driven by fingertip travel.
    #[default]
    Discrete,
    /// Index+middle raised is `ScrollUp`; scrolling down comes from hand
    /// position instead of a finger pattern.
    SplitScroll,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureState {
    pub gesture_type: GestureType,
    /// Snapshot that produced the label, kept for diagnostics.
    pub fingers: Option<FingerState>,
}

impl GestureState {
    pub fn wait() -> Self {
        Self { gesture_type: GestureType::Wait, fingers: None }
    }
}

/// Maps finger states onto gestures, first matching rule wins.
pub fn match_rules(profile: GestureProfile, s: &FingerState) -> GestureType {
    if s.all_down() {
        return GestureType::None;
    }
    if s.all_up() {
        return GestureType::Move;
    }
    if s.thumb && !s.index && s.middle && s.ring && s.pinky {
        return GestureType::LeftClick;
    }
    if s.thumb && s.index && s.middle && !s.ring && s.pinky {
        return GestureType::RightClick;
    }
    if !s.thumb && s.index && s.middle && !s.ring && !s.pinky {
        return match profile {
            GestureProfile::Discrete => GestureType::Scroll,
            GestureProfile::SplitScroll => GestureType::ScrollUp,
        };
    }
    GestureType::Unknown
}

pub struct GestureClassifier {
    profile: GestureProfile,
    suppression: Option<Duration>,
    last_accepted: Option<Duration>,
}

impl GestureClassifier {
    pub fn new(profile: GestureProfile) -> Self {
        Self { profile, suppression: None, last_accepted: None }
    }

    /// Enables the session-wide mode that accepts at most one decision per
    /// `interval`.
    pub fn with_suppression(mut self, interval: Duration) -> Self {
        self.suppression = Some(interval);
        self
    }

    /// Labels `state` at time `now`.
    ///
    /// `_prev` is accepted so callers can thread the last label through; the
    /// rule sets are memoryless and do not consult it.
    pub fn classify(
        &mut self,
        state: &FingerState,
        _prev: GestureType,
        now: Duration,
    ) -> GestureState {
        if let (Some(interval), Some(last)) = (self.suppression, self.last_accepted) {
            if now.saturating_sub(last) < interval {
                return GestureState::wait();
            }
        }
        self.last_accepted = Some(now);

        GestureState {
            gesture_type: match_rules(self.profile, state),
            fingers: Some(*state),
        }
    }
}
