// src/cooldown.rs - Per-action minimum interval gate
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::CooldownConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Move,
    LeftClick,
    RightClick,
    Scroll,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Move => "move",
            ActionKind::LeftClick => "left_click",
            ActionKind::RightClick => "right_click",
            ActionKind::Scroll => "scroll",
        }
    }
}

/// Last admission time for every action kind.
#[derive(Debug, Clone, Default)]
pub struct CooldownState {
    last_fire: HashMap<ActionKind, Duration>,
}

impl CooldownState {
    pub fn last_fire(&self, kind: ActionKind) -> Option<Duration> {
        self.last_fire.get(&kind).copied()
    }
}

pub struct ActionDebouncer {
    thresholds: HashMap<ActionKind, Duration>,
    state: CooldownState,
}

impl ActionDebouncer {
    pub fn new(config: &CooldownConfig) -> Self {
        let click = Duration::from_millis(config.click_ms);
        let thresholds = HashMap::from([
            (ActionKind::Move, Duration::from_millis(config.move_ms)),
            (ActionKind::LeftClick, click),
            (ActionKind::RightClick, click),
            (ActionKind::Scroll, Duration::from_millis(config.scroll_ms)),
        ]);
        Self { thresholds, state: CooldownState::default() }
    }

    pub fn threshold(&self, kind: ActionKind) -> Duration {
        self.thresholds.get(&kind).copied().unwrap_or_default()
    }

    /// Admits `kind` if its threshold has strictly elapsed since the last
    /// admission. Rejections leave the state untouched.
    pub fn admit(&mut self, kind: ActionKind, now: Duration) -> bool {
        let threshold = self.threshold(kind);
        let open = match self.state.last_fire(kind) {
            Some(last) => now.saturating_sub(last) > threshold,
            None => true,
        };
        if open {
            self.state.last_fire.insert(kind, now);
        }
        open
    }

    pub fn state(&self) -> &CooldownState {
        &self.state
    }
}
