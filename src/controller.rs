// src/controller.rs - Per-frame gesture to pointer pipeline
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::cooldown::{ActionDebouncer, ActionKind};
use crate::error::{PointerError, Result};
use crate::gesture::{GestureClassifier, GestureProfile, GestureType};
use crate::landmarks::{HandFrame, INDEX_TIP};
use crate::pointer::{MouseButton, PointerSink};
use crate::posture::{self, FingerState};
use crate::scroll::ScrollAccumulator;
use crate::smoothing::MotionFilter;
use crate::source::{Capture, FrameSource, TimedCapture};

const FALLBACK_SCREEN: (u32, u32) = (1920, 1080);
const METRICS_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PointerAction {
    Move { x: i32, y: i32 },
    Click { button: MouseButton },
    /// Positive scrolls up.
    Scroll { delta: i32 },
}

impl PointerAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            PointerAction::Move { .. } => ActionKind::Move,
            PointerAction::Click { button: MouseButton::Left } => ActionKind::LeftClick,
            PointerAction::Click { button: MouseButton::Right } => ActionKind::RightClick,
            PointerAction::Scroll { .. } => ActionKind::Scroll,
        }
    }

    fn apply(&self, sink: &mut dyn PointerSink) -> Result<()> {
        match *self {
            PointerAction::Move { x, y } => sink.set_cursor_position(x, y),
            PointerAction::Click { button } => sink.press_and_release(button),
            PointerAction::Scroll { delta } => sink.scroll(delta),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    /// The estimator saw no hand.
    Idle,
    /// Partial hand; skipped before classification.
    Malformed,
    Processed,
}

/// Everything decided for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub index: u64,
    pub timestamp: Duration,
    pub status: FrameStatus,
    pub fingers: Option<FingerState>,
    pub gesture: Option<GestureType>,
    pub action: Option<PointerAction>,
    pub injection_failed: bool,
}

impl FrameOutcome {
    fn new(index: u64, timestamp: Duration, status: FrameStatus) -> Self {
        Self {
            index,
            timestamp,
            status,
            fingers: None,
            gesture: None,
            action: None,
            injection_failed: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub frames: u64,
    pub hands: u64,
    pub malformed_frames: u64,
    pub injection_failures: u64,
    pub backward_timestamps: u64,
    pub dropped_frames: u64,
    pub gestures: BTreeMap<String, u64>,
    pub actions: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default)]
pub struct PerformanceMetrics {
    pub avg_fps: f32,
    pub avg_processing_time: f32,
    frame_times: VecDeque<f32>,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self {
            avg_fps: 0.0,
            avg_processing_time: 0.0,
            frame_times: VecDeque::with_capacity(METRICS_WINDOW),
        }
    }

    fn record(&mut self, elapsed: f32) {
        self.frame_times.push_front(elapsed);
        if self.frame_times.len() > METRICS_WINDOW {
            self.frame_times.pop_back();
        }
        self.avg_processing_time =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        self.avg_fps = if self.avg_processing_time > 0.0 {
            1.0 / self.avg_processing_time
        } else {
            0.0
        };
    }
}

pub struct GestureController {
    config: ControllerConfig,
    classifier: GestureClassifier,
    debouncer: ActionDebouncer,
    motion: MotionFilter,
    scroll: ScrollAccumulator,
    active_gesture: GestureType,
    last_timestamp: Option<Duration>,
    screen: Option<(u32, u32)>,
    stats: SessionStats,
    metrics: PerformanceMetrics,
}

impl GestureController {
    pub fn new(config: ControllerConfig) -> Result<Self> {
        config.validate()?;

        let mut classifier = GestureClassifier::new(config.gesture.profile);
        if let Some(interval) = config.gesture.suppression() {
            classifier = classifier.with_suppression(interval);
        }
        let screen = match (config.screen.width, config.screen.height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        };

        Ok(Self {
            debouncer: ActionDebouncer::new(&config.cooldown),
            motion: MotionFilter::new(&config.smoothing),
            scroll: ScrollAccumulator::new(&config.scroll),
            classifier,
            config,
            active_gesture: GestureType::None,
            last_timestamp: None,
            screen,
            stats: SessionStats::default(),
            metrics: PerformanceMetrics::new(),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn active_gesture(&self) -> GestureType {
        self.active_gesture
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    /// Runs one capture through the pipeline and applies at most one action
    /// to `sink`. Never fails: bad frames and rejected injections are
    /// logged and counted.
    pub fn process(&mut self, capture: &TimedCapture, sink: &mut dyn PointerSink) -> FrameOutcome {
        let now = self.monotonic(capture.timestamp);
        let index = self.stats.frames;
        self.stats.frames += 1;

        let frame = match &capture.capture {
            Capture::NoHand => return FrameOutcome::new(index, now, FrameStatus::Idle),
            Capture::Hand(frame) => frame,
        };
        self.stats.hands += 1;

        let fingers = match posture::extract(frame) {
            Ok(fingers) => fingers,
            Err(e) => {
                warn!(frame = index, "Skipping frame: {}", e);
                self.stats.malformed_frames += 1;
                return FrameOutcome::new(index, now, FrameStatus::Malformed);
            }
        };

        let mut outcome = FrameOutcome::new(index, now, FrameStatus::Processed);
        outcome.fingers = Some(fingers);

        let decision = self.classifier.classify(&fingers, self.active_gesture, now);
        let gesture = decision.gesture_type;
        outcome.gesture = Some(gesture);
        *self.stats.gestures.entry(gesture.to_string()).or_default() += 1;

        if gesture == GestureType::Wait {
            return outcome;
        }
        self.transition(gesture);

        let action = match self.decide(frame, gesture, now, sink) {
            Ok(action) => action,
            Err(e) => {
                warn!(frame = index, "Skipping frame: {}", e);
                self.stats.malformed_frames += 1;
                outcome.status = FrameStatus::Malformed;
                return outcome;
            }
        };

        if let Some(action) = action {
            debug!(frame = index, %fingers, %gesture, ?action, "Emitting action");
            *self.stats.actions.entry(action.kind().as_str().to_string()).or_default() += 1;
            if let Err(e) = action.apply(sink) {
                warn!(frame = index, "Pointer injection failed: {}", e);
                self.stats.injection_failures += 1;
                outcome.injection_failed = true;
            }
        }
        outcome.action = action;
        outcome
    }

    pub fn process_with_metrics(
        &mut self,
        capture: &TimedCapture,
        sink: &mut dyn PointerSink,
    ) -> FrameOutcome {
        let start = Instant::now();
        let outcome = self.process(capture, sink);
        self.metrics.record(start.elapsed().as_secs_f32());
        outcome
    }

    /// Pulls captures until the source ends or `stop` is raised.
    pub fn run<S, F>(
        &mut self,
        source: &mut S,
        sink: &mut dyn PointerSink,
        stop: &AtomicBool,
        mut on_frame: F,
    ) -> anyhow::Result<SessionStats>
    where
        S: FrameSource + ?Sized,
        F: FnMut(&FrameOutcome),
    {
        info!(profile = ?self.config.gesture.profile, "Gesture control session started");

        while !stop.load(Ordering::Relaxed) {
            let Some(capture) = source.next_capture()? else {
                info!("Frame source closed");
                stop.store(true, Ordering::Relaxed);
                break;
            };
            let outcome = self.process_with_metrics(&capture, sink);
            on_frame(&outcome);
        }

        info!(
            frames = self.stats.frames,
            malformed = self.stats.malformed_frames,
            injection_failures = self.stats.injection_failures,
            avg_ms = self.metrics.avg_processing_time * 1000.0,
            "Gesture control session finished"
        );
        Ok(self.stats.clone())
    }

    pub fn record_dropped_frames(&mut self, dropped: u64) {
        self.stats.dropped_frames = dropped;
    }

    fn monotonic(&mut self, timestamp: Duration) -> Duration {
        let now = match self.last_timestamp {
            Some(last) if timestamp < last => {
                warn!(?timestamp, ?last, "Timestamp moved backward, holding last value");
                self.stats.backward_timestamps += 1;
                last
            }
            _ => timestamp,
        };
        self.last_timestamp = Some(now);
        now
    }

    /// Drops anchors that must not survive a change of gesture.
    fn transition(&mut self, gesture: GestureType) {
        let previous = self.active_gesture;
        if previous == gesture {
            return;
        }
        if previous == GestureType::Move || gesture == GestureType::Move {
            self.motion.reset();
        }
        if previous == GestureType::Scroll {
            self.scroll.reset_anchor();
        }
        debug!(from = %previous, to = %gesture, "Gesture changed");
        self.active_gesture = gesture;
    }

    fn decide(
        &mut self,
        frame: &HandFrame,
        gesture: GestureType,
        now: Duration,
        sink: &dyn PointerSink,
    ) -> Result<Option<PointerAction>> {
        let action = match gesture {
            GestureType::Move => {
                if !self.debouncer.admit(ActionKind::Move, now) {
                    return Ok(None);
                }
                let tip = frame.point(INDEX_TIP)?;
                let (w, h) = self.screen_size(sink);
                let (x, y) = self.motion.filter(tip.x, tip.y, w, h);
                Some(PointerAction::Move { x, y })
            }
            GestureType::LeftClick => self
                .debouncer
                .admit(ActionKind::LeftClick, now)
                .then_some(PointerAction::Click { button: MouseButton::Left }),
            GestureType::RightClick => self
                .debouncer
                .admit(ActionKind::RightClick, now)
                .then_some(PointerAction::Click { button: MouseButton::Right }),
            GestureType::Scroll => {
                // Not rate limited; ticks track fingertip travel one to one.
                let ticks = self.scroll.displacement_ticks_for(frame)?;
                (ticks != 0).then_some(PointerAction::Scroll { delta: ticks })
            }
            GestureType::ScrollUp => self
                .debouncer
                .admit(ActionKind::Scroll, now)
                .then_some(PointerAction::Scroll { delta: 1 }),
            GestureType::None | GestureType::Unknown => {
                // Finger patterns win; hand position only decides when no
                // pattern claimed the frame.
                if self.config.gesture.profile == GestureProfile::SplitScroll
                    && self.scroll.wants_scroll_down(frame)?
                    && self.debouncer.admit(ActionKind::Scroll, now)
                {
                    Some(PointerAction::Scroll { delta: -1 })
                } else {
                    None
                }
            }
            GestureType::Wait => None,
        };
        Ok(action)
    }

    fn screen_size(&mut self, sink: &dyn PointerSink) -> (u32, u32) {
        if let Some(screen) = self.screen {
            return screen;
        }
        let screen = sink.screen_size().unwrap_or_else(|e: PointerError| {
            warn!("Could not query screen size ({}), assuming {:?}", e, FALLBACK_SCREEN);
            FALLBACK_SCREEN
        });
        info!(width = screen.0, height = screen.1, "Using screen size");
        self.screen = Some(screen);
        screen
    }
}
