//! End-to-end tests for the gesture pipeline
//!
//! Scripted landmark frames -> GestureController -> RecordingPointer

use hand_pointer::config::ControllerConfig;
use hand_pointer::controller::{FrameStatus, GestureController, PointerAction};
use hand_pointer::data::DataExporter;
use hand_pointer::gesture::{GestureProfile, GestureType};
use hand_pointer::handoff::ThreadedSource;
use hand_pointer::landmarks::HandFrame;
use hand_pointer::pointer::{MouseButton, PointerCall, RecordingPointer};
use hand_pointer::source::{Capture, CsvFrameSource, ScriptedSource, TimedCapture};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const PROFILES: [GestureProfile; 2] = [GestureProfile::Discrete, GestureProfile::SplitScroll];
const FRAME: Duration = Duration::from_millis(33);

/// Hand with the requested fingers raised, index tip at `tip`.
fn hand(fingers: [bool; 5], tip: (f64, f64)) -> HandFrame {
    let mut points = vec![(0.5, 0.8); 21];
    points[3] = (0.5, 0.6);
    points[4] = (if fingers[0] { 0.4 } else { 0.6 }, 0.6);
    for (i, (pip, tip_idx)) in [(6, 8), (10, 12), (14, 16), (18, 20)].into_iter().enumerate() {
        points[pip] = (0.5, 0.5);
        points[tip_idx] = (0.5, if fingers[i + 1] { 0.3 } else { 0.7 });
    }
    if fingers[1] {
        points[8] = tip;
    }
    HandFrame::from_xy(&points)
}

fn open_hand(tip: (f64, f64)) -> Capture {
    Capture::Hand(hand([true; 5], tip))
}

fn index_down() -> Capture {
    Capture::Hand(hand([true, false, true, true, true], (0.5, 0.3)))
}

fn ring_down() -> Capture {
    Capture::Hand(hand([true, true, true, false, true], (0.5, 0.3)))
}

fn controller(profile: GestureProfile) -> GestureController {
    let mut config = ControllerConfig::default();
    config.gesture.profile = profile;
    GestureController::new(config).unwrap()
}

fn run_script(
    profile: GestureProfile,
    captures: Vec<Capture>,
) -> (GestureController, Vec<PointerCall>) {
    let mut controller = controller(profile);
    let mut sink = RecordingPointer::new(1920, 1080);
    let mut source = ScriptedSource::evenly_spaced(captures, FRAME);
    let stop = AtomicBool::new(false);
    controller.run(&mut source, &mut sink, &stop, |_| {}).unwrap();
    assert!(stop.load(Ordering::Relaxed), "end of stream raises the stop flag");
    (controller, sink.take_calls())
}

fn is_move(call: &PointerCall) -> bool {
    matches!(call, PointerCall::Move { .. })
}

#[test]
fn held_click_fires_once_between_moves() {
    for profile in PROFILES {
        let mut script = Vec::new();
        script.extend((0..5).map(|_| open_hand((0.5, 0.3))));
        // Eight frames of ~33 ms all sit inside the 500 ms click cooldown.
        script.extend((0..8).map(|_| index_down()));
        script.extend((0..5).map(|_| open_hand((0.5, 0.3))));

        let (_, calls) = run_script(profile, script);

        let clicks: Vec<_> = calls.iter().filter(|c| !is_move(c)).collect();
        assert_eq!(clicks, vec![&PointerCall::Click(MouseButton::Left)], "{:?}", profile);

        let click_at = calls.iter().position(|c| !is_move(c)).unwrap();
        assert_eq!(click_at, 5);
        assert_eq!(calls.len(), 11);
        assert!(calls[..click_at].iter().all(is_move));
        assert!(calls[click_at + 1..].iter().all(is_move));
    }
}

#[test]
fn click_repeats_after_cooldown() {
    // 20 frames at 33 ms span 627 ms, long enough for a second click.
    let (_, calls) = run_script(GestureProfile::Discrete, (0..20).map(|_| ring_down()).collect());
    assert_eq!(
        calls,
        vec![PointerCall::Click(MouseButton::Right), PointerCall::Click(MouseButton::Right)]
    );
}

#[test]
fn left_and_right_clicks_do_not_block_each_other() {
    for profile in PROFILES {
        let (_, calls) = run_script(profile, vec![index_down(), ring_down()]);
        assert_eq!(
            calls,
            vec![PointerCall::Click(MouseButton::Left), PointerCall::Click(MouseButton::Right)]
        );
    }
}

#[test]
fn malformed_and_missing_frames_are_skipped() {
    for profile in PROFILES {
        let partial = Capture::Hand(HandFrame::from_xy(&[(0.5, 0.5); 20]));
        let script = vec![Capture::NoHand, partial.clone(), index_down(), partial, Capture::NoHand];
        let (controller, calls) = run_script(profile, script);

        assert_eq!(calls, vec![PointerCall::Click(MouseButton::Left)]);
        let stats = controller.stats();
        assert_eq!(stats.frames, 5);
        assert_eq!(stats.hands, 3);
        assert_eq!(stats.malformed_frames, 2);
        assert_eq!(stats.gestures.values().sum::<u64>(), 1);
        assert_eq!(stats.actions.get("left_click"), Some(&1));
    }
}

#[test]
fn cursor_settles_on_target() {
    for profile in PROFILES {
        let mut script = vec![open_hand((0.25, 0.25))];
        script.extend((0..60).map(|_| open_hand((0.3, 0.35))));
        let (_, calls) = run_script(profile, script);

        assert_eq!(calls.first(), Some(&PointerCall::Move { x: 480, y: 270 }));
        assert_eq!(calls.last(), Some(&PointerCall::Move { x: 576, y: 378 }));
        let xs: Vec<i32> = calls
            .iter()
            .map(|c| match c {
                PointerCall::Move { x, .. } => *x,
                other => panic!("unexpected call {:?}", other),
            })
            .collect();
        assert!(xs.windows(2).all(|w| w[0] <= w[1] && w[1] <= 576));
    }
}

#[test]
fn fist_and_unknown_shapes_stay_quiet() {
    for profile in PROFILES {
        let fist = Capture::Hand(hand([false; 5], (0.5, 0.7)));
        let thumb_only = Capture::Hand(hand([true, false, false, false, false], (0.5, 0.7)));
        let (controller, calls) = run_script(profile, vec![fist, thumb_only]);
        assert!(calls.is_empty());
        assert_eq!(controller.stats().gestures.get("none"), Some(&1));
        assert_eq!(controller.stats().gestures.get("unknown"), Some(&1));
    }
}

#[test]
fn discrete_scroll_follows_fingertip() {
    let peace = |y| Capture::Hand(hand([false, true, true, false, false], (0.5, y)));
    let script = vec![peace(0.48), peace(0.46), peace(0.40), peace(0.44)];
    let (_, calls) = run_script(GestureProfile::Discrete, script);
    // Travel of 1.6, 4.8 and -3.2 ticks; remainders roll into the next frame.
    assert_eq!(
        calls,
        vec![PointerCall::Scroll(2), PointerCall::Scroll(4), PointerCall::Scroll(-3)]
    );
}

#[test]
fn fast_camera_keeps_all_scroll_travel() {
    // 60 fps: frames arrive faster than the scroll cooldown.
    let peace = |y| Capture::Hand(hand([false, true, true, false, false], (0.5, y)));
    let script: Vec<Capture> = (0..=20).map(|i| peace(0.45 - 0.01 * i as f64)).collect();

    let mut controller = controller(GestureProfile::Discrete);
    let mut sink = RecordingPointer::new(1920, 1080);
    let mut source = ScriptedSource::evenly_spaced(script, Duration::from_millis(16));
    let stop = AtomicBool::new(false);
    controller.run(&mut source, &mut sink, &stop, |_| {}).unwrap();

    let total: i32 = sink
        .calls()
        .iter()
        .map(|call| match call {
            PointerCall::Scroll(delta) => *delta,
            other => panic!("unexpected call {:?}", other),
        })
        .sum();
    assert_eq!(total, 16);
}

#[test]
fn suppressed_session_decides_once_per_interval() {
    let mut config = ControllerConfig::default();
    config.gesture.profile = GestureProfile::SplitScroll;
    config.gesture.suppression_enabled = true;
    let mut controller = GestureController::new(config).unwrap();
    let mut sink = RecordingPointer::new(1920, 1080);

    let peace = Capture::Hand(hand([false, true, true, false, false], (0.5, 0.3)));
    // 100 frames over 3.3 s: decisions at 0 s and 2.0 s (first frame past the interval).
    let mut source = ScriptedSource::evenly_spaced(vec![peace; 100], FRAME);
    let stop = AtomicBool::new(false);
    let mut waits = 0;
    controller
        .run(&mut source, &mut sink, &stop, |outcome| {
            if outcome.gesture == Some(GestureType::Wait) {
                waits += 1;
            }
        })
        .unwrap();

    assert_eq!(sink.calls(), &[PointerCall::Scroll(1), PointerCall::Scroll(1)]);
    assert_eq!(waits, 98);
}

#[test]
fn stop_flag_halts_the_loop() {
    let mut controller = controller(GestureProfile::Discrete);
    let mut sink = RecordingPointer::new(1920, 1080);
    let mut source = ScriptedSource::evenly_spaced(vec![Capture::NoHand; 10], FRAME);
    let stop = AtomicBool::new(false);
    let mut seen = 0;
    controller
        .run(&mut source, &mut sink, &stop, |_| {
            seen += 1;
            if seen == 3 {
                stop.store(true, Ordering::Relaxed);
            }
        })
        .unwrap();
    assert_eq!(seen, 3);
    assert_eq!(controller.stats().frames, 3);
}

#[test]
fn csv_replay_through_threaded_source_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("landmarks.csv");

    let mut text = String::from("# timestamp_ms,x0,y0,z0,...\n");
    let frames = [hand([true; 5], (0.5, 0.3)), hand([true, false, true, true, true], (0.5, 0.3))];
    for (i, frame) in frames.iter().enumerate() {
        text.push_str(&(i * 40).to_string());
        for p in frame.landmarks() {
            text.push_str(&format!(",{},{},{}", p.x, p.y, p.z));
        }
        text.push('\n');
    }
    text.push_str("80\n");
    std::fs::write(&input, text).unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let csv = CsvFrameSource::open(&input).unwrap();
    let mut source = ThreadedSource::spawn(csv, Arc::clone(&stop));
    let mut controller = controller(GestureProfile::Discrete);
    let mut sink = RecordingPointer::new(1000, 1000);
    let mut exporter = DataExporter::new(dir.path(), Some("replay".to_string()));

    let stats = controller
        .run(&mut source, &mut sink, &stop, |outcome| exporter.add_frame(outcome))
        .unwrap();

    // The latest-frame slot may drop frames, never reorder them.
    assert_eq!(stats.frames + source.dropped_frames(), 3);
    assert_eq!(exporter.len() as u64, stats.frames);

    let csv_path = exporter.export_csv().unwrap();
    let rows = csv::Reader::from_path(csv_path).unwrap().records().count();
    assert_eq!(rows as u64, stats.frames);
    assert!(exporter.export_summary(&stats).unwrap().exists());
}

#[test]
fn outcome_reports_processed_gesture_and_action() {
    let mut controller = controller(GestureProfile::Discrete);
    let mut sink = RecordingPointer::new(1000, 1000);
    let outcome = controller.process(
        &TimedCapture { timestamp: Duration::ZERO, capture: index_down() },
        &mut sink,
    );
    assert_eq!(outcome.status, FrameStatus::Processed);
    assert_eq!(outcome.gesture, Some(GestureType::LeftClick));
    assert_eq!(outcome.action, Some(PointerAction::Click { button: MouseButton::Left }));
    assert_eq!(outcome.fingers.map(|f| f.to_string()), Some("TiMRP".to_string()));
}
