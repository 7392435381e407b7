// src/handoff.rs - Latest-frame-wins handoff between capture and pipeline threads
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;
use tracing::{debug, warn};

use crate::source::{FrameSource, TimedCapture};

struct Slot<T> {
    value: Option<T>,
    closed: bool,
    error: Option<String>,
    dropped: u64,
}

/// Single-slot channel. A new value replaces an unread one, which is
/// counted as dropped; values are never queued.
pub struct LatestFrameSlot<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> Default for LatestFrameSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestFrameSlot<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot { value: None, closed: false, error: None, dropped: 0 }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // A panicking producer leaves the slot data intact.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn publish(&self, value: T) {
        let mut slot = self.lock();
        if slot.value.replace(value).is_some() {
            slot.dropped += 1;
        }
        self.ready.notify_one();
    }

    pub fn close(&self, error: Option<String>) {
        let mut slot = self.lock();
        slot.closed = true;
        if error.is_some() {
            slot.error = error;
        }
        self.ready.notify_all();
    }

    /// Waits for the newest value. Returns `Ok(None)` once the slot is
    /// closed and drained.
    pub fn take(&self) -> std::result::Result<Option<T>, String> {
        let mut slot = self.lock();
        loop {
            if let Some(value) = slot.value.take() {
                return Ok(Some(value));
            }
            if slot.closed {
                return match slot.error.take() {
                    Some(error) => Err(error),
                    None => Ok(None),
                };
            }
            slot = self.ready.wait(slot).unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }
}

/// Runs a frame source on its own thread and exposes only its most recent
/// capture.
pub struct ThreadedSource {
    slot: Arc<LatestFrameSlot<TimedCapture>>,
    stop: Arc<AtomicBool>,
    producer: Option<JoinHandle<()>>,
}

impl ThreadedSource {
    pub fn spawn<S>(mut source: S, stop: Arc<AtomicBool>) -> Self
    where
        S: FrameSource + Send + 'static,
    {
        let slot = Arc::new(LatestFrameSlot::new());
        let producer_slot = Arc::clone(&slot);
        let producer_stop = Arc::clone(&stop);

        let producer = std::thread::spawn(move || {
            while !producer_stop.load(Ordering::Relaxed) {
                match source.next_capture() {
                    Ok(Some(capture)) => producer_slot.publish(capture),
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Frame producer failed: {:#}", e);
                        producer_slot.close(Some(format!("{:#}", e)));
                        return;
                    }
                }
            }
            debug!("Frame producer finished");
            producer_slot.close(None);
        });

        Self { slot, stop, producer: Some(producer) }
    }

    pub fn dropped_frames(&self) -> u64 {
        self.slot.dropped()
    }
}

impl FrameSource for ThreadedSource {
    fn next_capture(&mut self) -> Result<Option<TimedCapture>> {
        self.slot.take().map_err(anyhow::Error::msg)
    }
}

impl Drop for ThreadedSource {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.producer.take() {
            // A producer blocked on its input is left to exit with the process.
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Capture, ScriptedSource};
    use std::time::Duration;

    #[test]
    fn newer_value_replaces_unread_one() {
        let slot = LatestFrameSlot::new();
        slot.publish(1);
        slot.publish(2);
        slot.publish(3);
        assert_eq!(slot.take(), Ok(Some(3)));
        assert_eq!(slot.dropped(), 2);
        slot.close(None);
        assert_eq!(slot.take(), Ok(None));
    }

    #[test]
    fn close_surfaces_error_after_drain() {
        let slot = LatestFrameSlot::new();
        slot.publish("last");
        slot.close(Some("camera unplugged".to_string()));
        assert_eq!(slot.take(), Ok(Some("last")));
        assert_eq!(slot.take(), Err("camera unplugged".to_string()));
    }

    #[test]
    fn take_blocks_until_publish() {
        let slot = Arc::new(LatestFrameSlot::new());
        let producer = Arc::clone(&slot);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            producer.publish(7u32);
        });
        assert_eq!(slot.take(), Ok(Some(7)));
        handle.join().unwrap();
    }

    #[test]
    fn threaded_source_delivers_latest_then_ends() {
        let source = ScriptedSource::evenly_spaced(
            vec![Capture::NoHand; 50],
            Duration::from_millis(10),
        );
        let mut threaded = ThreadedSource::spawn(source, Arc::new(AtomicBool::new(false)));

        let mut received = Vec::new();
        while let Some(capture) = threaded.next_capture().unwrap() {
            received.push(capture.timestamp);
        }
        assert!(!received.is_empty());
        assert!(received.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(received.len() as u64 + threaded.dropped_frames(), 50);
    }
}
