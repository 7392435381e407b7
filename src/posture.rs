// src/posture.rs - Finger up/down detection
use serde::Serialize;
use std::fmt;

use crate::error::Result;
use crate::landmarks::*;

/// Up/down state of every finger for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    pub const fn new(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> Self {
        Self { thumb, index, middle, ring, pinky }
    }

    pub fn as_array(&self) -> [bool; 5] {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
    }

    pub fn all_up(&self) -> bool {
        self.as_array().iter().all(|&up| up)
    }

    pub fn all_down(&self) -> bool {
        self.as_array().iter().all(|&up| !up)
    }
}

impl fmt::Display for FingerState {
    /// Compact "T I M R P" mask, uppercase when the finger is up.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = ['t', 'i', 'm', 'r', 'p'];
        for (label, up) in labels.iter().zip(self.as_array()) {
            let c = if up { label.to_ascii_uppercase() } else { *label };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Derives the finger state from one frame.
///
/// A finger is up when its tip sits above its PIP joint. The thumb folds
/// sideways, so it is up when its tip is left of the IP joint in the
/// mirrored view.
pub fn extract(frame: &HandFrame) -> Result<FingerState> {
    frame.ensure_complete()?;

    let finger_up = |tip: usize, pip: usize| -> Result<bool> {
        Ok(frame.point(tip)?.y < frame.point(pip)?.y)
    };

    Ok(FingerState {
        thumb: frame.point(THUMB_TIP)?.x < frame.point(THUMB_IP)?.x,
        index: finger_up(INDEX_TIP, INDEX_PIP)?,
        middle: finger_up(MIDDLE_TIP, MIDDLE_PIP)?,
        ring: finger_up(RING_TIP, RING_PIP)?,
        pinky: finger_up(PINKY_TIP, PINKY_PIP)?,
    })
}
