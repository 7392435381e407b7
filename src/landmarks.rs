// src/landmarks.rs - Hand landmark frame as delivered by the pose estimator
use nalgebra::Vector3;

use crate::error::{PointerError, Result};

/// Number of landmarks the estimator reports for one hand.
pub const HAND_LANDMARK_COUNT: usize = 21;

// MediaPipe hand landmark indices
pub const WRIST: usize = 0;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// One tracked hand for one capture cycle.
///
/// Coordinates are normalized image coordinates in the mirrored view: the
/// estimator is responsible for the horizontal flip.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    landmarks: Vec<Vector3<f64>>,
}

impl HandFrame {
    pub fn new(landmarks: Vec<Vector3<f64>>) -> Self {
        Self { landmarks }
    }

    pub fn from_xy(points: &[(f64, f64)]) -> Self {
        Self::new(points.iter().map(|&(x, y)| Vector3::new(x, y, 0.0)).collect())
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn landmarks(&self) -> &[Vector3<f64>] {
        &self.landmarks
    }

    /// Fails with `MalformedFrame` unless the full hand is present.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.landmarks.len() < HAND_LANDMARK_COUNT {
            return Err(PointerError::MalformedFrame {
                expected: HAND_LANDMARK_COUNT,
                found: self.landmarks.len(),
            });
        }
        Ok(())
    }

    pub fn point(&self, index: usize) -> Result<&Vector3<f64>> {
        self.landmarks.get(index).ok_or(PointerError::MalformedFrame {
            expected: HAND_LANDMARK_COUNT,
            found: self.landmarks.len(),
        })
    }
}
