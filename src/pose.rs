//! Landmark and pose-frame data model
//!
//! Mirrors the MediaPipe holistic output layout: one body array (33 points,
//! fixed indices), optional hand arrays (21 points each) and an optional
//! face mesh (468 points). Any subset may be missing on a given frame when
//! the estimator loses track.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// MediaPipe Pose body indices (gameplay-relevant subset of the 33)
pub mod body {
    pub const NOSE: usize = 0;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
    pub const LEFT_KNEE: usize = 25;
    pub const RIGHT_KNEE: usize = 26;

    pub const COUNT: usize = 33;
}

/// MediaPipe Face Mesh nose tip index
pub const FACE_NOSE_TIP: usize = 1;

/// Points per hand array
pub const HAND_POINT_COUNT: usize = 21;

/// A single landmark in normalized capture-frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, 0-1 across the frame
    pub x: f32,
    /// Vertical position, 0-1 down the frame
    pub y: f32,
    /// Relative depth (unitless, estimator-defined)
    pub z: f32,
    /// Detection confidence 0-1; absent means always-visible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    /// Convert to pixel space for a given canvas size
    #[inline]
    pub fn to_pixels(&self, width: f32, height: f32) -> Vec2 {
        Vec2::new(self.x * width, self.y * height)
    }

    /// Whether the landmark clears a confidence threshold (absent = visible)
    #[inline]
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility.map(|v| v >= threshold).unwrap_or(true)
    }
}

/// One timestamped capture of all available landmark sets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Capture timestamp in milliseconds
    pub timestamp_ms: f64,
    /// Body pose landmarks (33 points when present)
    pub body: Option<Vec<Landmark>>,
    /// Left hand landmarks (21 points when present)
    pub left_hand: Option<Vec<Landmark>>,
    /// Right hand landmarks (21 points when present)
    pub right_hand: Option<Vec<Landmark>>,
    /// Face mesh landmarks (468 points when present)
    pub face: Option<Vec<Landmark>>,
}

impl PoseFrame {
    pub fn new(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            ..Default::default()
        }
    }

    /// Fetch a body landmark by index, if the body array is present and long enough
    pub fn body_landmark(&self, index: usize) -> Option<Landmark> {
        self.body.as_deref().and_then(|lms| lms.get(index)).copied()
    }

    /// Nose position: face mesh tip preferred, body nose as fallback
    pub fn nose(&self) -> Option<Landmark> {
        self.face
            .as_deref()
            .and_then(|lms| lms.get(FACE_NOSE_TIP))
            .copied()
            .or_else(|| self.body_landmark(body::NOSE))
    }

    /// All landmarks that count as "hand" points for hit tests.
    ///
    /// Uses the dedicated hand arrays when present; the estimator drops
    /// hands far more often than the body, so the body wrists stand in
    /// when both hand arrays are missing.
    pub fn hand_points(&self) -> Vec<Landmark> {
        let mut points = Vec::new();
        if let Some(lms) = self.left_hand.as_deref() {
            points.extend_from_slice(lms);
        }
        if let Some(lms) = self.right_hand.as_deref() {
            points.extend_from_slice(lms);
        }
        if points.is_empty() {
            points.extend(self.body_landmark(body::LEFT_WRIST));
            points.extend(self.body_landmark(body::RIGHT_WRIST));
        }
        points
    }

    /// Left and right knee landmarks, where present
    pub fn knees(&self) -> Vec<Landmark> {
        let mut points = Vec::new();
        points.extend(self.body_landmark(body::LEFT_KNEE));
        points.extend(self.body_landmark(body::RIGHT_KNEE));
        points
    }

    /// Left and right hip landmarks, both required
    pub fn hips(&self) -> Option<(Landmark, Landmark)> {
        let left = self.body_landmark(body::LEFT_HIP)?;
        let right = self.body_landmark(body::RIGHT_HIP)?;
        Some((left, right))
    }
}
