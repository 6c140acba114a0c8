//! Gameplay settings
//!
//! Everything the host UI surfaces as tunable lives here. The core accepts
//! a settings object at construction and on live reconfiguration.

use serde::{Deserialize, Serialize};

use crate::consts;

/// Runtime gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    // === Collision ===
    /// Hit radius around a target center (pixels)
    pub target_radius: f32,

    // === Hip sway ===
    /// Horizontal tolerance around the center line for centering (pixels)
    pub hip_centering_tolerance: f32,
    /// Continuous in-tolerance time required to finish centering (ms)
    pub hip_centering_hold_ms: f64,
    /// Hits required on each side before the mode completes
    pub hip_targets_per_side: u32,
    /// Sway animation duration, doubles as the side-flip delay (ms)
    pub hip_flip_delay_ms: f64,

    // === Flow ===
    /// How long the open-ended random mode runs (ms)
    pub random_timeout_ms: f64,
    /// Countdown between games (ms)
    pub inter_game_delay_ms: f64,

    // === Smoothing ===
    /// Savitzky-Golay window size (odd)
    pub smoothing_window: usize,
    /// Savitzky-Golay polynomial order
    pub smoothing_order: usize,
    /// Whether landmark smoothing is applied at all
    pub smoothing_enabled: bool,

    // === Fixed sequences ===
    /// Targets in the hands-fixed and head-fixed sequences
    pub fixed_sequence_len: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            target_radius: consts::TARGET_RADIUS,
            hip_centering_tolerance: consts::HIP_CENTERING_TOLERANCE,
            hip_centering_hold_ms: consts::HIP_CENTERING_HOLD_MS,
            hip_targets_per_side: consts::HIP_TARGETS_PER_SIDE,
            hip_flip_delay_ms: consts::HIP_FLIP_DELAY_MS,
            random_timeout_ms: consts::RANDOM_TIMEOUT_MS,
            inter_game_delay_ms: consts::INTER_GAME_DELAY_MS,
            smoothing_window: consts::SMOOTHING_WINDOW,
            smoothing_order: consts::SMOOTHING_ORDER,
            smoothing_enabled: true,
            fixed_sequence_len: consts::FIXED_SEQUENCE_LEN,
        }
    }
}

impl GameSettings {
    /// Clamp nonsensical values to usable ones instead of erroring.
    ///
    /// An even smoothing window is bumped to the next odd size; zero or
    /// negative radii and durations revert to their defaults.
    pub fn normalized(mut self) -> Self {
        if self.target_radius <= 0.0 {
            self.target_radius = consts::TARGET_RADIUS;
        }
        if self.hip_centering_tolerance <= 0.0 {
            self.hip_centering_tolerance = consts::HIP_CENTERING_TOLERANCE;
        }
        if self.hip_centering_hold_ms < 0.0 {
            self.hip_centering_hold_ms = consts::HIP_CENTERING_HOLD_MS;
        }
        if self.hip_targets_per_side == 0 {
            self.hip_targets_per_side = consts::HIP_TARGETS_PER_SIDE;
        }
        if self.hip_flip_delay_ms < 0.0 {
            self.hip_flip_delay_ms = consts::HIP_FLIP_DELAY_MS;
        }
        if self.smoothing_window == 0 {
            self.smoothing_window = consts::SMOOTHING_WINDOW;
        } else if self.smoothing_window % 2 == 0 {
            self.smoothing_window += 1;
        }
        if self.fixed_sequence_len == 0 {
            self.fixed_sequence_len = consts::FIXED_SEQUENCE_LEN;
        }
        self
    }

    /// Total hip-sway hits that end the mode regardless of side balance
    pub fn hip_total_quota(&self) -> u32 {
        self.hip_targets_per_side * 2
    }
}
