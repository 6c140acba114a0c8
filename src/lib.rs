//! Kinefit - motion-capture target game core
//!
//! Core modules:
//! - `pose`: Landmark and pose-frame data model (MediaPipe layout)
//! - `smoothing`: Savitzky-Golay landmark smoothing with moving-average fallback
//! - `game`: Deterministic game logic (modes, collisions, hip-sway state machine, flow)
//! - `settings`: Runtime-tunable gameplay configuration
//!
//! The crate has no camera, rendering, or UI surface. The host feeds pose
//! frames in and reads score/target state back out each frame.

pub mod game;
pub mod pose;
pub mod settings;
pub mod smoothing;

pub use game::{CollisionOutcome, FlowEvent, FlowPhase, GameEngine, GameFlow, GameMode};
pub use pose::{Landmark, PoseFrame};
pub use settings::GameSettings;
pub use smoothing::FrameSmoother;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Hit radius around a target center (pixels)
    pub const TARGET_RADIUS: f32 = 50.0;
    /// Number of targets in the fixed hands/head sequences
    pub const FIXED_SEQUENCE_LEN: usize = 8;

    /// Hip-sway centering tolerance around the center line (pixels)
    pub const HIP_CENTERING_TOLERANCE: f32 = 40.0;
    /// How long the hip midpoint must hold inside the tolerance band (ms)
    pub const HIP_CENTERING_HOLD_MS: f64 = 2000.0;
    /// Per-side hit quota for hip-sway completion
    pub const HIP_TARGETS_PER_SIDE: u32 = 4;
    /// Delay between a side hit and the side flip (sway animation duration, ms)
    pub const HIP_FLIP_DELAY_MS: f64 = 500.0;

    /// Open-ended random mode runs this long before the flow moves on (ms)
    pub const RANDOM_TIMEOUT_MS: f64 = 30_000.0;
    /// Countdown between games in the flow sequence (ms)
    pub const INTER_GAME_DELAY_MS: f64 = 10_000.0;

    /// Smoothing window size (odd)
    pub const SMOOTHING_WINDOW: usize = 5;
    /// Smoothing polynomial order
    pub const SMOOTHING_ORDER: usize = 2;
}

/// Euclidean distance between two pixel-space points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}
