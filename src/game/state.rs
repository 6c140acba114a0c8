//! Game state and core gameplay types
//!
//! Everything the presentation layer reads back out of the engine lives
//! here; the engine hands out copies, never references into its own state.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::targets::{Target, TargetKind};

/// The four game modes, in flow order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    /// Shift the hips between two lateral regions after centering
    HipsSway,
    /// Touch a figure-eight sequence of targets with either hand
    HandsFixed,
    /// Move the head through a circle of targets
    HeadFixed,
    /// Open-ended randomly placed targets until stopped
    Random,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::HipsSway => "hips-sway",
            GameMode::HandsFixed => "hands-fixed",
            GameMode::HeadFixed => "head-fixed",
            GameMode::Random => "random",
        }
    }
}

/// Score totals by target kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub hand: u32,
    pub head: u32,
    pub knee: u32,
}

impl ScoreBreakdown {
    pub fn add(&mut self, kind: TargetKind) {
        match kind {
            TargetKind::Hand => self.hand += 1,
            TargetKind::Head => self.head += 1,
            TargetKind::Knee => self.knee += 1,
        }
    }
}

/// Lifecycle event for a spawned target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "event")]
pub enum TargetEvent {
    /// Target became active
    Start,
    /// Target was hit by the named keypoint
    Obtained { keypoint: String },
    /// Game stopped while the target was still active
    End,
}

/// Append-only record of one target lifecycle event, consumed for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub target_id: u64,
    pub kind: TargetKind,
    #[serde(flatten)]
    pub event: TargetEvent,
    pub pos: Vec2,
    pub timestamp_ms: f64,
}

/// Progress through the active mode; `total: None` means open-ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeProgress {
    pub completed: u32,
    pub total: Option<u32>,
}

/// Which lateral region the player must reach next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Hip-sway sub-state-machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HipPhase {
    /// Player must hold the hip midpoint on the center line
    Centering,
    /// Player sways into the target side's region
    Targeting,
    /// Quota reached; the mode is inert
    Completed,
}

/// Cosmetic sway animation parameters (informational, never affects scoring)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwayAnimation {
    pub active: bool,
    pub start_time_ms: f64,
    /// Instantaneous hip velocity at the triggering hit (px/ms)
    pub velocity: Vec2,
    pub duration_ms: f64,
}

impl Default for SwayAnimation {
    fn default() -> Self {
        Self {
            active: false,
            start_time_ms: 0.0,
            velocity: Vec2::ZERO,
            duration_ms: 0.0,
        }
    }
}

/// Hip-sway mode state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HipSwayState {
    pub phase: HipPhase,
    pub target_side: Option<Side>,
    /// Monotonic within a session; reset only by start_game
    pub left_hits: u32,
    pub right_hits: u32,
    pub is_centered: bool,
    /// When the midpoint last entered the tolerance band
    pub centering_start_ms: Option<f64>,
    pub animation: SwayAnimation,
    /// Deadline for the deferred side flip after a hit
    pub pending_flip_at_ms: Option<f64>,
    /// Edge-trigger latch: was a hip inside the target region last frame
    pub was_in_region: bool,
}

impl Default for HipSwayState {
    fn default() -> Self {
        Self {
            phase: HipPhase::Centering,
            target_side: None,
            left_hits: 0,
            right_hits: 0,
            is_centered: false,
            centering_start_ms: None,
            animation: SwayAnimation::default(),
            pending_flip_at_ms: None,
            was_in_region: false,
        }
    }
}

impl HipSwayState {
    pub fn total_hits(&self) -> u32 {
        self.left_hits + self.right_hits
    }

    pub fn hits_for(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left_hits,
            Side::Right => self.right_hits,
        }
    }
}

/// Per-session game state, owned exclusively by the engine
#[derive(Debug, Clone, Default)]
pub struct GameState {
    /// Monotonic within a session; reset only by start_game
    pub score: u32,
    pub breakdown: ScoreBreakdown,
    /// Target ids already scored (random-mode de-duplication)
    pub hit_target_ids: HashSet<u64>,
    /// Append-only lifecycle records for export
    pub target_history: Vec<TargetRecord>,
    /// Active target (random mode, or the current sequence target)
    pub current_target: Option<Target>,
    /// Full sequence for the fixed modes
    pub fixed_targets: Vec<Target>,
    /// Index of the next sequence target to hit
    pub current_fixed_index: usize,
    /// Monotonic id source for spawned targets
    next_id: u64,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh target id
    pub fn next_target_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reserve a contiguous id range (for fixed sequences)
    pub fn reserve_target_ids(&mut self, count: u64) -> u64 {
        let first = self.next_id;
        self.next_id += count;
        first
    }

    pub fn record(&mut self, target: &Target, event: TargetEvent, timestamp_ms: f64) {
        self.target_history.push(TargetRecord {
            target_id: target.id,
            kind: target.kind,
            event,
            pos: target.pos,
            timestamp_ms,
        });
    }
}
