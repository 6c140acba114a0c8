//! Deterministic game logic
//!
//! All gameplay rules live here. This module must stay pure and deterministic:
//! - Pull-model timing only (callers pass the current time, no timers)
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod engine;
pub mod flow;
pub mod geom;
pub mod state;
pub mod targets;

pub use engine::{CollisionOutcome, GameEngine};
pub use flow::{FlowEvent, FlowPhase, GameFlow, GAME_ORDER};
pub use geom::{within_radius, Rect};
pub use state::{
    GameMode, GameState, HipPhase, HipSwayState, ModeProgress, ScoreBreakdown, Side,
    SwayAnimation, TargetEvent, TargetRecord,
};
pub use targets::{
    circle_targets, figure_eight_targets, hip_sway_regions, random_target, HipSwayRegions, Target,
    TargetKind,
};
