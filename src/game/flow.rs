//! Game-flow orchestrator
//!
//! Runs the four modes in a fixed order with a countdown between games and a
//! timeout for the open-ended random mode. Pull model throughout: the host
//! calls `tick` on a coarse cadence (every ~100ms) with the current time and
//! the engine's completion flag, and applies the returned event. No timers,
//! so cancellation is just clearing the stored deadlines.

use serde::Serialize;

use crate::settings::GameSettings;

use super::state::GameMode;

/// The fixed mode sequence
pub const GAME_ORDER: [GameMode; 4] = [
    GameMode::HipsSway,
    GameMode::HandsFixed,
    GameMode::HeadFixed,
    GameMode::Random,
];

/// Orchestrator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowPhase {
    /// Not running
    Waiting,
    /// A game is active
    Playing,
    /// Countdown between games
    Delay,
    /// All four games finished
    Completed,
}

/// What the host must do after a flow transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    /// Switch the engine to this mode and call start_game
    StartGame(GameMode),
    /// Stop the engine; the delay countdown toward the next game has begun
    GameEnded(GameMode),
    /// The whole sequence finished (fires exactly once)
    Completed,
    /// Nothing to do
    None,
}

/// Sequences the four game modes with delays and timeouts
pub struct GameFlow {
    settings: GameSettings,
    phase: FlowPhase,
    index: usize,
    /// When the current inter-game delay ends
    delay_end_ms: Option<f64>,
    /// When the open-ended random mode is forced to end
    timeout_at_ms: Option<f64>,
    /// External force-advance signal received since the last tick
    force_advance: bool,
}

impl GameFlow {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            settings: settings.normalized(),
            phase: FlowPhase::Waiting,
            index: 0,
            delay_end_ms: None,
            timeout_at_ms: None,
            force_advance: false,
        }
    }

    // === Display accessors ===

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// Active (or next, during a delay) mode; None once completed or idle
    pub fn current_mode(&self) -> Option<GameMode> {
        match self.phase {
            FlowPhase::Waiting | FlowPhase::Completed => None,
            _ => GAME_ORDER.get(self.index).copied(),
        }
    }

    pub fn current_game_index(&self) -> usize {
        self.index
    }

    /// Remaining inter-game countdown, zero when not delaying
    pub fn remaining_delay_ms(&self, now_ms: f64) -> f64 {
        match (self.phase, self.delay_end_ms) {
            (FlowPhase::Delay, Some(end)) => (end - now_ms).max(0.0),
            _ => 0.0,
        }
    }

    /// Remaining random-mode time, zero when no timeout is armed
    pub fn remaining_timeout_ms(&self, now_ms: f64) -> f64 {
        match (self.phase, self.timeout_at_ms) {
            (FlowPhase::Playing, Some(at)) => (at - now_ms).max(0.0),
            _ => 0.0,
        }
    }

    // === Operations ===

    /// Begin the sequence from the first mode
    pub fn start(&mut self, now_ms: f64) -> FlowEvent {
        self.index = 0;
        self.phase = FlowPhase::Playing;
        self.delay_end_ms = None;
        self.force_advance = false;
        self.arm_timeout(now_ms);
        log::info!("game flow started: {}", GAME_ORDER[0].as_str());
        FlowEvent::StartGame(GAME_ORDER[0])
    }

    /// Cancel from any non-completed state; suppresses all pending transitions
    pub fn stop(&mut self) {
        if self.phase == FlowPhase::Completed {
            return;
        }
        log::info!("game flow stopped");
        self.phase = FlowPhase::Waiting;
        self.index = 0;
        self.delay_end_ms = None;
        self.timeout_at_ms = None;
        self.force_advance = false;
    }

    /// External end-of-game signal for the open-ended random mode
    /// (e.g. a host-side timer). Ignored for the self-completing modes.
    pub fn force_advance(&mut self) {
        if self.phase == FlowPhase::Playing && self.current_mode() == Some(GameMode::Random) {
            self.force_advance = true;
        }
    }

    /// Advance the flow. `mode_complete` is the engine's completion flag for
    /// the active mode; ignored outside the playing phase.
    pub fn tick(&mut self, now_ms: f64, mode_complete: bool) -> FlowEvent {
        match self.phase {
            FlowPhase::Waiting | FlowPhase::Completed => FlowEvent::None,
            FlowPhase::Playing => self.tick_playing(now_ms, mode_complete),
            FlowPhase::Delay => self.tick_delay(now_ms),
        }
    }

    fn tick_playing(&mut self, now_ms: f64, mode_complete: bool) -> FlowEvent {
        let timed_out = self.timeout_at_ms.map(|at| now_ms >= at).unwrap_or(false);
        let forced = std::mem::take(&mut self.force_advance);
        if !(mode_complete || timed_out || forced) {
            return FlowEvent::None;
        }

        let ended = GAME_ORDER[self.index];
        self.timeout_at_ms = None;
        log::info!("game ended: {}", ended.as_str());

        if self.index + 1 >= GAME_ORDER.len() {
            self.phase = FlowPhase::Completed;
            log::info!("game flow completed");
            return FlowEvent::Completed;
        }

        self.phase = FlowPhase::Delay;
        self.delay_end_ms = Some(now_ms + self.settings.inter_game_delay_ms);
        FlowEvent::GameEnded(ended)
    }

    fn tick_delay(&mut self, now_ms: f64) -> FlowEvent {
        let Some(end) = self.delay_end_ms else {
            return FlowEvent::None;
        };
        if now_ms < end {
            return FlowEvent::None;
        }
        self.delay_end_ms = None;
        self.index += 1;
        self.phase = FlowPhase::Playing;
        self.arm_timeout(now_ms);
        let mode = GAME_ORDER[self.index];
        log::info!("next game: {}", mode.as_str());
        FlowEvent::StartGame(mode)
    }

    /// Only the open-ended random mode gets a deadline
    fn arm_timeout(&mut self, now_ms: f64) {
        self.timeout_at_ms = match GAME_ORDER.get(self.index) {
            Some(GameMode::Random) => Some(now_ms + self.settings.random_timeout_ms),
            _ => None,
        };
    }
}
