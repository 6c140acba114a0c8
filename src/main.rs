//! Kinefit demo session
//!
//! Drives the full game flow with a synthetic pose source: a scripted
//! "player" that centers its hips, sways on cue, and moves a hand/head to
//! whatever target is active. Prints the session's target history as JSON
//! when the flow completes.
//!
//! Run with `RUST_LOG=info cargo run` to watch the transitions.

use glam::Vec2;

use kinefit::game::{FlowEvent, FlowPhase, GameEngine, GameFlow, GameMode, HipPhase, Side};
use kinefit::pose::{body, Landmark, PoseFrame};
use kinefit::{FrameSmoother, GameSettings};

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;
/// Frame cadence of the synthetic pose source (~30 Hz)
const FRAME_MS: f64 = 33.0;

fn main() {
    env_logger::init();

    let settings = GameSettings {
        // Keep the demo short
        inter_game_delay_ms: 1000.0,
        random_timeout_ms: 5000.0,
        hip_targets_per_side: 2,
        ..Default::default()
    };

    let mut smoother = FrameSmoother::from_settings(&settings);
    let mut engine = GameEngine::new(GameMode::HipsSway, settings.clone(), WIDTH, HEIGHT, 0xC0FFEE);
    let mut flow = GameFlow::new(settings);

    let mut now = 0.0f64;
    if let FlowEvent::StartGame(mode) = flow.start(now) {
        engine.update_game_mode(mode);
        engine.start_game(now);
    }

    let mut history = Vec::new();
    while flow.phase() != FlowPhase::Completed {
        now += FRAME_MS;

        if flow.phase() == FlowPhase::Playing {
            let frame = synthesize_frame(&engine, now);
            let smoothed = smoother.push(&frame);
            engine.check_collisions(&smoothed, now);
        }

        // Host-side coarse tick (the demo just ticks every frame)
        match flow.tick(now, engine.is_complete()) {
            FlowEvent::StartGame(mode) => {
                engine.update_game_mode(mode);
                engine.start_game(now);
            }
            FlowEvent::GameEnded(_) | FlowEvent::Completed => {
                engine.stop_game(now);
                history.extend(engine.target_history());
            }
            FlowEvent::None => {}
        }

        if now > 600_000.0 {
            log::error!("demo did not converge, aborting");
            break;
        }
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&history).unwrap_or_default()
    );
}

/// Produce the frame a cooperating player would: hips where the hip-sway
/// phase wants them, nose/hand on the active target otherwise.
fn synthesize_frame(engine: &GameEngine, now: f64) -> PoseFrame {
    let mut landmarks = vec![Landmark::default(); body::COUNT];
    let mut frame = PoseFrame::new(now);

    match engine.mode() {
        GameMode::HipsSway => {
            let sway = engine.hip_sway();
            let mid_x = match (sway.phase, sway.target_side) {
                (HipPhase::Targeting, Some(Side::Left)) => 0.15,
                (HipPhase::Targeting, Some(Side::Right)) => 0.85,
                _ => 0.5,
            };
            landmarks[body::LEFT_HIP] = Landmark::new(mid_x - 0.03, 0.6, 0.0);
            landmarks[body::RIGHT_HIP] = Landmark::new(mid_x + 0.03, 0.6, 0.0);
        }
        GameMode::HandsFixed | GameMode::Random => {
            if let Some(target) = engine.current_target() {
                let norm = Vec2::new(target.pos.x / WIDTH, target.pos.y / HEIGHT);
                landmarks[body::LEFT_WRIST] = Landmark::new(norm.x, norm.y, 0.0);
                landmarks[body::LEFT_KNEE] = Landmark::new(norm.x, norm.y, 0.0);
                landmarks[body::NOSE] = Landmark::new(norm.x, norm.y, 0.0);
            }
        }
        GameMode::HeadFixed => {
            if let Some(target) = engine.current_target() {
                landmarks[body::NOSE] =
                    Landmark::new(target.pos.x / WIDTH, target.pos.y / HEIGHT, 0.0);
            }
        }
    }

    frame.body = Some(landmarks);
    frame
}
