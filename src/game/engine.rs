//! Game-mode state machine
//!
//! Single entry point per frame: `check_collisions` takes the current pose
//! frame and wall-clock time and advances whichever mode is active. Timed
//! transitions (centering hold, deferred side flip) compare stored
//! timestamps against the caller-supplied time; nothing in here schedules
//! callbacks or blocks.
//!
//! The entry point is total: broken or partial frames, calls before
//! `start_game`, and calls after completion all return a non-hit outcome.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::pose::PoseFrame;
use crate::settings::GameSettings;

use super::geom::within_radius;
use super::state::{
    GameMode, GameState, HipPhase, HipSwayState, ModeProgress, ScoreBreakdown, Side,
    SwayAnimation, TargetEvent, TargetRecord,
};
use super::targets::{
    circle_targets, figure_eight_targets, hip_sway_regions, random_target, HipSwayRegions, Target,
    TargetKind,
};

/// Per-frame collision result reported to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollisionOutcome {
    pub hit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_kind: Option<TargetKind>,
    /// Name of the keypoint that scored (e.g. "left_hip", "nose")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_keypoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ModeProgress>,
}

impl CollisionOutcome {
    fn miss() -> Self {
        Self::default()
    }

    fn miss_with_progress(progress: ModeProgress) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }
}

/// The game-mode state machine
pub struct GameEngine {
    mode: GameMode,
    settings: GameSettings,
    width: f32,
    height: f32,
    rng: Pcg32,
    running: bool,
    state: GameState,
    hip: HipSwayState,
    /// Previous-frame hip midpoint and its timestamp, for the velocity estimate
    prev_hip_mid: Option<(Vec2, f64)>,
}

impl GameEngine {
    pub fn new(mode: GameMode, settings: GameSettings, width: f32, height: f32, seed: u64) -> Self {
        Self {
            mode,
            settings: settings.normalized(),
            width,
            height,
            rng: Pcg32::seed_from_u64(seed),
            running: false,
            state: GameState::new(),
            hip: HipSwayState::default(),
            prev_hip_mid: None,
        }
    }

    // === Public operations ===

    /// Reset all session state and initialize the active mode.
    ///
    /// Calling while already started re-initializes.
    pub fn start_game(&mut self, now_ms: f64) {
        log::info!("start_game: mode={}", self.mode.as_str());
        self.state = GameState::new();
        self.hip = HipSwayState::default();
        self.prev_hip_mid = None;
        self.running = true;

        match self.mode {
            GameMode::HipsSway => {
                // No targets; the region geometry is derived on demand
            }
            GameMode::HandsFixed => {
                let first_id = self.state.reserve_target_ids(self.settings.fixed_sequence_len as u64);
                let mut targets = figure_eight_targets(self.width, self.height, first_id);
                targets.truncate(self.settings.fixed_sequence_len);
                self.init_fixed_sequence(targets, now_ms);
            }
            GameMode::HeadFixed => {
                let first_id = self.state.reserve_target_ids(self.settings.fixed_sequence_len as u64);
                let mut targets = circle_targets(self.width, self.height, first_id);
                targets.truncate(self.settings.fixed_sequence_len);
                self.init_fixed_sequence(targets, now_ms);
            }
            GameMode::Random => {
                self.spawn_random_target(now_ms);
            }
        }
    }

    /// End the session: finalize the active target's history, keep the score
    pub fn stop_game(&mut self, now_ms: f64) {
        if let Some(target) = self.state.current_target.take() {
            self.state.record(&target, TargetEvent::End, now_ms);
        }
        self.running = false;
        log::info!(
            "stop_game: mode={} score={}",
            self.mode.as_str(),
            self.state.score
        );
    }

    /// Live canvas resize; in-progress fixed sequences are re-laid-out at the
    /// same index so the session is not lost
    pub fn update_dimensions(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        if !self.running {
            return;
        }
        match self.mode {
            GameMode::HandsFixed => {
                let first_id = self.state.fixed_targets.first().map(|t| t.id).unwrap_or(0);
                self.state.fixed_targets = figure_eight_targets(width, height, first_id);
                self.refresh_current_fixed();
            }
            GameMode::HeadFixed => {
                let first_id = self.state.fixed_targets.first().map(|t| t.id).unwrap_or(0);
                self.state.fixed_targets = circle_targets(width, height, first_id);
                self.refresh_current_fixed();
            }
            _ => {}
        }
    }

    /// Switch modes; the next `start_game` initializes the new mode
    pub fn update_game_mode(&mut self, mode: GameMode) {
        if self.mode != mode {
            log::debug!("mode switch: {} -> {}", self.mode.as_str(), mode.as_str());
            self.mode = mode;
            self.running = false;
        }
    }

    /// The per-frame entry point. Never panics; returns a non-hit outcome on
    /// missing data or when no game is active.
    pub fn check_collisions(&mut self, frame: &PoseFrame, now_ms: f64) -> CollisionOutcome {
        if !self.running {
            return CollisionOutcome::miss();
        }
        match self.mode {
            GameMode::HipsSway => self.check_hip_sway(frame, now_ms),
            GameMode::HandsFixed => self.check_fixed_sequence(frame, now_ms, TargetKind::Hand),
            GameMode::HeadFixed => self.check_fixed_sequence(frame, now_ms, TargetKind::Head),
            GameMode::Random => self.check_random(frame, now_ms),
        }
    }

    // === Read-only accessors (copies, never internal references) ===

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn score_breakdown(&self) -> ScoreBreakdown {
        self.state.breakdown
    }

    pub fn current_target(&self) -> Option<Target> {
        self.state.current_target
    }

    pub fn target_history(&self) -> Vec<TargetRecord> {
        self.state.target_history.clone()
    }

    pub fn hip_sway(&self) -> HipSwayState {
        self.hip.clone()
    }

    pub fn regions(&self) -> HipSwayRegions {
        hip_sway_regions(self.width, self.height)
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Whether the active mode has reached its completion condition.
    ///
    /// Random mode is open-ended and never completes on its own.
    pub fn is_complete(&self) -> bool {
        match self.mode {
            GameMode::HipsSway => self.hip.phase == HipPhase::Completed,
            GameMode::HandsFixed | GameMode::HeadFixed => {
                !self.state.fixed_targets.is_empty()
                    && self.state.current_fixed_index >= self.state.fixed_targets.len()
            }
            GameMode::Random => false,
        }
    }

    pub fn mode_progress(&self) -> ModeProgress {
        match self.mode {
            GameMode::HipsSway => ModeProgress {
                completed: self.hip.total_hits(),
                total: Some(self.settings.hip_total_quota()),
            },
            GameMode::HandsFixed | GameMode::HeadFixed => ModeProgress {
                completed: self.state.current_fixed_index as u32,
                total: Some(self.state.fixed_targets.len() as u32),
            },
            GameMode::Random => ModeProgress {
                completed: self.state.score,
                total: None,
            },
        }
    }

    // === Mode initialization helpers ===

    fn init_fixed_sequence(&mut self, targets: Vec<Target>, now_ms: f64) {
        if let Some(first) = targets.first().copied() {
            self.state.record(&first, TargetEvent::Start, now_ms);
            self.state.current_target = Some(first);
        }
        self.state.fixed_targets = targets;
        self.state.current_fixed_index = 0;
    }

    fn refresh_current_fixed(&mut self) {
        let idx = self.state.current_fixed_index;
        self.state.current_target = self.state.fixed_targets.get(idx).copied();
    }

    fn spawn_random_target(&mut self, now_ms: f64) {
        let id = self.state.next_target_id();
        let target = random_target(self.width, self.height, &mut self.rng, id);
        self.state.record(&target, TargetEvent::Start, now_ms);
        self.state.current_target = Some(target);
        log::debug!(
            "spawned {:?} target {} at ({:.0},{:.0})",
            target.kind,
            target.id,
            target.pos.x,
            target.pos.y
        );
    }

    // === Fixed-sequence modes (hands / head) ===

    fn check_fixed_sequence(
        &mut self,
        frame: &PoseFrame,
        now_ms: f64,
        kind: TargetKind,
    ) -> CollisionOutcome {
        if self.is_complete() {
            return CollisionOutcome::miss_with_progress(self.mode_progress());
        }
        let Some(target) = self.state.current_target else {
            return CollisionOutcome::miss_with_progress(self.mode_progress());
        };

        let hit_keypoint = match kind {
            TargetKind::Hand => self.find_hand_hit(frame, target.pos),
            TargetKind::Head => self.find_nose_hit(frame, target.pos),
            TargetKind::Knee => self.find_knee_hit(frame, target.pos),
        };
        let Some(keypoint) = hit_keypoint else {
            return CollisionOutcome::miss_with_progress(self.mode_progress());
        };

        self.score_hit(&target, &keypoint, now_ms);
        self.state.current_fixed_index += 1;
        let next = self.state.fixed_targets.get(self.state.current_fixed_index).copied();
        match next {
            Some(next) => {
                self.state.record(&next, TargetEvent::Start, now_ms);
                self.state.current_target = Some(next);
            }
            None => {
                self.state.current_target = None;
                log::info!("{} sequence complete", self.mode.as_str());
            }
        }

        CollisionOutcome {
            hit: true,
            hit_kind: Some(kind),
            hit_keypoint: Some(keypoint),
            progress: Some(self.mode_progress()),
        }
    }

    // === Random mode ===

    fn check_random(&mut self, frame: &PoseFrame, now_ms: f64) -> CollisionOutcome {
        let Some(target) = self.state.current_target else {
            return CollisionOutcome::miss_with_progress(self.mode_progress());
        };
        // A target scores at most once, no matter how many landmarks qualify
        if self.state.hit_target_ids.contains(&target.id) {
            return CollisionOutcome::miss_with_progress(self.mode_progress());
        }

        let hit_keypoint = match target.kind {
            TargetKind::Hand => self.find_hand_hit(frame, target.pos),
            TargetKind::Head => self.find_nose_hit(frame, target.pos),
            TargetKind::Knee => self.find_knee_hit(frame, target.pos),
        };
        let Some(keypoint) = hit_keypoint else {
            return CollisionOutcome::miss_with_progress(self.mode_progress());
        };

        self.score_hit(&target, &keypoint, now_ms);
        self.spawn_random_target(now_ms);

        CollisionOutcome {
            hit: true,
            hit_kind: Some(target.kind),
            hit_keypoint: Some(keypoint),
            progress: Some(self.mode_progress()),
        }
    }

    /// Shared scoring path: dedupe set, score, breakdown, history record
    fn score_hit(&mut self, target: &Target, keypoint: &str, now_ms: f64) {
        self.state.hit_target_ids.insert(target.id);
        self.state.score += 1;
        self.state.breakdown.add(target.kind);
        self.state.record(
            target,
            TargetEvent::Obtained {
                keypoint: keypoint.to_string(),
            },
            now_ms,
        );
        log::info!(
            "hit {:?} target {} with {} (score {})",
            target.kind,
            target.id,
            keypoint,
            self.state.score
        );
    }

    // === Keypoint hit scans ===

    fn find_hand_hit(&self, frame: &PoseFrame, target: Vec2) -> Option<String> {
        let radius = self.settings.target_radius;
        frame
            .hand_points()
            .iter()
            .enumerate()
            .find(|(_, lm)| within_radius(lm.to_pixels(self.width, self.height), target, radius))
            .map(|(i, _)| format!("hand_{i}"))
    }

    fn find_nose_hit(&self, frame: &PoseFrame, target: Vec2) -> Option<String> {
        let nose = frame.nose()?;
        within_radius(
            nose.to_pixels(self.width, self.height),
            target,
            self.settings.target_radius,
        )
        .then(|| "nose".to_string())
    }

    fn find_knee_hit(&self, frame: &PoseFrame, target: Vec2) -> Option<String> {
        let radius = self.settings.target_radius;
        let (left, right) = {
            let knees = frame.knees();
            (knees.first().copied(), knees.get(1).copied())
        };
        for (lm, name) in [(left, "left_knee"), (right, "right_knee")] {
            if let Some(lm) = lm {
                if within_radius(lm.to_pixels(self.width, self.height), target, radius) {
                    return Some(name.to_string());
                }
            }
        }
        None
    }

    // === Hip-sway sub-state-machine ===

    fn check_hip_sway(&mut self, frame: &PoseFrame, now_ms: f64) -> CollisionOutcome {
        // A pending side flip fires by deadline even on frames with no hips
        self.fire_pending_flip(now_ms);

        if self.hip.phase == HipPhase::Completed {
            return CollisionOutcome::miss_with_progress(self.mode_progress());
        }

        let Some((left_hip, right_hip)) = frame.hips() else {
            return CollisionOutcome::miss_with_progress(self.mode_progress());
        };
        let left_px = left_hip.to_pixels(self.width, self.height);
        let right_px = right_hip.to_pixels(self.width, self.height);
        let midpoint = (left_px + right_px) / 2.0;

        let velocity = self.hip_velocity(midpoint, now_ms);
        self.prev_hip_mid = Some((midpoint, now_ms));

        match self.hip.phase {
            HipPhase::Centering => self.advance_centering(midpoint, now_ms),
            HipPhase::Targeting => self.advance_targeting(left_px, right_px, velocity, now_ms),
            HipPhase::Completed => CollisionOutcome::miss_with_progress(self.mode_progress()),
        }
    }

    /// Instantaneous hip midpoint velocity in px/ms (cosmetic only)
    fn hip_velocity(&self, midpoint: Vec2, now_ms: f64) -> Vec2 {
        match self.prev_hip_mid {
            Some((prev, prev_ms)) if now_ms > prev_ms => {
                (midpoint - prev) / (now_ms - prev_ms) as f32
            }
            _ => Vec2::ZERO,
        }
    }

    fn advance_centering(&mut self, midpoint: Vec2, now_ms: f64) -> CollisionOutcome {
        let regions = hip_sway_regions(self.width, self.height);
        let offset = (midpoint.x - regions.center_line_x).abs();
        let in_tolerance = offset <= self.settings.hip_centering_tolerance;
        self.hip.is_centered = in_tolerance;

        if !in_tolerance {
            // Leaving the band resets the hold, no partial credit
            self.hip.centering_start_ms = None;
            return CollisionOutcome::miss_with_progress(self.mode_progress());
        }

        let started = *self.hip.centering_start_ms.get_or_insert(now_ms);
        if now_ms - started >= self.settings.hip_centering_hold_ms {
            self.hip.phase = HipPhase::Targeting;
            self.hip.target_side = Some(Side::Left);
            self.hip.was_in_region = false;
            // The hold is over; don't leave a stale timestamp in snapshots
            self.hip.centering_start_ms = None;
            log::info!("hip-sway centered, targeting left");
        }
        CollisionOutcome::miss_with_progress(self.mode_progress())
    }

    fn advance_targeting(
        &mut self,
        left_px: Vec2,
        right_px: Vec2,
        velocity: Vec2,
        now_ms: f64,
    ) -> CollisionOutcome {
        let Some(side) = self.hip.target_side else {
            return CollisionOutcome::miss_with_progress(self.mode_progress());
        };
        let regions = hip_sway_regions(self.width, self.height);
        let region = match side {
            Side::Left => regions.left,
            Side::Right => regions.right,
        };

        // Either hip counts, and so does the midpoint when the hips straddle
        // the region boundary
        let midpoint = (left_px + right_px) / 2.0;
        let in_region =
            region.contains(left_px) || region.contains(right_px) || region.contains(midpoint);
        // Edge-triggered: only a fresh entry scores, and not while a flip is pending
        let scores = in_region && !self.hip.was_in_region && self.hip.pending_flip_at_ms.is_none();
        self.hip.was_in_region = in_region;

        if !scores {
            return CollisionOutcome::miss_with_progress(self.mode_progress());
        }

        match side {
            Side::Left => self.hip.left_hits += 1,
            Side::Right => self.hip.right_hits += 1,
        }
        let keypoint = if region.contains(left_px) {
            "left_hip"
        } else if region.contains(right_px) {
            "right_hip"
        } else {
            "hip_midpoint"
        };
        self.state.score += 1;
        self.hip.animation = SwayAnimation {
            active: true,
            start_time_ms: now_ms,
            velocity,
            duration_ms: self.settings.hip_flip_delay_ms,
        };
        self.hip.pending_flip_at_ms = Some(now_ms + self.settings.hip_flip_delay_ms);
        log::info!(
            "hip-sway hit: side={side:?} left={} right={}",
            self.hip.left_hits,
            self.hip.right_hits
        );

        CollisionOutcome {
            hit: true,
            hit_kind: None,
            hit_keypoint: Some(keypoint.to_string()),
            progress: Some(self.mode_progress()),
        }
    }

    /// Apply a due side flip: completion first, otherwise pick the next side
    fn fire_pending_flip(&mut self, now_ms: f64) {
        let Some(deadline) = self.hip.pending_flip_at_ms else {
            return;
        };
        if now_ms < deadline {
            return;
        }
        self.hip.pending_flip_at_ms = None;
        self.hip.animation.active = false;

        let quota = self.settings.hip_targets_per_side;
        let both_done = self.hip.left_hits >= quota && self.hip.right_hits >= quota;
        let total_done = self.hip.total_hits() >= self.settings.hip_total_quota();
        if both_done || total_done {
            self.hip.phase = HipPhase::Completed;
            self.hip.target_side = None;
            log::info!(
                "hip-sway complete: left={} right={}",
                self.hip.left_hits,
                self.hip.right_hits
            );
            return;
        }

        let current = self.hip.target_side.unwrap_or(Side::Left);
        let other = current.other();
        // Flip to the other side unless it already met its quota, in which
        // case keep feeding whichever side has fewer hits
        let next = if self.hip.hits_for(other) >= quota {
            if self.hip.left_hits <= self.hip.right_hits {
                Side::Left
            } else {
                Side::Right
            }
        } else {
            other
        };
        self.hip.target_side = Some(next);
        self.hip.was_in_region = false;
        log::debug!("hip-sway side flip -> {next:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{body, Landmark};

    const W: f32 = 1000.0;
    const H: f32 = 1000.0;

    fn engine(mode: GameMode) -> GameEngine {
        GameEngine::new(mode, GameSettings::default(), W, H, 12345)
    }

    fn body_frame(ts: f64) -> PoseFrame {
        PoseFrame {
            timestamp_ms: ts,
            body: Some(vec![Landmark::default(); body::COUNT]),
            ..Default::default()
        }
    }

    fn hip_frame(ts: f64, mid_x: f32, mid_y: f32) -> PoseFrame {
        // Hips 0.06 apart around the requested midpoint (normalized coords)
        let mut frame = body_frame(ts);
        let lms = frame.body.as_mut().unwrap();
        lms[body::LEFT_HIP] = Landmark::new(mid_x - 0.03, mid_y, 0.0);
        lms[body::RIGHT_HIP] = Landmark::new(mid_x + 0.03, mid_y, 0.0);
        frame
    }

    fn nose_frame(ts: f64, x: f32, y: f32) -> PoseFrame {
        let mut face = vec![Landmark::default(); 468];
        face[crate::pose::FACE_NOSE_TIP] = Landmark {
            x,
            y,
            z: 0.0,
            visibility: Some(0.9),
        };
        PoseFrame {
            timestamp_ms: ts,
            face: Some(face),
            ..Default::default()
        }
    }

    fn wrist_frame(ts: f64, x: f32, y: f32) -> PoseFrame {
        let mut frame = body_frame(ts);
        let lms = frame.body.as_mut().unwrap();
        lms[body::LEFT_WRIST] = Landmark::new(x, y, 0.0);
        lms[body::RIGHT_WRIST] = Landmark::new(0.0, 0.0, 0.0);
        frame
    }

    #[test]
    fn test_not_started_is_noop() {
        let mut eng = engine(GameMode::Random);
        let out = eng.check_collisions(&body_frame(0.0), 0.0);
        assert_eq!(out, CollisionOutcome::miss());
        assert_eq!(eng.score(), 0);
    }

    #[test]
    fn test_empty_frame_never_panics() {
        let mut eng = engine(GameMode::HipsSway);
        eng.start_game(0.0);
        let out = eng.check_collisions(&PoseFrame::new(0.0), 10.0);
        assert!(!out.hit);
        // Body array shorter than the hip indices
        let short = PoseFrame {
            timestamp_ms: 0.0,
            body: Some(vec![Landmark::default(); 3]),
            ..Default::default()
        };
        assert!(!eng.check_collisions(&short, 20.0).hit);
    }

    #[test]
    fn test_hands_fixed_sequence_completion() {
        let mut eng = engine(GameMode::HandsFixed);
        eng.start_game(0.0);
        assert_eq!(eng.state.fixed_targets.len(), 8);

        for i in 0..8 {
            let target = eng.current_target().expect("active target");
            let frame = wrist_frame(i as f64 * 33.0, target.pos.x / W, target.pos.y / H);
            let out = eng.check_collisions(&frame, i as f64 * 33.0);
            assert!(out.hit, "target {i} should hit");
            assert_eq!(out.progress.unwrap().completed, i as u32 + 1);
        }
        assert!(eng.is_complete());
        assert_eq!(eng.score(), 8);
        assert_eq!(eng.score_breakdown().hand, 8);
        assert_eq!(eng.mode_progress().total, Some(8));

        // Further qualifying frames are no-ops after completion
        let out = eng.check_collisions(&wrist_frame(999.0, 0.5, 0.5), 999.0);
        assert!(!out.hit);
        assert_eq!(eng.score(), 8);
    }

    #[test]
    fn test_head_fixed_uses_nose() {
        let mut eng = engine(GameMode::HeadFixed);
        eng.start_game(0.0);
        let target = eng.current_target().unwrap();
        let out = eng.check_collisions(&nose_frame(0.0, target.pos.x / W, target.pos.y / H), 0.0);
        assert!(out.hit);
        assert_eq!(out.hit_keypoint.as_deref(), Some("nose"));
        assert_eq!(eng.score_breakdown().head, 1);

        // A hand at the next target does nothing in head mode
        let next = eng.current_target().unwrap();
        let out = eng.check_collisions(&wrist_frame(33.0, next.pos.x / W, next.pos.y / H), 33.0);
        assert!(!out.hit);
    }

    #[test]
    fn test_random_mode_hit_dedup() {
        let mut eng = engine(GameMode::Random);
        eng.start_game(0.0);
        // Replace the spawned target with a known head target
        let target = Target::new(eng.state.next_target_id(), TargetKind::Head, Vec2::new(500.0, 150.0));
        eng.state.current_target = Some(target);

        let frame = nose_frame(0.0, 0.5, 0.15);
        let out = eng.check_collisions(&frame, 0.0);
        assert!(out.hit);
        assert_eq!(out.hit_kind, Some(TargetKind::Head));
        assert_eq!(eng.score(), 1);
        assert_eq!(eng.score_breakdown().head, 1);

        // Pin the same target id back and feed more qualifying frames:
        // the dedupe set blocks re-scoring
        eng.state.current_target = Some(target);
        for i in 1..5 {
            let out = eng.check_collisions(&nose_frame(i as f64, 0.5, 0.15), i as f64);
            assert!(!out.hit);
        }
        assert_eq!(eng.score(), 1);
        let obtained = eng
            .target_history()
            .iter()
            .filter(|r| matches!(r.event, TargetEvent::Obtained { .. }) && r.target_id == target.id)
            .count();
        assert_eq!(obtained, 1);
    }

    #[test]
    fn test_random_mode_progress_unbounded() {
        let mut eng = engine(GameMode::Random);
        eng.start_game(0.0);
        assert_eq!(eng.mode_progress().total, None);
        assert!(!eng.is_complete());
    }

    #[test]
    fn test_random_respawn_after_hit() {
        let mut eng = engine(GameMode::Random);
        eng.start_game(0.0);
        let first = eng.current_target().unwrap();
        eng.state.current_target = Some(Target::new(first.id, TargetKind::Head, Vec2::new(500.0, 150.0)));
        let out = eng.check_collisions(&nose_frame(0.0, 0.5, 0.15), 0.0);
        assert!(out.hit);
        let next = eng.current_target().unwrap();
        assert_ne!(next.id, first.id);
    }

    #[test]
    fn test_stop_game_records_end_and_keeps_score() {
        let mut eng = engine(GameMode::Random);
        eng.start_game(0.0);
        eng.state.current_target = Some(Target::new(99, TargetKind::Head, Vec2::new(500.0, 150.0)));
        eng.check_collisions(&nose_frame(0.0, 0.5, 0.15), 0.0);
        assert_eq!(eng.score(), 1);

        eng.stop_game(100.0);
        assert_eq!(eng.score(), 1);
        assert!(eng.current_target().is_none());
        let last = eng.target_history().last().cloned().unwrap();
        assert_eq!(last.event, TargetEvent::End);
    }

    #[test]
    fn test_centering_hold_gate() {
        let mut eng = engine(GameMode::HipsSway);
        eng.start_game(0.0);

        // Midpoint 10px off center, held for 2100ms of simulated frames
        let mut now = 0.0;
        while now <= 2100.0 {
            eng.check_collisions(&hip_frame(now, 0.51, 0.5), now);
            now += 33.0;
        }
        assert_eq!(eng.hip_sway().phase, HipPhase::Targeting);
        assert_eq!(eng.hip_sway().target_side, Some(Side::Left));
        // The hold timestamp is consumed by the transition
        assert!(eng.hip_sway().centering_start_ms.is_none());
    }

    #[test]
    fn test_centering_exit_resets_timer() {
        let mut eng = engine(GameMode::HipsSway);
        eng.start_game(0.0);

        let mut now = 0.0;
        while now < 1900.0 {
            eng.check_collisions(&hip_frame(now, 0.51, 0.5), now);
            now += 33.0;
        }
        // Leave tolerance at 1900ms (tolerance is 40px = 0.04W)
        eng.check_collisions(&hip_frame(1900.0, 0.6, 0.5), 1900.0);
        assert_eq!(eng.hip_sway().phase, HipPhase::Centering);
        assert!(eng.hip_sway().centering_start_ms.is_none());

        // Re-enter: the hold starts over, so 1000ms more is not enough
        for i in 0..30 {
            let t = 1933.0 + i as f64 * 33.0;
            eng.check_collisions(&hip_frame(t, 0.5, 0.5), t);
        }
        assert_eq!(eng.hip_sway().phase, HipPhase::Centering);
    }

    /// Drive the engine to the targeting phase, returning the current time
    fn center(eng: &mut GameEngine) -> f64 {
        let mut now = 0.0;
        while eng.hip_sway().phase == HipPhase::Centering && now < 5000.0 {
            eng.check_collisions(&hip_frame(now, 0.5, 0.5), now);
            now += 33.0;
        }
        assert_eq!(eng.hip_sway().phase, HipPhase::Targeting);
        now
    }

    #[test]
    fn test_hip_sway_edge_triggered_scoring() {
        let mut eng = engine(GameMode::HipsSway);
        eng.start_game(0.0);
        let mut now = center(&mut eng);

        // 10 consecutive frames inside the left region: exactly one hit
        let mut hits = 0;
        for _ in 0..10 {
            let out = eng.check_collisions(&hip_frame(now, 0.2, 0.5), now);
            if out.hit {
                hits += 1;
            }
            now += 33.0;
        }
        assert_eq!(hits, 1);
        assert_eq!(eng.hip_sway().left_hits, 1);
        assert_eq!(eng.score(), 1);
    }

    #[test]
    fn test_hip_sway_flip_after_delay() {
        let mut eng = engine(GameMode::HipsSway);
        eng.start_game(0.0);
        let mut now = center(&mut eng);

        let out = eng.check_collisions(&hip_frame(now, 0.2, 0.5), now);
        assert!(out.hit);
        assert!(eng.hip_sway().animation.active);
        assert_eq!(eng.hip_sway().target_side, Some(Side::Left));

        // Before the flip delay elapses the side stays put
        now += 100.0;
        eng.check_collisions(&hip_frame(now, 0.5, 0.5), now);
        assert_eq!(eng.hip_sway().target_side, Some(Side::Left));

        // After the delay the target flips right
        now += eng.settings().hip_flip_delay_ms + 1.0;
        eng.check_collisions(&hip_frame(now, 0.5, 0.5), now);
        assert_eq!(eng.hip_sway().target_side, Some(Side::Right));
        assert!(!eng.hip_sway().animation.active);
    }

    #[test]
    fn test_hip_sway_completion() {
        let settings = GameSettings {
            hip_targets_per_side: 2,
            hip_flip_delay_ms: 50.0,
            ..Default::default()
        };
        let mut eng = GameEngine::new(GameMode::HipsSway, settings, W, H, 1);
        eng.start_game(0.0);
        let mut now = center(&mut eng);

        // Alternate sides until the quota is met
        for _ in 0..4 {
            let side = eng.hip_sway().target_side.unwrap();
            let x = match side {
                Side::Left => 0.2,
                Side::Right => 0.8,
            };
            let out = eng.check_collisions(&hip_frame(now, x, 0.5), now);
            assert!(out.hit);
            now += 100.0; // past the flip delay
            eng.check_collisions(&hip_frame(now, 0.5, 0.5), now);
            now += 33.0;
        }

        assert_eq!(eng.hip_sway().phase, HipPhase::Completed);
        assert!(eng.is_complete());
        assert_eq!(eng.hip_sway().left_hits, 2);
        assert_eq!(eng.hip_sway().right_hits, 2);

        // Completed phase is inert
        let out = eng.check_collisions(&hip_frame(now, 0.2, 0.5), now);
        assert!(!out.hit);
    }

    #[test]
    fn test_start_game_resets_session() {
        let mut eng = engine(GameMode::Random);
        eng.start_game(0.0);
        eng.state.current_target = Some(Target::new(5, TargetKind::Head, Vec2::new(500.0, 150.0)));
        eng.check_collisions(&nose_frame(0.0, 0.5, 0.15), 0.0);
        assert_eq!(eng.score(), 1);

        eng.start_game(1000.0);
        assert_eq!(eng.score(), 0);
        assert_eq!(eng.score_breakdown(), ScoreBreakdown::default());
        assert!(eng.state.hit_target_ids.is_empty());
        // Fresh history carries only the new spawn's start record
        assert_eq!(eng.target_history().len(), 1);
    }

    #[test]
    fn test_end_to_end_head_target_scenario() {
        let mut eng = engine(GameMode::Random);
        eng.start_game(0.0);
        eng.state.current_target = Some(Target::new(
            eng.state.next_target_id(),
            TargetKind::Head,
            Vec2::new(500.0, 150.0),
        ));

        let out = eng.check_collisions(&nose_frame(0.0, 0.5, 0.15), 0.0);
        assert!(out.hit);
        assert_eq!(out.hit_kind, Some(TargetKind::Head));
        assert_eq!(eng.score(), 1);
        assert_eq!(eng.score_breakdown().head, 1);
    }

    #[test]
    fn test_update_dimensions_keeps_sequence_index() {
        let mut eng = engine(GameMode::HandsFixed);
        eng.start_game(0.0);
        let target = eng.current_target().unwrap();
        eng.check_collisions(&wrist_frame(0.0, target.pos.x / W, target.pos.y / H), 0.0);
        assert_eq!(eng.state.current_fixed_index, 1);

        eng.update_dimensions(800.0, 600.0);
        assert_eq!(eng.state.current_fixed_index, 1);
        // The active target is the re-laid-out second waypoint
        let expected = figure_eight_targets(800.0, 600.0, 0)[1];
        assert_eq!(eng.current_target().unwrap().pos, expected.pos);
    }
}
