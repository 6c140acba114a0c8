//! Target spawn generation
//!
//! Fixed paths (figure-eight, circle) are pure functions of the canvas size;
//! random-mode spawns draw from a caller-owned seeded RNG so sessions replay
//! deterministically.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::Rect;

/// Which body part must reach the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Hand,
    Head,
    Knee,
}

impl TargetKind {
    /// Display color, reported downstream for rendering
    pub fn color(&self) -> &'static str {
        match self {
            TargetKind::Hand => "#4dabf7",
            TargetKind::Head => "#ffd43b",
            TargetKind::Knee => "#69db7c",
        }
    }
}

/// A spawned target. Ids are unique per spawn within a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Target {
    pub id: u64,
    pub kind: TargetKind,
    /// Center in pixel space
    pub pos: Vec2,
    pub color: &'static str,
}

impl Target {
    pub fn new(id: u64, kind: TargetKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            color: kind.color(),
        }
    }
}

/// Fraction of each canvas edge kept clear of random targets
const BORDER_FRACTION: f32 = 0.05;

/// Eight figure-eight waypoints for the hands-fixed mode.
///
/// t = 2*pi*i/8, x = cx + 0.15W*sin(t), y = cy + 0.10H*sin(2t).
pub fn figure_eight_targets(width: f32, height: f32, first_id: u64) -> Vec<Target> {
    let cx = width / 2.0;
    let cy = height / 2.0;
    let rx = 0.15 * width;
    let ry = 0.10 * height;
    (0..8)
        .map(|i| {
            let t = std::f32::consts::TAU * i as f32 / 8.0;
            let pos = Vec2::new(cx + rx * t.sin(), cy + ry * (2.0 * t).sin());
            Target::new(first_id + i as u64, TargetKind::Hand, pos)
        })
        .collect()
}

/// Eight circle waypoints for the head-fixed mode.
///
/// Radius 0.12*min(W,H), centered in the upper half where a head plausibly is.
pub fn circle_targets(width: f32, height: f32, first_id: u64) -> Vec<Target> {
    let center = Vec2::new(0.5 * width, 0.3 * height);
    let radius = 0.12 * width.min(height);
    (0..8)
        .map(|i| {
            let t = std::f32::consts::TAU * i as f32 / 8.0;
            let pos = center + Vec2::new(radius * t.cos(), radius * t.sin());
            Target::new(first_id + i as u64, TargetKind::Head, pos)
        })
        .collect()
}

/// A random-mode target with an anatomically plausible position.
///
/// Head targets stay in the top third of the bordered area, knee targets in
/// the 60-85% vertical band, hand targets anywhere inside the border.
pub fn random_target(width: f32, height: f32, rng: &mut Pcg32, id: u64) -> Target {
    let kind = match rng.random_range(0..3u8) {
        0 => TargetKind::Hand,
        1 => TargetKind::Head,
        _ => TargetKind::Knee,
    };

    let border_x = BORDER_FRACTION * width;
    let border_y = BORDER_FRACTION * height;
    let usable_w = width - 2.0 * border_x;
    let usable_h = height - 2.0 * border_y;

    let x = border_x + rng.random_range(0.0..1.0f32) * usable_w;
    let y = match kind {
        // Head band: top third of the 0.8H usable span (10% top margin on
        // top of the 5% border), so y stays within [0.05H, 0.05H + 0.8H/3]
        TargetKind::Head => border_y + rng.random_range(0.0..1.0f32) * (0.8 * height / 3.0),
        TargetKind::Knee => {
            let band_top = 0.60 * height;
            let band_bottom = 0.85 * height;
            band_top + rng.random_range(0.0..1.0f32) * (band_bottom - band_top)
        }
        TargetKind::Hand => border_y + rng.random_range(0.0..1.0f32) * usable_h,
    };

    Target::new(id, kind, Vec2::new(x, y))
}

/// Hip-sway zone geometry, fully determined by the canvas size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HipSwayRegions {
    pub left: Rect,
    pub right: Rect,
    /// Vertical reference line the player centers on (x in pixels)
    pub center_line_x: f32,
}

/// Two lateral rectangles spanning 0.2H..H, each 0.35W wide, plus the center line
pub fn hip_sway_regions(width: f32, height: f32) -> HipSwayRegions {
    let top = 0.2 * height;
    let zone_w = 0.35 * width;
    HipSwayRegions {
        left: Rect::new(Vec2::new(0.0, top), Vec2::new(zone_w, height)),
        right: Rect::new(Vec2::new(width - zone_w, top), Vec2::new(width, height)),
        center_line_x: 0.5 * width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn test_figure_eight_shape() {
        let targets = figure_eight_targets(1000.0, 800.0, 0);
        assert_eq!(targets.len(), 8);
        assert!(targets.iter().all(|t| t.kind == TargetKind::Hand));
        // i = 0: sin(0) = 0 on both axes, so the first point is the center
        assert_eq!(targets[0].pos, Vec2::new(500.0, 400.0));
        // i = 2: t = pi/2, x = cx + rx, y = cy + ry*sin(pi) = cy
        assert!((targets[2].pos.x - 650.0).abs() < 1e-3);
        assert!((targets[2].pos.y - 400.0).abs() < 1e-3);
        // Ids are sequential
        assert_eq!(targets[7].id, 7);
    }

    #[test]
    fn test_circle_shape() {
        let targets = circle_targets(1000.0, 800.0, 10);
        assert_eq!(targets.len(), 8);
        assert!(targets.iter().all(|t| t.kind == TargetKind::Head));
        let center = Vec2::new(500.0, 240.0);
        let radius = 0.12 * 800.0;
        for t in &targets {
            assert!(((t.pos - center).length() - radius).abs() < 1e-3);
        }
    }

    #[test]
    fn test_hip_regions_geometry() {
        let regions = hip_sway_regions(1000.0, 800.0);
        assert_eq!(regions.left.min, Vec2::new(0.0, 160.0));
        assert_eq!(regions.left.max, Vec2::new(350.0, 800.0));
        assert_eq!(regions.right.min, Vec2::new(650.0, 160.0));
        assert_eq!(regions.right.max, Vec2::new(1000.0, 800.0));
        assert_eq!(regions.center_line_x, 500.0);
        // Stable for constant inputs
        assert_eq!(regions, hip_sway_regions(1000.0, 800.0));
    }

    #[test]
    fn test_random_target_regions_1000x1000() {
        let mut rng = rand_pcg::Pcg32::seed_from_u64(7);
        for id in 0..1000 {
            let t = random_target(1000.0, 1000.0, &mut rng, id);
            assert!(t.pos.x >= 50.0 && t.pos.x <= 950.0);
            match t.kind {
                TargetKind::Head => {
                    assert!(t.pos.y >= 50.0 && t.pos.y <= 50.0 + (0.8 * 1000.0) / 3.0);
                }
                TargetKind::Knee => {
                    assert!(t.pos.y >= 600.0 && t.pos.y <= 850.0);
                }
                TargetKind::Hand => {
                    assert!(t.pos.y >= 50.0 && t.pos.y <= 950.0);
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_random_targets_stay_in_anatomical_bands(seed in 0u64..1000, w in 200.0f32..4000.0, h in 200.0f32..4000.0) {
            let mut rng = rand_pcg::Pcg32::seed_from_u64(seed);
            for id in 0..50 {
                let t = random_target(w, h, &mut rng, id);
                prop_assert!(t.pos.x >= 0.05 * w && t.pos.x <= 0.95 * w);
                match t.kind {
                    TargetKind::Head => {
                        prop_assert!(t.pos.y >= 0.05 * h && t.pos.y <= 0.05 * h + 0.8 * h / 3.0)
                    }
                    TargetKind::Knee => prop_assert!(t.pos.y >= 0.60 * h && t.pos.y <= 0.85 * h),
                    TargetKind::Hand => prop_assert!(t.pos.y >= 0.05 * h && t.pos.y <= 0.95 * h),
                }
            }
        }
    }
}
