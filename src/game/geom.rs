//! Collision primitives
//!
//! The game's hit policy is deliberately simple: circular hit zones around
//! targets and axis-aligned rectangles for the hip-sway regions, both
//! inclusive of their boundary.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Whether point `p` lies within `radius` of `center` (boundary counts)
#[inline]
pub fn within_radius(p: Vec2, center: Vec2, radius: f32) -> bool {
    crate::distance(p, center) <= radius
}

/// Axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Containment test, inclusive of edges
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}
