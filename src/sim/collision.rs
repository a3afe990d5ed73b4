//! Collision primitives for rectangular hitboxes
//!
//! Every body in the core collides as an axis-aligned box. Fast movers are
//! tested with their travel segment (previous position to candidate
//! position) so a single large step cannot tunnel through a thin target.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half)
    }

    /// Rectangle from its top-left corner and size
    pub fn from_top_left(top_left: Vec2, size: Vec2) -> Self {
        Self::new(top_left, top_left + size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Grow on all four sides by `margin`
    pub fn inflate(&self, margin: f32) -> Self {
        Self::new(self.min - Vec2::splat(margin), self.max + Vec2::splat(margin))
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Overlap test (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Does the segment `a -> b` pass through this rectangle?
    ///
    /// Liang-Barsky clipping. A zero-length segment degenerates to a point test.
    pub fn clips_segment(&self, a: Vec2, b: Vec2) -> bool {
        let delta = b - a;
        let mut t_enter = 0.0_f32;
        let mut t_exit = 1.0_f32;

        for (p, q) in [
            (-delta.x, a.x - self.min.x),
            (delta.x, self.max.x - a.x),
            (-delta.y, a.y - self.min.y),
            (delta.y, self.max.y - a.y),
        ] {
            if p == 0.0 {
                // Parallel to this slab: reject if outside it
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                t_enter = t_enter.max(t);
            } else {
                t_exit = t_exit.min(t);
            }
            if t_enter > t_exit {
                return false;
            }
        }
        true
    }
}

/// Per-axis range test: both |dx| and |dy| within `range`
#[inline]
pub fn within_axis_range(a: Vec2, b: Vec2, range: f32) -> bool {
    let d = (a - b).abs();
    d.x <= range && d.y <= range
}
