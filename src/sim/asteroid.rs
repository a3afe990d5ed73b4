//! Fragmenting bodies
//!
//! Asteroids split into smaller, weaker copies of themselves when destroyed.
//! Each split multiplies the lineage's fragment count, and collision damage
//! is divided by it.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::damage::{Category, Combatant, Vitals};
use super::gravity::{Attractable, GravityClass};
use super::state::{EntityId, EntityIds};
use crate::consts::{ASTEROID_CULL_MARGIN, FRAME_RATE};
use crate::tuning::AsteroidTuning;

/// Cosmetic material; fragments inherit it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Composition {
    #[default]
    Rock,
    Ice,
    Junk,
}

/// What destroyed a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitCause {
    /// Health ran out under ordinary damage
    Depleted,
    /// Caught in a rocket or plasma blast
    Splash,
}

impl SplitCause {
    /// (children, scale divisor, health divisor)
    fn split_rule(self) -> (u32, f32, f32) {
        match self {
            SplitCause::Depleted => (2, 2.0, 2.0),
            SplitCause::Splash => (8, 8.0, 4.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: EntityId,
    /// Hitbox center
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    pub scale: f32,
    /// Hitbox side length
    pub size: f32,
    pub vitals: Vitals,
    /// Number of pieces the lineage has been split into so far
    pub fragment_count: u32,
    pub base_collision_damage: f32,
    pub composition: Composition,
    /// Set by splash weapons; the body fragments this tick regardless of health
    pub pending_split: Option<SplitCause>,
    pub warp_scale: f32,
}

impl Asteroid {
    /// Stationary rock with default health
    pub fn new(id: EntityId, pos: Vec2, scale: f32, tuning: &AsteroidTuning) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            scale,
            size: tuning.base_size * scale,
            vitals: Vitals::unshielded(tuning.default_health),
            fragment_count: 1,
            base_collision_damage: tuning.collision_damage,
            composition: Composition::Rock,
            pending_split: None,
            warp_scale: 1.0,
        }
    }

    /// Asteroid with a random downward drift and composition
    pub fn random<R: Rng>(
        id: EntityId,
        pos: Vec2,
        scale: f32,
        tuning: &AsteroidTuning,
        rng: &mut R,
    ) -> Self {
        let composition = match rng.random_range(0..3) {
            0 => Composition::Rock,
            1 => Composition::Ice,
            _ => Composition::Junk,
        };
        Self {
            vel: drift(rng),
            composition,
            ..Self::new(id, pos, scale, tuning)
        }
    }

    /// Damage dealt to whatever this body rams
    pub fn effective_collision_damage(&self) -> f32 {
        self.base_collision_damage / self.fragment_count as f32
    }

    pub fn hitbox(&self) -> Rect {
        Rect::from_center_size(self.pos, Vec2::splat(self.size))
    }

    pub fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Below the screen or far past either side
    pub fn is_offscreen(&self, bounds: &Rect) -> bool {
        let hb = self.hitbox();
        hb.min.y > bounds.max.y
            || hb.max.x < bounds.min.x - ASTEROID_CULL_MARGIN
            || hb.min.x > bounds.max.x + ASTEROID_CULL_MARGIN
    }

    /// Children spawned when this body is destroyed. Empty when they would
    /// be too small to see.
    pub fn break_apart<R: Rng>(
        &self,
        cause: SplitCause,
        ids: &mut EntityIds,
        rng: &mut R,
        tuning: &AsteroidTuning,
    ) -> Vec<Asteroid> {
        let (count, scale_div, health_div) = cause.split_rule();
        let scale = self.scale / scale_div;
        if scale < tuning.min_scale {
            return Vec::new();
        }

        let health = (self.vitals.max_health / health_div).max(tuning.min_child_health);
        let j = tuning.jitter.abs();
        (0..count)
            .map(|_| {
                let offset = Vec2::new(rng.random_range(-j..=j), rng.random_range(-j..=j));
                Asteroid {
                    id: ids.next(),
                    pos: self.pos + offset,
                    vel: drift(rng),
                    scale,
                    size: tuning.base_size * scale,
                    vitals: Vitals::unshielded(health),
                    fragment_count: self.fragment_count * count,
                    base_collision_damage: self.base_collision_damage,
                    composition: self.composition,
                    pending_split: None,
                    warp_scale: 1.0,
                }
            })
            .collect()
    }
}

/// Random downward drift: 2-5 px/frame down, -2..2 px/frame sideways
fn drift<R: Rng>(rng: &mut R) -> Vec2 {
    let vx = rng.random_range(-2..=2) as f32;
    let vy = rng.random_range(2..=5) as f32;
    Vec2::new(vx, vy) * FRAME_RATE
}

impl Combatant for Asteroid {
    fn vitals(&self) -> &Vitals {
        &self.vitals
    }
    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }
    fn category(&self) -> Category {
        Category::Neutral
    }
}

impl Attractable for Asteroid {
    fn gravity_class(&self) -> GravityClass {
        GravityClass::Destructible
    }
    fn is_attractable(&self) -> bool {
        self.vitals.alive
    }
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn displace(&mut self, delta: Vec2) {
        self.pos += delta;
    }
    fn set_warp_scale(&mut self, scale: f32) {
        self.warp_scale = scale;
    }
}
