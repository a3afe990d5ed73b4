//! Gravity wells
//!
//! A well drifts across the screen and, every tick, drags nearby bodies
//! toward its center, shrinks them as they close in and destroys anything
//! that reaches the kill radius. Straight-line shots whose travel segment
//! crosses a well's region are swallowed before they can hit anything.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, within_axis_range};
use super::state::EntityId;
use crate::consts::*;
use crate::tuning::Tuning;

/// How a body is classified for attraction purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GravityClass {
    Player,
    Hostile,
    /// Hostile hulls fitted with anti-gravity tech
    AntiGravity,
    /// Asteroids and other neutral debris
    Destructible,
    /// In-flight shots of either side
    Projectile,
}

/// Range/strength pair for one attraction tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttractionProfile {
    /// Per-axis reach from the well center
    pub range: f32,
    /// Pull per pixel of distance
    pub strength: f32,
    /// Smallest warp scale a body of this tier is shrunk to
    pub min_scale: f32,
}

/// Attraction tiers: players are pulled hardest from closest, debris
/// weakest from furthest, everything else sits between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractionTable {
    pub player: AttractionProfile,
    pub standard: AttractionProfile,
    pub destructible: AttractionProfile,
}

impl Default for AttractionTable {
    fn default() -> Self {
        Self {
            player: AttractionProfile {
                range: PLAYER_ATTRACTION_RANGE,
                strength: PLAYER_ATTRACTION_STRENGTH,
                min_scale: WARP_MIN_SCALE,
            },
            standard: AttractionProfile {
                range: STANDARD_ATTRACTION_RANGE,
                strength: STANDARD_ATTRACTION_STRENGTH,
                min_scale: WARP_MIN_SCALE,
            },
            destructible: AttractionProfile {
                range: DESTRUCTIBLE_ATTRACTION_RANGE,
                strength: DESTRUCTIBLE_ATTRACTION_STRENGTH,
                min_scale: WARP_DESTRUCTIBLE_MIN_SCALE,
            },
        }
    }
}

impl AttractionTable {
    pub fn profile(&self, class: GravityClass) -> &AttractionProfile {
        match class {
            GravityClass::Player => &self.player,
            GravityClass::Destructible => &self.destructible,
            GravityClass::Hostile | GravityClass::AntiGravity | GravityClass::Projectile => {
                &self.standard
            }
        }
    }
}

/// What a well did to a body this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellEffect {
    /// Out of range, exempt or already dead
    Ignored,
    /// Dragged toward the center
    Pulled,
    /// Killed in place; the body stays in its collection
    Crushed,
    /// Destroyed; the owner must drop the body from its collection
    Consumed,
}

/// Anything a gravity well can move
pub trait Attractable {
    fn gravity_class(&self) -> GravityClass;
    /// Dead or inactive bodies are skipped
    fn is_attractable(&self) -> bool;
    fn position(&self) -> Vec2;
    fn displace(&mut self, delta: Vec2);
    /// Cosmetic shrink factor (1.0 = full size)
    fn set_warp_scale(&mut self, scale: f32);

    /// Called when the body reaches the kill radius
    fn fall_in(&mut self) -> WellEffect {
        WellEffect::Consumed
    }
}

/// Which screen edge a well enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpawnEdge {
    Top,
    Left,
    Right,
}

/// Gravitational anomaly (black hole / quark star)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GravityWell {
    pub id: EntityId,
    pub pos: Vec2,
    /// Drift in pixels per second
    pub vel: Vec2,
    /// Side length of the square absorption region
    pub size: f32,
    pub kill_radius: f32,
    pub pull_min: f32,
    pub pull_max: f32,
    attraction: AttractionTable,
    exempt: BTreeSet<GravityClass>,
}

impl GravityWell {
    /// Well at a fixed position with the tuning's tables
    pub fn new(id: EntityId, pos: Vec2, vel: Vec2, tuning: &Tuning) -> Self {
        let g = &tuning.gravity;
        Self {
            id,
            pos,
            vel,
            size: g.well_size,
            kill_radius: g.kill_radius,
            pull_min: g.pull_min,
            pull_max: g.pull_max,
            attraction: g.attraction.clone(),
            exempt: g.exempt.iter().copied().collect(),
        }
    }

    /// Well entering from a random screen edge with a random inward drift
    pub fn spawn<R: Rng>(id: EntityId, tuning: &Tuning, rng: &mut R) -> Self {
        let w = tuning.screen_width;
        let h = tuning.screen_height;
        let off = tuning.gravity.spawn_offset;

        let edge = match rng.random_range(0..4) {
            0 => SpawnEdge::Left,
            1 => SpawnEdge::Right,
            _ => SpawnEdge::Top,
        };
        let along = rng.random_range(1..=4) as f32;
        let across = rng.random_range(-2..=2) as f32;

        let (pos, vel) = match edge {
            SpawnEdge::Top => (
                Vec2::new(rng.random_range(off..(w - off).max(off + 1.0)), -off),
                Vec2::new(across, along),
            ),
            SpawnEdge::Left => (
                Vec2::new(-off, rng.random_range(off..(h * 0.5).max(off + 1.0))),
                Vec2::new(along, across.abs()),
            ),
            SpawnEdge::Right => (
                Vec2::new(w + off, rng.random_range(off..(h * 0.5).max(off + 1.0))),
                Vec2::new(-along, across.abs()),
            ),
        };

        log::debug!("Gravity well {:?} spawned at {:?} ({:?} edge)", id, pos, edge);
        Self::new(id, pos, vel * FRAME_RATE, tuning)
    }

    pub fn attraction(&self) -> &AttractionTable {
        &self.attraction
    }

    pub fn is_exempt(&self, class: GravityClass) -> bool {
        self.exempt.contains(&class)
    }

    /// Square region that swallows shots and beam segments
    pub fn region(&self) -> Rect {
        Rect::from_center_size(self.pos, Vec2::splat(self.size))
    }

    /// Drift one step. Returns `false` once the well has left the inflated
    /// play bounds and should be discarded.
    pub fn advance(&mut self, dt: f32, bounds: &Rect, margin: f32) -> bool {
        self.pos += self.vel * dt;
        self.region().intersects(&bounds.inflate(margin))
    }

    /// Would a body travelling `from -> to` be swallowed?
    pub fn absorbs(&self, from: Vec2, to: Vec2) -> bool {
        self.region().clips_segment(from, to)
    }

    /// Pull, shrink or destroy one body
    pub fn apply_to<T: Attractable + ?Sized>(&self, body: &mut T) -> WellEffect {
        let class = body.gravity_class();
        if self.is_exempt(class) || !body.is_attractable() {
            return WellEffect::Ignored;
        }

        let profile = self.attraction.profile(class);
        let pos = body.position();
        if !within_axis_range(self.pos, pos, profile.range) {
            return WellEffect::Ignored;
        }

        let to_center = self.pos - pos;
        let distance = to_center.length();
        if distance <= self.kill_radius {
            return body.fall_in();
        }

        let pull = (distance * profile.strength).clamp(self.pull_min, self.pull_max);
        if let Some(dir) = to_center.try_normalize() {
            body.displace(dir * pull);
        }

        let rel = (distance / profile.range).min(1.0);
        body.set_warp_scale(rel.max(profile.min_scale));

        WellEffect::Pulled
    }

    /// Apply to every body of a collection, dropping consumed ones.
    /// `retain_mut` visits each element exactly once, so removal during the
    /// sweep cannot skip or double-visit anything.
    pub fn sweep<T: Attractable>(&self, bodies: &mut Vec<T>, consumed: &mut Vec<T>)
    where
        T: Clone,
    {
        bodies.retain_mut(|body| {
            if self.apply_to(body) == WellEffect::Consumed {
                consumed.push(body.clone());
                false
            } else {
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[derive(Debug, Clone)]
    struct Probe {
        class: GravityClass,
        pos: Vec2,
        alive: bool,
        warp: f32,
    }

    impl Probe {
        fn at(class: GravityClass, pos: Vec2) -> Self {
            Self {
                class,
                pos,
                alive: true,
                warp: 1.0,
            }
        }
    }

    impl Attractable for Probe {
        fn gravity_class(&self) -> GravityClass {
            self.class
        }
        fn is_attractable(&self) -> bool {
            self.alive
        }
        fn position(&self) -> Vec2 {
            self.pos
        }
        fn displace(&mut self, delta: Vec2) {
            self.pos += delta;
        }
        fn set_warp_scale(&mut self, scale: f32) {
            self.warp = scale;
        }
    }

    fn well_at(pos: Vec2) -> GravityWell {
        GravityWell::new(EntityId(1), pos, Vec2::ZERO, &Tuning::default())
    }

    #[test]
    fn test_pull_toward_center_clamped_to_floor() {
        let well = well_at(Vec2::new(500.0, 300.0));
        // Standard tier: 100 * 0.02 = 2 -> clamped up to 2.5
        let mut probe = Probe::at(GravityClass::Hostile, Vec2::new(400.0, 300.0));
        assert_eq!(well.apply_to(&mut probe), WellEffect::Pulled);
        assert!((probe.pos.x - 402.5).abs() < 1e-4);
        assert_eq!(probe.pos.y, 300.0);
    }

    #[test]
    fn test_pull_clamped_to_ceiling() {
        let well = well_at(Vec2::ZERO);
        // Player tier: 100 * 1.8 = 180 -> clamped down to 13
        let mut probe = Probe::at(GravityClass::Player, Vec2::new(0.0, 100.0));
        well.apply_to(&mut probe);
        assert!((probe.pos.y - 87.0).abs() < 1e-4);
    }

    #[test]
    fn test_axis_range_per_tier() {
        let well = well_at(Vec2::ZERO);
        // 200 px away: beyond the player's range, inside the standard range
        let mut player = Probe::at(GravityClass::Player, Vec2::new(200.0, 0.0));
        let mut hostile = Probe::at(GravityClass::Hostile, Vec2::new(200.0, 0.0));
        let mut rock = Probe::at(GravityClass::Destructible, Vec2::new(280.0, 280.0));
        assert_eq!(well.apply_to(&mut player), WellEffect::Ignored);
        assert_eq!(well.apply_to(&mut hostile), WellEffect::Pulled);
        assert_eq!(well.apply_to(&mut rock), WellEffect::Pulled);
        assert_eq!(player.pos, Vec2::new(200.0, 0.0));
    }

    #[test]
    fn test_exempt_and_dead_bodies_ignored() {
        let well = well_at(Vec2::ZERO);
        let mut immune = Probe::at(GravityClass::AntiGravity, Vec2::new(1.0, 0.0));
        assert_eq!(well.apply_to(&mut immune), WellEffect::Ignored);

        let mut dead = Probe::at(GravityClass::Hostile, Vec2::new(1.0, 0.0));
        dead.alive = false;
        assert_eq!(well.apply_to(&mut dead), WellEffect::Ignored);
    }

    #[test]
    fn test_kill_radius_consumes() {
        let well = well_at(Vec2::ZERO);
        let mut probe = Probe::at(GravityClass::Projectile, Vec2::new(1.0, 0.0));
        assert_eq!(well.apply_to(&mut probe), WellEffect::Consumed);
    }

    #[test]
    fn test_warp_scale_floors() {
        let well = well_at(Vec2::ZERO);
        let mut ship = Probe::at(GravityClass::Hostile, Vec2::new(10.0, 0.0));
        let mut rock = Probe::at(GravityClass::Destructible, Vec2::new(10.0, 0.0));
        well.apply_to(&mut ship);
        well.apply_to(&mut rock);
        assert_eq!(ship.warp, WARP_MIN_SCALE);
        assert_eq!(rock.warp, WARP_DESTRUCTIBLE_MIN_SCALE);

        let mut far = Probe::at(GravityClass::Hostile, Vec2::new(130.0, 0.0));
        well.apply_to(&mut far);
        assert!((far.warp - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_sweep_removes_only_consumed() {
        let well = well_at(Vec2::ZERO);
        let mut bodies = vec![
            Probe::at(GravityClass::Hostile, Vec2::new(1.0, 0.0)),
            Probe::at(GravityClass::Hostile, Vec2::new(50.0, 0.0)),
            Probe::at(GravityClass::Hostile, Vec2::new(0.0, 1.5)),
            Probe::at(GravityClass::Hostile, Vec2::new(900.0, 0.0)),
        ];
        let mut consumed = Vec::new();
        well.sweep(&mut bodies, &mut consumed);
        assert_eq!(consumed.len(), 2);
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[1].pos, Vec2::new(900.0, 0.0));
    }

    #[test]
    fn test_advance_despawns_past_margin() {
        let bounds = Rect::new(Vec2::ZERO, Vec2::new(1400.0, 700.0));
        let mut well = GravityWell::new(
            EntityId(1),
            Vec2::new(700.0, 700.0),
            Vec2::new(0.0, 600.0),
            &Tuning::default(),
        );
        let mut ticks = 0;
        while well.advance(1.0 / 60.0, &bounds, WELL_DESPAWN_MARGIN) {
            ticks += 1;
            assert!(ticks < 1000);
        }
        // Region top edge must be past bottom + margin
        assert!(well.region().min.y >= 700.0 + WELL_DESPAWN_MARGIN);
    }

    #[test]
    fn test_spawn_starts_inside_despawn_bounds() {
        let tuning = Tuning::default();
        let bounds = tuning.bounds();
        let mut rng = Pcg32::seed_from_u64(7);
        for i in 0..50 {
            let well = GravityWell::spawn(EntityId(i), &tuning, &mut rng);
            assert!(well.region().intersects(&bounds.inflate(tuning.gravity.despawn_margin)));
            assert!(!bounds.contains(well.pos));
            assert!(well.vel.length() > 0.0);
        }
    }

    #[test]
    fn test_absorbs_fast_segment() {
        let well = well_at(Vec2::new(100.0, 100.0));
        assert!(well.absorbs(Vec2::new(100.0, 600.0), Vec2::new(100.0, -400.0)));
        assert!(!well.absorbs(Vec2::new(400.0, 600.0), Vec2::new(400.0, -400.0)));
    }
}
