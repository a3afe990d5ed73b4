//! Continuous beam weapon
//!
//! A beam is a queue of short segments emitted from the owner's muzzle, one
//! per firing tick, that travel away from it and hit whatever they touch.
//! Firing is gated by a fuel pool that drains while active and recharges
//! (more slowly) while idle.

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::damage::{Combatant, DamageType, Side};
use super::gravity::GravityWell;
use super::projectile::Targets;
use super::state::{EntityId, SimEvent, Step};
use crate::tuning::BeamTuning;

/// One slice of a beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSegment {
    /// `x` is the beam axis, `y` the top edge
    pub pos: Vec2,
    pub length: f32,
    /// Seconds since emission
    pub age: f32,
}

impl BeamSegment {
    pub fn rect(&self, width: f32) -> Rect {
        Rect::from_top_left(
            Vec2::new(self.pos.x - width * 0.5, self.pos.y),
            Vec2::new(width, self.length),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beam {
    pub owner: EntityId,
    pub side: Side,
    pub fuel: f32,
    pub max_fuel: f32,
    /// Firing right now. Never true while fuel is 0.
    pub active: bool,
    pub segments: Vec<BeamSegment>,
}

impl Beam {
    /// Idle beam with a full tank
    pub fn new(owner: EntityId, side: Side, tuning: &BeamTuning) -> Self {
        Self {
            owner,
            side,
            fuel: tuning.max_fuel,
            max_fuel: tuning.max_fuel,
            active: false,
            segments: Vec::new(),
        }
    }

    /// Firing intent. An empty tank overrides the wish to fire.
    pub fn set_active(&mut self, want: bool) {
        self.active = want && self.fuel > 0.0;
    }

    /// Drain or recharge for `dt` seconds. Returns `true` on the tick the
    /// tank runs dry.
    pub fn update_fuel(&mut self, dt: f32, tuning: &BeamTuning) -> bool {
        if self.active && self.fuel > 0.0 {
            self.fuel -= tuning.drain_per_sec * dt;
            if self.fuel <= 0.0 {
                self.fuel = 0.0;
                self.active = false;
                return true;
            }
        } else {
            self.active = false;
            self.fuel = (self.fuel + tuning.recharge_per_sec * dt).min(self.max_fuel);
        }
        false
    }

    /// Append one segment at `muzzle`, extending away from the owner
    fn emit<R: Rng>(&mut self, muzzle: Vec2, tuning: &BeamTuning, rng: &mut R) {
        let lo = tuning.segment_min_len;
        let length = rng.random_range(lo..=tuning.segment_max_len.max(lo));
        let top = match self.side {
            Side::Player => muzzle.y - length,
            Side::Hostile => muzzle.y,
        };
        self.segments.push(BeamSegment {
            pos: Vec2::new(muzzle.x, top),
            length,
            age: 0.0,
        });
    }
}

/// Advance every beam one tick: fuel, emission, travel and collision.
///
/// Beams whose owner is gone go idle; they are dropped once their last
/// segment is spent.
pub fn update_beams<R: Rng>(
    beams: &mut Vec<Beam>,
    wells: &[GravityWell],
    targets: &mut Targets<'_>,
    tuning: &BeamTuning,
    step: Step,
    rng: &mut R,
    events: &mut Vec<SimEvent>,
) {
    // Ships already struck by a hostile beam this tick
    let mut struck: HashSet<EntityId> = HashSet::new();

    for beam in beams.iter_mut() {
        let muzzle = find_muzzle(targets, beam.owner);
        if muzzle.is_none() {
            beam.active = false;
        }

        if beam.update_fuel(step.dt, tuning) {
            log::debug!("Beam of {:?} ran dry", beam.owner);
            events.push(SimEvent::BeamRanDry { owner: beam.owner });
        }
        if let (true, Some(muzzle)) = (beam.active, muzzle) {
            beam.emit(muzzle, tuning, rng);
        }

        let side = beam.side;
        let travel = side.forward() * tuning.segment_speed * step.dt;
        beam.segments.retain_mut(|seg| {
            let before = seg.rect(tuning.width);
            seg.pos += travel;
            seg.age += step.dt;
            let after = seg.rect(tuning.width);

            let swept = before.union(&after);
            if wells.iter().any(|w| w.region().intersects(&swept)) {
                return false;
            }

            let mut hit = false;
            if let Some(rock) = targets
                .asteroids_mut()
                .find(|a| a.hitbox().intersects(&after))
            {
                rock.take_hit(tuning.damage_destructible, DamageType::Normal);
                hit = true;
            }

            for ship in targets
                .opponents_mut(side)
                .filter(|s| s.hitbox().intersects(&after))
            {
                match side {
                    Side::Player => {
                        ship.take_hit(tuning.damage_hostile, DamageType::Normal);
                        hit = true;
                    }
                    Side::Hostile => {
                        if struck.insert(ship.id) {
                            ship.take_hit(tuning.damage_player, DamageType::Normal);
                            hit = true;
                        }
                    }
                }
            }

            let off_screen =
                seg.pos.y + seg.length < step.bounds.min.y || seg.pos.y > step.bounds.max.y;
            !hit && !off_screen
        });
    }

    beams.retain(|b| {
        b.active || !b.segments.is_empty() || find_muzzle(targets, b.owner).is_some()
    });
}

fn find_muzzle(targets: &Targets<'_>, owner: EntityId) -> Option<Vec2> {
    if targets.player.id == owner {
        return targets.player.vitals.alive.then(|| targets.player.muzzle());
    }
    targets
        .hostiles
        .iter()
        .find(|s| s.id == owner && s.vitals.alive)
        .map(|s| s.muzzle())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::consts::SIM_DT;
    use crate::sim::asteroid::Asteroid;
    use crate::sim::state::{HullClass, Ship};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Range {
        tuning: Tuning,
        player: Ship,
        hostiles: Vec<Ship>,
        asteroids: Vec<Asteroid>,
        wells: Vec<GravityWell>,
        beams: Vec<Beam>,
        events: Vec<SimEvent>,
        rng: Pcg32,
    }

    impl Range {
        fn new() -> Self {
            Self {
                tuning: Tuning::default(),
                player: Ship::new(EntityId(1), HullClass::Player, Vec2::new(700.0, 650.0)),
                hostiles: Vec::new(),
                asteroids: Vec::new(),
                wells: Vec::new(),
                beams: Vec::new(),
                events: Vec::new(),
                rng: Pcg32::seed_from_u64(5),
            }
        }

        fn step(&mut self) {
            let step = Step {
                dt: SIM_DT,
                now: 0.0,
                bounds: self.tuning.bounds(),
            };
            let mut targets = Targets {
                player: &mut self.player,
                hostiles: &mut self.hostiles,
                asteroids: &mut self.asteroids,
            };
            update_beams(
                &mut self.beams,
                &self.wells,
                &mut targets,
                &self.tuning.beam,
                step,
                &mut self.rng,
                &mut self.events,
            );
        }
    }

    #[test]
    fn test_fuel_runs_dry_then_recovers() {
        let tuning = BeamTuning::default();
        let mut beam = Beam::new(EntityId(1), Side::Player, &tuning);
        beam.set_active(true);

        // 100 fuel / 20 per second = 5 s
        let mut ticks = 0;
        while !beam.update_fuel(SIM_DT, &tuning) {
            ticks += 1;
            assert!(ticks < 400);
        }
        assert!((ticks as f32 * SIM_DT - 5.0).abs() < 0.1);
        assert!(!beam.active);
        assert_eq!(beam.fuel, 0.0);

        beam.set_active(true);
        assert!(!beam.active);

        beam.set_active(false);
        let mut last = beam.fuel;
        for _ in 0..(15.0 / SIM_DT) as usize {
            beam.update_fuel(SIM_DT, &tuning);
            assert!(beam.fuel >= last);
            assert!(beam.fuel <= tuning.max_fuel);
            last = beam.fuel;
        }
        assert_eq!(beam.fuel, tuning.max_fuel);
    }

    #[test]
    fn test_one_segment_per_firing_tick() {
        let mut range = Range::new();
        let mut beam = Beam::new(EntityId(1), Side::Player, &range.tuning.beam);
        beam.set_active(true);
        range.beams.push(beam);

        range.step();
        range.step();
        range.step();
        let segs = &range.beams[0].segments;
        assert_eq!(segs.len(), 3);
        // Player beam travels upward; the oldest is furthest from the muzzle
        assert!(segs[0].pos.y < segs[2].pos.y);
        assert!(segs.iter().all(|s| (30.0..=50.0).contains(&s.length)));
    }

    #[test]
    fn test_player_beam_hits_every_touched_hostile() {
        let mut range = Range::new();
        range.hostiles.push(Ship::new(EntityId(2), HullClass::Fighter, Vec2::new(700.0, 300.0)));
        range.hostiles.push(Ship::new(EntityId(3), HullClass::Fighter, Vec2::new(710.0, 300.0)));
        let mut beam = Beam::new(EntityId(1), Side::Player, &range.tuning.beam);
        beam.segments.push(BeamSegment {
            pos: Vec2::new(705.0, 320.0),
            length: 40.0,
            age: 0.0,
        });
        range.beams.push(beam);

        range.step();
        assert_eq!(range.hostiles[0].vitals.health, 105.0);
        assert_eq!(range.hostiles[1].vitals.health, 105.0);
        assert!(range.beams[0].segments.is_empty());
    }

    #[test]
    fn test_hostile_beams_hit_player_once_per_tick() {
        let mut range = Range::new();
        range.player.vitals = crate::sim::damage::Vitals::unshielded(200.0);
        let player_top = range.player.pos.y - 50.0;
        for owner in [EntityId(2), EntityId(3)] {
            range.hostiles.push(Ship::new(owner, HullClass::Lancer, Vec2::new(700.0, 100.0)));
            let mut beam = Beam::new(owner, Side::Hostile, &range.tuning.beam);
            for k in 0..3 {
                beam.segments.push(BeamSegment {
                    pos: Vec2::new(700.0, player_top + k as f32 * 5.0),
                    length: 40.0,
                    age: 0.0,
                });
            }
            range.beams.push(beam);
        }

        range.step();
        assert_eq!(range.player.vitals.health, 199.0);
        // Only the segment that landed the hit is spent
        let left: usize = range.beams.iter().map(|b| b.segments.len()).sum();
        assert_eq!(left, 5);

        range.step();
        assert_eq!(range.player.vitals.health, 198.0);
    }

    #[test]
    fn test_well_swallows_segment() {
        let mut range = Range::new();
        range.wells.push(GravityWell::new(
            EntityId(9),
            Vec2::new(700.0, 300.0),
            Vec2::ZERO,
            &range.tuning,
        ));
        range.hostiles.push(Ship::new(EntityId(2), HullClass::Fighter, Vec2::new(700.0, 300.0)));
        let mut beam = Beam::new(EntityId(1), Side::Player, &range.tuning.beam);
        beam.segments.push(BeamSegment {
            pos: Vec2::new(700.0, 320.0),
            length: 40.0,
            age: 0.0,
        });
        range.beams.push(beam);

        range.step();
        assert!(range.beams[0].segments.is_empty());
        assert_eq!(range.hostiles[0].vitals.health, 110.0);
    }

    #[test]
    fn test_segment_damages_asteroid() {
        let mut range = Range::new();
        let rocks = range.tuning.asteroids.clone();
        range.asteroids.push(Asteroid::new(EntityId(4), Vec2::new(700.0, 300.0), 1.0, &rocks));
        let mut beam = Beam::new(EntityId(1), Side::Player, &range.tuning.beam);
        beam.segments.push(BeamSegment {
            pos: Vec2::new(700.0, 360.0),
            length: 40.0,
            age: 0.0,
        });
        range.beams.push(beam);

        range.step();
        assert_eq!(range.asteroids[0].vitals.health, -10.0);
        assert!(range.beams[0].segments.is_empty());
    }

    #[test]
    fn test_orphaned_beam_dropped_when_empty() {
        let mut range = Range::new();
        let mut beam = Beam::new(EntityId(77), Side::Hostile, &range.tuning.beam);
        beam.set_active(true);
        beam.segments.push(BeamSegment {
            pos: Vec2::new(100.0, 690.0),
            length: 40.0,
            age: 0.0,
        });
        range.beams.push(beam);

        range.step();
        assert!(range.beams.is_empty());
    }

    proptest! {
        #[test]
        fn prop_fuel_stays_in_range(
            intents in proptest::collection::vec(any::<bool>(), 1..2000),
        ) {
            let tuning = BeamTuning::default();
            let mut beam = Beam::new(EntityId(1), Side::Player, &tuning);
            for want in intents {
                beam.set_active(want);
                beam.update_fuel(SIM_DT, &tuning);
                prop_assert!(beam.fuel >= 0.0 && beam.fuel <= tuning.max_fuel);
                prop_assert!(!(beam.active && beam.fuel == 0.0));
            }
        }
    }
}
