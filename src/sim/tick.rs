//! Fixed timestep simulation tick
//!
//! Phases run strictly in order: gravity wells, then weapons, then deaths
//! and fragmentation, then removal of everything that left play. Later
//! phases see the deaths and absorptions decided by earlier ones.

use glam::Vec2;

use super::asteroid::SplitCause;
use super::beam::update_beams;
use super::damage::{Combatant, DamageType, Side};
use super::gravity::WellEffect;
use super::projectile::{Projectile, ProjectileKind, Targets, update_projectiles};
use super::state::{EntityId, GameState, SimEvent, Step};

/// One fire event from the decision layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireCommand {
    pub kind: ProjectileKind,
    pub side: Side,
    pub position: Vec2,
    /// Aim point for rockets and plasma; bolts and `None` fire straight along
    /// the side's forward direction
    pub aim: Option<Vec2>,
}

/// Beam intent for one owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamCommand {
    pub owner: EntityId,
    pub active: bool,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub fire: Vec<FireCommand>,
    pub beams: Vec<BeamCommand>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    for cmd in &input.fire {
        match cmd.aim {
            Some(target) => {
                state.spawn_projectile_toward(cmd.kind, cmd.side, cmd.position, target);
            }
            None => {
                state.spawn_projectile(cmd.kind, cmd.side, cmd.position);
            }
        }
    }
    for cmd in &input.beams {
        state.set_beam_active(cmd.owner, cmd.active);
    }

    state.time_ticks += 1;
    state.time_secs += f64::from(dt);
    let step = Step {
        dt,
        now: state.time_secs,
        bounds: state.bounds(),
    };

    update_wells(state, step);
    update_asteroids(state, step);

    let mut targets = Targets {
        player: &mut state.player,
        hostiles: &mut state.hostiles,
        asteroids: &mut state.asteroids,
    };
    update_projectiles(
        &mut state.projectiles,
        &state.wells,
        &mut targets,
        &state.tuning.weapons,
        step,
        &mut state.events,
    );
    update_beams(
        &mut state.beams,
        &state.wells,
        &mut targets,
        &state.tuning.beam,
        step,
        &mut state.rng,
        &mut state.events,
    );

    resolve_deaths(state);
    collect_garbage(state, step);
}

/// Phase 1: drift, expire, then attract every registered body
fn update_wells(state: &mut GameState, step: Step) {
    let margin = state.tuning.gravity.despawn_margin;
    let events = &mut state.events;
    state.wells.retain_mut(|well| {
        let keep = well.advance(step.dt, &step.bounds, margin);
        if !keep {
            log::debug!("Gravity well {:?} expired", well.id);
            events.push(SimEvent::WellExpired { well: well.id });
        }
        keep
    });

    for well in &state.wells {
        if well.apply_to(&mut state.player) == WellEffect::Crushed {
            log::info!("Player crushed by gravity well {:?}", well.id);
            events.push(SimEvent::ConsumedByWell {
                well: well.id,
                body: state.player.id,
            });
            events.push(SimEvent::PlayerDestroyed);
        }

        let mut ships = Vec::new();
        well.sweep(&mut state.hostiles, &mut ships);
        let mut rocks = Vec::new();
        well.sweep(&mut state.asteroids, &mut rocks);
        let mut shots = Vec::new();
        well.sweep(&mut state.projectiles, &mut shots);

        let consumed = ships
            .iter()
            .map(|s| s.id)
            .chain(rocks.iter().map(|a| a.id))
            .chain(shots.iter().map(|p| p.id));
        for body in consumed {
            log::debug!("{:?} fell into gravity well {:?}", body, well.id);
            events.push(SimEvent::ConsumedByWell {
                well: well.id,
                body,
            });
        }
    }
}

/// Phase 2a: asteroid drift and ramming
fn update_asteroids(state: &mut GameState, step: Step) {
    let player = &mut state.player;
    for rock in state.asteroids.iter_mut().filter(|a| a.vitals.alive) {
        rock.advance(step.dt);
        if player.vitals.alive && rock.hitbox().intersects(&player.hitbox()) {
            player.take_hit(rock.effective_collision_damage(), DamageType::Normal);
            rock.vitals.collapse();
            state.events.push(SimEvent::AsteroidRammed { asteroid: rock.id });
        }
    }
}

/// Phase 3: lifecycle checks, kill rewards and fragmentation
fn resolve_deaths(state: &mut GameState) {
    if state.player.vitals.settle() {
        log::info!("Player destroyed");
        state.events.push(SimEvent::PlayerDestroyed);
    }

    for ship in state.hostiles.iter_mut() {
        if !ship.vitals.settle() {
            continue;
        }
        log::debug!("{:?} {:?} destroyed", ship.hull, ship.id);
        state.events.push(SimEvent::ShipDestroyed {
            ship: ship.id,
            hull: ship.hull,
        });
        if state.player.vitals.alive {
            let reward = ship.hull.stats().reward;
            state.score += reward.score;
            state.player.vitals.restore(reward.health, reward.shield);
        }
    }

    let mut spawned = Vec::new();
    for rock in state.asteroids.iter_mut() {
        let depleted = rock.vitals.settle();
        let cause = match rock.pending_split.take() {
            Some(cause) => {
                rock.vitals.collapse();
                cause
            }
            None if depleted => SplitCause::Depleted,
            None => continue,
        };

        let children =
            rock.break_apart(cause, &mut state.ids, &mut state.rng, &state.tuning.asteroids);
        log::debug!(
            "Asteroid {:?} broke apart ({:?}) into {} pieces",
            rock.id,
            cause,
            children.len()
        );
        state.score += state.tuning.asteroids.score;
        state.events.push(SimEvent::AsteroidFragmented {
            asteroid: rock.id,
            children: children.len(),
            cause,
        });
        spawned.extend(children);
    }
    state.asteroids.extend(spawned);
}

/// Phase 4: drop everything that is dead, spent or out of play
fn collect_garbage(state: &mut GameState, step: Step) {
    state.projectiles.retain(Projectile::is_alive);
    state.hostiles.retain(|s| s.vitals.alive);
    state
        .asteroids
        .retain(|a| a.vitals.alive && !a.is_offscreen(&step.bounds));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::gravity::GravityWell;
    use crate::sim::state::HullClass;

    fn still_well(state: &mut GameState, pos: Vec2) -> EntityId {
        let id = state.next_entity_id();
        let well = GravityWell::new(id, pos, Vec2::ZERO, &state.tuning);
        state.wells.push(well);
        id
    }

    #[test]
    fn test_gravity_kill_marks_player_dead_but_keeps_it() {
        let mut state = GameState::new(1);
        let center = Vec2::new(700.0, 400.0);
        let well = still_well(&mut state, center);
        state.player.pos = center + Vec2::new(1.0, 0.0);
        let hostile = state.spawn_hostile(HullClass::Fighter, center + Vec2::new(0.0, 1.0));
        let rock = state.spawn_asteroid(center - Vec2::new(1.0, 0.0), 1.0);

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.player.vitals.health, 0.0);
        assert!(!state.player.vitals.alive);
        assert!(state.hostiles.iter().all(|s| s.id != hostile));
        assert!(state.asteroids.iter().all(|a| a.id != rock));
        assert!(state.events.contains(&SimEvent::PlayerDestroyed));
        assert!(state.events.contains(&SimEvent::ConsumedByWell { well, body: hostile }));

        // Dead player is no longer pulled and never reported twice
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(!state.events.contains(&SimEvent::PlayerDestroyed));
    }

    #[test]
    fn test_exempt_hull_survives_kill_radius() {
        let mut state = GameState::new(1);
        let center = Vec2::new(700.0, 300.0);
        still_well(&mut state, center);
        let mothership = state.spawn_hostile(HullClass::Mothership, center + Vec2::new(1.0, 0.0));

        tick(&mut state, &TickInput::default(), SIM_DT);
        let ship = state.ship(mothership).unwrap();
        assert!(ship.vitals.alive);
        assert_eq!(ship.pos, center + Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_gravity_kill_pays_no_reward() {
        let mut state = GameState::new(1);
        let center = Vec2::new(300.0, 300.0);
        still_well(&mut state, center);
        state.spawn_hostile(HullClass::Battleship, center + Vec2::new(1.0, 1.0));

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.hostiles.is_empty());
        assert_eq!(state.score, 0);
        assert!(
            !state
                .events
                .iter()
                .any(|e| matches!(e, SimEvent::ShipDestroyed { .. }))
        );
    }

    #[test]
    fn test_kill_reward_credited() {
        let mut state = GameState::new(1);
        let fighter = state.spawn_hostile(HullClass::Fighter, Vec2::new(700.0, 300.0));
        if let Some(ship) = state.ship_mut(fighter) {
            ship.vitals.health = 5.0;
        }
        state.player.vitals.shield = 150.0;

        let input = TickInput {
            fire: vec![FireCommand {
                kind: ProjectileKind::Bolt,
                side: Side::Player,
                position: Vec2::new(700.0, 320.0),
                aim: None,
            }],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        assert!(state.hostiles.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.score, 50);
        assert_eq!(state.player.vitals.shield, 170.0);
        assert!(state.events.contains(&SimEvent::ShipDestroyed {
            ship: fighter,
            hull: HullClass::Fighter,
        }));
    }

    #[test]
    fn test_depleted_asteroid_splits_in_two() {
        let mut state = GameState::new(4);
        let rock = state.spawn_asteroid(Vec2::new(500.0, 300.0), 1.0);
        state.asteroids[0].vitals.health = 5.0;
        let pos = state.asteroids[0].pos;
        state.spawn_projectile(ProjectileKind::Bolt, Side::Player, pos);

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.asteroids.iter().all(|a| a.id != rock));
        assert_eq!(state.asteroids.len(), 2);
        assert!(state.asteroids.iter().all(|a| a.fragment_count == 2));
        assert_eq!(state.score, 10);
        assert!(state.events.contains(&SimEvent::AsteroidFragmented {
            asteroid: rock,
            children: 2,
            cause: SplitCause::Depleted,
        }));
    }

    #[test]
    fn test_rocket_splash_shatters_asteroid() {
        let mut state = GameState::new(4);
        let rock = state.spawn_asteroid(Vec2::new(500.0, 300.0), 1.0);
        state.asteroids[0].vel = Vec2::ZERO;
        state.spawn_projectile(ProjectileKind::Rocket, Side::Player, Vec2::new(500.0, 400.0));

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.asteroids.iter().all(|a| a.id != rock));
        assert_eq!(state.asteroids.len(), 8);
        assert!(state.asteroids.iter().all(|a| a.scale == 0.125));
        // The rocket is still playing its explosion
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_asteroid_rams_player() {
        let mut state = GameState::new(2);
        let pos = state.player.pos;
        let rock = state.spawn_asteroid(pos, 1.0);

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.asteroids.is_empty());
        assert_eq!(state.player.vitals.shield, 120.0);
        assert!(state.events.contains(&SimEvent::AsteroidRammed { asteroid: rock }));
    }

    #[test]
    fn test_well_expires_off_screen() {
        let mut state = GameState::new(1);
        let id = state.next_entity_id();
        let tuning = state.tuning.clone();
        state.wells.push(GravityWell::new(
            id,
            Vec2::new(700.0, 1200.0),
            Vec2::new(0.0, 6000.0),
            &tuning,
        ));
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.wells.is_empty());
        assert!(state.events.contains(&SimEvent::WellExpired { well: id }));
    }

    #[test]
    fn test_beam_intent_through_input() {
        let mut state = GameState::new(1);
        let player = state.player.id;
        let input = TickInput {
            beams: vec![BeamCommand {
                owner: player,
                active: true,
            }],
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &input, SIM_DT);
        }
        let beam = state.beam(player).unwrap();
        assert!(beam.active);
        assert!(beam.fuel < beam.max_fuel);
        assert_eq!(beam.segments.len(), 10);
    }

    #[test]
    fn test_clock_advances() {
        let mut state = GameState::new(1);
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.time_ticks, 60);
        assert!((state.time_secs - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_hostile_heavy_bolt_ignores_aim() {
        let mut state = GameState::new(1);
        let input = TickInput {
            fire: vec![FireCommand {
                kind: ProjectileKind::HeavyBolt,
                side: Side::Hostile,
                position: Vec2::new(300.0, 100.0),
                aim: Some(Vec2::new(0.0, 100.0)),
            }],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        let shot = &state.projectiles[0];
        assert_eq!(shot.vel.normalize(), Vec2::Y);
        assert_eq!(shot.pos.x, 300.0);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        fn run(seed: u64) -> (u64, String, String) {
            let mut state = GameState::new(seed);
            state.spawn_gravity_well();
            for i in 0..6 {
                state.spawn_asteroid(Vec2::new(150.0 + i as f32 * 200.0, 50.0), 1.0);
            }
            state.spawn_hostile(HullClass::Gunship, Vec2::new(400.0, 120.0));
            let input = TickInput {
                fire: vec![FireCommand {
                    kind: ProjectileKind::Bolt,
                    side: Side::Player,
                    position: Vec2::new(700.0, 600.0),
                    aim: Some(Vec2::new(400.0, 120.0)),
                }],
                ..Default::default()
            };
            for _ in 0..240 {
                tick(&mut state, &input, SIM_DT);
            }
            (
                state.score,
                format!("{:?}", state.asteroids),
                format!("{:?}", state.wells),
            )
        }
        assert_eq!(run(99), run(99));
    }
}
