//! Projectile family
//!
//! Every shot flies in a straight line. Its travel segment for the tick is
//! checked against gravity wells before it moves; only then does it collide
//! with targets. Rockets and plasma pass through an `Exploding` state that
//! plays out for a fixed number of ticks before removal.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::asteroid::{Asteroid, SplitCause};
use super::collision::Rect;
use super::damage::{Combatant, DamageType, Side};
use super::gravity::{Attractable, GravityClass, GravityWell, WellEffect};
use super::state::{EntityId, Ship, SimEvent, Step};
use crate::tuning::WeaponTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    Bolt,
    HeavyBolt,
    /// Proximity-fused splash rocket (no homing)
    Rocket,
    /// Area plasma; damage is plasma-typed
    Plasma,
    FreezeBolt,
}

impl ProjectileKind {
    /// Rockets and plasma follow an aim point. Bolts always fly along their
    /// side's forward direction.
    pub fn is_aimable(self) -> bool {
        matches!(self, ProjectileKind::Rocket | ProjectileKind::Plasma)
    }
}

/// Speed, damage and hitbox of one shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotProfile {
    /// Pixels per second
    pub speed: f32,
    pub damage: f32,
    pub size: Vec2,
}

impl ShotProfile {
    pub fn new(speed: f32, damage: f32, size: Vec2) -> Self {
        Self {
            speed,
            damage,
            size,
        }
    }
}

/// A weapon's shot as fired by each side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub player: ShotProfile,
    pub hostile: ShotProfile,
}

impl WeaponProfile {
    pub fn symmetric(shot: ShotProfile) -> Self {
        Self {
            player: shot,
            hostile: shot,
        }
    }

    pub fn for_side(&self, side: Side) -> &ShotProfile {
        match side {
            Side::Player => &self.player,
            Side::Hostile => &self.hostile,
        }
    }
}

impl WeaponTuning {
    pub fn profile(&self, kind: ProjectileKind) -> &WeaponProfile {
        match kind {
            ProjectileKind::Bolt => &self.bolt,
            ProjectileKind::HeavyBolt => &self.heavy_bolt,
            ProjectileKind::Rocket => &self.rocket,
            ProjectileKind::Plasma => &self.plasma,
            ProjectileKind::FreezeBolt => &self.freeze_bolt,
        }
    }

    fn rocket_zone(&self, side: Side) -> Vec2 {
        match side {
            Side::Player => self.rocket_zone_player,
            Side::Hostile => self.rocket_zone_hostile,
        }
    }
}

/// Why a projectile left play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Removal {
    Hit,
    OutOfBounds,
    /// Swallowed by a well's region mid-flight
    Absorbed,
    /// Pulled into a well's kill radius
    Consumed,
    /// Explosion finished playing
    Spent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    Flying,
    Exploding {
        frame: u32,
        /// Area damage already applied
        detonated: bool,
    },
    Removed(Removal),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub kind: ProjectileKind,
    pub side: Side,
    /// Ship that fired it, if any. Rockets never detonate on their owner.
    pub owner: Option<EntityId>,
    /// Hitbox center
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    pub size: Vec2,
    pub damage: f32,
    pub damage_type: DamageType,
    pub state: ProjectileState,
    pub warp_scale: f32,
}

impl Projectile {
    /// New shot travelling along `dir`. Bolt kinds ignore `dir`, and a
    /// degenerate direction falls back to the side's forward direction.
    pub fn new(
        id: EntityId,
        kind: ProjectileKind,
        side: Side,
        pos: Vec2,
        dir: Vec2,
        weapons: &WeaponTuning,
    ) -> Self {
        let shot = weapons.profile(kind).for_side(side);
        let dir = if kind.is_aimable() {
            dir.try_normalize().unwrap_or(side.forward())
        } else {
            side.forward()
        };
        let damage_type = match kind {
            ProjectileKind::Plasma => DamageType::Plasma,
            _ => DamageType::Normal,
        };
        Self {
            id,
            kind,
            side,
            owner: None,
            pos,
            vel: dir * shot.speed,
            size: shot.size,
            damage: shot.damage,
            damage_type,
            state: ProjectileState::Flying,
            warp_scale: 1.0,
        }
    }

    /// Still in play (flying or exploding)
    pub fn is_alive(&self) -> bool {
        !matches!(self.state, ProjectileState::Removed(_))
    }

    pub fn hitbox(&self) -> Rect {
        Rect::from_center_size(self.pos, self.size)
    }

    fn heading(&self) -> Vec2 {
        self.vel.try_normalize().unwrap_or(self.side.forward())
    }

    fn remove(&mut self, why: Removal) {
        self.state = ProjectileState::Removed(why);
    }
}

impl Attractable for Projectile {
    fn gravity_class(&self) -> GravityClass {
        GravityClass::Projectile
    }
    fn is_attractable(&self) -> bool {
        self.state == ProjectileState::Flying
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
    fn fall_in(&mut self) -> WellEffect {
        self.remove(Removal::Consumed);
        WellEffect::Consumed
    }
}

/// Everything projectiles and beams can hurt this tick
pub struct Targets<'a> {
    pub player: &'a mut Ship,
    pub hostiles: &'a mut [Ship],
    pub asteroids: &'a mut [Asteroid],
}

impl Targets<'_> {
    /// Living ships on the other side from `side`
    pub(crate) fn opponents_mut(&mut self, side: Side) -> impl Iterator<Item = &mut Ship> {
        let opponent = side.opponent();
        std::iter::once(&mut *self.player)
            .chain(self.hostiles.iter_mut())
            .filter(move |ship| ship.vitals.alive && ship.category() == opponent)
    }

    pub(crate) fn asteroids_mut(&mut self) -> impl Iterator<Item = &mut Asteroid> {
        self.asteroids.iter_mut().filter(|a| a.vitals.alive)
    }

    /// Does anything `side` may hit overlap `zone`?
    fn any_in_zone(&mut self, side: Side, zone: &Rect, skip: Option<EntityId>) -> bool {
        let ship_hit = self
            .opponents_mut(side)
            .any(|s| Some(s.id) != skip && s.hitbox().intersects(zone));
        ship_hit || self.asteroids_mut().any(|a| a.hitbox().intersects(zone))
    }
}

/// Advance every live projectile by one tick
pub fn update_projectiles(
    projectiles: &mut [Projectile],
    wells: &[GravityWell],
    targets: &mut Targets<'_>,
    weapons: &WeaponTuning,
    step: Step,
    events: &mut Vec<SimEvent>,
) {
    for shot in projectiles.iter_mut() {
        match shot.state {
            ProjectileState::Flying => fly(shot, wells, targets, weapons, step, events),
            ProjectileState::Exploding { frame, detonated } => {
                if !detonated {
                    detonate_plasma(shot, targets, weapons, events);
                }
                let frame = frame + 1;
                shot.state = if frame >= weapons.explosion_ticks {
                    ProjectileState::Removed(Removal::Spent)
                } else {
                    ProjectileState::Exploding {
                        frame,
                        detonated: true,
                    }
                };
            }
            ProjectileState::Removed(_) => {}
        }
    }
}

fn fly(
    shot: &mut Projectile,
    wells: &[GravityWell],
    targets: &mut Targets<'_>,
    weapons: &WeaponTuning,
    step: Step,
    events: &mut Vec<SimEvent>,
) {
    let next = shot.pos + shot.vel * step.dt;
    if let Some(well) = wells.iter().find(|w| w.absorbs(shot.pos, next)) {
        shot.remove(Removal::Absorbed);
        events.push(SimEvent::ProjectileAbsorbed {
            projectile: shot.id,
            well: well.id,
        });
        return;
    }

    shot.pos = next;
    if !shot.hitbox().intersects(&step.bounds) {
        shot.remove(Removal::OutOfBounds);
        return;
    }

    match shot.kind {
        ProjectileKind::Bolt | ProjectileKind::HeavyBolt | ProjectileKind::FreezeBolt => {
            strike_first(shot, targets, weapons, step.now, events)
        }
        ProjectileKind::Rocket => {
            let zone = Rect::from_center_size(
                shot.pos + shot.heading() * weapons.rocket_zone_lead,
                weapons.rocket_zone(shot.side),
            );
            if targets.any_in_zone(shot.side, &zone, shot.owner) {
                explode_rocket(shot, &zone, targets, weapons, events);
            }
        }
        ProjectileKind::Plasma => {
            let zone = Rect::from_center_size(shot.pos, weapons.plasma_trigger_zone);
            if targets.any_in_zone(shot.side, &zone, shot.owner) {
                shot.state = ProjectileState::Exploding {
                    frame: 0,
                    detonated: false,
                };
                events.push(SimEvent::ProjectileDetonated {
                    projectile: shot.id,
                    pos: shot.pos,
                });
            }
        }
    }
}

/// Bolts hit the first overlapping opponent, then the first asteroid
fn strike_first(
    shot: &mut Projectile,
    targets: &mut Targets<'_>,
    weapons: &WeaponTuning,
    now: f64,
    events: &mut Vec<SimEvent>,
) {
    let hitbox = shot.hitbox();

    let mut target = None;
    if let Some(ship) = targets
        .opponents_mut(shot.side)
        .find(|s| s.hitbox().intersects(&hitbox))
    {
        ship.take_hit(shot.damage, shot.damage_type);
        if shot.kind == ProjectileKind::FreezeBolt {
            ship.freeze_until(now + f64::from(weapons.freeze_duration_secs));
        }
        target = Some(ship.id);
    }
    if target.is_none() {
        if let Some(rock) = targets
            .asteroids_mut()
            .find(|a| a.hitbox().intersects(&hitbox))
        {
            rock.take_hit(shot.damage, shot.damage_type);
            target = Some(rock.id);
        }
    }

    if let Some(target) = target {
        shot.remove(Removal::Hit);
        events.push(SimEvent::ProjectileHit {
            projectile: shot.id,
            target,
        });
    }
}

fn explode_rocket(
    shot: &mut Projectile,
    zone: &Rect,
    targets: &mut Targets<'_>,
    weapons: &WeaponTuning,
    events: &mut Vec<SimEvent>,
) {
    let owner = shot.owner;
    for ship in targets
        .opponents_mut(shot.side)
        .filter(|s| Some(s.id) != owner && s.hitbox().intersects(zone))
    {
        ship.take_hit(shot.damage, DamageType::Normal);
    }
    for rock in targets
        .asteroids_mut()
        .filter(|a| a.hitbox().intersects(zone))
    {
        rock.take_hit(weapons.rocket_asteroid_damage, DamageType::Normal);
        rock.pending_split = Some(SplitCause::Splash);
    }

    shot.state = ProjectileState::Exploding {
        frame: 0,
        detonated: true,
    };
    events.push(SimEvent::ProjectileDetonated {
        projectile: shot.id,
        pos: shot.pos,
    });
}

/// One-shot plasma area damage on the first exploding tick
fn detonate_plasma(
    shot: &Projectile,
    targets: &mut Targets<'_>,
    weapons: &WeaponTuning,
    events: &mut Vec<SimEvent>,
) {
    let blast = Rect::from_center_size(shot.pos, weapons.plasma_blast_zone);
    for ship in targets
        .opponents_mut(shot.side)
        .filter(|s| s.hitbox().intersects(&blast))
    {
        ship.take_hit(shot.damage, shot.damage_type);
        events.push(SimEvent::ProjectileHit {
            projectile: shot.id,
            target: ship.id,
        });
    }
    for rock in targets
        .asteroids_mut()
        .filter(|a| a.hitbox().intersects(&blast))
    {
        rock.take_hit(shot.damage, shot.damage_type);
        if rock.vitals.health <= 0.0 {
            rock.pending_split = Some(SplitCause::Splash);
        }
    }
}
