//! Game state and core simulation types
//!
//! Live entities are held in explicit owned collections; each tick phase
//! borrows only the collections it needs.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::asteroid::{Asteroid, SplitCause};
use super::beam::Beam;
use super::collision::Rect;
use super::damage::{Category, Combatant, Side, Vitals};
use super::gravity::{Attractable, GravityClass, GravityWell, WellEffect};
use super::projectile::{Projectile, ProjectileKind};
use crate::aim_direction;
use crate::tuning::Tuning;

/// Unique identifier for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Monotonic entity ID allocator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// What a hostile kill pays out to the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub score: u64,
    pub shield: f32,
    pub health: f32,
}

/// Fixed stats of a hull class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullStats {
    pub health: f32,
    /// -1 for hulls without shield capacity
    pub shield: f32,
    pub size: Vec2,
    pub reward: Reward,
}

/// Ship classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HullClass {
    Player,
    Fighter,
    Interceptor,
    Gunship,
    /// Carries a continuous beam
    Lancer,
    Battleship,
    PlasmaShip,
    Dreadnought,
    /// Anti-gravity capital ship; wells cannot touch it
    Mothership,
    StrikeCraft,
}

impl HullClass {
    pub fn stats(self) -> HullStats {
        let (health, shield, size, score, reward_shield, reward_health) = match self {
            HullClass::Player => (200.0, 200.0, Vec2::new(64.0, 64.0), 0, 0.0, 0.0),
            HullClass::Fighter => (110.0, -1.0, Vec2::new(56.0, 56.0), 50, 20.0, 0.0),
            HullClass::Interceptor => (120.0, -1.0, Vec2::new(56.0, 56.0), 50, 30.0, 0.0),
            HullClass::Gunship => (150.0, -1.0, Vec2::new(64.0, 64.0), 50, 10.0, 0.0),
            HullClass::Lancer => (200.0, -1.0, Vec2::new(72.0, 72.0), 150, 40.0, 0.0),
            HullClass::Battleship => (800.0, -1.0, Vec2::new(140.0, 110.0), 350, 60.0, 5.0),
            HullClass::PlasmaShip => (100.0, 550.0, Vec2::new(90.0, 90.0), 250, 80.0, 0.0),
            HullClass::Dreadnought => (500.0, 1350.0, Vec2::new(160.0, 120.0), 750, 120.0, 50.0),
            HullClass::Mothership => (1500.0, 4550.0, Vec2::new(320.0, 200.0), 2750, 200.0, 100.0),
            HullClass::StrikeCraft => (60.0, -1.0, Vec2::new(32.0, 32.0), 20, 0.0, 0.0),
        };
        HullStats {
            health,
            shield,
            size,
            reward: Reward {
                score,
                shield: reward_shield,
                health: reward_health,
            },
        }
    }

    pub fn category(self) -> Category {
        match self {
            HullClass::Player => Category::Player,
            _ => Category::Hostile,
        }
    }

    pub fn gravity_class(self) -> GravityClass {
        match self {
            HullClass::Player => GravityClass::Player,
            HullClass::Mothership => GravityClass::AntiGravity,
            _ => GravityClass::Hostile,
        }
    }
}

/// A ship: the player or a hostile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: EntityId,
    pub hull: HullClass,
    /// Hitbox center
    pub pos: Vec2,
    pub size: Vec2,
    pub vitals: Vitals,
    /// Simulation time (seconds) until which the ship is frozen
    pub frozen_until: f64,
    /// Cosmetic shrink applied by gravity wells
    pub warp_scale: f32,
}

impl Ship {
    pub fn new(id: EntityId, hull: HullClass, pos: Vec2) -> Self {
        let stats = hull.stats();
        Self {
            id,
            hull,
            pos,
            size: stats.size,
            vitals: Vitals::new(stats.health, stats.shield),
            frozen_until: 0.0,
            warp_scale: 1.0,
        }
    }

    pub fn side(&self) -> Side {
        match self.hull.category() {
            Category::Player => Side::Player,
            _ => Side::Hostile,
        }
    }

    pub fn hitbox(&self) -> Rect {
        Rect::from_center_size(self.pos, self.size)
    }

    /// Where this ship's shots and beams leave the hull
    pub fn muzzle(&self) -> Vec2 {
        self.pos + self.side().forward() * (self.size.y * 0.5)
    }

    /// Extend the freeze lock-out (never shortens an existing one)
    pub fn freeze_until(&mut self, until: f64) {
        self.frozen_until = self.frozen_until.max(until);
    }

    /// Movement/behaviour must be suppressed by the controller while frozen
    pub fn is_frozen(&self, now: f64) -> bool {
        now < self.frozen_until
    }
}

impl Combatant for Ship {
    fn vitals(&self) -> &Vitals {
        &self.vitals
    }
    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }
    fn category(&self) -> Category {
        self.hull.category()
    }
}

impl Attractable for Ship {
    fn gravity_class(&self) -> GravityClass {
        self.hull.gravity_class()
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

    /// The player is never removed, only marked dead
    fn fall_in(&mut self) -> WellEffect {
        self.vitals.collapse();
        match self.hull.category() {
            Category::Player => WellEffect::Crushed,
            _ => WellEffect::Consumed,
        }
    }
}

/// Timing and bounds shared by every system in one tick
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub dt: f32,
    /// Simulation clock at the end of this tick
    pub now: f64,
    pub bounds: Rect,
}

/// Observable transitions from one tick, for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    ProjectileHit { projectile: EntityId, target: EntityId },
    ProjectileAbsorbed { projectile: EntityId, well: EntityId },
    ProjectileDetonated { projectile: EntityId, pos: Vec2 },
    ShipDestroyed { ship: EntityId, hull: HullClass },
    PlayerDestroyed,
    AsteroidRammed { asteroid: EntityId },
    AsteroidFragmented { asteroid: EntityId, children: usize, cause: SplitCause },
    ConsumedByWell { well: EntityId, body: EntityId },
    WellExpired { well: EntityId },
    BeamRanDry { owner: EntityId },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub tuning: Tuning,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulation clock in seconds
    pub time_secs: f64,
    pub score: u64,
    pub player: Ship,
    /// Live hostiles (sorted by id)
    pub hostiles: Vec<Ship>,
    pub asteroids: Vec<Asteroid>,
    pub projectiles: Vec<Projectile>,
    pub beams: Vec<Beam>,
    pub wells: Vec<GravityWell>,
    /// Transitions produced by the last tick
    pub events: Vec<SimEvent>,
    pub(crate) rng: Pcg32,
    pub(crate) ids: EntityIds,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut ids = EntityIds::default();
        let start = Vec2::new(tuning.screen_width * 0.5, tuning.screen_height - 80.0);
        let player = Ship::new(ids.next(), HullClass::Player, start);
        Self {
            seed,
            tuning,
            time_ticks: 0,
            time_secs: 0.0,
            score: 0,
            player,
            hostiles: Vec::new(),
            asteroids: Vec::new(),
            projectiles: Vec::new(),
            beams: Vec::new(),
            wells: Vec::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            ids,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.next()
    }

    pub fn bounds(&self) -> Rect {
        self.tuning.bounds()
    }

    /// Player or hostile by id
    pub fn ship(&self, id: EntityId) -> Option<&Ship> {
        if self.player.id == id {
            return Some(&self.player);
        }
        self.hostiles.iter().find(|s| s.id == id)
    }

    pub fn ship_mut(&mut self, id: EntityId) -> Option<&mut Ship> {
        if self.player.id == id {
            return Some(&mut self.player);
        }
        self.hostiles.iter_mut().find(|s| s.id == id)
    }

    pub fn spawn_hostile(&mut self, hull: HullClass, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.hostiles.push(Ship::new(id, hull, pos));
        id
    }

    pub fn spawn_asteroid(&mut self, pos: Vec2, scale: f32) -> EntityId {
        let id = self.next_entity_id();
        let asteroid = Asteroid::random(id, pos, scale, &self.tuning.asteroids, &mut self.rng);
        self.asteroids.push(asteroid);
        id
    }

    pub fn spawn_gravity_well(&mut self) -> EntityId {
        let id = self.next_entity_id();
        let well = GravityWell::spawn(id, &self.tuning, &mut self.rng);
        self.wells.push(well);
        id
    }

    /// Unaimed shot: travels straight along the side's forward direction
    pub fn spawn_projectile(&mut self, kind: ProjectileKind, side: Side, pos: Vec2) -> EntityId {
        self.launch(kind, side, pos, side.forward(), None)
    }

    /// Aimed shot. Only rockets and plasma follow the aim; bolts fly straight.
    /// Aiming at the spawn point itself falls back to the side's forward
    /// direction.
    pub fn spawn_projectile_toward(
        &mut self,
        kind: ProjectileKind,
        side: Side,
        pos: Vec2,
        target: Vec2,
    ) -> EntityId {
        let dir = aim_direction(pos, target, side.forward());
        self.launch(kind, side, pos, dir, None)
    }

    /// Fire from a ship's muzzle. Returns `None` if the ship is gone or dead.
    pub fn fire_from(&mut self, ship: EntityId, kind: ProjectileKind) -> Option<EntityId> {
        let (side, muzzle) = self
            .ship(ship)
            .filter(|s| s.vitals.alive)
            .map(|s| (s.side(), s.muzzle()))?;
        Some(self.launch(kind, side, muzzle, side.forward(), Some(ship)))
    }

    fn launch(
        &mut self,
        kind: ProjectileKind,
        side: Side,
        pos: Vec2,
        dir: Vec2,
        owner: Option<EntityId>,
    ) -> EntityId {
        let id = self.next_entity_id();
        let mut shot = Projectile::new(id, kind, side, pos, dir, &self.tuning.weapons);
        shot.owner = owner;
        self.projectiles.push(shot);
        id
    }

    /// Beam intent for a ship. The beam is created on first use.
    pub fn set_beam_active(&mut self, owner: EntityId, active: bool) {
        if let Some(beam) = self.beams.iter_mut().find(|b| b.owner == owner) {
            beam.set_active(active);
            return;
        }
        let Some(side) = self.ship(owner).filter(|s| s.vitals.alive).map(Ship::side) else {
            return;
        };
        let mut beam = Beam::new(owner, side, &self.tuning.beam);
        beam.set_active(active);
        self.beams.push(beam);
    }

    pub fn beam(&self, owner: EntityId) -> Option<&Beam> {
        self.beams.iter().find(|b| b.owner == owner)
    }
}
