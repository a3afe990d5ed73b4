//! Deterministic simulation module
//!
//! All combat and gravity logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order, which is id order)
//! - No rendering, audio or platform dependencies

pub mod asteroid;
pub mod beam;
pub mod collision;
pub mod damage;
pub mod gravity;
pub mod projectile;
pub mod state;
pub mod tick;

pub use asteroid::{Asteroid, Composition, SplitCause};
pub use beam::{Beam, BeamSegment};
pub use collision::Rect;
pub use damage::{Category, Combatant, DamageType, NO_SHIELD, Side, Vitals, apply_damage};
pub use gravity::{
    Attractable, AttractionProfile, AttractionTable, GravityClass, GravityWell, WellEffect,
};
pub use projectile::{
    Projectile, ProjectileKind, ProjectileState, Removal, ShotProfile, Targets, WeaponProfile,
};
pub use state::{EntityId, GameState, HullClass, HullStats, Reward, Ship, SimEvent, Step};
pub use tick::{BeamCommand, FireCommand, TickInput, tick};
