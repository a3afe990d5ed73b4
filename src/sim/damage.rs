//! Damage resolution
//!
//! Shields soak incoming hits before health does. Plasma is shield-biased:
//! it charges a shield at a multiple of its nominal amount. Once a combatant
//! is dead it ignores all further damage.

use serde::{Deserialize, Serialize};

use crate::consts::PLASMA_SHIELD_MULTIPLIER;

/// Shield value meaning "this hull has no shield capacity at all"
pub const NO_SHIELD: f32 = -1.0;

/// Which side of the fight an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Player,
    Hostile,
    /// Destructible scenery (asteroids, junk)
    Neutral,
}

/// Side that fired a shot or beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Hostile,
}

impl Side {
    /// Category of combatants this side is allowed to hurt
    pub fn opponent(self) -> Category {
        match self {
            Side::Player => Category::Hostile,
            Side::Hostile => Category::Player,
        }
    }

    /// Travel direction for unaimed shots (player fires up, hostiles fire down)
    pub fn forward(self) -> glam::Vec2 {
        match self {
            Side::Player => glam::Vec2::NEG_Y,
            Side::Hostile => glam::Vec2::Y,
        }
    }
}

impl From<Side> for Category {
    fn from(side: Side) -> Self {
        match side {
            Side::Player => Category::Player,
            Side::Hostile => Category::Hostile,
        }
    }
}

/// Kind of damage carried by a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DamageType {
    #[default]
    Normal,
    Plasma,
}

/// Health/shield pool of anything that can be hurt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: f32,
    pub max_health: f32,
    /// Current shield, or [`NO_SHIELD`]
    pub shield: f32,
    pub max_shield: f32,
    pub alive: bool,
}

impl Vitals {
    pub fn new(health: f32, shield: f32) -> Self {
        Self {
            health,
            max_health: health,
            shield,
            max_shield: shield,
            alive: true,
        }
    }

    /// Vitals for an unshielded body
    pub fn unshielded(health: f32) -> Self {
        Self::new(health, NO_SHIELD)
    }

    pub fn has_shield_capacity(&self) -> bool {
        self.shield != NO_SHIELD
    }

    /// Lifecycle check. Returns `true` exactly once: on the first call that
    /// observes a living combatant with `health <= 0`. Health is clamped to 0.
    pub fn settle(&mut self) -> bool {
        if self.alive && self.health <= 0.0 {
            self.health = 0.0;
            self.alive = false;
            return true;
        }
        false
    }

    /// Kill outright regardless of remaining health/shield
    pub fn collapse(&mut self) {
        self.health = 0.0;
        self.alive = false;
    }

    /// Top up health and shield (kill rewards), capped at their maxima.
    /// An unshielded pool never gains shield.
    pub fn restore(&mut self, health: f32, shield: f32) {
        if !self.alive {
            return;
        }
        self.health = (self.health + health).min(self.max_health);
        if self.has_shield_capacity() {
            self.shield = (self.shield + shield).min(self.max_shield);
        }
    }
}

/// Apply one hit to a vitals pool and return the updated pool.
///
/// Pure: the input is never mutated. Health is not clamped here; that is the
/// job of [`Vitals::settle`].
pub fn apply_damage(vitals: Vitals, amount: f32, damage_type: DamageType) -> Vitals {
    if !vitals.alive {
        return vitals;
    }

    let mut out = vitals;
    if out.shield > 0.0 {
        let charge = match damage_type {
            DamageType::Normal => amount,
            DamageType::Plasma => amount * PLASMA_SHIELD_MULTIPLIER,
        };
        out.shield -= charge;
        if out.shield < 0.0 {
            let leftover = -out.shield;
            out.shield = 0.0;
            out.health -= leftover;
        }
    } else {
        out.health -= amount;
    }
    out
}

/// Anything that can take damage
pub trait Combatant {
    fn vitals(&self) -> &Vitals;
    fn vitals_mut(&mut self) -> &mut Vitals;
    fn category(&self) -> Category;

    fn is_alive(&self) -> bool {
        self.vitals().alive
    }

    /// Route a hit through [`apply_damage`]
    fn take_hit(&mut self, amount: f32, damage_type: DamageType) {
        let updated = apply_damage(*self.vitals(), amount, damage_type);
        *self.vitals_mut() = updated;
    }
}
