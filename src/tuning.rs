//! Game balance
//!
//! Every balance number the simulation reads lives in [`Tuning`]. Defaults
//! come from [`crate::consts`]; a JSON file may override any subset of
//! fields (missing keys keep their defaults).

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::per_frame;
use crate::sim::collision::Rect;
use crate::sim::gravity::{AttractionTable, GravityClass};
use crate::sim::projectile::{ShotProfile, WeaponProfile};

/// Gravity well parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityTuning {
    pub well_size: f32,
    pub kill_radius: f32,
    pub despawn_margin: f32,
    pub spawn_offset: f32,
    /// Per-tick pull floor (pixels)
    pub pull_min: f32,
    /// Per-tick pull ceiling (pixels)
    pub pull_max: f32,
    pub attraction: AttractionTable,
    /// Classes wells never touch
    pub exempt: Vec<GravityClass>,
}

impl Default for GravityTuning {
    fn default() -> Self {
        Self {
            well_size: WELL_SIZE,
            kill_radius: WELL_KILL_RADIUS,
            despawn_margin: WELL_DESPAWN_MARGIN,
            spawn_offset: WELL_SPAWN_OFFSET,
            pull_min: WELL_PULL_MIN,
            pull_max: WELL_PULL_MAX,
            attraction: AttractionTable::default(),
            exempt: vec![GravityClass::AntiGravity],
        }
    }
}

/// Projectile weapons
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    pub bolt: WeaponProfile,
    pub heavy_bolt: WeaponProfile,
    /// `damage` is the splash dealt to ships
    pub rocket: WeaponProfile,
    pub plasma: WeaponProfile,
    pub freeze_bolt: WeaponProfile,
    /// Proximity zone of player rockets
    pub rocket_zone_player: Vec2,
    /// Proximity zone of hostile rockets (smaller)
    pub rocket_zone_hostile: Vec2,
    /// How far ahead of the rocket the zone is centered
    pub rocket_zone_lead: f32,
    pub rocket_asteroid_damage: f32,
    /// Plasma arms when anything enters this zone
    pub plasma_trigger_zone: Vec2,
    /// Plasma detonation area
    pub plasma_blast_zone: Vec2,
    pub explosion_ticks: u32,
    pub freeze_duration_secs: f32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        let bolt = ShotProfile::new(per_frame(12.0), 10.0, Vec2::new(6.0, 24.0));
        let freeze = ShotProfile::new(per_frame(10.0), 30.0, Vec2::new(20.0, 40.0));
        let plasma = ShotProfile::new(per_frame(8.0), 40.0, Vec2::new(24.0, 24.0));
        Self {
            bolt: WeaponProfile::symmetric(bolt),
            // Hostile heavy shots are weaker and slower
            heavy_bolt: WeaponProfile {
                player: ShotProfile::new(per_frame(14.0), 50.0, Vec2::new(18.0, 45.0)),
                hostile: ShotProfile::new(per_frame(6.0), 10.0, Vec2::new(18.0, 45.0)),
            },
            rocket: WeaponProfile {
                player: ShotProfile::new(per_frame(12.0), 200.0, Vec2::new(20.0, 50.0)),
                hostile: ShotProfile::new(per_frame(6.0), 50.0, Vec2::new(20.0, 50.0)),
            },
            plasma: WeaponProfile::symmetric(plasma),
            freeze_bolt: WeaponProfile::symmetric(freeze),
            rocket_zone_player: Vec2::new(100.0, 40.0),
            rocket_zone_hostile: Vec2::new(80.0, 30.0),
            rocket_zone_lead: 30.0,
            rocket_asteroid_damage: ROCKET_ASTEROID_DAMAGE,
            plasma_trigger_zone: Vec2::new(60.0, 60.0),
            plasma_blast_zone: Vec2::new(220.0, 220.0),
            explosion_ticks: EXPLOSION_TICKS,
            freeze_duration_secs: FREEZE_DURATION_SECS,
        }
    }
}

/// Continuous beam
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamTuning {
    pub max_fuel: f32,
    pub drain_per_sec: f32,
    pub recharge_per_sec: f32,
    /// Segment travel speed (pixels per second)
    pub segment_speed: f32,
    pub width: f32,
    pub segment_min_len: f32,
    pub segment_max_len: f32,
    pub damage_destructible: f32,
    /// Player beam against each hostile it touches
    pub damage_hostile: f32,
    /// Hostile beam against the player
    pub damage_player: f32,
}

impl Default for BeamTuning {
    fn default() -> Self {
        Self {
            max_fuel: BEAM_MAX_FUEL,
            drain_per_sec: BEAM_DRAIN_PER_SEC,
            recharge_per_sec: BEAM_RECHARGE_PER_SEC,
            segment_speed: BEAM_SEGMENT_SPEED,
            width: BEAM_WIDTH,
            segment_min_len: BEAM_SEGMENT_MIN_LEN,
            segment_max_len: BEAM_SEGMENT_MAX_LEN,
            damage_destructible: BEAM_DAMAGE_DESTRUCTIBLE,
            damage_hostile: BEAM_DAMAGE_HOSTILE,
            damage_player: BEAM_DAMAGE_PLAYER,
        }
    }
}

/// Asteroids and their fragments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidTuning {
    /// Hitbox side at scale 1.0
    pub base_size: f32,
    pub collision_damage: f32,
    pub default_health: f32,
    /// Children below this scale are not spawned
    pub min_scale: f32,
    pub min_child_health: f32,
    pub jitter: f32,
    pub score: u64,
}

impl Default for AsteroidTuning {
    fn default() -> Self {
        Self {
            base_size: ASTEROID_BASE_SIZE,
            collision_damage: ASTEROID_COLLISION_DAMAGE,
            default_health: ASTEROID_DEFAULT_HEALTH,
            min_scale: ASTEROID_MIN_SCALE,
            min_child_health: ASTEROID_MIN_CHILD_HEALTH,
            jitter: ASTEROID_JITTER,
            score: ASTEROID_SCORE,
        }
    }
}

/// All balance numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub screen_width: f32,
    pub screen_height: f32,
    pub gravity: GravityTuning,
    pub weapons: WeaponTuning,
    pub beam: BeamTuning,
    pub asteroids: AsteroidTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            gravity: GravityTuning::default(),
            weapons: WeaponTuning::default(),
            beam: BeamTuning::default(),
            asteroids: AsteroidTuning::default(),
        }
    }
}

impl Tuning {
    /// Play area rectangle
    pub fn bounds(&self) -> Rect {
        Rect::new(Vec2::ZERO, Vec2::new(self.screen_width, self.screen_height))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a JSON file, falling back to defaults on any problem
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read tuning {}: {} - using defaults", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Invalid tuning {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}
