//! Gravshot - combat and gravity-well core for a vertical arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (damage, gravity wells, projectiles, beams, fragmentation)
//! - `tuning`: Data-driven game balance
//!
//! Screen coordinates: origin top-left, +Y points down. The player sits near
//! the bottom and fires upward; hostiles fire downward.

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frames per second the per-frame balance numbers were authored against
    pub const FRAME_RATE: f32 = 60.0;

    /// Play area
    pub const SCREEN_WIDTH: f32 = 1400.0;
    pub const SCREEN_HEIGHT: f32 = 700.0;

    /// Gravity wells
    pub const WELL_SIZE: f32 = 160.0;
    pub const WELL_KILL_RADIUS: f32 = 2.0;
    /// Bounds inflation before a drifting well is discarded
    pub const WELL_DESPAWN_MARGIN: f32 = 300.0;
    /// Spawn offset outside the screen edge
    pub const WELL_SPAWN_OFFSET: f32 = 50.0;
    pub const WELL_PULL_MIN: f32 = 2.5;
    pub const WELL_PULL_MAX: f32 = 13.0;
    pub const PLAYER_ATTRACTION_RANGE: f32 = 110.0;
    pub const PLAYER_ATTRACTION_STRENGTH: f32 = 1.8;
    pub const STANDARD_ATTRACTION_RANGE: f32 = 260.0;
    pub const STANDARD_ATTRACTION_STRENGTH: f32 = 0.02;
    pub const DESTRUCTIBLE_ATTRACTION_RANGE: f32 = 290.0;
    pub const DESTRUCTIBLE_ATTRACTION_STRENGTH: f32 = 0.005;
    /// Smallest warp scale for ships and projectiles
    pub const WARP_MIN_SCALE: f32 = 0.05;
    /// Asteroids barely shrink
    pub const WARP_DESTRUCTIBLE_MIN_SCALE: f32 = 0.95;

    /// Plasma hits charge shields at this multiple of the nominal amount
    pub const PLASMA_SHIELD_MULTIPLIER: f32 = 5.0;

    /// Explosion animation length (8 frames of 100 ms)
    pub const EXPLOSION_TICKS: u32 = 48;
    /// Freeze bolt lock-out
    pub const FREEZE_DURATION_SECS: f32 = 3.0;

    /// Continuous beam
    pub const BEAM_MAX_FUEL: f32 = 100.0;
    pub const BEAM_DRAIN_PER_SEC: f32 = 20.0;
    pub const BEAM_RECHARGE_PER_SEC: f32 = 10.0;
    pub const BEAM_SEGMENT_SPEED: f32 = 35.0 * FRAME_RATE;
    pub const BEAM_WIDTH: f32 = 2.0;
    pub const BEAM_SEGMENT_MIN_LEN: f32 = 30.0;
    pub const BEAM_SEGMENT_MAX_LEN: f32 = 50.0;
    pub const BEAM_DAMAGE_DESTRUCTIBLE: f32 = 30.0;
    pub const BEAM_DAMAGE_HOSTILE: f32 = 5.0;
    pub const BEAM_DAMAGE_PLAYER: f32 = 1.0;

    /// Asteroids
    pub const ASTEROID_BASE_SIZE: f32 = 100.0;
    pub const ASTEROID_COLLISION_DAMAGE: f32 = 80.0;
    pub const ASTEROID_DEFAULT_HEALTH: f32 = 20.0;
    pub const ASTEROID_MIN_SCALE: f32 = 0.1;
    pub const ASTEROID_MIN_CHILD_HEALTH: f32 = 5.0;
    pub const ASTEROID_JITTER: f32 = 20.0;
    pub const ASTEROID_SCORE: u64 = 10;
    /// How far past a side edge an asteroid may drift before it is culled
    pub const ASTEROID_CULL_MARGIN: f32 = 1000.0;
    /// Rocket splash against asteroids
    pub const ROCKET_ASTEROID_DAMAGE: f32 = 100.0;
}

/// Unit direction from `from` toward `to`, or `fallback` when the two points
/// coincide (or the result would not be finite).
#[inline]
pub fn aim_direction(from: Vec2, to: Vec2, fallback: Vec2) -> Vec2 {
    (to - from).try_normalize().unwrap_or(fallback)
}

/// Convert a per-frame speed (pixels per 60 Hz frame) to pixels per second
#[inline]
pub fn per_frame(speed: f32) -> f32 {
    speed * consts::FRAME_RATE
}
