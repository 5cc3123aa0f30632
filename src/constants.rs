//! Centralised gameplay constants.
//!
//! Every tuneable value lives here so it can be found and reasoned about in one
//! place. [`crate::config::GameConfig::default`] mirrors these values; a TOML file
//! can override any subset at startup.
//!
//! ## Tuning guidance
//!
//! Distances are in world units. The play field is sized after an orthographic
//! camera of half-height 9 at a 16:9 aspect, so one unit is roughly one asteroid
//! of size 1 at scale 1.0.

// ── Play Field ────────────────────────────────────────────────────────────────

/// Width of the play field (world units), centred on the origin.
pub const FIELD_WIDTH: f32 = 32.0;

/// Height of the play field (world units), centred on the origin.
pub const FIELD_HEIGHT: f32 = 18.0;

/// Distance an object is nudged back inside the field after wrapping.
///
/// Keeps a wrapped object from immediately re-triggering the opposite edge test.
pub const WRAP_EPSILON: f32 = 0.001;

// ── Asteroid Motion ──────────────────────────────────────────────────────────

/// Lower bound of the random initial speed, before dividing by asteroid size.
pub const ASTEROID_MIN_VEL: f32 = 5.0;

/// Upper bound of the random initial speed, before dividing by asteroid size.
pub const ASTEROID_MAX_VEL: f32 = 10.0;

/// Maximum magnitude of the random initial angular velocity (rad/s).
pub const ASTEROID_MAX_ANGULAR_VEL: f32 = 10.0;

/// World-space diameter of a size-1 asteroid. Radius scales linearly with size.
pub const ASTEROID_SCALE: f32 = 0.75;

/// Radius of the disc around the field centre that out-of-bounds asteroids aim at.
pub const RECENTER_TARGET_RADIUS: f32 = 4.0;

/// Local offset radius for a fragment attached under its parent.
pub const FRAGMENT_OFFSET_RADIUS: f32 = 0.5;

// ── Placement ────────────────────────────────────────────────────────────────

/// Minimum distance between a freshly placed asteroid cluster and the player ship.
pub const MIN_ASTEROID_DIST_FROM_PLAYER: f32 = 5.0;

/// Minimum distance between a freshly placed asteroid cluster and any live asteroid.
pub const MIN_ASTEROID_DIST_FROM_ASTEROIDS: f32 = 3.0;

/// Rejection-sampling budget for cluster placement before falling back to an
/// unconstrained point.
pub const SPAWN_MAX_ATTEMPTS: u32 = 50;

// ── Pools ────────────────────────────────────────────────────────────────────

/// Free-list capacity reserved up front by each pool.
pub const POOL_DEFAULT_CAPACITY: usize = 10;

/// Free-list size above which [`crate::pool::Pool::trim_to_max`] destroys instances.
pub const POOL_MAX_SIZE: usize = 10;

// ── Player Ship ──────────────────────────────────────────────────────────────

/// Jumps the player starts with. A jump is spent on every asteroid contact.
pub const PLAYER_JUMPS: u32 = 3;

/// Seconds the ship stays hidden between a hit and reappearing.
pub const JUMP_DELAY: f32 = 1.0;

/// Seconds of hit immunity after reappearing.
pub const IMMUNE_TIME: f32 = 1.0;

/// Minimum distance between the reappearing ship and the position it left.
pub const MIN_PLAYER_SEPARATION: f32 = 5.0;

/// Minimum distance between the reappearing ship and any asteroid.
pub const MIN_ASTEROID_SEPARATION: f32 = 3.0;

/// Rejection-sampling budget for the jump destination.
pub const JUMP_MAX_ATTEMPTS: u32 = 20;

/// Ship speed (u/s) at full move input.
pub const PLAYER_MOVE_SPEED: f32 = 10.0;

/// Radius (u) used for ship–asteroid contact tests.
pub const PLAYER_RADIUS: f32 = 0.5;

// ── Bullets ──────────────────────────────────────────────────────────────────

/// Bullet speed (u/s).
pub const BULLET_SPEED: f32 = 20.0;

/// Seconds after which a bullet returns to its pool.
pub const BULLET_LIFETIME: f32 = 2.0;

/// Health removed from an asteroid per bullet impact.
pub const BULLET_DAMAGE: f32 = 1.0;

/// Radius (u) used for bullet–asteroid contact tests.
pub const BULLET_RADIUS: f32 = 0.1;

// ── Level Flow ───────────────────────────────────────────────────────────────

/// Level number the game starts at.
pub const START_LEVEL: u32 = 1;

/// Seconds spent in `PreLevel` before the level's asteroids spawn.
pub const PRE_LEVEL_DELAY: f32 = 2.0;

/// Seconds an unlocked achievement stays on display before the next one.
pub const ACHIEVEMENT_DISPLAY_TIME: f32 = 3.0;

/// Seed for the gameplay RNG.
pub const DEFAULT_RNG_SEED: u64 = 42;
