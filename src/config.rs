//! Runtime gameplay configuration loaded from `assets/asterax.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`], plus the per-level spawn rule table and the achievement
//! definitions. At startup, [`load_game_config`] reads `assets/asterax.toml` and
//! overwrites the defaults with any values present in the file. Missing keys fall
//! back to the compile-time defaults, so a minimal TOML can override just the
//! values you care about.
//!
//! ## Example
//!
//! ```toml
//! start_level = 1
//! asteroid_max_vel = 12.0
//!
//! [[spawn_rules]]
//! level_number = 1
//! parent_size = 3
//! parent_count = 1
//! parent_health = 2
//! child_size = 2
//! child_count = 2
//! child_health = 1
//! grandchild_size = 1
//! grandchild_count = 0
//! grandchild_health = 1
//! ```
//!
//! Keep `src/constants.rs` in sync: it remains the authoritative default source
//! used by `GameConfig::default()`.

use crate::achievements::{default_achievements, AchievementDef};
use crate::bounds::PlayField;
use crate::constants::*;
use crate::error::{validate_non_negative, validate_positive, GameError, GameResult};
use crate::spawn_rules::{default_spawn_rules, SpawnRuleTable};
use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;

/// Default location of the configuration file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/asterax.toml";

/// Runtime-tunable gameplay configuration.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Play Field ────────────────────────────────────────────────────────────
    pub field_width: f32,
    pub field_height: f32,

    // ── Asteroid Motion ───────────────────────────────────────────────────────
    pub asteroid_min_vel: f32,
    pub asteroid_max_vel: f32,
    pub asteroid_max_angular_vel: f32,
    pub asteroid_scale: f32,

    // ── Placement ─────────────────────────────────────────────────────────────
    pub min_asteroid_dist_from_player: f32,
    pub min_asteroid_dist_from_asteroids: f32,
    pub spawn_max_attempts: u32,

    // ── Pools ─────────────────────────────────────────────────────────────────
    pub pool_default_capacity: usize,
    pub pool_max_size: usize,

    // ── Player Ship ───────────────────────────────────────────────────────────
    pub player_jumps: u32,
    pub jump_delay: f32,
    pub immune_time: f32,
    pub min_player_separation: f32,
    pub min_asteroid_separation: f32,
    pub jump_max_attempts: u32,
    pub player_move_speed: f32,
    pub player_radius: f32,

    // ── Bullets ───────────────────────────────────────────────────────────────
    pub bullet_speed: f32,
    pub bullet_lifetime: f32,
    pub bullet_damage: f32,
    pub bullet_radius: f32,

    // ── Level Flow ────────────────────────────────────────────────────────────
    pub start_level: u32,
    pub pre_level_delay: f32,
    pub achievement_display_time: f32,
    pub rng_seed: u64,

    // ── Data Tables ───────────────────────────────────────────────────────────
    pub spawn_rules: SpawnRuleTable,
    pub achievements: Vec<AchievementDef>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Play Field
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            // Asteroid Motion
            asteroid_min_vel: ASTEROID_MIN_VEL,
            asteroid_max_vel: ASTEROID_MAX_VEL,
            asteroid_max_angular_vel: ASTEROID_MAX_ANGULAR_VEL,
            asteroid_scale: ASTEROID_SCALE,
            // Placement
            min_asteroid_dist_from_player: MIN_ASTEROID_DIST_FROM_PLAYER,
            min_asteroid_dist_from_asteroids: MIN_ASTEROID_DIST_FROM_ASTEROIDS,
            spawn_max_attempts: SPAWN_MAX_ATTEMPTS,
            // Pools
            pool_default_capacity: POOL_DEFAULT_CAPACITY,
            pool_max_size: POOL_MAX_SIZE,
            // Player Ship
            player_jumps: PLAYER_JUMPS,
            jump_delay: JUMP_DELAY,
            immune_time: IMMUNE_TIME,
            min_player_separation: MIN_PLAYER_SEPARATION,
            min_asteroid_separation: MIN_ASTEROID_SEPARATION,
            jump_max_attempts: JUMP_MAX_ATTEMPTS,
            player_move_speed: PLAYER_MOVE_SPEED,
            player_radius: PLAYER_RADIUS,
            // Bullets
            bullet_speed: BULLET_SPEED,
            bullet_lifetime: BULLET_LIFETIME,
            bullet_damage: BULLET_DAMAGE,
            bullet_radius: BULLET_RADIUS,
            // Level Flow
            start_level: START_LEVEL,
            pre_level_delay: PRE_LEVEL_DELAY,
            achievement_display_time: ACHIEVEMENT_DISPLAY_TIME,
            rng_seed: DEFAULT_RNG_SEED,
            // Data Tables
            spawn_rules: default_spawn_rules(),
            achievements: default_achievements(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> GameResult<Self> {
        let config: GameConfig = toml::from_str(contents).map_err(|e| GameError::ConfigParse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse `path`. A missing file yields `Ok(None)`.
    pub fn load_from_path(path: impl AsRef<Path>) -> GameResult<Option<Self>> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(GameError::ConfigRead {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };
        Self::from_toml_str(&contents).map(Some)
    }

    /// Reject values that would make the game unplayable.
    pub fn validate(&self) -> GameResult<()> {
        validate_positive("field_width", self.field_width)?;
        validate_positive("field_height", self.field_height)?;
        validate_positive("asteroid_scale", self.asteroid_scale)?;
        validate_non_negative("asteroid_min_vel", self.asteroid_min_vel)?;
        validate_non_negative("asteroid_max_angular_vel", self.asteroid_max_angular_vel)?;
        if self.asteroid_max_vel < self.asteroid_min_vel {
            return Err(GameError::UnsafeConstant {
                name: "asteroid_max_vel",
                value: self.asteroid_max_vel,
                safe_range: "[asteroid_min_vel, ∞)",
            });
        }
        validate_non_negative("jump_delay", self.jump_delay)?;
        validate_non_negative("immune_time", self.immune_time)?;
        validate_non_negative("pre_level_delay", self.pre_level_delay)?;
        validate_non_negative("achievement_display_time", self.achievement_display_time)?;
        validate_positive("bullet_lifetime", self.bullet_lifetime)?;
        self.spawn_rules.validate()
    }

    /// Play field described by this configuration.
    pub fn play_field(&self) -> PlayField {
        PlayField::new(self.field_width, self.field_height)
    }

    /// Collision radius of an asteroid of the given size.
    #[inline]
    pub fn asteroid_radius(&self, size: u32) -> f32 {
        size as f32 * self.asteroid_scale * 0.5
    }
}

/// Startup system: attempt to load [`CONFIG_PATH`] and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Parse and validation errors are logged and the compiled defaults stay in
/// place. A missing file is not an error.
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    match GameConfig::load_from_path(CONFIG_PATH) {
        Ok(Some(loaded)) => {
            *config = loaded;
            info!("Loaded game config from {CONFIG_PATH}");
        }
        Ok(None) => {
            info!("No {CONFIG_PATH} found; using compiled defaults");
        }
        Err(e) => {
            error!("{e}; using compiled defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = GameConfig::from_toml_str("asteroid_max_vel = 12.0\nstart_level = 2\n")
            .expect("valid partial config");
        assert_eq!(cfg.asteroid_max_vel, 12.0);
        assert_eq!(cfg.start_level, 2);
        assert_eq!(cfg.asteroid_min_vel, ASTEROID_MIN_VEL);
        assert_eq!(cfg.spawn_rules, default_spawn_rules());
    }

    #[test]
    fn spawn_rules_replace_default_table() {
        let src = r#"
            [[spawn_rules]]
            level_number = 4
            parent_size = 2
            parent_count = 1
            parent_health = 1
            child_size = 1
            child_count = 3
            child_health = 1
            grandchild_size = 1
            grandchild_count = 0
            grandchild_health = 1
        "#;
        let cfg = GameConfig::from_toml_str(src).expect("valid rules");
        assert_eq!(cfg.spawn_rules.len(), 1);
        assert_eq!(cfg.spawn_rules.max_level(), Some(4));
        assert_eq!(cfg.spawn_rules.try_get_rule(4).map(|r| r.child_count), Some(3));
    }

    #[test]
    fn inverted_velocity_range_is_rejected() {
        let err = GameConfig::from_toml_str("asteroid_min_vel = 9.0\nasteroid_max_vel = 2.0\n")
            .expect_err("min > max must fail");
        assert!(matches!(err, GameError::UnsafeConstant { name: "asteroid_max_vel", .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = GameConfig::from_toml_str("field_width = \"wide\"").expect_err("type mismatch");
        assert!(matches!(err, GameError::ConfigParse { .. }));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let loaded = GameConfig::load_from_path("does/not/exist.toml").expect("no error");
        assert!(loaded.is_none());
    }

    #[test]
    fn asteroid_radius_scales_with_size() {
        let cfg = GameConfig::default();
        assert!((cfg.asteroid_radius(2) - 2.0 * cfg.asteroid_radius(1)).abs() < 1e-6);
    }
}
