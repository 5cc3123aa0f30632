//! Level orchestration: the registry of live asteroids and the spawn state machine.
//!
//! [`AsteraxManager`] owns the [`AsteroidField`]. A level start spawns the
//! rule's parent clusters at safe positions; every removal checks whether the
//! field just emptied and, if a level is running, reports the clear exactly once.

use crate::asteroid::{initial_velocity, AsteroidHandle};
use crate::bounds::PlayField;
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::events::{AsteroidDestroyed, AsteroidHit, LevelCleared};
use crate::field::AsteroidField;
use crate::fragmentation::{initialize_cluster, on_hit};
use crate::placement::{safe_spawn_position, PlacementRules};
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnPhase {
    #[default]
    Idle,
    Spawning,
}

/// Read-only world state a level spawn depends on.
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext<'a> {
    pub bounds: &'a PlayField,
    pub player: Vec2,
    pub config: &'a GameConfig,
}

/// What a call to [`AsteraxManager::spawn_level`] produced.
#[derive(Debug, Default)]
pub struct LevelSpawn {
    pub clusters: Vec<AsteroidHandle>,
    /// Parents plus all attached fragments.
    pub asteroids: usize,
    /// Placements that exhausted their attempts.
    pub fallbacks: usize,
    pub cleared: Option<LevelCleared>,
}

/// Asteroids that left the field, and the level clear they caused, if any.
#[derive(Debug, Default)]
pub struct Removal {
    pub released: Vec<AsteroidHandle>,
    pub cleared: Option<LevelCleared>,
}

/// Outcome of applying one [`AsteroidHit`].
#[derive(Debug, Default)]
pub struct HitOutcome {
    /// Point value of the target at the moment it was struck.
    pub points: u32,
    /// Fragments knocked loose by the hit.
    pub freed: Vec<AsteroidHandle>,
    pub destroyed: Option<AsteroidDestroyed>,
    pub removal: Removal,
}

#[derive(Resource, Debug)]
pub struct AsteraxManager {
    field: AsteroidField,
    phase: SpawnPhase,
    /// Level waiting for its clear signal.
    active_level: Option<u32>,
}

impl AsteraxManager {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            field: AsteroidField::new(
                config.pool_default_capacity,
                config.pool_max_size,
                config.asteroid_scale,
            ),
            phase: SpawnPhase::Idle,
            active_level: None,
        }
    }

    pub fn field(&self) -> &AsteroidField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut AsteroidField {
        &mut self.field
    }

    pub fn phase(&self) -> SpawnPhase {
        self.phase
    }

    pub fn is_spawning(&self) -> bool {
        self.phase == SpawnPhase::Spawning
    }

    pub fn active_level(&self) -> Option<u32> {
        self.active_level
    }

    /// Number of live asteroids, attached fragments included.
    pub fn asteroid_count(&self) -> usize {
        self.field.len()
    }

    /// Spawn the clusters for `level`.
    ///
    /// Does nothing while another spawn is in progress. A level with no rule, or
    /// one whose rule spawns nothing, is cleared immediately.
    pub fn spawn_level(&mut self, level: u32, ctx: SpawnContext, rng: &mut impl Rng) -> LevelSpawn {
        if self.is_spawning() {
            warn!("Level {level} start ignored: a spawn is already in progress");
            return LevelSpawn::default();
        }
        self.phase = SpawnPhase::Spawning;
        self.active_level = Some(level);

        let mut result = LevelSpawn::default();
        match ctx.config.spawn_rules.try_get_rule(level) {
            Some(rule) => {
                self.field.prewarm(rule.total_asteroids() as usize);
                let placement = PlacementRules {
                    min_player_dist: ctx.config.min_asteroid_dist_from_player,
                    min_asteroid_dist: ctx.config.min_asteroid_dist_from_asteroids,
                    max_attempts: ctx.config.spawn_max_attempts,
                };
                for _ in 0..rule.parent_count {
                    let occupied = self.field.world_positions();
                    let spot = safe_spawn_position(ctx.bounds, ctx.player, &occupied, placement, rng);
                    if spot.fallback {
                        result.fallbacks += 1;
                    }

                    let root = self.field.spawn(rule.parent_size);
                    if let Some(a) = self.field.get_mut(root) {
                        a.position = spot.point;
                        a.rotation = rng.gen_range(0.0..TAU);
                        a.wrap_enabled = true;
                        a.velocity =
                            initial_velocity(spot.point, a.size, ctx.bounds, ctx.config, rng);
                    }
                    let fragments = initialize_cluster(&mut self.field, root, &rule, rng);

                    result.asteroids += 1 + fragments.len();
                    result.clusters.push(root);
                }
            }
            None => warn!("No spawn rule for level {level}; nothing to spawn"),
        }
        self.phase = SpawnPhase::Idle;

        if result.fallbacks > 0 {
            debug!("Level {level}: {} placements fell back to unconstrained points", result.fallbacks);
        }
        info!(
            "Level {level}: spawned {} clusters ({} asteroids)",
            result.clusters.len(),
            result.asteroids
        );

        result.cleared = self.check_cleared();
        result
    }

    /// Remove `handle` (and anything still attached to it) from the field.
    ///
    /// A stale handle removes nothing. The removal that empties the field during
    /// an active level reports the clear; later removals never report it again.
    pub fn remove_asteroid(&mut self, handle: AsteroidHandle) -> Removal {
        let released = self.field.release(handle);
        if released.is_empty() {
            debug!("Ignoring removal of stale asteroid {:?}", handle);
            return Removal::default();
        }
        Removal {
            released,
            cleared: self.check_cleared(),
        }
    }

    /// Apply damage from `hit`: the target sheds its fragments, loses health and
    /// leaves the field if that killed it.
    pub fn apply_hit(
        &mut self,
        hit: &AsteroidHit,
        bounds: &PlayField,
        config: &GameConfig,
        rng: &mut impl Rng,
    ) -> GameResult<HitOutcome> {
        let points = self
            .field
            .get(hit.target)
            .map(|a| a.point_value)
            .ok_or(GameError::StaleHandle { context: "apply_hit" })?;

        let freed = on_hit(&mut self.field, hit.target, bounds, config, rng);

        let mut outcome = HitOutcome {
            points,
            freed,
            ..HitOutcome::default()
        };

        let died = match self.field.get_mut(hit.target) {
            Some(target) => {
                target.health.change_value(-hit.damage);
                target.health.is_dead()
            }
            None => false,
        };
        if died {
            let max_parent = config.spawn_rules.global_max_parent_size() as f32;
            if let Some(target) = self.field.get(hit.target) {
                outcome.destroyed = Some(AsteroidDestroyed {
                    handle: hit.target,
                    size: target.size,
                    points: target.point_value,
                    position: self.field.world_position(hit.target.id).unwrap_or(target.position),
                    effect_scale: (target.size as f32 / max_parent).clamp(0.0, 1.0),
                });
            }
            outcome.removal = self.remove_asteroid(hit.target);
        }
        Ok(outcome)
    }

    /// Move every free asteroid by its velocity and wrap it at the field edges.
    pub fn advance_motion(&mut self, dt: f32, bounds: &PlayField) {
        for asteroid in self.field.iter_mut() {
            if asteroid.is_attached() {
                continue;
            }
            asteroid.position += asteroid.velocity.linear * dt;
            asteroid.rotation = (asteroid.rotation + asteroid.velocity.angular * dt).rem_euclid(TAU);
            if asteroid.wrap_enabled && bounds.is_out_of_bounds(asteroid.position) {
                asteroid.position = bounds.wrap(asteroid.position);
            }
        }
    }

    /// First asteroid, in id order, whose collision circle overlaps the circle
    /// at `point` with `radius`.
    ///
    /// Attached fragments count as part of their cluster's shape, but contact
    /// with one resolves to the cluster root.
    pub fn overlapping(&self, point: Vec2, radius: f32, config: &GameConfig) -> Option<AsteroidHandle> {
        self.field.iter().find_map(|a| {
            let pos = self.field.world_position(a.id())?;
            let reach = config.asteroid_radius(a.size) + radius;
            if pos.distance_squared(point) >= reach * reach {
                return None;
            }
            self.field.root_of(a.id())
        })
    }

    /// Release every live asteroid without signalling a clear. Returns how many
    /// were released.
    pub fn clear_level(&mut self) -> usize {
        self.active_level = None;
        let released = self.field.release_all();
        self.field.trim_pool();
        released
    }

    fn check_cleared(&mut self) -> Option<LevelCleared> {
        if !self.field.is_empty() {
            return None;
        }
        self.active_level.take().map(|level| {
            info!("Level {level} cleared");
            LevelCleared { level }
        })
    }
}

impl Default for AsteraxManager {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}
