//! Safe spawn placement by bounded rejection sampling.

use crate::bounds::PlayField;
use bevy::prelude::*;
use rand::Rng;

/// Result of a placement search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPosition {
    pub point: Vec2,
    /// `true` when every attempt was rejected and `point` is unconstrained.
    pub fallback: bool,
}

/// Distance constraints for [`safe_spawn_position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRules {
    pub min_player_dist: f32,
    pub min_asteroid_dist: f32,
    pub max_attempts: u32,
}

/// Sample points in `field` until one is farther than `min_player_dist` from
/// `player` and farther than `min_asteroid_dist` from every asteroid.
///
/// After `max_attempts` rejections an unconstrained random point is returned,
/// so a crowded field may yield an overlapping spawn. Never fails.
pub fn safe_spawn_position(
    field: &PlayField,
    player: Vec2,
    asteroids: &[Vec2],
    rules: PlacementRules,
    rng: &mut impl Rng,
) -> SpawnPosition {
    let sq_player = rules.min_player_dist * rules.min_player_dist;
    let sq_asteroid = rules.min_asteroid_dist * rules.min_asteroid_dist;

    for _ in 0..rules.max_attempts {
        let candidate = field.random_point(rng);

        if candidate.distance_squared(player) <= sq_player {
            continue;
        }
        if asteroids
            .iter()
            .any(|a| a.distance_squared(candidate) <= sq_asteroid)
        {
            continue;
        }

        return SpawnPosition {
            point: candidate,
            fallback: false,
        };
    }

    SpawnPosition {
        point: field.random_point(rng),
        fallback: true,
    }
}
