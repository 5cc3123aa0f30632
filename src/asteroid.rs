//! Asteroid entity, health and initial motion.
//!
//! Asteroids are plain values owned either by the live store in
//! [`crate::field::AsteroidField`] or by its pool. Callers refer to a live
//! asteroid through an [`AsteroidHandle`]; the handle's generation changes every
//! time the instance goes back to the pool, so a handle kept across a release no
//! longer resolves.

use crate::bounds::PlayField;
use crate::config::GameConfig;
use crate::constants::RECENTER_TARGET_RADIUS;
use crate::pool::Poolable;
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

/// Stable identity of a pooled asteroid instance. Survives reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AsteroidId(pub u32);

/// Reference to one life of an asteroid instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AsteroidHandle {
    pub id: AsteroidId,
    pub generation: u32,
}

/// Hit points with the clamping rules of the game's damage model.
///
/// A zero `max` disables clamping. Once the value drops to zero the health is
/// dead until [`Health::reset`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    value: f32,
    max: f32,
    dead: bool,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            value: max,
            max,
            dead: max <= 0.0,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Add `delta` (negative for damage).
    pub fn change_value(&mut self, delta: f32) {
        self.value += delta;
        if self.max != 0.0 {
            self.value = self.value.clamp(0.0, self.max);
        }
        if self.value <= 0.0 {
            self.dead = true;
        }
    }

    pub fn reset(&mut self) {
        self.value = self.max;
        self.dead = self.max <= 0.0;
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Linear and angular velocity of a free-flying asteroid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub linear: Vec2,
    /// Radians per second, counter-clockwise positive.
    pub angular: f32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity {
        linear: Vec2::ZERO,
        angular: 0.0,
    };
}

#[derive(Debug, Clone)]
pub struct Asteroid {
    id: AsteroidId,
    generation: u32,
    active: bool,
    /// Size tier; 1 is the smallest fragment.
    pub size: u32,
    pub health: Health,
    /// Score awarded when a bullet hits this asteroid.
    pub point_value: u32,
    /// Damage dealt to the player ship on contact.
    pub damage_value: u32,
    /// World position for top-level asteroids, offset from the parent when attached.
    pub position: Vec2,
    /// Radians; relative to the parent when attached.
    pub rotation: f32,
    pub velocity: Velocity,
    pub parent: Option<AsteroidId>,
    pub children: Vec<AsteroidId>,
    /// Whether the asteroid wraps at field edges. Attached fragments ride their parent.
    pub wrap_enabled: bool,
}

impl Asteroid {
    pub fn new(id: AsteroidId) -> Self {
        Self {
            id,
            generation: 0,
            active: false,
            size: 1,
            health: Health::default(),
            point_value: 0,
            damage_value: 0,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Velocity::ZERO,
            parent: None,
            children: Vec::new(),
            wrap_enabled: true,
        }
    }

    #[inline]
    pub fn id(&self) -> AsteroidId {
        self.id
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[inline]
    pub fn handle(&self) -> AsteroidHandle {
        AsteroidHandle {
            id: self.id,
            generation: self.generation,
        }
    }

    /// `true` while this asteroid rides under a parent.
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }
}

impl Poolable for Asteroid {
    fn reset(&mut self) {
        self.velocity = Velocity::ZERO;
        self.parent = None;
        self.children.clear();
        self.wrap_enabled = true;
    }

    fn set_active(&mut self, active: bool) {
        if self.active && !active {
            self.generation = self.generation.wrapping_add(1);
        }
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

// ── Random sampling helpers ───────────────────────────────────────────────────

/// Uniformly random direction.
pub fn random_unit_vector(rng: &mut impl Rng) -> Vec2 {
    Vec2::from_angle(rng.gen_range(0.0..TAU))
}

/// Uniformly random point inside the unit disc.
pub fn random_in_unit_disc(rng: &mut impl Rng) -> Vec2 {
    random_unit_vector(rng) * rng.gen_range(0.0f32..=1.0).sqrt()
}

/// Initial velocity for an asteroid released at `position`.
///
/// An asteroid outside the field heads back toward a random point near the
/// centre; one inside picks a random heading. Speed is drawn from the configured
/// range and divided by size so larger asteroids drift slower.
pub fn initial_velocity(
    position: Vec2,
    size: u32,
    field: &PlayField,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Velocity {
    let direction = if field.is_out_of_bounds(position) {
        let target = field.center + random_in_unit_disc(rng) * RECENTER_TARGET_RADIUS;
        let toward = (target - position).normalize_or_zero();
        if toward == Vec2::ZERO {
            random_unit_vector(rng)
        } else {
            toward
        }
    } else {
        random_unit_vector(rng)
    };

    let speed = rng.gen_range(config.asteroid_min_vel..=config.asteroid_max_vel) / size.max(1) as f32;
    let max_ang = config.asteroid_max_angular_vel;

    Velocity {
        linear: direction * speed,
        angular: rng.gen_range(-max_ang..=max_ang),
    }
}
