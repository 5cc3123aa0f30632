//! Typed message channels between the gameplay systems.

use crate::asteroid::AsteroidHandle;
use bevy::prelude::*;

/// Request to begin a new game from the menu or after game over.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct StartGame;

/// A level has begun; the manager spawns its clusters.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelStarted {
    pub level: u32,
}

/// Every asteroid of the level is gone.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCleared {
    pub level: u32,
}

/// What struck an asteroid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSource {
    Bullet,
    Player,
}

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct AsteroidHit {
    pub target: AsteroidHandle,
    pub damage: f32,
    pub source: HitSource,
}

/// An asteroid died and left the field.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct AsteroidDestroyed {
    pub handle: AsteroidHandle,
    pub size: u32,
    pub points: u32,
    pub position: Vec2,
    /// Size relative to the largest configured parent, in `[0, 1]`.
    pub effect_scale: f32,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddScore {
    pub amount: u32,
}

/// Launch a bullet from `origin` heading along `direction`.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct FireBullet {
    pub origin: Vec2,
    pub direction: Vec2,
}

/// Switch between playing a level and the pause screen.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct TogglePause;
