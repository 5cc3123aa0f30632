//! Pooled bullets fired by the player ship.

use crate::bounds::PlayField;
use crate::pool::{Pool, PoolStats, Poolable};
use bevy::prelude::*;
use std::collections::BTreeMap;

/// Reference to one flight of a pooled bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BulletHandle {
    pub id: u32,
    pub generation: u32,
}

#[derive(Debug, Clone)]
pub struct Bullet {
    id: u32,
    generation: u32,
    active: bool,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Bullet {
    fn new(id: u32) -> Self {
        Self {
            id,
            generation: 0,
            active: false,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
        }
    }

    pub fn handle(&self) -> BulletHandle {
        BulletHandle {
            id: self.id,
            generation: self.generation,
        }
    }
}

impl Poolable for Bullet {
    fn reset(&mut self) {
        self.velocity = Vec2::ZERO;
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

/// Every bullet in flight plus the pool they return to.
#[derive(Resource, Debug)]
pub struct BulletMagazine {
    pool: Pool<Bullet>,
    live: BTreeMap<u32, Bullet>,
}

impl BulletMagazine {
    /// Magazine with `default_capacity` bullets built up front.
    pub fn new(default_capacity: usize, max_size: usize) -> Self {
        let mut next_id = 0u32;
        let mut pool = Pool::with_capacity(default_capacity, max_size, move || {
            next_id += 1;
            Bullet::new(next_id)
        });
        pool.prewarm(default_capacity);
        Self {
            pool,
            live: BTreeMap::new(),
        }
    }

    /// Launch a bullet. A zero `direction` fires straight up.
    pub fn fire(&mut self, origin: Vec2, direction: Vec2, speed: f32) -> BulletHandle {
        let mut bullet = self.pool.acquire();
        bullet.position = origin;
        bullet.velocity = direction.try_normalize().unwrap_or(Vec2::Y) * speed;
        let handle = bullet.handle();
        self.live.insert(handle.id, bullet);
        handle
    }

    /// Return a bullet to the pool. A stale handle is ignored.
    pub fn release(&mut self, handle: BulletHandle) -> bool {
        if !self.contains(handle) {
            return false;
        }
        match self.live.remove(&handle.id) {
            Some(bullet) => {
                self.pool.release(bullet);
                true
            }
            None => false,
        }
    }

    pub fn release_all(&mut self) {
        for (_, bullet) in std::mem::take(&mut self.live) {
            self.pool.release(bullet);
        }
        self.pool.trim_to_max();
    }

    pub fn get(&self, handle: BulletHandle) -> Option<&Bullet> {
        self.live
            .get(&handle.id)
            .filter(|b| b.generation == handle.generation)
    }

    pub fn contains(&self, handle: BulletHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bullet> {
        self.live.values()
    }

    /// Move every bullet and wrap it at the field edges.
    pub fn advance(&mut self, dt: f32, bounds: &PlayField) {
        for bullet in self.live.values_mut() {
            bullet.position += bullet.velocity * dt;
            if bounds.is_out_of_bounds(bullet.position) {
                bullet.position = bounds.wrap(bullet.position);
            }
        }
    }
}

impl Default for BulletMagazine {
    fn default() -> Self {
        use crate::constants::{POOL_DEFAULT_CAPACITY, POOL_MAX_SIZE};
        Self::new(POOL_DEFAULT_CAPACITY, POOL_MAX_SIZE)
    }
}
