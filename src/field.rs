//! Pooled asteroid storage with a parent/child hierarchy.
//!
//! [`AsteroidField`] owns every asteroid instance: live ones in an ordered map
//! keyed by [`AsteroidId`], parked ones in a [`Pool`]. Attached fragments store
//! their position and rotation relative to the parent, in units of the parent's
//! diameter, the way a child transform sits under its parent.
//!
//! Releasing an asteroid also releases every fragment still attached under it.
//! Fragments that should outlive their parent must be detached first (see
//! [`crate::fragmentation::on_hit`]).

use crate::asteroid::{Asteroid, AsteroidHandle, AsteroidId};
use crate::pool::{Pool, PoolStats};
use bevy::prelude::*;
use std::collections::BTreeMap;

pub struct AsteroidField {
    pool: Pool<Asteroid>,
    live: BTreeMap<AsteroidId, Asteroid>,
    /// World-space diameter of a size-1 asteroid.
    unit_scale: f32,
}

impl AsteroidField {
    pub fn new(default_capacity: usize, max_size: usize, unit_scale: f32) -> Self {
        let mut next_id = 0u32;
        let pool = Pool::with_capacity(default_capacity, max_size, move || {
            next_id += 1;
            Asteroid::new(AsteroidId(next_id))
        });
        Self {
            pool,
            live: BTreeMap::new(),
            unit_scale,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Acquire a top-level asteroid of `size` from the pool and make it live.
    pub fn spawn(&mut self, size: u32) -> AsteroidHandle {
        let mut asteroid = self.pool.acquire();
        asteroid.size = size.max(1);
        let handle = asteroid.handle();
        self.live.insert(handle.id, asteroid);
        handle
    }

    /// Release `handle` and every fragment still attached beneath it.
    ///
    /// Returns the handles that left the field, root first. A stale handle
    /// releases nothing.
    pub fn release(&mut self, handle: AsteroidHandle) -> Vec<AsteroidHandle> {
        if !self.contains(handle) {
            return Vec::new();
        }

        if let Some(parent_id) = self.live.get(&handle.id).and_then(|a| a.parent) {
            if let Some(parent) = self.live.get_mut(&parent_id) {
                parent.children.retain(|c| *c != handle.id);
            }
        }

        let mut order = vec![handle.id];
        order.extend(self.descendants(handle.id));

        let mut released = Vec::with_capacity(order.len());
        for id in order {
            if let Some(asteroid) = self.live.remove(&id) {
                released.push(asteroid.handle());
                self.pool.release(asteroid);
            }
        }
        released
    }

    /// Release every live asteroid. Returns how many were released.
    pub fn release_all(&mut self) -> usize {
        let count = self.live.len();
        let all = std::mem::take(&mut self.live);
        for (_, asteroid) in all {
            self.pool.release(asteroid);
        }
        count
    }

    /// Destroy pooled instances beyond the pool's max size.
    pub fn trim_pool(&mut self) -> usize {
        self.pool.trim_to_max()
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    pub fn get(&self, handle: AsteroidHandle) -> Option<&Asteroid> {
        self.live
            .get(&handle.id)
            .filter(|a| a.generation() == handle.generation)
    }

    pub fn get_mut(&mut self, handle: AsteroidHandle) -> Option<&mut Asteroid> {
        self.live
            .get_mut(&handle.id)
            .filter(|a| a.generation() == handle.generation)
    }

    pub fn get_by_id(&self, id: AsteroidId) -> Option<&Asteroid> {
        self.live.get(&id)
    }

    pub fn get_by_id_mut(&mut self, id: AsteroidId) -> Option<&mut Asteroid> {
        self.live.get_mut(&id)
    }

    /// `true` when `handle` still names a live asteroid.
    pub fn contains(&self, handle: AsteroidHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asteroid> {
        self.live.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Asteroid> {
        self.live.values_mut()
    }

    /// Handles of every live asteroid, in id order.
    pub fn handles(&self) -> Vec<AsteroidHandle> {
        self.live.values().map(Asteroid::handle).collect()
    }

    /// Handles of live asteroids that are not attached to a parent.
    pub fn top_level(&self) -> Vec<AsteroidHandle> {
        self.live
            .values()
            .filter(|a| !a.is_attached())
            .map(Asteroid::handle)
            .collect()
    }

    /// World positions of every live asteroid, attached fragments included.
    pub fn world_positions(&self) -> Vec<Vec2> {
        self.live
            .keys()
            .filter_map(|id| self.world_position(*id))
            .collect()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn pooled(&self) -> usize {
        self.pool.count_inactive()
    }

    /// Fill the free list so the next `count` spawns reuse parked instances.
    pub fn prewarm(&mut self, count: usize) {
        self.pool.prewarm(count);
    }

    // ── Hierarchy ─────────────────────────────────────────────────────────────

    /// All live asteroids attached below `id`, depth first.
    pub fn descendants(&self, id: AsteroidId) -> Vec<AsteroidId> {
        let mut out = Vec::new();
        let mut stack: Vec<AsteroidId> = self
            .live
            .get(&id)
            .map(|a| a.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(a) = self.live.get(&next) {
                stack.extend(a.children.iter().rev().copied());
            }
        }
        out
    }

    /// Attach `child` under `parent`. The child's position becomes a local offset
    /// and it stops moving and wrapping on its own.
    pub fn attach(&mut self, child: AsteroidId, parent: AsteroidId) -> bool {
        if child == parent || !self.live.contains_key(&parent) {
            return false;
        }
        let Some(c) = self.live.get_mut(&child) else {
            return false;
        };
        if c.parent.is_some() {
            return false;
        }
        c.parent = Some(parent);
        c.wrap_enabled = false;
        c.velocity = crate::asteroid::Velocity::ZERO;
        if let Some(p) = self.live.get_mut(&parent) {
            p.children.push(child);
        }
        true
    }

    /// Detach `child` from its parent, keeping its world position and rotation.
    pub fn detach(&mut self, child: AsteroidId) -> bool {
        let Some((world_pos, world_rot)) = self.world_transform(child) else {
            return false;
        };
        let Some(parent_id) = self.live.get(&child).and_then(|a| a.parent) else {
            return false;
        };
        if let Some(parent) = self.live.get_mut(&parent_id) {
            parent.children.retain(|c| *c != child);
        }
        if let Some(c) = self.live.get_mut(&child) {
            c.parent = None;
            c.position = world_pos;
            c.rotation = world_rot;
        }
        true
    }

    /// World position and rotation of `id`, resolved through its parents.
    pub fn world_transform(&self, id: AsteroidId) -> Option<(Vec2, f32)> {
        let asteroid = self.live.get(&id)?;
        match asteroid.parent {
            None => Some((asteroid.position, asteroid.rotation)),
            Some(parent_id) => {
                let parent = self.live.get(&parent_id)?;
                let (parent_pos, parent_rot) = self.world_transform(parent_id)?;
                let diameter = parent.size as f32 * self.unit_scale;
                let offset = Vec2::from_angle(parent_rot).rotate(asteroid.position * diameter);
                Some((parent_pos + offset, parent_rot + asteroid.rotation))
            }
        }
    }

    pub fn world_position(&self, id: AsteroidId) -> Option<Vec2> {
        self.world_transform(id).map(|(pos, _)| pos)
    }

    /// Top-level asteroid of the cluster `id` belongs to (itself when free).
    pub fn root_of(&self, id: AsteroidId) -> Option<AsteroidHandle> {
        let mut current = self.live.get(&id)?;
        while let Some(parent) = current.parent {
            current = self.live.get(&parent)?;
        }
        Some(current.handle())
    }
}

impl std::fmt::Debug for AsteroidField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsteroidField")
            .field("live", &self.live.len())
            .field("pool", &self.pool)
            .finish()
    }
}

impl Default for AsteroidField {
    fn default() -> Self {
        use crate::constants::{ASTEROID_SCALE, POOL_DEFAULT_CAPACITY, POOL_MAX_SIZE};
        Self::new(POOL_DEFAULT_CAPACITY, POOL_MAX_SIZE, ASTEROID_SCALE)
    }
}
