//! Generic object pool.
//!
//! [`Pool<T>`] keeps released instances on a free list and hands them back out
//! instead of building new ones. The lifecycle of an instance is
//! create → acquire → (use) → release → (reuse | destroy).
//!
//! - `acquire` pops the free list or calls the factory on a miss, then resets the
//!   instance and marks it active. Callers never see a half-initialised value.
//! - `release` resets the instance, marks it inactive and pushes it on the free list.
//!   Release never destroys; the free list may grow past `max_size`.
//! - `trim_to_max` / `clear` (and dropping the pool) run the destroy hook on
//!   surplus or all free instances.
//!
//! Only pool-owned state is reset. Domain state such as an asteroid's health is
//! left for the caller to initialise.

use crate::constants::{POOL_DEFAULT_CAPACITY, POOL_MAX_SIZE};

/// Implemented by anything that can live in a [`Pool`].
pub trait Poolable {
    /// Clear transient, pool-owned state (velocities, hierarchy links, timers).
    fn reset(&mut self);

    /// Mark the instance live (`true`) or parked on the free list (`false`).
    fn set_active(&mut self, active: bool);

    fn is_active(&self) -> bool;
}

/// Lifetime counters for a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances built by the factory.
    pub created: u64,
    /// Successful `acquire` calls.
    pub acquired: u64,
    /// Instances passed to `release`.
    pub released: u64,
    /// Instances handed to the destroy hook.
    pub destroyed: u64,
}

type Factory<T> = Box<dyn FnMut() -> T + Send + Sync>;
type DestroyHook<T> = Box<dyn FnMut(T) + Send + Sync>;

pub struct Pool<T: Poolable> {
    free: Vec<T>,
    factory: Factory<T>,
    on_destroy: Option<DestroyHook<T>>,
    max_size: usize,
    stats: PoolStats,
}

impl<T: Poolable> Pool<T> {
    /// Pool with the default capacity and max size from `constants.rs`.
    pub fn new(factory: impl FnMut() -> T + Send + Sync + 'static) -> Self {
        Self::with_capacity(POOL_DEFAULT_CAPACITY, POOL_MAX_SIZE, factory)
    }

    /// Pool that reserves `default_capacity` free-list slots and trims to `max_size`.
    pub fn with_capacity(
        default_capacity: usize,
        max_size: usize,
        factory: impl FnMut() -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            free: Vec::with_capacity(default_capacity),
            factory: Box::new(factory),
            on_destroy: None,
            max_size,
            stats: PoolStats::default(),
        }
    }

    /// Install a hook that receives every instance the pool destroys.
    pub fn with_destroy_hook(mut self, hook: impl FnMut(T) + Send + Sync + 'static) -> Self {
        self.on_destroy = Some(Box::new(hook));
        self
    }

    /// Take an instance from the free list, or build one if the list is empty.
    pub fn acquire(&mut self) -> T {
        let mut item = match self.free.pop() {
            Some(item) => item,
            None => {
                self.stats.created += 1;
                (self.factory)()
            }
        };
        item.reset();
        item.set_active(true);
        self.stats.acquired += 1;
        item
    }

    /// Return an instance to the free list.
    pub fn release(&mut self, mut item: T) {
        item.reset();
        item.set_active(false);
        self.stats.released += 1;
        self.free.push(item);
    }

    /// Build instances up front until the free list holds at least `count`.
    pub fn prewarm(&mut self, count: usize) {
        while self.free.len() < count {
            let mut item = (self.factory)();
            self.stats.created += 1;
            item.reset();
            item.set_active(false);
            self.free.push(item);
        }
    }

    /// Destroy free instances beyond `max_size`. Returns how many were destroyed.
    pub fn trim_to_max(&mut self) -> usize {
        let surplus = self.free.len().saturating_sub(self.max_size);
        for _ in 0..surplus {
            if let Some(item) = self.free.pop() {
                self.destroy(item);
            }
        }
        surplus
    }

    /// Destroy every free instance.
    pub fn clear(&mut self) {
        while let Some(item) = self.free.pop() {
            self.destroy(item);
        }
    }

    fn destroy(&mut self, item: T) {
        self.stats.destroyed += 1;
        if let Some(hook) = self.on_destroy.as_mut() {
            hook(item);
        }
    }

    /// Instances built and not yet destroyed.
    pub fn count_all(&self) -> usize {
        (self.stats.created - self.stats.destroyed) as usize
    }

    /// Instances currently handed out.
    pub fn count_active(&self) -> usize {
        self.count_all().saturating_sub(self.free.len())
    }

    /// Instances parked on the free list.
    pub fn count_inactive(&self) -> usize {
        self.free.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl<T: Poolable> Drop for Pool<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Poolable> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("inactive", &self.free.len())
            .field("max_size", &self.max_size)
            .field("stats", &self.stats)
            .finish()
    }
}
