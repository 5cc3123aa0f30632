//! Asteroid fragmentation: building cluster trees and breaking them apart.
//!
//! A cluster is a parent asteroid carrying `child.count` attached fragments, each
//! of which carries `grandchild.count` fragments of its own. The tree is exactly
//! two levels deep: the grandchild tier recurses with [`Tier::NONE`], which stops
//! the recursion.
//!
//! When a cluster is hit its direct children are detached into the field as
//! independent asteroids (grandchildren stay attached to their child). This has to
//! happen before the parent is released, because releasing a parent releases
//! whatever is still attached to it.

use crate::asteroid::{initial_velocity, random_unit_vector, AsteroidHandle, AsteroidId, Health};
use crate::bounds::PlayField;
use crate::config::GameConfig;
use crate::constants::FRAGMENT_OFFSET_RADIUS;
use crate::field::AsteroidField;
use crate::spawn_rules::{SpawnRule, Tier};
use rand::Rng;
use std::f32::consts::TAU;

/// Spawn `child.count` fragments under `parent`, each with `grandchild.count`
/// fragments beneath it.
///
/// Returns every handle created, each child followed by its grandchildren.
/// An empty tier (zero count or zero size) spawns nothing.
pub fn spawn_descendants(
    field: &mut AsteroidField,
    parent: AsteroidId,
    child: Tier,
    grandchild: Tier,
    rng: &mut impl Rng,
) -> Vec<AsteroidHandle> {
    let mut spawned = Vec::new();
    if field.get_by_id(parent).is_some() {
        spawn_tier(field, parent, child, grandchild, rng, &mut spawned);
    }
    spawned
}

fn spawn_tier(
    field: &mut AsteroidField,
    parent: AsteroidId,
    tier: Tier,
    next: Tier,
    rng: &mut impl Rng,
    spawned: &mut Vec<AsteroidHandle>,
) {
    if tier.is_empty() {
        return;
    }

    for _ in 0..tier.count {
        let handle = field.spawn(tier.size);
        field.attach(handle.id, parent);
        if let Some(frag) = field.get_mut(handle) {
            frag.point_value = tier.points;
            frag.damage_value = tier.damage;
            frag.health = Health::new(tier.health as f32);
            frag.position = random_unit_vector(rng) * FRAGMENT_OFFSET_RADIUS;
            frag.rotation = rng.gen_range(0.0..TAU);
        }
        spawned.push(handle);

        spawn_tier(field, handle.id, next, Tier::NONE, rng, spawned);
    }
}

/// Turn `root` into the parent of a fresh cluster described by `rule`.
///
/// Anything still attached to `root` is released first. Returns the descendants
/// created.
pub fn initialize_cluster(
    field: &mut AsteroidField,
    root: AsteroidHandle,
    rule: &SpawnRule,
    rng: &mut impl Rng,
) -> Vec<AsteroidHandle> {
    let stale: Vec<AsteroidHandle> = match field.get(root) {
        Some(a) => a
            .children
            .iter()
            .filter_map(|id| field.get_by_id(*id).map(|c| c.handle()))
            .collect(),
        None => return Vec::new(),
    };
    for handle in stale {
        field.release(handle);
    }

    let parent = rule.parent();
    if let Some(a) = field.get_mut(root) {
        a.size = parent.size.max(1);
        a.health = Health::new(parent.health as f32);
        a.point_value = parent.points;
        a.damage_value = parent.damage;
    }

    spawn_descendants(field, root.id, rule.child(), rule.grandchild(), rng)
}

/// React to `target` being hit: a cluster (size > 1) sheds its direct children.
///
/// Each child keeps its world position, starts wrapping at the field edges and
/// gets a fresh initial velocity. Returns the freed children; nothing is released.
pub fn on_hit(
    field: &mut AsteroidField,
    target: AsteroidHandle,
    bounds: &PlayField,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Vec<AsteroidHandle> {
    let children: Vec<AsteroidId> = match field.get(target) {
        Some(a) if a.size > 1 => a.children.clone(),
        _ => return Vec::new(),
    };

    let mut freed = Vec::with_capacity(children.len());
    for child in children {
        if !field.detach(child) {
            continue;
        }
        if let Some(c) = field.get_by_id_mut(child) {
            c.wrap_enabled = true;
            c.velocity = initial_velocity(c.position, c.size, bounds, config, rng);
            freed.push(c.handle());
        }
    }
    freed
}
