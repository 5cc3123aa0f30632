//! Frame-driven queue of delayed continuations.
//!
//! Timed gameplay (the pre-level pause, the player's jump sequence, bullet
//! self-destruct) is expressed as tasks scheduled here and drained by
//! [`crate::simulation`] once per frame. Nothing ever blocks: a task simply
//! becomes due once enough frame time has been fed through [`DeferredQueue::advance`].
//!
//! A task may name the pooled instance it belongs to. When that instance is
//! released its handle goes stale, and the draining system drops the task
//! instead of running it against whatever now occupies the slot.

use crate::bullet::BulletHandle;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Continuations scheduled by the gameplay systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameTask {
    /// The pre-level pause is over.
    BeginLevel,
    /// The jumping ship reappears at a safe position.
    PlayerReappear,
    /// The ship's post-jump immunity runs out.
    PlayerVulnerable,
    /// A bullet reached the end of its lifetime.
    ExpireBullet,
    /// The achievement on display has been shown long enough.
    AcknowledgeAchievement,
}

/// Game task queue; tasks may be bound to the bullet they expire.
pub type TaskQueue = DeferredQueue<GameTask, BulletHandle>;

#[derive(Debug)]
struct Task<A, O> {
    id: TaskId,
    remaining: f32,
    owner: Option<O>,
    action: A,
}

/// A task whose delay has elapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Due<A, O> {
    pub id: TaskId,
    pub owner: Option<O>,
    pub action: A,
}

/// Pending tasks carrying actions `A`, optionally bound to an owner handle `O`.
#[derive(Resource, Debug)]
pub struct DeferredQueue<A: Send + Sync + 'static, O: Send + Sync + 'static> {
    next_id: u64,
    tasks: Vec<Task<A, O>>,
}

impl<A: Send + Sync + 'static, O: Send + Sync + 'static> Default for DeferredQueue<A, O> {
    fn default() -> Self {
        Self {
            next_id: 0,
            tasks: Vec::new(),
        }
    }
}

impl<A, O> DeferredQueue<A, O>
where
    A: Send + Sync + 'static,
    O: Copy + PartialEq + Send + Sync + 'static,
{
    /// Run `action` after `delay` seconds of frame time. Negative delays count
    /// as zero, so the task fires on the next advance.
    pub fn schedule(&mut self, delay: f32, owner: Option<O>, action: A) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.tasks.push(Task {
            id,
            remaining: delay.max(0.0),
            owner,
            action,
        });
        id
    }

    /// Drop a pending task. Returns `false` if it already fired or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Drop every pending task bound to `owner`. Returns how many were dropped.
    pub fn cancel_owner(&mut self, owner: O) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.owner != Some(owner));
        before - self.tasks.len()
    }

    /// Feed `dt` seconds through the queue and return the tasks that became due,
    /// earliest deadline first (ties in scheduling order).
    pub fn advance(&mut self, dt: f32) -> Vec<Due<A, O>> {
        for task in &mut self.tasks {
            task.remaining -= dt;
        }

        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|t| t.remaining <= 0.0);
        self.tasks = pending;

        due.sort_by(|a, b| a.remaining.total_cmp(&b.remaining).then(a.id.cmp(&b.id)));
        due.into_iter()
            .map(|t| Due {
                id: t.id,
                owner: t.owner,
                action: t.action,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// `true` while some pending task carries an action equal to `action`.
    pub fn is_pending(&self, action: &A) -> bool
    where
        A: PartialEq,
    {
        self.tasks.iter().any(|t| t.action == *action)
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
