//! Player ship: movement, asteroid contact and the jump sequence.
//!
//! Jumps are the ship's lives. Touching an asteroid while vulnerable costs at
//! least one jump: the ship vanishes, reappears `jump_delay` seconds later at a
//! safe spot, and stays immune for `immune_time` seconds after that. Losing the
//! last jump ends the game.

use crate::achievements::GameEvent;
use crate::bounds::PlayField;
use crate::config::GameConfig;
use crate::events::{AsteroidHit, HitSource};
use crate::level::GamePhase;
use crate::manager::AsteraxManager;
use crate::placement::{safe_spawn_position, PlacementRules};
use crate::scheduler::{GameTask, TaskQueue};
use bevy::prelude::*;
use rand::Rng;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayerShip {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Unit vector the ship fires along.
    pub heading: Vec2,
    jumps: u32,
    visible: bool,
    jumping: bool,
    immune: bool,
}

/// Result of an asteroid touching the ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Ship was hidden, mid-jump or immune.
    Ignored,
    Jumped { jumps_left: u32 },
    Destroyed,
}

impl PlayerShip {
    pub fn new(jumps: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            heading: Vec2::Y,
            jumps,
            visible: true,
            jumping: false,
            immune: false,
        }
    }

    pub fn jumps(&self) -> u32 {
        self.jumps
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn is_immune(&self) -> bool {
        self.immune
    }

    pub fn can_be_hit(&self) -> bool {
        self.visible && !self.jumping && !self.immune
    }

    /// Spend `damage` jumps (at least one) and start a jump, or die trying.
    pub fn register_contact(&mut self, damage: u32) -> ContactOutcome {
        if !self.can_be_hit() {
            return ContactOutcome::Ignored;
        }
        self.jumps = self.jumps.saturating_sub(damage.max(1));
        self.visible = false;
        self.immune = true;
        self.velocity = Vec2::ZERO;
        if self.jumps == 0 {
            return ContactOutcome::Destroyed;
        }
        self.jumping = true;
        ContactOutcome::Jumped {
            jumps_left: self.jumps,
        }
    }

    /// End the jump at `position`. Immunity continues until [`Self::end_immunity`].
    pub fn reappear(&mut self, position: Vec2) {
        self.position = position;
        self.visible = true;
        self.jumping = false;
    }

    pub fn end_immunity(&mut self) {
        self.immune = false;
    }

    /// Fresh ship with `jumps` lives at the centre of the field.
    pub fn reset(&mut self, jumps: u32) {
        *self = Self::new(jumps);
    }
}

impl Default for PlayerShip {
    fn default() -> Self {
        Self::new(crate::constants::PLAYER_JUMPS)
    }
}

/// Pick the reappearance point for a jumping ship and schedule the end of its
/// immunity.
pub fn finish_jump(
    ship: &mut PlayerShip,
    manager: &AsteraxManager,
    bounds: &PlayField,
    config: &GameConfig,
    queue: &mut TaskQueue,
    rng: &mut impl Rng,
) {
    let rules = PlacementRules {
        min_player_dist: config.min_player_separation,
        min_asteroid_dist: config.min_asteroid_separation,
        max_attempts: config.jump_max_attempts,
    };
    let asteroids = manager.field().world_positions();
    let spot = safe_spawn_position(bounds, ship.position, &asteroids, rules, rng);
    if spot.fallback {
        debug!("Jump placement fell back to an unconstrained point");
    }
    ship.reappear(spot.point);
    queue.schedule(config.immune_time, None, GameTask::PlayerVulnerable);
}

/// Advance a visible ship by `dt`, capping its speed at `max_speed` and
/// wrapping at the field edges.
pub fn step_ship(ship: &mut PlayerShip, dt: f32, max_speed: f32, bounds: &PlayField) {
    if !ship.is_visible() {
        return;
    }
    ship.velocity = ship.velocity.clamp_length_max(max_speed);
    let next = ship.position + ship.velocity * dt;
    ship.position = if bounds.is_out_of_bounds(next) {
        bounds.wrap(next)
    } else {
        next
    };
}

pub fn move_player(
    time: Res<Time>,
    config: Res<GameConfig>,
    bounds: Res<PlayField>,
    mut ship: ResMut<PlayerShip>,
) {
    step_ship(&mut ship, time.delta_secs(), config.player_move_speed, &bounds);
}

/// Resolve the ship touching an asteroid: the ship jumps (or dies) and the
/// asteroid sheds its fragments.
pub fn player_asteroid_contact(
    config: Res<GameConfig>,
    manager: Res<AsteraxManager>,
    mut ship: ResMut<PlayerShip>,
    mut queue: ResMut<TaskQueue>,
    mut hits: MessageWriter<AsteroidHit>,
    mut events: MessageWriter<GameEvent>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    if !ship.can_be_hit() {
        return;
    }
    let Some(target) = manager.overlapping(ship.position, config.player_radius, &config) else {
        return;
    };
    let damage = manager
        .field()
        .get(target)
        .map(|a| a.damage_value)
        .unwrap_or(1);

    // Ship contact fragments the asteroid without wearing it down.
    hits.write(AsteroidHit {
        target,
        damage: 0.0,
        source: HitSource::Player,
    });

    match ship.register_contact(damage) {
        ContactOutcome::Jumped { jumps_left } => {
            info!("Ship hit; jumping ({jumps_left} jumps left)");
            queue.schedule(config.jump_delay, None, GameTask::PlayerReappear);
            events.write(GameEvent::PlayerJumped { jumps_left });
        }
        ContactOutcome::Destroyed => {
            info!("Ship destroyed; game over");
            next_state.set(GamePhase::GameOver);
        }
        ContactOutcome::Ignored => {}
    }
}
