//! Simulation plugin and the per-frame gameplay systems.
//!
//! All gameplay runs in `Update` as one chained set, so every frame sees the
//! same order: level flow, deferred tasks, spawning, motion, collisions, hit
//! resolution, scoring, achievements and finally the level-clear check.

use crate::achievements::{
    forward_game_events, present_achievements, track_achievements, AchievementTracker,
    AchievementUnlocked, GameEvent,
};
use crate::bounds::PlayField;
use crate::bullet::BulletMagazine;
use crate::config::{load_game_config, GameConfig};
use crate::events::{
    AddScore, AsteroidDestroyed, AsteroidHit, FireBullet, HitSource, LevelCleared, LevelStarted,
    StartGame, TogglePause,
};
use crate::level::{
    advance_level, begin_level, enter_game_over, handle_start_game, schedule_level_begin,
    spawn_level_asteroids, toggle_pause, GamePhase, LevelProgress,
};
use crate::manager::AsteraxManager;
use crate::player::{finish_jump, move_player, player_asteroid_contact, PlayerShip};
use crate::scheduler::{GameTask, TaskQueue};
use crate::score::{apply_score, Score};
use crate::GameRng;
use bevy::prelude::*;

/// Registers every AsteraX resource, message and system.
///
/// Expects `StatesPlugin` (or `DefaultPlugins`) to be present already.
pub struct SimulationPlugin {
    /// Read `assets/asterax.toml` at startup. Disable to run with whatever
    /// `GameConfig` was inserted before the plugin.
    pub load_config_file: bool,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self {
            load_config_file: true,
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GamePhase>()
            .init_resource::<GameConfig>()
            .init_resource::<PlayField>()
            .init_resource::<GameRng>()
            .init_resource::<AsteraxManager>()
            .init_resource::<BulletMagazine>()
            .init_resource::<PlayerShip>()
            .init_resource::<LevelProgress>()
            .init_resource::<Score>()
            .init_resource::<TaskQueue>()
            .init_resource::<AchievementTracker>()
            .add_message::<StartGame>()
            .add_message::<TogglePause>()
            .add_message::<LevelStarted>()
            .add_message::<LevelCleared>()
            .add_message::<AsteroidHit>()
            .add_message::<AsteroidDestroyed>()
            .add_message::<AddScore>()
            .add_message::<FireBullet>()
            .add_message::<GameEvent>()
            .add_message::<AchievementUnlocked>();

        if self.load_config_file {
            app.add_systems(Startup, (load_game_config, apply_config).chain());
        } else {
            app.add_systems(Startup, apply_config);
        }

        app.add_systems(OnEnter(GamePhase::PreLevel), schedule_level_begin)
            .add_systems(OnEnter(GamePhase::PostLevel), advance_level)
            .add_systems(OnEnter(GamePhase::GameOver), enter_game_over)
            .add_systems(
                Update,
                (
                    handle_start_game,
                    toggle_pause,
                    run_deferred_tasks
                        .run_if(not(in_state(GamePhase::Paused)))
                        .run_if(not(in_state(GamePhase::MainMenu))),
                    spawn_level_asteroids,
                    (
                        move_player,
                        fire_bullets,
                        advance_asteroids,
                        advance_bullets,
                        bullet_asteroid_impacts,
                        player_asteroid_contact,
                    )
                        .chain()
                        .run_if(in_state(GamePhase::Level)),
                    resolve_asteroid_hits,
                    apply_score,
                    forward_game_events,
                    track_achievements,
                    present_achievements.run_if(in_state(GamePhase::Level)),
                    handle_level_cleared,
                )
                    .chain(),
            );
    }
}

/// Startup: rebuild config-dependent resources from the final `GameConfig`.
#[allow(clippy::too_many_arguments)]
pub fn apply_config(
    config: Res<GameConfig>,
    mut bounds: ResMut<PlayField>,
    mut rng: ResMut<GameRng>,
    mut manager: ResMut<AsteraxManager>,
    mut bullets: ResMut<BulletMagazine>,
    mut ship: ResMut<PlayerShip>,
    mut progress: ResMut<LevelProgress>,
    mut tracker: ResMut<AchievementTracker>,
) {
    *bounds = config.play_field();
    *rng = GameRng::new(config.rng_seed);
    *manager = AsteraxManager::new(&config);
    *bullets = BulletMagazine::new(config.pool_default_capacity, config.pool_max_size);
    ship.reset(config.player_jumps);
    progress.level = config.start_level.max(1);
    *tracker = AchievementTracker::new(&config.achievements);
    info!(
        "AsteraX ready: {}x{} field, {} spawn rules, seed {}",
        config.field_width,
        config.field_height,
        config.spawn_rules.len(),
        config.rng_seed
    );
}

/// Advance the deferred queue by this frame's delta and run whatever fell due.
///
/// Tasks bound to a bullet that has since been released are dropped.
#[allow(clippy::too_many_arguments)]
pub fn run_deferred_tasks(
    time: Res<Time>,
    config: Res<GameConfig>,
    bounds: Res<PlayField>,
    progress: Res<LevelProgress>,
    manager: Res<AsteraxManager>,
    mut queue: ResMut<TaskQueue>,
    mut ship: ResMut<PlayerShip>,
    mut bullets: ResMut<BulletMagazine>,
    mut tracker: ResMut<AchievementTracker>,
    mut rng: ResMut<GameRng>,
    mut next_state: ResMut<NextState<GamePhase>>,
    mut started: MessageWriter<LevelStarted>,
) {
    for due in queue.advance(time.delta_secs()) {
        if let Some(owner) = due.owner {
            if !bullets.contains(owner) {
                debug!("Dropping {:?}: bullet {:?} was recycled", due.action, owner);
                continue;
            }
        }
        match due.action {
            GameTask::BeginLevel => begin_level(&progress, &mut next_state, &mut started),
            GameTask::PlayerReappear => {
                finish_jump(&mut ship, &manager, &bounds, &config, &mut queue, &mut rng.rng)
            }
            GameTask::PlayerVulnerable => ship.end_immunity(),
            GameTask::ExpireBullet => {
                if let Some(owner) = due.owner {
                    bullets.release(owner);
                }
            }
            GameTask::AcknowledgeAchievement => tracker.acknowledge(),
        }
    }
}

/// Launch a bullet per [`FireBullet`] and schedule its self-destruct.
pub fn fire_bullets(
    mut requests: MessageReader<FireBullet>,
    config: Res<GameConfig>,
    ship: Res<PlayerShip>,
    mut bullets: ResMut<BulletMagazine>,
    mut queue: ResMut<TaskQueue>,
    mut events: MessageWriter<GameEvent>,
) {
    for request in requests.read() {
        if !ship.is_visible() {
            continue;
        }
        let handle = bullets.fire(request.origin, request.direction, config.bullet_speed);
        queue.schedule(config.bullet_lifetime, Some(handle), GameTask::ExpireBullet);
        events.write(GameEvent::BulletFired);
    }
}

pub fn advance_asteroids(
    time: Res<Time>,
    bounds: Res<PlayField>,
    mut manager: ResMut<AsteraxManager>,
) {
    manager.advance_motion(time.delta_secs(), &bounds);
}

pub fn advance_bullets(
    time: Res<Time>,
    bounds: Res<PlayField>,
    mut bullets: ResMut<BulletMagazine>,
) {
    bullets.advance(time.delta_secs(), &bounds);
}

/// A bullet touching an asteroid is released, its self-destruct cancelled, and
/// the asteroid takes a hit.
pub fn bullet_asteroid_impacts(
    config: Res<GameConfig>,
    manager: Res<AsteraxManager>,
    mut bullets: ResMut<BulletMagazine>,
    mut queue: ResMut<TaskQueue>,
    mut hits: MessageWriter<AsteroidHit>,
) {
    let impacts: Vec<_> = bullets
        .iter()
        .filter_map(|b| {
            manager
                .overlapping(b.position, config.bullet_radius, &config)
                .map(|target| (b.handle(), target))
        })
        .collect();

    for (bullet, target) in impacts {
        bullets.release(bullet);
        queue.cancel_owner(bullet);
        hits.write(AsteroidHit {
            target,
            damage: config.bullet_damage,
            source: HitSource::Bullet,
        });
    }
}

/// Apply every [`AsteroidHit`]: fragment, damage, destroy, score.
#[allow(clippy::too_many_arguments)]
pub fn resolve_asteroid_hits(
    mut hits: MessageReader<AsteroidHit>,
    config: Res<GameConfig>,
    bounds: Res<PlayField>,
    mut manager: ResMut<AsteraxManager>,
    mut rng: ResMut<GameRng>,
    mut destroyed: MessageWriter<AsteroidDestroyed>,
    mut score: MessageWriter<AddScore>,
    mut cleared: MessageWriter<LevelCleared>,
) {
    for hit in hits.read() {
        match manager.apply_hit(hit, &bounds, &config, &mut rng.rng) {
            Ok(outcome) => {
                if hit.source == HitSource::Bullet && outcome.points > 0 {
                    score.write(AddScore {
                        amount: outcome.points,
                    });
                }
                if let Some(d) = outcome.destroyed {
                    destroyed.write(d);
                }
                if let Some(c) = outcome.removal.cleared {
                    cleared.write(c);
                }
            }
            Err(e) => debug!("{e}"),
        }
    }
}

/// A cleared level moves on, unless the same frame cost the ship its last jump.
pub fn handle_level_cleared(
    mut cleared: MessageReader<LevelCleared>,
    ship: Res<PlayerShip>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    if cleared.read().last().is_none() {
        return;
    }
    if ship.jumps() == 0 {
        return;
    }
    next_state.set(GamePhase::PostLevel);
}
