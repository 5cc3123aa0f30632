//! Game phase state machine and level progression.
//!
//! ```text
//! MainMenu ──StartGame──▶ PreLevel ──delay──▶ Level ──cleared──▶ PostLevel ─┐
//!                             ▲                 │  ▲                        │
//!                             └─────────────────┼──┼──────── level + 1 ◀────┘
//!                                  ship lost ◀──┘  └──▶ Paused
//!                                      │
//!                                      ▼
//!                                  GameOver ──StartGame──▶ PreLevel
//! ```

use crate::achievements::AchievementTracker;
use crate::bullet::BulletMagazine;
use crate::config::GameConfig;
use crate::bounds::PlayField;
use crate::constants::START_LEVEL;
use crate::events::{LevelCleared, LevelStarted, StartGame, TogglePause};
use crate::manager::{AsteraxManager, SpawnContext};
use crate::player::PlayerShip;
use crate::scheduler::{GameTask, TaskQueue};
use crate::score::Score;
use crate::GameRng;
use bevy::prelude::*;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    #[default]
    MainMenu,
    /// Short pause announcing the next level.
    PreLevel,
    Level,
    /// The level was just cleared; advancing to the next one.
    PostLevel,
    GameOver,
    Paused,
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
}

impl Default for LevelProgress {
    fn default() -> Self {
        Self { level: START_LEVEL }
    }
}

/// Reset everything and head into the first level. Only honoured from the
/// main menu or the game-over screen.
#[allow(clippy::too_many_arguments)]
pub fn handle_start_game(
    mut starts: MessageReader<StartGame>,
    state: Res<State<GamePhase>>,
    config: Res<GameConfig>,
    mut progress: ResMut<LevelProgress>,
    mut manager: ResMut<AsteraxManager>,
    mut bullets: ResMut<BulletMagazine>,
    mut ship: ResMut<PlayerShip>,
    mut score: ResMut<Score>,
    mut queue: ResMut<TaskQueue>,
    mut tracker: ResMut<AchievementTracker>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    if starts.read().count() == 0 {
        return;
    }
    match state.get() {
        GamePhase::MainMenu | GamePhase::GameOver => {}
        other => {
            debug!("StartGame ignored in {other:?}");
            return;
        }
    }

    manager.clear_level();
    bullets.release_all();
    drop_pending_tasks(&mut queue, &mut tracker);
    score.reset();
    ship.reset(config.player_jumps);
    progress.level = config.start_level.max(1);

    info!("Starting game at level {}", progress.level);
    next_state.set(GamePhase::PreLevel);
}

/// `OnEnter(PreLevel)`: start the countdown to the level.
pub fn schedule_level_begin(
    config: Res<GameConfig>,
    progress: Res<LevelProgress>,
    mut queue: ResMut<TaskQueue>,
) {
    if queue.is_pending(&GameTask::BeginLevel) {
        return;
    }
    info!("Level {} begins in {:.1}s", progress.level, config.pre_level_delay);
    queue.schedule(config.pre_level_delay, None, GameTask::BeginLevel);
}

/// Continuation of the pre-level countdown.
pub fn begin_level(
    progress: &LevelProgress,
    next_state: &mut NextState<GamePhase>,
    started: &mut MessageWriter<LevelStarted>,
) {
    next_state.set(GamePhase::Level);
    started.write(LevelStarted {
        level: progress.level,
    });
}

/// Spawn the asteroid clusters for each started level.
pub fn spawn_level_asteroids(
    mut started: MessageReader<LevelStarted>,
    config: Res<GameConfig>,
    bounds: Res<PlayField>,
    ship: Res<PlayerShip>,
    mut manager: ResMut<AsteraxManager>,
    mut rng: ResMut<GameRng>,
    mut cleared: MessageWriter<LevelCleared>,
) {
    for start in started.read() {
        let ctx = SpawnContext {
            bounds: &bounds,
            player: ship.position,
            config: &config,
        };
        let spawn = manager.spawn_level(start.level, ctx, &mut rng.rng);
        if let Some(clear) = spawn.cleared {
            cleared.write(clear);
        }
    }
}

/// `OnEnter(PostLevel)`: move on to the next level.
pub fn advance_level(
    mut progress: ResMut<LevelProgress>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    progress.level += 1;
    info!("Advancing to level {}", progress.level);
    next_state.set(GamePhase::PreLevel);
}

/// `OnEnter(GameOver)`: drop every asteroid, bullet and pending continuation.
pub fn enter_game_over(
    progress: Res<LevelProgress>,
    score: Res<Score>,
    mut manager: ResMut<AsteraxManager>,
    mut bullets: ResMut<BulletMagazine>,
    mut queue: ResMut<TaskQueue>,
    mut tracker: ResMut<AchievementTracker>,
) {
    let released = manager.clear_level();
    bullets.release_all();
    drop_pending_tasks(&mut queue, &mut tracker);
    info!(
        "Game over on level {} with {} points ({released} asteroids released)",
        progress.level, score.value
    );
}

/// Drop every pending continuation. The achievement on display would never
/// be acknowledged otherwise, which stalls the display queue.
fn drop_pending_tasks(queue: &mut TaskQueue, tracker: &mut AchievementTracker) {
    queue.clear();
    tracker.acknowledge();
}

pub fn toggle_pause(
    mut toggles: MessageReader<TogglePause>,
    state: Res<State<GamePhase>>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    if toggles.read().count() % 2 == 0 {
        return;
    }
    match state.get() {
        GamePhase::Level => next_state.set(GamePhase::Paused),
        GamePhase::Paused => next_state.set(GamePhase::Level),
        _ => {}
    }
}
