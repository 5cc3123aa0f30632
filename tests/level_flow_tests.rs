//! Headless integration tests for the level flow, the jump sequence and the
//! deferred task queue.
//!
//! Every app here is built with [`create_headless_app`]: [`MinimalPlugins`] plus
//! `StatesPlugin`, no window, no rendering. Frame time is pinned with
//! [`TimeUpdateStrategy::ManualDuration`] so timers advance deterministically.
//!
//! Covered scenarios:
//! 1. `StartGame` goes through `PreLevel` into `Level` and spawns the rule's asteroids.
//! 2. Clearing a level advances to the next one via `PostLevel` and `PreLevel`.
//! 3. Losing the last jump enters `GameOver` and empties the field.
//! 4. A bullet self-destruct bound to a recycled bullet never fires.
//! 5. Destroying an asteroid unlocks and presents an achievement.
//! 6. A shot at an attached fragment strikes the whole cluster.
//! 7. Ship contact fragments an asteroid without damaging it.
//! 8. Restarting mid-display keeps the achievement queue moving.

use asterax::achievements::{
    AchievementDef, AchievementTracker, AchievementUnlocked, Condition, GameEventKind,
};
use asterax::bullet::{BulletHandle, BulletMagazine};
use asterax::config::GameConfig;
use asterax::create_headless_app;
use asterax::events::{AsteroidHit, FireBullet, HitSource, LevelStarted, StartGame};
use asterax::level::{GamePhase, LevelProgress};
use asterax::manager::AsteraxManager;
use asterax::player::PlayerShip;
use asterax::scheduler::{GameTask, TaskQueue};
use asterax::score::Score;
use asterax::spawn_rules::{LevelSpawnRule, SpawnRule, SpawnRuleTable};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// 100 ms per frame.
fn app_with(config: GameConfig) -> App {
    let mut app = create_headless_app(config);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
    app
}

/// One level whose single parent dies to one hit and has no fragments.
fn single_asteroid_config() -> GameConfig {
    GameConfig {
        pre_level_delay: 0.3,
        spawn_rules: SpawnRuleTable::new(vec![LevelSpawnRule {
            level_number: 1,
            rule: SpawnRule {
                parent_count: 1,
                parent_health: 1,
                child_count: 0,
                grandchild_count: 0,
                ..SpawnRule::default()
            },
        }]),
        ..GameConfig::default()
    }
}

fn phase(app: &App) -> GamePhase {
    *app.world().resource::<State<GamePhase>>().get()
}

/// Update until `done` holds or `max_frames` have run. Returns whether it held.
fn run_until(app: &mut App, max_frames: usize, done: impl Fn(&App) -> bool) -> bool {
    for _ in 0..max_frames {
        app.update();
        if done(app) {
            return true;
        }
    }
    false
}

fn start_and_enter_level(app: &mut App) {
    app.update();
    app.world_mut().write_message(StartGame);
    assert!(
        run_until(app, 50, |a| phase(a) == GamePhase::Level),
        "StartGame must reach Level"
    );
}

fn force_level_phase(app: &mut App) {
    app.update();
    app.world_mut()
        .resource_mut::<NextState<GamePhase>>()
        .set(GamePhase::Level);
    app.update();
    assert_eq!(phase(app), GamePhase::Level);
}

fn count_achievement(title: &str, event: GameEventKind) -> AchievementDef {
    AchievementDef {
        title: title.into(),
        description: String::new(),
        condition: Condition::Count { event, required: 1 },
    }
}

/// Level flow forced straight into `Level` with `level`'s asteroids spawned.
fn spawned_level(config: GameConfig, level: u32) -> App {
    let mut app = app_with(config);
    force_level_phase(&mut app);
    app.world_mut().write_message(LevelStarted { level });
    app.update();
    app
}

fn showing(app: &App) -> Option<String> {
    app.world()
        .resource::<AchievementTracker>()
        .showing()
        .map(|d| d.title.clone())
}

fn only_bullet(app: &App) -> BulletHandle {
    let bullets = app.world().resource::<BulletMagazine>();
    assert_eq!(bullets.len(), 1);
    bullets.iter().next().map(|b| b.handle()).expect("one bullet")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// The default table's level 1 is 2 parents × (1 + 2 children × (1 + 2 grandchildren)).
#[test]
fn start_game_spawns_level_one_after_pre_level() {
    let mut app = app_with(GameConfig {
        pre_level_delay: 0.5,
        ..GameConfig::default()
    });
    app.update();
    assert_eq!(phase(&app), GamePhase::MainMenu);

    app.world_mut().write_message(StartGame);
    assert!(run_until(&mut app, 5, |a| phase(a) == GamePhase::PreLevel));
    assert_eq!(app.world().resource::<AsteraxManager>().asteroid_count(), 0);

    assert!(run_until(&mut app, 20, |a| phase(a) == GamePhase::Level));
    let manager = app.world().resource::<AsteraxManager>();
    assert_eq!(manager.asteroid_count(), 2 * (1 + 2 * (1 + 2)));
    assert_eq!(manager.field().top_level().len(), 2);
    assert_eq!(manager.active_level(), Some(1));
}

#[test]
fn clearing_a_level_advances_via_pre_level() {
    let mut app = app_with(single_asteroid_config());
    start_and_enter_level(&mut app);

    let target = app.world().resource::<AsteraxManager>().field().top_level()[0];
    app.world_mut().write_message(AsteroidHit {
        target,
        damage: 1.0,
        source: HitSource::Bullet,
    });

    assert!(
        run_until(&mut app, 10, |a| phase(a) == GamePhase::PreLevel),
        "cleared level must return to PreLevel"
    );
    assert_eq!(app.world().resource::<LevelProgress>().level, 2);
    assert_eq!(
        app.world().resource::<Score>().value,
        SpawnRule::default().parent_points
    );

    // Level 2 is past the table: the ramped rule spawns two parents.
    assert!(run_until(&mut app, 20, |a| phase(a) == GamePhase::Level));
    let manager = app.world().resource::<AsteraxManager>();
    assert_eq!(manager.field().top_level().len(), 2);
}

#[test]
fn losing_last_jump_is_game_over() {
    let mut app = app_with(GameConfig {
        player_jumps: 1,
        ..single_asteroid_config()
    });
    start_and_enter_level(&mut app);

    let asteroid = {
        let manager = app.world().resource::<AsteraxManager>();
        let handle = manager.field().top_level()[0];
        manager.field().get(handle).map(|a| a.position).expect("live")
    };
    app.world_mut().resource_mut::<PlayerShip>().position = asteroid;

    assert!(run_until(&mut app, 5, |a| phase(a) == GamePhase::GameOver));
    assert_eq!(app.world().resource::<PlayerShip>().jumps(), 0);
    assert_eq!(app.world().resource::<AsteraxManager>().asteroid_count(), 0);
}

#[test]
fn jump_hides_ship_then_reappears_immune() {
    let mut app = app_with(GameConfig {
        player_jumps: 3,
        jump_delay: 0.5,
        immune_time: 0.5,
        asteroid_min_vel: 1.0,
        asteroid_max_vel: 2.0,
        ..single_asteroid_config()
    });
    start_and_enter_level(&mut app);

    let asteroid = {
        let manager = app.world().resource::<AsteraxManager>();
        let handle = manager.field().top_level()[0];
        manager.field().get(handle).map(|a| a.position).expect("live")
    };
    app.world_mut().resource_mut::<PlayerShip>().position = asteroid;
    app.update();

    let ship = app.world().resource::<PlayerShip>();
    assert_eq!(ship.jumps(), 2);
    assert!(!ship.is_visible());

    assert!(run_until(&mut app, 10, |a| a
        .world()
        .resource::<PlayerShip>()
        .is_visible()));
    assert!(app.world().resource::<PlayerShip>().is_immune());

    assert!(run_until(&mut app, 10, |a| a
        .world()
        .resource::<PlayerShip>()
        .can_be_hit()));
}

#[test]
fn self_destruct_of_recycled_bullet_never_fires() {
    let mut app = app_with(GameConfig {
        bullet_lifetime: 1.0,
        ..GameConfig::default()
    });
    force_level_phase(&mut app);

    let fire = FireBullet {
        origin: Vec2::ZERO,
        direction: Vec2::X,
    };
    app.world_mut().write_message(fire);
    app.update();
    let first = only_bullet(&app);

    // Released early, as if it had hit something.
    assert!(app.world_mut().resource_mut::<BulletMagazine>().release(first));
    for _ in 0..5 {
        app.update();
    }

    app.world_mut().write_message(fire);
    app.update();
    let second = only_bullet(&app);
    assert_eq!(second.id, first.id, "pooled instance reused");
    assert_ne!(second, first);

    // The first bullet's timer has run out by now; the second's has not.
    for _ in 0..7 {
        app.update();
    }
    assert!(app.world().resource::<BulletMagazine>().contains(second));

    for _ in 0..5 {
        app.update();
    }
    assert!(app.world().resource::<BulletMagazine>().is_empty());
}

#[test]
fn destroying_an_asteroid_presents_achievement() {
    let mut app = app_with(GameConfig {
        achievements: vec![AchievementDef {
            title: "First Contact".into(),
            description: "Destroy your first asteroid.".into(),
            condition: Condition::Count {
                event: GameEventKind::AsteroidDestroyed,
                required: 1,
            },
        }],
        ..single_asteroid_config()
    });
    force_level_phase(&mut app);
    app.world_mut().write_message(LevelStarted { level: 1 });
    app.update();

    let target = app.world().resource::<AsteraxManager>().field().top_level()[0];
    app.world_mut().write_message(AsteroidHit {
        target,
        damage: 1.0,
        source: HitSource::Bullet,
    });
    app.update();

    let messages = app.world().resource::<Messages<AchievementUnlocked>>();
    let mut cursor = messages.get_cursor();
    let titles: Vec<_> = cursor.read(messages).map(|m| m.title.clone()).collect();
    assert_eq!(titles, vec!["First Contact".to_string()]);
}

#[test]
fn shot_at_attached_fragment_breaks_the_cluster() {
    let mut app = spawned_level(
        GameConfig {
            bullet_speed: 0.5,
            asteroid_min_vel: 0.0,
            asteroid_max_vel: 0.0,
            asteroid_max_angular_vel: 0.0,
            achievements: Vec::new(),
            spawn_rules: SpawnRuleTable::new(vec![LevelSpawnRule {
                level_number: 1,
                rule: SpawnRule {
                    parent_count: 1,
                    child_count: 2,
                    grandchild_count: 0,
                    ..SpawnRule::default()
                },
            }]),
            ..GameConfig::default()
        },
        1,
    );

    let (root, origin, outward) = {
        let field = app.world().resource::<AsteraxManager>().field();
        let root = field.top_level()[0];
        let root_pos = field.get(root).map(|a| a.position).expect("live root");
        let child = field.get(root).expect("live root").children[0];
        let child_pos = field.world_position(child).expect("attached child");
        (root, child_pos, (child_pos - root_pos).normalize_or(Vec2::X))
    };
    app.world_mut().write_message(FireBullet {
        origin,
        direction: outward,
    });
    app.update();

    let manager = app.world().resource::<AsteraxManager>();
    let hit_root = manager.field().get(root).expect("root survives one hit");
    assert!(hit_root.children.is_empty(), "children shed by the root");
    assert_eq!(hit_root.health.value(), SpawnRule::default().parent_health as f32 - 1.0);
    assert_eq!(manager.field().top_level().len(), 3);
    assert!(app.world().resource::<BulletMagazine>().is_empty());
    assert!(
        !app.world()
            .resource::<TaskQueue>()
            .is_pending(&GameTask::ExpireBullet),
        "self-destruct cancelled on impact"
    );
}

#[test]
fn ship_contact_fragments_without_damage() {
    let mut app = app_with(GameConfig {
        spawn_rules: SpawnRuleTable::new(vec![LevelSpawnRule {
            level_number: 1,
            rule: SpawnRule {
                parent_count: 1,
                parent_health: 1,
                child_count: 2,
                grandchild_count: 0,
                ..SpawnRule::default()
            },
        }]),
        ..single_asteroid_config()
    });
    start_and_enter_level(&mut app);

    let (root, position) = {
        let field = app.world().resource::<AsteraxManager>().field();
        let root = field.top_level()[0];
        (root, field.get(root).map(|a| a.position).expect("live"))
    };
    app.world_mut().resource_mut::<PlayerShip>().position = position;
    app.update();

    assert_eq!(app.world().resource::<PlayerShip>().jumps(), 2);
    let manager = app.world().resource::<AsteraxManager>();
    let struck = manager.field().get(root).expect("1 HP asteroid survives contact");
    assert_eq!(struck.health.value(), 1.0);
    assert!(struck.children.is_empty());
    assert_eq!(manager.field().top_level().len(), 3);
    assert_eq!(app.world().resource::<Score>().value, 0);
    assert_eq!(phase(&app), GamePhase::Level);
}

#[test]
fn restart_during_achievement_display_keeps_queue_moving() {
    let mut app = app_with(GameConfig {
        achievement_display_time: 100.0,
        achievements: vec![
            count_achievement("Arrival", GameEventKind::LevelReached),
            count_achievement("Boom", GameEventKind::AsteroidDestroyed),
        ],
        ..single_asteroid_config()
    });
    start_and_enter_level(&mut app);
    assert!(run_until(&mut app, 5, |a| showing(a).is_some()));
    assert_eq!(showing(&app).as_deref(), Some("Arrival"));

    app.world_mut()
        .resource_mut::<NextState<GamePhase>>()
        .set(GamePhase::GameOver);
    app.update();
    assert_eq!(phase(&app), GamePhase::GameOver);
    assert_eq!(showing(&app), None, "display reset with the pending tasks");

    start_and_enter_level(&mut app);
    let target = app.world().resource::<AsteraxManager>().field().top_level()[0];
    app.world_mut().write_message(AsteroidHit {
        target,
        damage: 1.0,
        source: HitSource::Bullet,
    });
    app.update();

    assert_eq!(showing(&app).as_deref(), Some("Boom"));
    assert_eq!(app.world().resource::<AchievementTracker>().pending(), 0);
}
