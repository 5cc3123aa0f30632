use asterax::achievements::AchievementUnlocked;
use asterax::bullet::BulletMagazine;
use asterax::events::{AsteroidDestroyed, FireBullet, StartGame};
use asterax::level::{GamePhase, LevelProgress};
use asterax::manager::AsteraxManager;
use asterax::player::PlayerShip;
use asterax::score::Score;
use asterax::simulation::SimulationPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use std::env;
use std::time::Duration;

/// Frames simulated when `ASTERAX_FRAMES` is unset (one minute at 60 Hz).
const DEFAULT_FRAMES: u32 = 3600;
const FRAME_TIME: f32 = 1.0 / 60.0;
/// Seconds between autopilot shots.
const AUTOPILOT_FIRE_INTERVAL: f32 = 0.25;

#[derive(Resource, Default)]
struct Autopilot {
    cooldown: f32,
}

fn request_start(mut start: MessageWriter<StartGame>) {
    start.write(StartGame);
}

/// Aim at the nearest asteroid and fire on a fixed cadence.
fn autopilot(
    time: Res<Time>,
    manager: Res<AsteraxManager>,
    mut ship: ResMut<PlayerShip>,
    mut pilot: ResMut<Autopilot>,
    mut fire: MessageWriter<FireBullet>,
) {
    pilot.cooldown -= time.delta_secs();
    if !ship.is_visible() || pilot.cooldown > 0.0 {
        return;
    }
    let origin = ship.position;
    let nearest = manager
        .field()
        .world_positions()
        .into_iter()
        .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)));
    if let Some(target) = nearest {
        ship.heading = (target - origin).normalize_or(Vec2::Y);
        fire.write(FireBullet {
            origin,
            direction: ship.heading,
        });
        pilot.cooldown = AUTOPILOT_FIRE_INTERVAL;
    }
}

fn report(
    mut destroyed: MessageReader<AsteroidDestroyed>,
    mut unlocked: MessageReader<AchievementUnlocked>,
) {
    for d in destroyed.read() {
        debug!("Asteroid {:?} (size {}) destroyed at {}", d.handle.id, d.size, d.position);
    }
    for a in unlocked.read() {
        info!("Achievement: {} ({})", a.title, a.description);
    }
}

fn main() {
    let frames = env::var("ASTERAX_FRAMES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, LogPlugin::default()))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            FRAME_TIME,
        )))
        .add_plugins(SimulationPlugin::default())
        .init_resource::<Autopilot>()
        .add_systems(Startup, request_start)
        .add_systems(
            Update,
            (autopilot.run_if(in_state(GamePhase::Level)), report),
        );

    for _ in 0..frames {
        app.update();
        if *app.world().resource::<State<GamePhase>>().get() == GamePhase::GameOver {
            break;
        }
    }

    let world = app.world();
    info!(
        "Finished: phase {:?}, level {}, score {}, {} jumps left",
        world.resource::<State<GamePhase>>().get(),
        world.resource::<LevelProgress>().level,
        world.resource::<Score>().value,
        world.resource::<PlayerShip>().jumps()
    );
    let asteroids = world.resource::<AsteraxManager>().field().pool_stats();
    let bullets = world.resource::<BulletMagazine>().pool_stats();
    info!(
        "Pools: {} asteroids built for {} spawns, {} bullets built for {} shots",
        asteroids.created, asteroids.acquired, bullets.created, bullets.acquired
    );
}
