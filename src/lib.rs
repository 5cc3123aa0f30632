//! AsteraX core library
//!
//! Asteroid fragmentation, pooled spawning and level flow for an arcade
//! asteroid shooter, built as a headless Bevy ECS plugin. Rendering, input and
//! physics solving are left to the host application; the simulation moves
//! everything kinematically and resolves contacts with circle overlap tests.

pub mod achievements;
pub mod asteroid;
pub mod bounds;
pub mod bullet;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod field;
pub mod fragmentation;
pub mod level;
pub mod manager;
pub mod placement;
pub mod player;
pub mod pool;
pub mod scheduler;
pub mod score;
pub mod simulation;
pub mod spawn_rules;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeded gameplay RNG. Every random draw in the simulation goes through it,
/// so a seed reproduces a whole session.
#[derive(Resource)]
pub struct GameRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(constants::DEFAULT_RNG_SEED)
    }
}

/// Build a windowless app running the full simulation with `config`.
///
/// The config file on disk is ignored, which keeps tests independent of the
/// working directory.
pub fn create_headless_app(config: config::GameConfig) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(config)
        .add_plugins(simulation::SimulationPlugin {
            load_config_file: false,
        });
    app
}
