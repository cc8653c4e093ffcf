//! riffbrawl simulation core
//!
//! ECS-симуляция боя на Bevy 0.16: два бойца, hurters, летящая гитара,
//! framing камера, раунды.
//!
//! Хост (игровой движок) владеет рендером, звуком и UI. Он:
//! - шлёт `KeyInput` / `RoundCommand`
//! - вызывает `advance_simulation(world, dt)` раз в кадр
//! - читает Transform, `Animation`, `CameraRig`, события `PlayerTriggered` / `RoundEnded`

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod camera;
pub mod combat;
pub mod components;
pub mod config;
pub mod error;
pub mod input;
pub mod level;
pub mod logger;
pub mod physics;
pub mod round;
pub mod schedule;

pub use camera::{AttachCamera, CameraController, CameraPlugin, CameraRig};
pub use combat::{
    AttackKind, AttackReleased, CombatPlugin, HitEffect, Hurter, HurterHit, PlayerEvent, PlayerTriggered, Projectile,
};
pub use components::*;
pub use config::SimulationConfig;
pub use error::BrawlError;
pub use input::{Action, ActionPhase, Bot, InputPlugin, KeyInput, Keymap, PlayerCommand};
pub use level::{load_level, spawn_arena, Arena, Drifter};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use physics::PhysicsPlugin;
pub use round::{
    MatchEnded, MatchLengthPolicy, MatchState, RoundCommand, RoundEndCause, RoundEnded, RoundPhase, RoundPlugin,
    RoundStarted, RoundState,
};
pub use schedule::{
    advance_simulation, rotate_tick_events, Scheduler, SimClock, SimulationTick, TickEvents, TickEventsAppExt, TickPlugin,
    TickSet,
};

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// SimulationConfig можно вставить до плагина; иначе берутся defaults.
pub struct BrawlPlugin;

impl Plugin for BrawlPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SimulationConfig>()
            .cloned()
            .unwrap_or_default();

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(config.seed));
        }

        app.insert_resource(RoundState::new(config.round.round_time))
            .insert_resource(CameraRig::new(Vec2::from(config.camera.viewport)))
            .insert_resource(config)
            .add_plugins((
                TickPlugin,
                InputPlugin,
                CombatPlugin,
                PhysicsPlugin,
                RoundPlugin,
                CameraPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Компоненты `T` в порядке Entity index, сериализованные через Debug.
pub fn world_snapshot<T>(world: &mut World) -> Vec<u8>
where
    T: Component + std::fmt::Debug,
{
    let mut snapshot = Vec::new();
    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
