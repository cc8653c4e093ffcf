//! Headless матч riffbrawl
//!
//! Два бота дерутся до конца матча. Первый аргумент — путь к JSON конфигу
//! (опционально). Полезно для проверки детерминизма и баланса.

use brawl_simulation::logger::log_info;
use brawl_simulation::{
    advance_simulation, create_headless_app, spawn_arena, Bot, BrawlPlugin, MatchState, RoundCommand, RoundPhase,
    RoundState, SimulationConfig,
};
use bevy::prelude::*;

const DT: f32 = 1.0 / 60.0;
/// Предохранитель: 30 минут симуляции
const MAX_TICKS: u64 = 60 * 60 * 30;

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match SimulationConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        },
        None => SimulationConfig::default(),
    };

    let seed = config.seed;
    println!("Starting riffbrawl headless match (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(config);
    app.add_plugins(BrawlPlugin);

    let arena = match spawn_arena(app.world_mut()) {
        Ok(arena) => arena,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    app.world_mut().entity_mut(arena.left).insert(Bot::new(0.4));
    app.world_mut().entity_mut(arena.right).insert(Bot::new(0.55));

    let world = app.world_mut();
    for tick in 0..MAX_TICKS {
        advance_simulation(world, DT);

        match world.resource::<RoundState>().phase {
            RoundPhase::RoundOver { .. } => {
                world.resource_mut::<Events<RoundCommand>>().send(RoundCommand::Advance);
            }
            RoundPhase::MatchOver { winner } => {
                let score = world.resource::<MatchState>();
                log_info(&format!("Match finished at tick {tick}"));
                println!(
                    "Winner: {:?} after {} rounds ({:?})",
                    winner, score.round, score.wins
                );
                return;
            }
            RoundPhase::Fighting => {}
        }
    }

    println!("No winner after {} ticks", MAX_TICKS);
}
