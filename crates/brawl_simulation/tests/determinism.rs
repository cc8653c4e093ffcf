//! Тесты детерминизма
//!
//! Два бота с одинаковым seed должны сыграть один и тот же матч:
//! snapshot игроков и transforms совпадают побайтно. Заодно на каждом
//! тике проверяются инварианты бойцов.

mod support;

use bevy::prelude::*;
use brawl_simulation::*;
use support::*;

const TICK_COUNT: usize = 60 * 90;

struct MatchRecord {
    players: Vec<u8>,
    transforms: Vec<u8>,
    rounds_started: usize,
}

/// Прогнать матч ботов; RoundOver сразу подтверждается
fn run_bot_match(seed: u64, ticks: usize) -> MatchRecord {
    let mut config = SimulationConfig::default();
    config.seed = seed;
    config.round.round_time = 20.0;
    let (mut app, arena) = create_arena_app(config);

    app.world_mut().entity_mut(arena.left).insert(Bot::new(0.25));
    app.world_mut().entity_mut(arena.right).insert(Bot::new(0.3));

    let mut cooldowns = [f32::NEG_INFINITY; 2];
    let mut rounds_seen = 0;

    for _ in 0..ticks {
        tick(&mut app, 1);

        let rounds_started = events::<RoundStarted>(&app).len();
        if rounds_started != rounds_seen {
            rounds_seen = rounds_started;
            cooldowns = [f32::NEG_INFINITY; 2];
        }

        for (slot, entity) in [arena.left, arena.right].into_iter().enumerate() {
            let fighter = player(&app, entity);
            check_player_invariants(&fighter);
            // Cooldown внутри раунда только продлевается
            assert!(
                fighter.action_timeout_until >= cooldowns[slot],
                "{:?}: cooldown went back",
                fighter.side
            );
            cooldowns[slot] = fighter.action_timeout_until;
        }

        match app.world().resource::<RoundState>().phase {
            RoundPhase::RoundOver { .. } => send(&mut app, RoundCommand::Advance),
            RoundPhase::MatchOver { .. } => break,
            RoundPhase::Fighting => {}
        }
    }

    MatchRecord {
        players: world_snapshot::<Player>(app.world_mut()),
        transforms: world_snapshot::<Transform>(app.world_mut()),
        rounds_started: rounds_seen,
    }
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;

    let first = run_bot_match(SEED, TICK_COUNT);
    let second = run_bot_match(SEED, TICK_COUNT);

    assert_eq!(
        first.players, second.players,
        "Матч с одинаковым seed ({}) дал разных бойцов!",
        SEED
    );
    assert_eq!(first.transforms, second.transforms);
    assert_eq!(first.rounds_started, second.rounds_started);
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICKS: usize = 60 * 20;

    let records: Vec<_> = (0..3).map(|_| run_bot_match(SEED, TICKS)).collect();

    for (i, record) in records.iter().enumerate().skip(1) {
        assert_eq!(
            records[0].transforms, record.transforms,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

#[test]
fn test_different_seeds_diverge() {
    const TICKS: usize = 60 * 10;

    let first = run_bot_match(1, TICKS);
    let second = run_bot_match(2, TICKS);

    assert_ne!(first.transforms, second.transforms);
}

#[test]
fn test_bot_match_progresses() {
    let record = run_bot_match(7, TICK_COUNT);

    // Раунд не дольше 20 секунд: к 90-й секунде сыграны минимум три
    assert!(record.rounds_started >= 2, "rounds started: {}", record.rounds_started);
}
