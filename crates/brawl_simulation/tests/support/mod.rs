//! Общие helpers для integration тестов
//!
//! Тики крутятся через `advance_simulation`, буферы событий ротируются
//! каждый тик. Поэтому события пишутся в `Recorded<E>` системой-читателем
//! в конце тика, и `events::<E>()` видит всё с начала теста.

#![allow(dead_code)]

use bevy::prelude::*;
use brawl_simulation::*;

pub const DT: f32 = 1.0 / 60.0;

/// Все события типа `E`, прочитанные в конце каждого тика
#[derive(Resource)]
pub struct Recorded<E: Event>(pub Vec<E>);

fn record_events<E: Event + Clone>(mut reader: EventReader<E>, mut recorded: ResMut<Recorded<E>>) {
    recorded.0.extend(reader.read().cloned());
}

/// Начать запись событий `E` (до первого тика)
pub fn record<E: Event + Clone>(app: &mut App) {
    app.insert_resource(Recorded::<E>(Vec::new()));
    app.add_systems(SimulationTick, record_events::<E>.after(TickSet::Animation));
}

/// Helper: headless App со всеми plugins симуляции
pub fn create_match_app(config: SimulationConfig) -> App {
    let mut app = create_headless_app(config.seed);
    app.insert_resource(config);
    app.add_plugins(BrawlPlugin);

    record::<PlayerTriggered>(&mut app);
    record::<HurterHit>(&mut app);
    record::<RoundEnded>(&mut app);
    record::<RoundStarted>(&mut app);
    record::<MatchEnded>(&mut app);
    app
}

/// Helper: App + арена (оба игрока + камера)
pub fn create_arena_app(config: SimulationConfig) -> (App, Arena) {
    let mut app = create_match_app(config);
    let arena = spawn_arena(app.world_mut()).expect("arena spawns");
    (app, arena)
}

pub fn tick(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        advance_simulation(app.world_mut(), DT);
    }
}

/// Прогнать симуляцию на `seconds` секунд
pub fn run_for(app: &mut App, seconds: f32) {
    tick(app, (seconds / DT).ceil() as usize);
}

pub fn events<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world().resource::<Recorded<E>>().0.clone()
}

pub fn send<E: Event>(app: &mut App, event: E) {
    app.world_mut().resource_mut::<Events<E>>().send(event);
}

pub fn player(app: &App, entity: Entity) -> Player {
    app.world().get::<Player>(entity).expect("player exists").clone()
}

pub fn player_mut(app: &mut App, entity: Entity) -> Mut<'_, Player> {
    app.world_mut().get_mut::<Player>(entity).expect("player exists")
}

pub fn place(app: &mut App, entity: Entity, x: f32) {
    let mut transform = app.world_mut().get_mut::<Transform>(entity).expect("transform exists");
    transform.translation.x = x;
}

pub fn position(app: &App, entity: Entity) -> Vec2 {
    app.world()
        .get::<Transform>(entity)
        .expect("transform exists")
        .translation
        .truncate()
}

pub fn count<C: Component>(app: &mut App) -> usize {
    let world = app.world_mut();
    world.query::<&C>().iter(world).count()
}

/// Проверить инварианты бойца
pub fn check_player_invariants(player: &Player) {
    assert!(
        (0.0..=player.max_health).contains(&player.health),
        "{:?}: health {} out of range",
        player.side,
        player.health
    );
    if player.health == 0.0 {
        assert_eq!(player.state, FighterState::Lying, "{:?}: dead but not lying", player.side);
    }
}
