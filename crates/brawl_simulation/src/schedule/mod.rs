//! Simulation tick: clock, custom schedule, порядок фаз
//!
//! # Архитектура
//!
//! Хост вызывает `advance_simulation(world, dt)` один раз за кадр
//! (или `run_simulation_tick` из FixedUpdate). Внутри:
//!
//! ```text
//! SimClock.now += dt
//!   └─ SimulationTick schedule
//!        Tasks → Input → Actions → Physics → Combat → Round → Camera → Animation
//! ```
//!
//! Между фазами Bevy вставляет apply_deferred: despawn/spawn из одной фазы
//! видны следующей, поэтому удаление entity во время итерации безопасно.
//!
//! В конце тика буферы событий симуляции ротируются (см. `TickEvents`):
//! событие живёт два тика, читатели со своим cursor'ом его не теряют.

use std::any::TypeId;

use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;

pub mod scheduler;


pub use scheduler::{run_due_tasks, DeferredAction, DueTask, Scheduler, TaskId};

/// Custom schedule: один логический update(dt) симуляции
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationTick;

/// Фазы тика (выполняются строго последовательно)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Отложенные callbacks с истёкшим deadline
    Tasks,
    /// Keymap / bots → PlayerCommand
    Input,
    /// State machine игроков, запуск атак
    Actions,
    /// Velocity, интеграция, границы арены, solid collision
    Physics,
    /// Hurters против игроков, урон
    Combat,
    /// Таймер раунда, победа, переход раундов
    Round,
    /// Кадрирование камеры
    Camera,
    /// Animation tags по итогам тика
    Animation,
}

/// Часы симуляции (simulation time, не wall time)
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimClock {
    /// Монотонное время симуляции (секунды)
    pub now: f32,
    /// dt текущего тика
    pub dt: f32,
    pub tick: u64,
}

impl SimClock {
    pub fn advance(&mut self, dt: f32) {
        // Отрицательный dt от хоста = пауза, время назад не идёт
        self.dt = dt.max(0.0);
        self.now += self.dt;
        self.tick = self.tick.wrapping_add(1);
    }
}

/// Реестр событий, которые ротируются раз в тик симуляции
///
/// `advance_simulation` вызывается в обход `app.update()`, поэтому
/// `event_update_system` Bevy до этих буферов не доходит.
#[derive(Resource, Default)]
pub struct TickEvents {
    updaters: Vec<(TypeId, fn(&mut World))>,
}

impl TickEvents {
    pub fn register<E: Event>(&mut self) {
        let id = TypeId::of::<E>();
        if self.updaters.iter().any(|(registered, _)| *registered == id) {
            return;
        }
        self.updaters.push((id, update_events::<E>));
    }

    pub fn len(&self) -> usize {
        self.updaters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updaters.is_empty()
    }
}

fn update_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.update();
    }
}

/// Ротировать буферы всех зарегистрированных событий
pub fn rotate_tick_events(world: &mut World) {
    let updaters: Vec<fn(&mut World)> = match world.get_resource::<TickEvents>() {
        Some(registry) => registry.updaters.iter().map(|(_, updater)| *updater).collect(),
        None => return,
    };

    for update in updaters {
        update(world);
    }
}

/// `add_event` + ротация на каждом тике симуляции
pub trait TickEventsAppExt {
    fn add_tick_event<E: Event>(&mut self) -> &mut Self;
}

impl TickEventsAppExt for App {
    fn add_tick_event<E: Event>(&mut self) -> &mut Self {
        self.add_event::<E>();
        self.world_mut()
            .get_resource_or_insert_with(TickEvents::default)
            .register::<E>();
        self
    }
}

/// Прогнать один тик симуляции с явным dt
pub fn advance_simulation(world: &mut World, dt: f32) {
    world.resource_mut::<SimClock>().advance(dt);
    world.run_schedule(SimulationTick);
    rotate_tick_events(world);
}

/// Exclusive system: мост FixedUpdate → SimulationTick
pub fn run_simulation_tick(world: &mut World) {
    let dt = world.resource::<Time<Fixed>>().delta_secs();
    advance_simulation(world, dt);
}

/// Регистрирует schedule, порядок фаз, clock и scheduler
pub struct TickPlugin;

impl Plugin for TickPlugin {
    fn build(&self, app: &mut App) {
        app.init_schedule(SimulationTick)
            .init_resource::<TickEvents>()
            .init_resource::<SimClock>()
            .init_resource::<Scheduler>()
            .configure_sets(
                SimulationTick,
                (
                    TickSet::Tasks,
                    TickSet::Input,
                    TickSet::Actions,
                    TickSet::Physics,
                    TickSet::Combat,
                    TickSet::Round,
                    TickSet::Camera,
                    TickSet::Animation,
                )
                    .chain(),
            )
            .add_systems(SimulationTick, run_due_tasks.in_set(TickSet::Tasks))
            .add_systems(FixedUpdate, run_simulation_tick);
    }
}
