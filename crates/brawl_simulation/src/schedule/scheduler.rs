//! Deferred execution: "через N секунд симуляции сделать X"
//!
//! Одна min-heap по deadline на весь мир. Отмена — "void, skip on pop":
//! - явно через `void` / `void_owned_by`
//! - неявно: задача владельца, которого уже нет в мире, не выполняется
//!
//! Вместо замыканий — типизированный `DeferredAction`, чтобы задачи
//! исполнялись обычной системой с доступом к ECS.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use bevy::prelude::*;

use super::SimClock;
use crate::combat::{AttackKind, AttackReleased};
use crate::components::Kinematic;
use crate::level::Drifter;

/// Что сделать, когда deadline наступит
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Уничтожить владельца (ttl hurter'а, гитары, эффекта)
    Despawn,
    /// Follow-through атаки: hit / smash / throw
    ReleaseAttack(AttackKind),
    /// Гитара разворачивается и летит обратно
    ReverseFlight,
    /// Очередной шаг скриптованного drifter'а
    DrifterThink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Задача, у которой наступил deadline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DueTask {
    pub id: TaskId,
    pub owner: Entity,
    pub action: DeferredAction,
    pub deadline: f32,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledTask {
    deadline: f32,
    id: TaskId,
    owner: Entity,
    action: DeferredAction,
}

// BinaryHeap — max-heap, поэтому порядок перевёрнут: раньше deadline → "больше".
// При равных deadline — порядок постановки (меньший id первым).
impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .total_cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledTask {}

#[derive(Resource, Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<ScheduledTask>,
    voided: HashSet<TaskId>,
    next_id: u64,
}

impl Scheduler {
    /// Запланировать на абсолютное время симуляции
    pub fn schedule_at(&mut self, deadline: f32, owner: Entity, action: DeferredAction) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.queue.push(ScheduledTask {
            deadline,
            id,
            owner,
            action,
        });
        id
    }

    /// Запланировать через `delay` секунд от текущего времени
    pub fn schedule_after(
        &mut self,
        clock: &SimClock,
        delay: f32,
        owner: Entity,
        action: DeferredAction,
    ) -> TaskId {
        self.schedule_at(clock.now + delay.max(0.0), owner, action)
    }

    pub fn void(&mut self, id: TaskId) {
        if self.queue.iter().any(|task| task.id == id) {
            self.voided.insert(id);
        }
    }

    /// Отменить все ожидающие задачи владельца (сброс раунда и т.п.)
    pub fn void_owned_by(&mut self, owner: Entity) {
        let owned: Vec<TaskId> = self
            .queue
            .iter()
            .filter(|task| task.owner == owner)
            .map(|task| task.id)
            .collect();
        self.voided.extend(owned);
    }

    /// Достать все задачи с deadline <= now в порядке deadline
    pub fn pop_due(&mut self, now: f32) -> Vec<DueTask> {
        let mut due = Vec::new();

        while self.queue.peek().is_some_and(|task| task.deadline <= now) {
            let Some(task) = self.queue.pop() else {
                break;
            };

            if self.voided.remove(&task.id) {
                continue;
            }

            due.push(DueTask {
                id: task.id,
                owner: task.owner,
                action: task.action,
                deadline: task.deadline,
            });
        }

        due
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        !self.voided.contains(&id) && self.queue.iter().any(|task| task.id == id)
    }

    /// Количество живых (не отменённых) задач
    pub fn pending_len(&self) -> usize {
        self.queue.len() - self.voided.len()
    }

    pub fn pending_for(&self, owner: Entity) -> usize {
        self.queue
            .iter()
            .filter(|task| task.owner == owner && !self.voided.contains(&task.id))
            .count()
    }
}

/// Система: выполнить задачи с наступившим deadline
///
/// Запускается первой в тике. Владелец, которого уже нет в мире
/// (или который удалён раньше в этом же батче) — задача пропускается.
pub fn run_due_tasks(
    mut commands: Commands,
    clock: Res<SimClock>,
    mut scheduler: ResMut<Scheduler>,
    live: Query<Entity>,
    mut bodies: Query<(&mut Kinematic, &mut Transform, Option<&mut Drifter>)>,
    mut attacks: EventWriter<AttackReleased>,
) {
    let mut despawned = HashSet::new();

    for task in scheduler.pop_due(clock.now) {
        if despawned.contains(&task.owner) || !live.contains(task.owner) {
            continue;
        }

        match task.action {
            DeferredAction::Despawn => {
                commands.entity(task.owner).try_despawn();
                despawned.insert(task.owner);
            }
            DeferredAction::ReleaseAttack(kind) => {
                attacks.write(AttackReleased {
                    attacker: task.owner,
                    kind,
                });
            }
            DeferredAction::ReverseFlight => {
                if let Ok((mut body, _, _)) = bodies.get_mut(task.owner) {
                    body.velocity = -body.velocity;
                    body.angular_velocity = -body.angular_velocity;
                }
            }
            DeferredAction::DrifterThink => {
                if let Ok((mut body, mut transform, Some(mut drifter))) = bodies.get_mut(task.owner) {
                    drifter.think(&mut transform, &mut body);
                    scheduler.schedule_after(&clock, drifter.interval, task.owner, DeferredAction::DrifterThink);
                }
            }
        }
    }
}
