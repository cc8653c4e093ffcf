//! Combat module: state machine бойцов, атаки, hurters, урон
//!
//! ECS ответственность:
//! - State machine: Player + PlayerCommand → state / velocity / cooldown
//! - Attacks: отложенный follow-through → Hurter / FlyingGuitar
//! - Damage: Hurter overlap → hurt → knockback / defeat
//!
//! Хост подписывается на `PlayerTriggered` (анимации, звуки) и
//! `RoundEnded` (экран победы).

use bevy::prelude::*;

pub mod actions;
pub mod attacks;
pub mod damage;
pub mod hurter;


pub use actions::{apply_action, handle_player_commands, sync_animation, ActionOutcome};
pub use attacks::{release_attacks, spawn_guitar, spawn_hurter, HurterSpec, Projectile};
pub use damage::{apply_hurts, knockback};
pub use hurter::{scan_hurters, HitEffect, Hurter};

use crate::components::{FighterState, Side};
use crate::schedule::{SimulationTick, TickEventsAppExt, TickSet};

/// Атаки с follow-through (запускаются через Scheduler)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackKind {
    /// Удар стоя
    Hit,
    /// Удар в прыжке
    Smash,
    /// Бросок гитары
    Throw,
}

/// Trigger бойца (typed замена таблицы "event name → handler")
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    StateChanged { from: FighterState, to: FighterState },
    Jump,
    Block,
    Hit,
    Smash,
    Throw,
    Special,
    Hurt { damage: f32 },
    Defeated,
}

impl From<AttackKind> for PlayerEvent {
    fn from(kind: AttackKind) -> Self {
        match kind {
            AttackKind::Hit => PlayerEvent::Hit,
            AttackKind::Smash => PlayerEvent::Smash,
            AttackKind::Throw => PlayerEvent::Throw,
        }
    }
}

/// Событие: trigger(event, payload) бойца — для animation/sound слоя хоста
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlayerTriggered {
    pub player: Entity,
    pub side: Side,
    pub event: PlayerEvent,
}

/// Событие: follow-through атаки наступил (из Scheduler)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackReleased {
    pub attacker: Entity,
    pub kind: AttackKind,
}

/// Событие: hurter пересёкся с игроком (один раз за жизнь hurter'а)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HurterHit {
    pub hurter: Entity,
    pub owner: Entity,
    pub owner_side: Side,
    pub target: Entity,
    pub damage: f32,
    pub level: i32,
    pub hurter_position: Vec2,
}

/// Combat Plugin
///
/// Порядок выполнения внутри тика:
/// 1. handle_player_commands — state machine по входным командам (Actions)
/// 2. release_attacks — follow-through → spawn hurter / гитары (Actions)
/// 3. scan_hurters — overlap hurter ↔ игрок → HurterHit (Combat)
/// 4. apply_hurts — урон, отбрасывание, поражение (Combat)
/// 5. sync_animation — animation tag по смене состояния (Animation, в конце тика)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_tick_event::<PlayerTriggered>()
            .add_tick_event::<AttackReleased>()
            .add_tick_event::<HurterHit>();

        app.add_systems(
            SimulationTick,
            (
                (handle_player_commands, release_attacks)
                    .chain()
                    .in_set(TickSet::Actions),
                (scan_hurters, apply_hurts).chain().in_set(TickSet::Combat),
                sync_animation.in_set(TickSet::Animation),
            ),
        );
    }
}
