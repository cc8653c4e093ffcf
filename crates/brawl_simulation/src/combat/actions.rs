//! State machine бойца: команда → переход + triggers
//!
//! # Таблица переходов
//!
//! ```text
//! jump     standing|block, cooldown ok     → vy = impulse, Jump, "jump"
//! block ↓  standing, cooldown ok           → Block (defence raised), "block"
//! block ↑  block                           → Standing (compare-and-set)
//! hit      standing, cooldown ok, alive    → schedule Hit, cooldown
//!          jump, cooldown ok, alive        → schedule Smash, longer cooldown
//! throw    standing|block, cooldown ok     → Standing, schedule Throw, cooldown
//! special  cooldown ok, meter full         → "special"
//! go ↓/↑   not lying                       → move intent held / released
//! ```
//!
//! Команда вне guard'а молча игнорируется.

use bevy::prelude::*;

use super::{AttackKind, PlayerEvent, PlayerTriggered};
use crate::components::{Animation, FighterState, Kinematic, Player, SpecialMeter, StateChange};
use crate::config::SimulationConfig;
use crate::error::BrawlError;
use crate::input::{Action, ActionPhase, PlayerCommand};
use crate::round::RoundState;
use crate::schedule::{DeferredAction, Scheduler, SimClock};

/// Результат одной команды
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutcome {
    /// Triggers для публикации, по порядку
    pub events: Vec<PlayerEvent>,
    /// Отложенный удар: вид атаки + delay (сек)
    pub release: Option<(AttackKind, f32)>,
}

impl ActionOutcome {
    fn state_changed(&mut self, change: Option<StateChange>) {
        if let Some(StateChange { from, to }) = change {
            self.events.push(PlayerEvent::StateChanged { from, to });
        }
    }
}

/// Применить `do_<action>` / `stop_<action>` к бойцу
///
/// Без ECS: события и follow-through публикует вызывающий.
pub fn apply_action(
    player: &mut Player,
    body: &mut Kinematic,
    meter: Option<&mut SpecialMeter>,
    action: Action,
    phase: ActionPhase,
    now: f32,
    config: &SimulationConfig,
) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();
    let combat = &config.combat;

    match (phase, action) {
        (ActionPhase::Press, Action::Go { direction }) => {
            if player.state != FighterState::Lying {
                player.move_intent.set(direction, true);
            }
        }
        (ActionPhase::Release, Action::Go { direction }) => {
            player.move_intent.set(direction, false);
        }

        (ActionPhase::Press, Action::Jump) => {
            if matches!(player.state, FighterState::Standing | FighterState::Block) && player.can_act(now) {
                body.velocity.y = config.physics.jump_impulse;
                outcome.state_changed(player.change_state(FighterState::Jump));
                outcome.events.push(PlayerEvent::Jump);
            }
        }

        (ActionPhase::Press, Action::Block) => {
            if player.state == FighterState::Standing && player.can_act(now) {
                outcome.state_changed(player.change_state(FighterState::Block));
                outcome.events.push(PlayerEvent::Block);
            }
        }
        (ActionPhase::Release, Action::Block) => {
            outcome.state_changed(player.change_state_from(FighterState::Block, FighterState::Standing));
        }

        (ActionPhase::Press, Action::Hit) => {
            if player.can_act(now) && player.is_alive() {
                match player.state {
                    FighterState::Standing => {
                        player.extend_cooldown(now, combat.hit.cooldown);
                        outcome.release = Some((AttackKind::Hit, combat.hit.delay));
                    }
                    FighterState::Jump => {
                        player.extend_cooldown(now, combat.smash.cooldown);
                        outcome.release = Some((AttackKind::Smash, combat.smash.delay));
                    }
                    FighterState::Block | FighterState::Lying => {}
                }
            }
        }

        (ActionPhase::Press, Action::Throw) => {
            if matches!(player.state, FighterState::Standing | FighterState::Block) && player.can_act(now) {
                outcome.state_changed(player.change_state(FighterState::Standing));
                player.extend_cooldown(now, combat.throw.cooldown);
                outcome.release = Some((AttackKind::Throw, combat.throw.delay));
            }
        }

        (ActionPhase::Press, Action::Special) => {
            if player.can_act(now) && player.is_alive() {
                if let Some(meter) = meter {
                    if meter.spend() {
                        outcome.events.push(PlayerEvent::Special);
                    }
                }
            }
        }

        // stop_jump / stop_hit / stop_throw / stop_special — no-op
        (ActionPhase::Release, _) => {}
    }

    outcome
}

/// System: PlayerCommand → state machine
///
/// Вне Fighting нажатия игнорируются. Команда для стороны без игрока
/// = ошибка сборки мира → BrawlError.
pub fn handle_player_commands(
    mut player_commands: EventReader<PlayerCommand>,
    clock: Res<SimClock>,
    config: Res<SimulationConfig>,
    round: Res<RoundState>,
    mut scheduler: ResMut<Scheduler>,
    mut players: Query<(Entity, &mut Player, &mut Kinematic, Option<&mut SpecialMeter>)>,
    mut triggers: EventWriter<PlayerTriggered>,
) -> Result {
    for command in player_commands.read() {
        if command.phase == ActionPhase::Press && !round.is_fighting() {
            continue;
        }

        let (entity, mut player, mut body, mut meter) = players
            .iter_mut()
            .find(|(_, player, _, _)| player.side == command.side)
            .ok_or(BrawlError::MissingPlayer(command.side))?;

        let outcome = apply_action(
            &mut player,
            &mut body,
            meter.as_deref_mut(),
            command.action,
            command.phase,
            clock.now,
            &config,
        );

        if let Some((kind, delay)) = outcome.release {
            scheduler.schedule_after(&clock, delay, entity, DeferredAction::ReleaseAttack(kind));
        }

        for event in outcome.events {
            triggers.write(PlayerTriggered {
                player: entity,
                side: player.side,
                event,
            });
        }
    }

    Ok(())
}

/// Система: Animation tag следует за сменой состояния
pub fn sync_animation(
    mut triggers: EventReader<PlayerTriggered>,
    mut animations: Query<&mut Animation>,
) {
    for trigger in triggers.read() {
        if let PlayerEvent::StateChanged { to, .. } = trigger.event {
            if let Ok(mut animation) = animations.get_mut(trigger.player) {
                animation.name = to.animation();
            }
        }
    }
}
