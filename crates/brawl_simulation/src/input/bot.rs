//! Bot driver: случайный, но воспроизводимый input для headless матчей
//!
//! Каждые `interval` секунд бот отпускает зажатое действие и нажимает
//! новое, выбранное из DeterministicRng. Один seed → один и тот же матч.

use bevy::prelude::*;
use rand::Rng;

use super::{Action, PlayerCommand};
use crate::components::Player;
use crate::round::RoundState;
use crate::schedule::SimClock;
use crate::DeterministicRng;

/// Из чего бот выбирает
pub const BOT_ACTIONS: [Action; 7] = [
    Action::Go { direction: -1 },
    Action::Go { direction: 1 },
    Action::Jump,
    Action::Hit,
    Action::Block,
    Action::Throw,
    Action::Special,
];

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Bot {
    /// Секунды между решениями
    pub interval: f32,
    pub next_decision_at: f32,
    #[reflect(ignore)]
    pub held: Option<Action>,
}

impl Bot {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            next_decision_at: 0.0,
            held: None,
        }
    }
}

/// Система: решения ботов
pub fn drive_bots(
    clock: Res<SimClock>,
    round: Res<RoundState>,
    mut rng: ResMut<DeterministicRng>,
    mut bots: Query<(&mut Bot, &Player)>,
    mut commands: EventWriter<PlayerCommand>,
) {
    if !round.is_fighting() {
        return;
    }

    for (mut bot, player) in bots.iter_mut() {
        if clock.now < bot.next_decision_at {
            continue;
        }

        if let Some(held) = bot.held.take() {
            commands.write(PlayerCommand::release(player.side, held));
        }

        let action = BOT_ACTIONS[rng.rng.gen_range(0..BOT_ACTIONS.len())];
        commands.write(PlayerCommand::press(player.side, action));

        bot.held = Some(action);
        bot.next_decision_at = clock.now + bot.interval;
    }
}
