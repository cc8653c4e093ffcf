//! Input layer: key events хоста → команды игроков
//!
//! Хост шлёт `KeyInput` (нажатие / отпускание), keymap превращает их в
//! `PlayerCommand` (do_<action> / stop_<action>) или в confirm раунда.
//! Боты (headless матчи) пишут те же `PlayerCommand`.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod bot;

pub use bot::{drive_bots, Bot, BOT_ACTIONS};

use crate::components::Side;
use crate::config::SimulationConfig;
use crate::round::RoundCommand;
use crate::schedule::{SimulationTick, TickEventsAppExt, TickSet};

/// Действие бойца
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// direction: -1 влево, +1 вправо
    Go { direction: i8 },
    Jump,
    Hit,
    Block,
    Throw,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionPhase {
    /// do_<action>
    Press,
    /// stop_<action>
    Release,
}

/// Команда конкретному игроку
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerCommand {
    pub side: Side,
    pub action: Action,
    pub phase: ActionPhase,
}

impl PlayerCommand {
    pub fn press(side: Side, action: Action) -> Self {
        Self {
            side,
            action,
            phase: ActionPhase::Press,
        }
    }

    pub fn release(side: Side, action: Action) -> Self {
        Self {
            side,
            action,
            phase: ActionPhase::Release,
        }
    }
}

/// Сырое событие клавиатуры хоста (имя клавиши как строка)
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub pressed: bool,
}

impl KeyInput {
    pub fn press(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            pressed: true,
        }
    }

    pub fn release(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            pressed: false,
        }
    }
}

/// Куда ведёт клавиша
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "kebab-case")]
pub enum Binding {
    Player { side: Side, action: Action },
    /// Подтверждение на экране победы → RoundCommand::Advance
    Confirm,
}

/// Статическая таблица клавиш
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keymap(pub HashMap<String, Binding>);

impl Default for Keymap {
    fn default() -> Self {
        let player = |side, action| Binding::Player { side, action };
        let table = [
            ("W", player(Side::Left, Action::Jump)),
            ("A", player(Side::Left, Action::Go { direction: -1 })),
            ("D", player(Side::Left, Action::Go { direction: 1 })),
            ("Z", player(Side::Left, Action::Hit)),
            ("C", player(Side::Left, Action::Special)),
            ("V", player(Side::Left, Action::Throw)),
            ("B", player(Side::Left, Action::Block)),
            ("Up", player(Side::Right, Action::Jump)),
            ("Left", player(Side::Right, Action::Go { direction: -1 })),
            ("Right", player(Side::Right, Action::Go { direction: 1 })),
            ("Num1", player(Side::Right, Action::Hit)),
            ("Num3", player(Side::Right, Action::Special)),
            ("Num4", player(Side::Right, Action::Throw)),
            ("Num5", player(Side::Right, Action::Block)),
            ("Return", Binding::Confirm),
        ];

        Self(table.into_iter().map(|(key, binding)| (key.to_string(), binding)).collect())
    }
}

impl Keymap {
    pub fn resolve(&self, key: &str) -> Option<Binding> {
        self.0.get(key).copied()
    }
}

/// Система: KeyInput → PlayerCommand / RoundCommand
///
/// Клавиши вне keymap игнорируются.
pub fn apply_keymap(
    mut keys: EventReader<KeyInput>,
    config: Res<SimulationConfig>,
    mut player_commands: EventWriter<PlayerCommand>,
    mut round_commands: EventWriter<RoundCommand>,
) {
    for key in keys.read() {
        match config.keymap.resolve(&key.key) {
            Some(Binding::Player { side, action }) => {
                let phase = if key.pressed {
                    ActionPhase::Press
                } else {
                    ActionPhase::Release
                };
                player_commands.write(PlayerCommand { side, action, phase });
            }
            Some(Binding::Confirm) if key.pressed => {
                round_commands.write(RoundCommand::Advance);
            }
            Some(Binding::Confirm) | None => {}
        }
    }
}

/// Input Plugin
///
/// Клавиатура раньше ботов: порядок команд в тике фиксирован.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_tick_event::<KeyInput>()
            .add_tick_event::<PlayerCommand>()
            .add_systems(SimulationTick, (apply_keymap, drive_bots).chain().in_set(TickSet::Input));
    }
}
