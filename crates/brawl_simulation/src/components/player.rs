//! Боец: сторона, состояние, здоровье, защита, cooldown
//!
//! Инварианты:
//! - 0 ≤ health ≤ max_health, после 0 здоровье не растёт до сброса раунда
//! - ровно одно состояние FighterState активно
//! - action_timeout_until не убывает между сбросами раунда

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CombatTuning;

/// Сторона игрока (фиксированные id "left" / "right")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Направление взгляда: левый смотрит вправо, правый — влево
    pub fn facing(self) -> f32 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }

    /// Id entity игрока в мире
    pub fn entity_id(self) -> &'static str {
        match self {
            Side::Left => "player-left",
            Side::Right => "player-right",
        }
    }
}

/// Состояния бойца (hit/smash/throw/special — транзиентные триггеры, не состояния)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum FighterState {
    #[default]
    Standing,
    Jump,
    Block,
    Lying,
}

impl FighterState {
    pub fn animation(self) -> &'static str {
        match self {
            FighterState::Standing => "stand",
            FighterState::Jump => "jump",
            FighterState::Block => "block",
            FighterState::Lying => "lie",
        }
    }
}

/// Зажатые направления движения (-1 / +1)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct MoveIntent {
    pub back: bool,
    pub forward: bool,
}

impl MoveIntent {
    /// direction < 0 — влево, > 0 — вправо (в мировых координатах)
    pub fn set(&mut self, direction: i8, held: bool) {
        match direction.signum() {
            -1 => self.back = held,
            1 => self.forward = held,
            _ => {}
        }
    }

    /// Сумма зажатых направлений: -1, 0 или +1
    pub fn axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.back {
            axis -= 1.0;
        }
        if self.forward {
            axis += 1.0;
        }
        axis
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Результат смены состояния (для trigger "state-change")
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: FighterState,
    pub to: FighterState,
}

/// Результат `Player::hurt`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HurtOutcome {
    /// Уже лежит / мёртв — урон не применяется
    Ignored,
    /// defence_level >= level: блок поглотил удар полностью
    Blocked,
    Damaged { damage: f32 },
    /// Здоровье дошло до 0 этим ударом
    Defeated { damage: f32 },
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Player {
    pub side: Side,
    pub state: FighterState,
    pub health: f32,
    pub max_health: f32,
    pub defence_level: i32,
    /// defence_level, который выставляется в состоянии Block
    pub block_defence: i32,
    pub width: f32,
    pub height: f32,
    /// Абсолютное время симуляции; action разрешён только когда now > этого значения
    pub action_timeout_until: f32,
    pub move_intent: MoveIntent,
}

impl Player {
    pub fn new(side: Side, tuning: &CombatTuning) -> Self {
        Self {
            side,
            state: FighterState::Standing,
            health: tuning.max_health,
            max_health: tuning.max_health,
            defence_level: 0,
            block_defence: tuning.block_defence,
            width: tuning.player_width,
            height: tuning.player_height,
            action_timeout_until: f32::NEG_INFINITY,
            move_intent: MoveIntent::default(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn facing(&self) -> f32 {
        self.side.facing()
    }

    pub fn can_act(&self, now: f32) -> bool {
        now > self.action_timeout_until
    }

    /// Продлить animation lock. Монотонно: cooldown никогда не укорачивается.
    pub fn extend_cooldown(&mut self, now: f32, timeout: f32) {
        self.action_timeout_until = self.action_timeout_until.max(now + timeout);
    }

    /// Сменить состояние (on_state_change: defence сбрасывается, в Block поднимается)
    pub fn change_state(&mut self, to: FighterState) -> Option<StateChange> {
        if self.state == to {
            return None;
        }

        let from = self.state;
        self.state = to;
        self.defence_level = 0;
        if to == FighterState::Block {
            self.defence_level = self.block_defence;
        }

        Some(StateChange { from, to })
    }

    /// Compare-and-set: меняем состояние только если всё ещё в `from`
    pub fn change_state_from(&mut self, from: FighterState, to: FighterState) -> Option<StateChange> {
        if self.state != from {
            return None;
        }
        self.change_state(to)
    }

    /// Горизонтальная скорость от move intent (прямое присваивание, не ускорение)
    pub fn horizontal_velocity(&self, move_speed: f32) -> f32 {
        match self.state {
            FighterState::Standing | FighterState::Jump => self.move_intent.axis() * move_speed,
            FighterState::Block | FighterState::Lying => 0.0,
        }
    }

    /// Применить удар hurter'а уровня `level`.
    ///
    /// Состояние не меняется: перевод в Lying делает вызывающая система,
    /// чтобы отправить trigger смены состояния.
    pub fn hurt(&mut self, damage: f32, level: i32) -> HurtOutcome {
        if !self.is_alive() || self.state == FighterState::Lying {
            return HurtOutcome::Ignored;
        }

        if self.defence_level >= level {
            return HurtOutcome::Blocked;
        }

        let damage = damage.max(0.0);
        self.health = (self.health - damage).clamp(0.0, self.max_health);

        if self.is_alive() {
            HurtOutcome::Damaged { damage }
        } else {
            HurtOutcome::Defeated { damage }
        }
    }

    /// Сброс к началу раунда
    pub fn reset_for_round(&mut self) {
        self.state = FighterState::Standing;
        self.health = self.max_health;
        self.defence_level = 0;
        self.action_timeout_until = f32::NEG_INFINITY;
        self.move_intent.clear();
    }
}

/// Заряд special-приёма (specialAvailable hook)
///
/// Без этого компонента special недоступен никогда.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct SpecialMeter {
    pub charge: f32,
    pub required: f32,
    /// Заряд за единицу нанесённого урона
    pub gain: f32,
}

impl SpecialMeter {
    pub fn new(required: f32, gain: f32) -> Self {
        Self {
            charge: 0.0,
            required,
            gain,
        }
    }

    pub fn is_full(&self) -> bool {
        self.charge >= self.required
    }

    pub fn add_damage(&mut self, damage: f32) {
        self.charge = (self.charge + damage * self.gain).min(self.required);
    }

    pub fn spend(&mut self) -> bool {
        if !self.is_full() {
            return false;
        }
        self.charge = 0.0;
        true
    }
}
