//! Round / match controller
//!
//! # Жизненный цикл
//!
//! ```text
//! Fighting ──(KO | таймер | EndRound)──► RoundOver{winner}
//!     ▲                                      │ Advance
//!     └──── RoundStarted (round += 1) ◄──────┤
//!                                            └─► MatchOver{winner}  (MatchLengthPolicy)
//! StartMatch из любой фазы: счёт обнулён, раунд 1
//! ```
//!
//! В RoundOver / MatchOver input и урон выключены (см. `RoundState::is_fighting`).

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::CameraController;
use crate::combat::{HitEffect, Hurter, PlayerEvent, PlayerTriggered, Projectile};
use crate::components::{Animation, CameraTarget, FighterState, Kinematic, Player, Side, SpecialMeter};
use crate::config::SimulationConfig;
use crate::error::BrawlError;
use crate::logger::log_info;
use crate::schedule::{Scheduler, SimClock, SimulationTick, TickEventsAppExt, TickSet};

/// Счёт матча. Меняется только в конце раунда, сбрасывается только StartMatch.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    pub wins: HashMap<Side, u32>,
    /// Номер текущего раунда (с 1)
    pub round: u32,
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            wins: HashMap::new(),
            round: 1,
        }
    }
}

impl MatchState {
    pub fn wins_of(&self, side: Side) -> u32 {
        self.wins.get(&side).copied().unwrap_or(0)
    }

    pub fn record_win(&mut self, side: Side) {
        *self.wins.entry(side).or_insert(0) += 1;
    }

    /// Сторона с большим числом побед (None при равенстве)
    pub fn leader(&self) -> Option<Side> {
        let left = self.wins_of(Side::Left);
        let right = self.wins_of(Side::Right);
        match left.cmp(&right) {
            std::cmp::Ordering::Greater => Some(Side::Left),
            std::cmp::Ordering::Less => Some(Side::Right),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Когда матч окончен
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum MatchLengthPolicy {
    /// Окончен, когда сыграно больше `rounds` раундов и счёт не равный
    LeaderAfterRounds { rounds: u32 },
    /// Матч не заканчивается сам (тренировка)
    Endless,
}

impl Default for MatchLengthPolicy {
    fn default() -> Self {
        MatchLengthPolicy::LeaderAfterRounds { rounds: 2 }
    }
}

impl MatchLengthPolicy {
    /// Проверяется после завершения раунда `state.round`
    pub fn is_match_over(&self, state: &MatchState) -> bool {
        match *self {
            MatchLengthPolicy::LeaderAfterRounds { rounds } => state.round > rounds && state.leader().is_some(),
            MatchLengthPolicy::Endless => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundPhase {
    #[default]
    Fighting,
    /// Раунд решён, хост показывает prompt и ждёт Advance
    RoundOver { winner: Option<Side> },
    MatchOver { winner: Option<Side> },
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct RoundState {
    pub phase: RoundPhase,
    /// Секунды до конца раунда по таймеру
    pub time_left: f32,
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new(60.0)
    }
}

impl RoundState {
    pub fn new(round_time: f32) -> Self {
        Self {
            phase: RoundPhase::Fighting,
            time_left: round_time,
        }
    }

    pub fn is_fighting(&self) -> bool {
        self.phase == RoundPhase::Fighting
    }

    pub fn finish_round(&mut self, winner: Option<Side>) {
        self.phase = RoundPhase::RoundOver { winner };
    }

    pub fn start_round(&mut self, round_time: f32) {
        *self = Self::new(round_time);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEndCause {
    Knockout,
    TimeUp,
    /// RoundCommand::EndRound от хоста
    Forced,
}

/// Событие "win": раунд решён (winner = None — ничья)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEnded {
    pub winner: Option<Side>,
    pub cause: RoundEndCause,
}

/// Команды хоста (confirm, меню)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundCommand {
    /// Следующий раунд или конец матча (только из RoundOver)
    Advance,
    /// Новый матч: счёт обнулён
    StartMatch,
    /// Закончить раунд сейчас, победитель по здоровью
    EndRound,
}

/// Событие: начался раунд `round`
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundStarted {
    pub round: u32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchEnded {
    pub winner: Option<Side>,
    pub rounds: u32,
}

/// Строго больше здоровья — победа, равное — ничья
pub fn winner_by_health(left: f32, right: f32) -> Option<Side> {
    if left > right {
        Some(Side::Left)
    } else if right > left {
        Some(Side::Right)
    } else {
        None
    }
}

fn health_of(players: &Query<&Player>, side: Side) -> Result<f32, BrawlError> {
    players
        .iter()
        .find(|player| player.side == side)
        .map(|player| player.health)
        .ok_or(BrawlError::MissingPlayer(side))
}

fn decide_by_health(players: &Query<&Player>) -> Result<Option<Side>, BrawlError> {
    Ok(winner_by_health(
        health_of(players, Side::Left)?,
        health_of(players, Side::Right)?,
    ))
}

/// Система: таймер раунда
pub fn tick_round_timer(
    clock: Res<SimClock>,
    mut round: ResMut<RoundState>,
    players: Query<&Player>,
    mut ended: EventWriter<RoundEnded>,
) -> Result {
    // Арена ещё не создана
    if players.is_empty() || !round.is_fighting() || round.time_left <= 0.0 {
        return Ok(());
    }

    round.time_left = (round.time_left - clock.dt).max(0.0);
    if round.time_left > 0.0 {
        return Ok(());
    }

    ended.write(RoundEnded {
        winner: decide_by_health(&players)?,
        cause: RoundEndCause::TimeUp,
    });
    Ok(())
}

/// Система: RoundCommand от хоста
pub fn handle_round_commands(
    mut round_commands: EventReader<RoundCommand>,
    config: Res<SimulationConfig>,
    mut match_state: ResMut<MatchState>,
    mut round: ResMut<RoundState>,
    players: Query<&Player>,
    mut ended: EventWriter<RoundEnded>,
    mut started: EventWriter<RoundStarted>,
    mut match_ended: EventWriter<MatchEnded>,
) -> Result {
    for command in round_commands.read() {
        match command {
            RoundCommand::EndRound => {
                if round.is_fighting() {
                    ended.write(RoundEnded {
                        winner: decide_by_health(&players)?,
                        cause: RoundEndCause::Forced,
                    });
                }
            }
            RoundCommand::Advance => {
                if !matches!(round.phase, RoundPhase::RoundOver { .. }) {
                    continue;
                }

                if config.round.match_length.is_match_over(&match_state) {
                    let winner = match_state.leader();
                    round.phase = RoundPhase::MatchOver { winner };
                    match_ended.write(MatchEnded {
                        winner,
                        rounds: match_state.round,
                    });
                    log_info(&format!(
                        "Match over after {} rounds: winner {:?} ({}:{})",
                        match_state.round,
                        winner,
                        match_state.wins_of(Side::Left),
                        match_state.wins_of(Side::Right)
                    ));
                } else {
                    match_state.round += 1;
                    started.write(RoundStarted {
                        round: match_state.round,
                    });
                }
            }
            RoundCommand::StartMatch => {
                match_state.reset();
                started.write(RoundStarted {
                    round: match_state.round,
                });
            }
        }
    }

    Ok(())
}

/// Система: RoundEnded → счёт, отъезд камеры, RoundOver
///
/// Учитывается только первое окончание раунда (двойной KO в одном тике).
pub fn conclude_round(
    mut ended: EventReader<RoundEnded>,
    config: Res<SimulationConfig>,
    mut match_state: ResMut<MatchState>,
    mut round: ResMut<RoundState>,
    mut cameras: Query<&mut CameraController>,
) {
    for event in ended.read() {
        if !round.is_fighting() {
            continue;
        }

        if let Some(winner) = event.winner {
            match_state.record_win(winner);
            for mut camera in cameras.iter_mut() {
                camera.widen(Vec2::from(config.camera.win_pad));
            }
        }

        round.finish_round(event.winner);
        log_info(&format!(
            "Round {} over ({:?}): winner {:?}, score {}:{}",
            match_state.round,
            event.cause,
            event.winner,
            match_state.wins_of(Side::Left),
            match_state.wins_of(Side::Right)
        ));
    }
}

/// Система: RoundStarted → сброс арены
///
/// Игроки на стартовых позициях с полным здоровьем, их отложенные атаки
/// отменены, hurters / гитары / эффекты удалены, камера снова плотная.
pub fn start_round(
    mut commands: Commands,
    mut started: EventReader<RoundStarted>,
    config: Res<SimulationConfig>,
    mut round: ResMut<RoundState>,
    mut scheduler: ResMut<Scheduler>,
    mut players: Query<(
        Entity,
        &mut Player,
        &mut Kinematic,
        &mut Transform,
        Option<&mut Animation>,
        Option<&mut SpecialMeter>,
    )>,
    transients: Query<Entity, Or<(With<Hurter>, With<Projectile>, With<HitEffect>)>>,
    mut cameras: Query<&mut CameraController>,
    mut triggers: EventWriter<PlayerTriggered>,
) {
    let Some(event) = started.read().last().copied() else {
        return;
    };

    for (entity, mut player, mut body, mut transform, animation, meter) in players.iter_mut() {
        let from = player.state;
        player.reset_for_round();
        if from != FighterState::Standing {
            triggers.write(PlayerTriggered {
                player: entity,
                side: player.side,
                event: PlayerEvent::StateChanged {
                    from,
                    to: FighterState::Standing,
                },
            });
        }

        transform.translation.x = match player.side {
            Side::Left => config.combat.spawn_left,
            Side::Right => config.combat.spawn_right,
        };
        transform.translation.y = config.physics.limit_bottom;
        body.velocity = Vec2::ZERO;

        if let Some(mut animation) = animation {
            animation.name = FighterState::Standing.animation();
        }
        if let Some(mut meter) = meter {
            meter.charge = 0.0;
        }

        scheduler.void_owned_by(entity);
        commands.entity(entity).insert(CameraTarget);
    }

    for entity in transients.iter() {
        scheduler.void_owned_by(entity);
        commands.entity(entity).try_despawn();
    }

    for mut camera in cameras.iter_mut() {
        camera.reset_pad();
    }

    round.start_round(config.round.round_time);
    log_info(&format!("Round {} started", event.round));
}

/// Round Plugin
///
/// Порядок: таймер → команды хоста → подведение итогов → старт нового раунда
pub struct RoundPlugin;

impl Plugin for RoundPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MatchState>()
            .init_resource::<RoundState>()
            .add_tick_event::<RoundEnded>()
            .add_tick_event::<RoundCommand>()
            .add_tick_event::<RoundStarted>()
            .add_tick_event::<MatchEnded>()
            .add_systems(
                SimulationTick,
                (tick_round_timer, handle_round_commands, conclude_round, start_round)
                    .chain()
                    .in_set(TickSet::Round),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_by_health() {
        assert_eq!(winner_by_health(40.0, 70.0), Some(Side::Right));
        assert_eq!(winner_by_health(70.0, 40.0), Some(Side::Left));
        assert_eq!(winner_by_health(50.0, 50.0), None);
    }

    #[test]
    fn test_default_policy_needs_three_rounds_and_a_leader() {
        let policy = MatchLengthPolicy::default();
        let mut state = MatchState::default();

        state.record_win(Side::Left);
        state.round = 2;
        state.record_win(Side::Left);
        assert!(!policy.is_match_over(&state), "round 2 is never final");

        state.round = 3;
        assert!(policy.is_match_over(&state));

        state.record_win(Side::Right);
        state.record_win(Side::Right);
        assert!(!policy.is_match_over(&state), "tied score keeps playing");
    }

    #[test]
    fn test_endless_policy() {
        let mut state = MatchState::default();
        state.round = 100;
        state.record_win(Side::Right);
        assert!(!MatchLengthPolicy::Endless.is_match_over(&state));
    }

    #[test]
    fn test_policy_from_json() {
        let policy: MatchLengthPolicy =
            serde_json::from_str(r#"{ "policy": "leader-after-rounds", "rounds": 4 }"#).unwrap();
        assert_eq!(policy, MatchLengthPolicy::LeaderAfterRounds { rounds: 4 });

        let policy: MatchLengthPolicy = serde_json::from_str(r#"{ "policy": "endless" }"#).unwrap();
        assert_eq!(policy, MatchLengthPolicy::Endless);
    }

    #[test]
    fn test_match_state_reset() {
        let mut state = MatchState::default();
        state.record_win(Side::Left);
        state.round = 3;

        state.reset();

        assert_eq!(state.round, 1);
        assert_eq!(state.wins_of(Side::Left), 0);
        assert_eq!(state.leader(), None);
    }
}
