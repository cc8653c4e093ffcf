//! Применение урона от попаданий hurter'ов
//!
//! HurterHit → Player::hurt:
//! - Blocked / Ignored: ничего не происходит (ни урона, ни trigger "hurt")
//! - Damaged: trigger "hurt", вертикальное отбрасывание, заряд special meter атакующего
//! - Defeated: то же + Lying, снятие CameraTarget, RoundEnded с победой владельца hurter'а

use bevy::prelude::*;

use super::{HurterHit, PlayerEvent, PlayerTriggered};
use crate::components::{CameraTarget, FighterState, HurtOutcome, Kinematic, Player, SpecialMeter};
use crate::config::SimulationConfig;
use crate::logger::{log_info, log_with_level, LogLevel};
use crate::round::{RoundEndCause, RoundEnded, RoundState};

/// Вертикальное отбрасывание: K * (p.y - h.y) / |p - h|
///
/// Совпадающие позиции дают 0, а не NaN.
pub fn knockback(player_pos: Vec2, hurter_pos: Vec2, strength: f32) -> f32 {
    let distance = player_pos.distance(hurter_pos);
    if distance <= f32::EPSILON {
        return 0.0;
    }
    strength * (player_pos.y - hurter_pos.y) / distance
}

/// Система: HurterHit → урон / отбрасывание / поражение
pub fn apply_hurts(
    mut commands: Commands,
    mut hits: EventReader<HurterHit>,
    config: Res<SimulationConfig>,
    round: Res<RoundState>,
    mut players: Query<(&mut Player, &mut Kinematic, &Transform)>,
    mut meters: Query<&mut SpecialMeter>,
    mut triggers: EventWriter<PlayerTriggered>,
    mut round_ended: EventWriter<RoundEnded>,
) {
    for hit in hits.read() {
        // Раунд уже решён: удары после победы не считаются
        if !round.is_fighting() {
            continue;
        }

        let Ok((mut player, mut body, transform)) = players.get_mut(hit.target) else {
            continue;
        };

        let damage = match player.hurt(hit.damage, hit.level) {
            HurtOutcome::Ignored | HurtOutcome::Blocked => continue,
            HurtOutcome::Damaged { damage } | HurtOutcome::Defeated { damage } => damage,
        };

        let side = player.side;
        let player_pos = transform.translation.truncate();
        body.velocity.y += knockback(player_pos, hit.hurter_position, config.combat.knockback);

        triggers.write(PlayerTriggered {
            player: hit.target,
            side,
            event: PlayerEvent::Hurt { damage },
        });

        log_with_level(
            LogLevel::Debug,
            &format!("{:?} hit {:?} for {} (health {})", hit.owner_side, side, damage, player.health),
        );

        if let Ok(mut meter) = meters.get_mut(hit.owner) {
            meter.add_damage(damage);
        }

        if player.is_alive() {
            continue;
        }

        if let Some(change) = player.change_state(FighterState::Lying) {
            triggers.write(PlayerTriggered {
                player: hit.target,
                side,
                event: PlayerEvent::StateChanged {
                    from: change.from,
                    to: change.to,
                },
            });
        }
        triggers.write(PlayerTriggered {
            player: hit.target,
            side,
            event: PlayerEvent::Defeated,
        });

        commands.entity(hit.target).remove::<CameraTarget>();

        round_ended.write(RoundEnded {
            winner: Some(hit.owner_side),
            cause: RoundEndCause::Knockout,
        });

        log_info(&format!("{:?} knocked out by {:?}", side, hit.owner_side));
    }
}
