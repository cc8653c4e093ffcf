//! Hurter: короткоживущий damage volume
//!
//! Архитектура:
//! - Спавнится follow-through атаки (hit / smash) или это летящая гитара
//! - Каждый тик проверяет overlap со всеми игроками, кроме владельца
//! - Первое попадание → HurterHit + эффект → despawn. Не больше одного попадания
//! - Ни в кого не попал → Scheduler удаляет его по ttl

use bevy::prelude::*;

use super::HurterHit;
use crate::components::{Animation, Player, Side};
use crate::config::SimulationConfig;
use crate::schedule::{DeferredAction, Scheduler, SimClock};

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Hurter {
    /// Игрок-владелец (собственный удар его не задевает)
    pub owner: Entity,
    pub owner_side: Side,
    pub damage: f32,
    /// Half-extent квадратного proxy (не настоящий круг)
    pub radius: f32,
    /// Сравнивается с defence_level цели
    pub level: i32,
    /// Уже попал: дальнейшие проверки запрещены даже до despawn
    pub spent: bool,
}

impl Hurter {
    /// AABB overlap: |dx| < r + w/2 && |dy| < r + h/2
    pub fn intersects(&self, hurter_pos: Vec2, player_pos: Vec2, player: &Player) -> bool {
        let delta = (hurter_pos - player_pos).abs();
        delta.x < self.radius + player.width / 2.0 && delta.y < self.radius + player.height / 2.0
    }
}

/// Маркер: визуальный эффект попадания (хост рисует, мы только спавним/удаляем)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct HitEffect;

/// Система: hurters против игроков
///
/// Despawn через commands применяется на границе фаз, поэтому удалять
/// hurter прямо во время обхода безопасно.
pub fn scan_hurters(
    mut commands: Commands,
    clock: Res<SimClock>,
    config: Res<SimulationConfig>,
    mut scheduler: ResMut<Scheduler>,
    mut hurters: Query<(Entity, &mut Hurter, &Transform)>,
    players: Query<(Entity, &Player, &Transform)>,
    mut hits: EventWriter<HurterHit>,
) {
    for (hurter_entity, mut hurter, hurter_transform) in hurters.iter_mut() {
        if hurter.spent {
            continue;
        }

        let hurter_pos = hurter_transform.translation.truncate();

        for (target, player, player_transform) in players.iter() {
            if target == hurter.owner {
                continue;
            }

            let player_pos = player_transform.translation.truncate();
            if !hurter.intersects(hurter_pos, player_pos, player) {
                continue;
            }

            hurter.spent = true;

            hits.write(HurterHit {
                hurter: hurter_entity,
                owner: hurter.owner,
                owner_side: hurter.owner_side,
                target,
                damage: hurter.damage,
                level: hurter.level,
                hurter_position: hurter_pos,
            });

            let midpoint = (hurter_pos + player_pos) / 2.0;
            let effect = commands
                .spawn((
                    HitEffect,
                    Animation::new("hit-effect"),
                    Transform::from_translation(midpoint.extend(1.0)),
                ))
                .id();
            scheduler.schedule_after(&clock, config.combat.hit_effect_ttl, effect, DeferredAction::Despawn);

            commands.entity(hurter_entity).try_despawn();
            break;
        }
    }
}
