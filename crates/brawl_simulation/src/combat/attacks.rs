//! Follow-through атак: hurters и летящая гитара
//!
//! Нажатие hit/throw только ставит задачу в Scheduler. Когда deadline
//! наступает, `run_due_tasks` публикует `AttackReleased`, а здесь мы
//! проверяем что атакующий ещё может бить и спавним damage volume.

use bevy::prelude::*;

use super::{AttackKind, AttackReleased, Hurter, PlayerEvent, PlayerTriggered};
use crate::components::{Animation, FighterState, Kinematic, Player, Side};
use crate::config::{AttackProfile, SimulationConfig, ThrowProfile};
use crate::round::RoundState;
use crate::schedule::{DeferredAction, Scheduler, SimClock};

/// Параметры нового hurter'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HurterSpec {
    pub owner: Entity,
    pub owner_side: Side,
    pub position: Vec2,
    pub velocity: Vec2,
    pub ttl: f32,
    pub damage: f32,
    pub radius: f32,
    pub level: i32,
}

impl HurterSpec {
    /// Hurter удара: offset и скорость по x отражаются по facing атакующего
    pub fn from_profile(owner: Entity, side: Side, origin: Vec2, profile: &AttackProfile) -> Self {
        let facing = Vec2::new(side.facing(), 1.0);
        Self {
            owner,
            owner_side: side,
            position: origin + Vec2::from(profile.offset) * facing,
            velocity: Vec2::from(profile.velocity) * facing,
            ttl: profile.ttl,
            damage: profile.damage,
            radius: profile.radius,
            level: profile.level,
        }
    }

    fn hurter(&self) -> Hurter {
        Hurter {
            owner: self.owner,
            owner_side: self.owner_side,
            damage: self.damage,
            radius: self.radius,
            level: self.level,
            spent: false,
        }
    }
}

/// Летящая гитара: разворачивается в `reverse_at`, исчезает через 2*ttl
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    pub reverse_at: f32,
}

/// Спавн hurter'а с удалением по ttl
pub fn spawn_hurter(
    commands: &mut Commands,
    scheduler: &mut Scheduler,
    clock: &SimClock,
    spec: HurterSpec,
) -> Entity {
    let entity = commands
        .spawn((
            spec.hurter(),
            Kinematic::with_velocity(spec.velocity),
            Transform::from_translation(spec.position.extend(0.0)),
        ))
        .id();

    scheduler.schedule_after(clock, spec.ttl, entity, DeferredAction::Despawn);
    entity
}

/// Спавн гитары: hurter + Projectile + вращение
pub fn spawn_guitar(
    commands: &mut Commands,
    scheduler: &mut Scheduler,
    clock: &SimClock,
    owner: Entity,
    side: Side,
    origin: Vec2,
    profile: &ThrowProfile,
) -> Entity {
    let facing = side.facing();
    let spec = HurterSpec {
        owner,
        owner_side: side,
        position: origin + Vec2::new(profile.offset[0] * facing, profile.offset[1]),
        velocity: Vec2::new(profile.speed * facing, 0.0),
        ttl: profile.ttl,
        damage: profile.damage,
        radius: profile.radius,
        level: profile.level,
    };

    let entity = commands
        .spawn((
            spec.hurter(),
            Projectile {
                reverse_at: clock.now + profile.ttl,
            },
            Kinematic {
                velocity: spec.velocity,
                angular_velocity: profile.spin * facing,
                gravity_scale: 0.0,
            },
            Animation::new("guitar"),
            Transform::from_translation(spec.position.extend(0.0)),
        ))
        .id();

    scheduler.schedule_after(clock, profile.ttl, entity, DeferredAction::ReverseFlight);
    scheduler.schedule_after(clock, profile.ttl * 2.0, entity, DeferredAction::Despawn);
    entity
}

/// Система: AttackReleased → trigger + damage volume
///
/// Между нажатием и follow-through игрока могли уложить или раунд мог
/// закончиться. Тогда атака пропадает молча.
pub fn release_attacks(
    mut commands: Commands,
    mut releases: EventReader<AttackReleased>,
    clock: Res<SimClock>,
    config: Res<SimulationConfig>,
    round: Res<RoundState>,
    mut scheduler: ResMut<Scheduler>,
    players: Query<(&Player, &Transform)>,
    mut triggers: EventWriter<PlayerTriggered>,
) {
    for release in releases.read() {
        if !round.is_fighting() {
            continue;
        }

        let Ok((player, transform)) = players.get(release.attacker) else {
            continue;
        };

        if !player.is_alive() || player.state == FighterState::Lying {
            continue;
        }

        let origin = transform.translation.truncate();
        let combat = &config.combat;

        match release.kind {
            AttackKind::Hit => {
                let spec = HurterSpec::from_profile(release.attacker, player.side, origin, &combat.hit);
                spawn_hurter(&mut commands, &mut scheduler, &clock, spec);
            }
            AttackKind::Smash => {
                let spec = HurterSpec::from_profile(release.attacker, player.side, origin, &combat.smash);
                spawn_hurter(&mut commands, &mut scheduler, &clock, spec);
            }
            AttackKind::Throw => {
                spawn_guitar(
                    &mut commands,
                    &mut scheduler,
                    &clock,
                    release.attacker,
                    player.side,
                    origin,
                    &combat.throw,
                );
            }
        }

        triggers.write(PlayerTriggered {
            player: release.attacker,
            side: player.side,
            event: PlayerEvent::from(release.kind),
        });
    }
}
