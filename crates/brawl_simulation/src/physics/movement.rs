//! Kinematic integration для 2D арены
//!
//! Архитектура:
//! - Velocity меняем сами: move intent (прямое присваивание) + гравитация
//! - Position интегрирует хост; в headless режиме это делает `integrate_kinematics`
//! - Position трогаем только для clamp к границам арены
//!
//! Детерминизм: dt берётся из SimClock, не из wall time

use bevy::prelude::*;

use crate::combat::{PlayerEvent, PlayerTriggered};
use crate::components::{FighterState, Kinematic, Player};
use crate::config::SimulationConfig;
use crate::schedule::SimClock;

/// Система: move intent + гравитация → velocity
///
/// Горизонтальная скорость игрока пересчитывается каждый тик из зажатых
/// направлений (не ускорение). Гравитация действует на всё с gravity_scale > 0.
pub fn update_player_velocity(
    clock: Res<SimClock>,
    config: Res<SimulationConfig>,
    mut bodies: Query<(&mut Kinematic, Option<&Player>)>,
) {
    let physics = &config.physics;

    for (mut body, player) in bodies.iter_mut() {
        if let Some(player) = player {
            body.velocity.x = player.horizontal_velocity(physics.move_speed);
        }

        if body.gravity_scale != 0.0 {
            body.velocity.y -= physics.gravity * body.gravity_scale * clock.dt;
        }
    }
}

/// Run condition: хост не интегрирует позиции сам
pub fn positions_integrated_here(config: Res<SimulationConfig>) -> bool {
    config.physics.integrate_positions
}

/// Система интеграции velocity → Transform (headless режим)
///
/// angular_velocity в градусах/с.
pub fn integrate_kinematics(clock: Res<SimClock>, mut bodies: Query<(&Kinematic, &mut Transform)>) {
    let dt = clock.dt;

    for (body, mut transform) in bodies.iter_mut() {
        transform.translation += (body.velocity * dt).extend(0.0);
        if body.angular_velocity != 0.0 {
            transform.rotate_z(body.angular_velocity.to_radians() * dt);
        }
    }
}

/// Система: границы арены + приземление
///
/// Пол гасит только скорость вниз. Landing: на полу, скорость не вверх,
/// состояние не Block / Lying → Standing.
pub fn clamp_to_arena(
    config: Res<SimulationConfig>,
    mut players: Query<(Entity, &mut Player, &mut Kinematic, &mut Transform)>,
    mut triggers: EventWriter<PlayerTriggered>,
) {
    let physics = &config.physics;

    for (entity, mut player, mut body, mut transform) in players.iter_mut() {
        let position = &mut transform.translation;
        position.x = position.x.clamp(physics.limit_left, physics.limit_right);

        if position.y > physics.limit_bottom {
            continue;
        }

        position.y = physics.limit_bottom;
        if body.velocity.y < 0.0 {
            body.velocity.y = 0.0;
        }

        // Прыжок только начался: хост ещё не сдвинул позицию, а vy уже вверх
        if player.state == FighterState::Jump && body.velocity.y <= 0.0 {
            if let Some(change) = player.change_state(FighterState::Standing) {
                triggers.write(PlayerTriggered {
                    player: entity,
                    side: player.side,
                    event: PlayerEvent::StateChanged {
                        from: change.from,
                        to: change.to,
                    },
                });
            }
        }
    }
}
