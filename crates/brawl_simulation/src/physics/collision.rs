//! Solid collision двух игроков
//!
//! Ровно два твёрдых тела (left / right), поэтому broad-phase не нужен.
//! Контакт точечный по x: intruder ставится вплотную к другому, его vx = 0.

use bevy::prelude::*;

use crate::components::{Kinematic, Player, Side};
use crate::config::SimulationConfig;
use crate::error::BrawlError;

/// Горизонтальная проекция тела игрока
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidBody {
    pub x: f32,
    pub vx: f32,
    pub width: f32,
}

/// Кто вдавился в кого
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intruder {
    Left,
    Right,
    Both,
}

/// Разрешить overlap левого и правого игрока.
///
/// Overlap: `right.x - rw/2 <= left.x + lw/2`. Intruder выбирается по скоростям,
/// а не по порядку обхода: левый, если идёт вправо, а правый не идёт влево;
/// оба, если идут навстречу (коррекция делится пополам); иначе правый.
/// Если коррекция выталкивает тело за арену, остаток сдвигает другое тело.
pub fn resolve_pair(
    left: &mut SolidBody,
    right: &mut SolidBody,
    limit_left: f32,
    limit_right: f32,
) -> Option<Intruder> {
    let contact = (left.width + right.width) / 2.0;
    if right.x - left.x > contact {
        return None;
    }

    let left_pushes = left.vx > 0.0;
    let right_pushes = right.vx < 0.0;

    let intruder = match (left_pushes, right_pushes) {
        (true, true) => Intruder::Both,
        (true, false) => Intruder::Left,
        _ => Intruder::Right,
    };

    match intruder {
        Intruder::Right => {
            right.x = left.x + contact;
            right.vx = 0.0;
        }
        Intruder::Left => {
            left.x = right.x - contact;
            left.vx = 0.0;
        }
        Intruder::Both => {
            let center = (left.x + right.x) / 2.0;
            left.x = center - contact / 2.0;
            right.x = center + contact / 2.0;
            left.vx = 0.0;
            right.vx = 0.0;
        }
    }

    if right.x > limit_right {
        right.x = limit_right;
        left.x = right.x - contact;
    }
    if left.x < limit_left {
        left.x = limit_left;
        right.x = left.x + contact;
    }

    Some(intruder)
}

/// Система: solid collision игроков
///
/// Пока арена не создана (игроков нет) — no-op. Один игрок без второго
/// или два игрока на одной стороне — ошибка конфигурации.
pub fn resolve_player_overlap(
    config: Res<SimulationConfig>,
    mut players: Query<(&Player, &mut Kinematic, &mut Transform)>,
) -> Result {
    if players.is_empty() {
        return Ok(());
    }

    let mut left = None;
    let mut right = None;

    for (player, body, transform) in players.iter_mut() {
        let slot = match player.side {
            Side::Left => &mut left,
            Side::Right => &mut right,
        };
        if slot.is_some() {
            return Err(BrawlError::DuplicatePlayer(player.side).into());
        }
        *slot = Some((player, body, transform));
    }

    let (left_player, mut left_body, mut left_transform) = left.ok_or(BrawlError::MissingPlayer(Side::Left))?;
    let (right_player, mut right_body, mut right_transform) =
        right.ok_or(BrawlError::MissingPlayer(Side::Right))?;

    let mut l = SolidBody {
        x: left_transform.translation.x,
        vx: left_body.velocity.x,
        width: left_player.width,
    };
    let mut r = SolidBody {
        x: right_transform.translation.x,
        vx: right_body.velocity.x,
        width: right_player.width,
    };

    let physics = &config.physics;
    if resolve_pair(&mut l, &mut r, physics.limit_left, physics.limit_right).is_none() {
        return Ok(());
    }

    left_transform.translation.x = l.x;
    left_body.velocity.x = l.vx;
    right_transform.translation.x = r.x;
    right_body.velocity.x = r.vx;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(x: f32, vx: f32) -> SolidBody {
        SolidBody { x, vx, width: 100.0 }
    }

    #[test]
    fn test_separated_bodies_untouched() {
        let mut left = body(0.0, 10.0);
        let mut right = body(150.0, -10.0);

        assert_eq!(resolve_pair(&mut left, &mut right, -500.0, 500.0), None);
        assert_eq!(left, body(0.0, 10.0));
        assert_eq!(right, body(150.0, -10.0));
    }

    #[test]
    fn test_standing_overlap_pushes_right_player() {
        let mut left = body(0.0, 0.0);
        let mut right = body(80.0, 0.0);

        let intruder = resolve_pair(&mut left, &mut right, -500.0, 500.0);

        assert_eq!(intruder, Some(Intruder::Right));
        assert_eq!(right.x, 100.0);
        assert_eq!(right.vx, 0.0);
        assert_eq!(left.x, 0.0);
    }

    #[test]
    fn test_left_walking_in_is_intruder() {
        let mut left = body(30.0, 100.0);
        let mut right = body(100.0, 0.0);

        let intruder = resolve_pair(&mut left, &mut right, -500.0, 500.0);

        assert_eq!(intruder, Some(Intruder::Left));
        assert_eq!(left.x, 0.0);
        assert_eq!(left.vx, 0.0);
        assert_eq!(right.x, 100.0);
    }

    #[test]
    fn test_head_on_splits_correction() {
        let mut left = body(0.0, 100.0);
        let mut right = body(60.0, -100.0);

        let intruder = resolve_pair(&mut left, &mut right, -500.0, 500.0);

        assert_eq!(intruder, Some(Intruder::Both));
        assert_eq!(left.x, -20.0);
        assert_eq!(right.x, 80.0);
        assert_eq!((left.vx, right.vx), (0.0, 0.0));
    }

    #[test]
    fn test_correction_against_wall_pushes_other() {
        let mut left = body(450.0, 0.0);
        let mut right = body(480.0, 0.0);

        resolve_pair(&mut left, &mut right, -500.0, 500.0);

        assert_eq!(right.x, 500.0);
        assert_eq!(left.x, 400.0);
    }

    #[test]
    fn test_result_does_not_depend_on_query_order() {
        use bevy::ecs::system::RunSystemOnce;

        let run = |right_first: bool| {
            let config = SimulationConfig::default();
            let mut world = World::new();
            let left = Player {
                width: 100.0,
                ..Player::new(Side::Left, &config.combat)
            };
            let right = Player {
                width: 100.0,
                ..Player::new(Side::Right, &config.combat)
            };
            let left_bundle = (left, Kinematic::default(), Transform::from_xyz(0.0, 0.0, 0.0));
            let right_bundle = (right, Kinematic::default(), Transform::from_xyz(80.0, 0.0, 0.0));
            if right_first {
                world.spawn(right_bundle);
                world.spawn(left_bundle);
            } else {
                world.spawn(left_bundle);
                world.spawn(right_bundle);
            }
            world.insert_resource(config);
            world.run_system_once(resolve_player_overlap).unwrap().unwrap();

            let mut positions: Vec<(Side, f32)> = world
                .query::<(&Player, &Transform)>()
                .iter(&world)
                .map(|(player, transform)| (player.side, transform.translation.x))
                .collect();
            positions.sort_by(|a, b| a.0.cmp(&b.0));
            positions
        };

        assert_eq!(run(false), run(true));
        assert_eq!(run(false), vec![(Side::Left, 0.0), (Side::Right, 100.0)]);
    }

    #[test]
    fn test_missing_player_is_error() {
        use bevy::ecs::system::RunSystemOnce;

        let config = SimulationConfig::default();
        let mut world = World::new();
        world.spawn((
            Player::new(Side::Left, &config.combat),
            Kinematic::default(),
            Transform::default(),
        ));
        world.insert_resource(config);

        let result = world.run_system_once(resolve_player_overlap).unwrap();
        assert!(result.is_err());
    }
}
