//! Загрузка уровня и расстановка арены
//!
//! Уровень — JSON со списком entity по классам:
//! - `static-entity` — статичный спрайт фона (z = -1)
//! - `test-entity` — drifter: скриптованная camera target для отладки камеры
//! - `camera-controller` — framing controller
//!
//! Игроки в уровень не входят: их ставит `spawn_arena`.

use std::collections::HashSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::{AttachCamera, CameraController};
use crate::components::{
    Animation, CameraTarget, EntityId, Kinematic, Player, Side, SpecialMeter, StaticProp,
};
use crate::config::SimulationConfig;
use crate::error::BrawlError;
use crate::logger::log;
use crate::schedule::{DeferredAction, Scheduler, SimClock};

pub const CAMERA_CONTROLLER_ID: &str = "camera-controller";

/// Скриптованная цель камеры: раз в `interval` секунд прыгает в новую точку
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Drifter {
    pub step: i32,
    pub interval: f32,
}

impl Default for Drifter {
    fn default() -> Self {
        Self {
            step: 0,
            interval: 1.0,
        }
    }
}

impl Drifter {
    /// Позиция (i*10 mod 40, -i*20 mod 50), скорость ±100 по x
    pub fn think(&mut self, transform: &mut Transform, body: &mut Kinematic) {
        let i = self.step;
        transform.translation.x = (i * 10).rem_euclid(40) as f32;
        transform.translation.y = (-i * 20).rem_euclid(50) as f32;
        body.velocity = Vec2::new(if i % 2 == 0 { -100.0 } else { 100.0 }, 0.0);
        self.step += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelEntity {
    pub class: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub position: [f32; 2],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelDescription {
    #[serde(default)]
    pub entities: Vec<LevelEntity>,
}

fn world_config(world: &World) -> SimulationConfig {
    world.get_resource::<SimulationConfig>().cloned().unwrap_or_default()
}

fn world_now(world: &World) -> f32 {
    world.get_resource::<SimClock>().map(|clock| clock.now).unwrap_or(0.0)
}

fn taken_ids(world: &mut World) -> HashSet<String> {
    let mut query = world.query::<&EntityId>();
    query.iter(world).map(|id| id.0.clone()).collect()
}

/// Проверить описание целиком до спавна: уровень либо загружен весь, либо не загружен
fn validate(world: &mut World, level: &LevelDescription) -> Result<(), BrawlError> {
    let mut ids = taken_ids(world);

    for entity in &level.entities {
        match entity.class.as_str() {
            "static-entity" | "test-entity" | "camera-controller" => {}
            other => return Err(BrawlError::UnknownEntityClass(other.to_string())),
        }

        let id = match (&entity.id, entity.class.as_str()) {
            (Some(id), _) => Some(id.clone()),
            (None, "camera-controller") => Some(CAMERA_CONTROLLER_ID.to_string()),
            (None, _) => None,
        };
        if let Some(id) = id {
            if !ids.insert(id.clone()) {
                return Err(BrawlError::DuplicateEntityId(id));
            }
        }
    }

    Ok(())
}

/// Загрузить уровень из JSON
pub fn load_level(world: &mut World, json: &str) -> Result<Vec<Entity>, BrawlError> {
    let level: LevelDescription = serde_json::from_str(json)?;
    spawn_level(world, &level)
}

pub fn spawn_level(world: &mut World, level: &LevelDescription) -> Result<Vec<Entity>, BrawlError> {
    validate(world, level)?;

    let config = world_config(world);
    let mut spawned = Vec::with_capacity(level.entities.len());

    for description in &level.entities {
        let position = Vec2::from(description.position);
        let entity = match description.class.as_str() {
            "static-entity" => world
                .spawn((StaticProp::default(), Transform::from_translation(position.extend(-1.0))))
                .id(),
            "test-entity" => spawn_drifter(world, position),
            "camera-controller" => spawn_camera_controller(world, &config, position),
            other => return Err(BrawlError::UnknownEntityClass(other.to_string())),
        };

        if let Some(id) = &description.id {
            world.entity_mut(entity).insert(EntityId::new(id.as_str()));
        }
        spawned.push(entity);
    }

    log(&format!("Level loaded: {} entities", spawned.len()));
    Ok(spawned)
}

/// Drifter: первый think сразу, следующие — через Scheduler
pub fn spawn_drifter(world: &mut World, position: Vec2) -> Entity {
    let mut drifter = Drifter::default();
    let mut transform = Transform::from_translation(position.extend(0.0));
    let mut body = Kinematic {
        angular_velocity: 100.0,
        ..default()
    };
    drifter.think(&mut transform, &mut body);

    let interval = drifter.interval;
    let entity = world
        .spawn((drifter, transform, body, CameraTarget, Animation::new("test")))
        .id();

    let deadline = world_now(world) + interval;
    world
        .get_resource_or_insert_with(Scheduler::default)
        .schedule_at(deadline, entity, DeferredAction::DrifterThink);
    entity
}

pub fn spawn_camera_controller(world: &mut World, config: &SimulationConfig, position: Vec2) -> Entity {
    world
        .spawn((
            EntityId::new(CAMERA_CONTROLLER_ID),
            CameraController::from_config(config),
            Transform::from_translation(position.extend(0.0)),
        ))
        .id()
}

/// Игрок на стартовой позиции своей стороны
pub fn spawn_player(world: &mut World, side: Side, config: &SimulationConfig) -> Result<Entity, BrawlError> {
    let mut players = world.query::<&Player>();
    if players.iter(world).any(|player| player.side == side) {
        return Err(BrawlError::DuplicatePlayer(side));
    }

    let x = match side {
        Side::Left => config.combat.spawn_left,
        Side::Right => config.combat.spawn_right,
    };

    let entity = world
        .spawn((
            EntityId::new(side.entity_id()),
            Player::new(side, &config.combat),
            Kinematic::falling(),
            Transform::from_xyz(x, config.physics.limit_bottom, 0.0),
            CameraTarget,
            Animation::new("stand"),
            SpecialMeter::new(config.combat.special_required, config.combat.special_gain),
        ))
        .id();

    Ok(entity)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arena {
    pub left: Entity,
    pub right: Entity,
    pub camera: Entity,
}

/// Оба игрока + camera controller (существующий из уровня или новый) + attach камеры
pub fn spawn_arena(world: &mut World) -> Result<Arena, BrawlError> {
    let config = world_config(world);

    let left = spawn_player(world, Side::Left, &config)?;
    let right = spawn_player(world, Side::Right, &config)?;

    let camera = {
        let mut controllers = world.query_filtered::<Entity, With<CameraController>>();
        controllers.iter(world).next()
    };
    let camera = match camera {
        Some(camera) => camera,
        None => spawn_camera_controller(world, &config, Vec2::ZERO),
    };

    if let Some(mut attach) = world.get_resource_mut::<Events<AttachCamera>>() {
        attach.send(AttachCamera { controller: camera });
    }

    Ok(Arena { left, right, camera })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::find_entity_by_id;

    const LEVEL: &str = r#"{
        "entities": [
            { "class": "static-entity", "id": "background", "position": [0, 100] },
            { "class": "test-entity", "id": "drifter" },
            { "class": "camera-controller" }
        ]
    }"#;

    #[test]
    fn test_load_level() {
        let mut world = World::new();
        let spawned = load_level(&mut world, LEVEL).unwrap();

        assert_eq!(spawned.len(), 3);
        let background = find_entity_by_id(&mut world, "background").unwrap();
        assert_eq!(world.get::<StaticProp>(background).unwrap().z_index, -1);

        let drifter = find_entity_by_id(&mut world, "drifter").unwrap();
        assert!(world.get::<CameraTarget>(drifter).is_some());
        assert_eq!(world.get::<Kinematic>(drifter).unwrap().angular_velocity, 100.0);
        assert_eq!(world.resource::<Scheduler>().pending_for(drifter), 1);

        assert!(find_entity_by_id(&mut world, CAMERA_CONTROLLER_ID).is_some());
    }

    #[test]
    fn test_unknown_class_is_error() {
        let mut world = World::new();
        let result = load_level(&mut world, r#"{ "entities": [ { "class": "dragon" } ] }"#);

        assert!(matches!(result, Err(BrawlError::UnknownEntityClass(class)) if class == "dragon"));
    }

    #[test]
    fn test_duplicate_id_spawns_nothing() {
        let mut world = World::new();
        let json = r#"{ "entities": [
            { "class": "static-entity", "id": "tree" },
            { "class": "static-entity", "id": "tree" }
        ] }"#;

        let result = load_level(&mut world, json);

        assert!(matches!(result, Err(BrawlError::DuplicateEntityId(id)) if id == "tree"));
        assert_eq!(world.query::<&StaticProp>().iter(&world).count(), 0);
    }

    #[test]
    fn test_second_camera_controller_is_duplicate() {
        let mut world = World::new();
        load_level(&mut world, r#"{ "entities": [ { "class": "camera-controller" } ] }"#).unwrap();

        let result = load_level(&mut world, r#"{ "entities": [ { "class": "camera-controller" } ] }"#);
        assert!(matches!(result, Err(BrawlError::DuplicateEntityId(_))));
    }

    #[test]
    fn test_drifter_think_sequence() {
        let mut drifter = Drifter::default();
        let mut transform = Transform::default();
        let mut body = Kinematic::default();

        let mut seen = Vec::new();
        for _ in 0..4 {
            drifter.think(&mut transform, &mut body);
            seen.push((transform.translation.x, transform.translation.y, body.velocity.x));
        }

        assert_eq!(
            seen,
            vec![
                (0.0, 0.0, -100.0),
                (10.0, 30.0, 100.0),
                (20.0, 10.0, -100.0),
                (30.0, 40.0, 100.0)
            ]
        );
    }

    #[test]
    fn test_spawn_arena() {
        let mut world = World::new();
        world.insert_resource(SimulationConfig::default());

        let arena = spawn_arena(&mut world).unwrap();

        assert_eq!(find_entity_by_id(&mut world, "player-left"), Some(arena.left));
        assert_eq!(find_entity_by_id(&mut world, "player-right"), Some(arena.right));
        assert_eq!(find_entity_by_id(&mut world, CAMERA_CONTROLLER_ID), Some(arena.camera));
        assert_eq!(world.get::<Transform>(arena.left).unwrap().translation.x, -150.0);
        assert_eq!(world.get::<Animation>(arena.right).unwrap().name, "stand");

        assert!(matches!(spawn_arena(&mut world), Err(BrawlError::DuplicatePlayer(Side::Left))));
    }
}
