//! Идентичность entity и теги

use bevy::prelude::*;

/// Строковый id entity ("player-left", "camera-controller", ...)
///
/// Инвариант: уникален в мире (проверяется при загрузке уровня).
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Тег "camera-target": entity участвует в кадрировании камеры
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct CameraTarget;

/// Текущая анимация (читается хостовым animation layer)
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Animation {
    pub name: &'static str,
}

impl Animation {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

/// Статический спрайт уровня с нестандартным z-индексом
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct StaticProp {
    pub z_index: i32,
}

impl Default for StaticProp {
    fn default() -> Self {
        Self { z_index: -1 }
    }
}

/// Найти entity по строковому id (аналог getEntityById хоста)
pub fn find_entity_by_id(world: &mut World, id: &str) -> Option<Entity> {
    let mut query = world.query::<(Entity, &EntityId)>();
    query
        .iter(world)
        .find(|(_, entity_id)| entity_id.as_str() == id)
        .map(|(entity, _)| entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_entity_by_id() {
        let mut world = World::new();
        let camera = world.spawn(EntityId::new("camera-controller")).id();
        world.spawn(EntityId::new("player-left"));

        assert_eq!(find_entity_by_id(&mut world, "camera-controller"), Some(camera));
        assert_eq!(find_entity_by_id(&mut world, "player-right"), None);
    }
}
