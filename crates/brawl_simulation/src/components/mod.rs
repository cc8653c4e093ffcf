//! ECS Components для игровых entity
//!
//! Организация по capability (вместо mixin-наследования):
//! - entity: идентичность и теги (EntityId, CameraTarget, Animation, StaticProp)
//! - movement: кинематика (Kinematic)
//! - player: боец и его state machine (Player, FighterState, Side, SpecialMeter)
//!
//! Системы работают по capability-компонентам, а не по конкретным "классам" entity.

pub mod entity;
pub mod movement;
pub mod player;

#[cfg(test)]
mod player_tests;

pub use entity::*;
pub use movement::*;
pub use player::*;
