//! Kinematic body: velocity + angular velocity
//!
//! Position живёт в Transform (translation.xy), его интегрирует хост
//! или `integrate_kinematics` в headless режиме.

use bevy::prelude::*;

/// Кинематическое тело (Movement capability)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Kinematic {
    /// Скорость (units/s)
    pub velocity: Vec2,
    /// Угловая скорость (degrees/s)
    pub angular_velocity: f32,
    /// Множитель гравитации: 1.0 для игроков, 0.0 для летающих объектов
    pub gravity_scale: f32,
}

impl Default for Kinematic {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            gravity_scale: 0.0,
        }
    }
}

impl Kinematic {
    pub fn with_velocity(velocity: Vec2) -> Self {
        Self {
            velocity,
            ..default()
        }
    }

    /// Тело под действием гравитации (игрок)
    pub fn falling() -> Self {
        Self {
            gravity_scale: 1.0,
            ..default()
        }
    }
}
