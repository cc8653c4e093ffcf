//! Tuning конфиг симуляции (data-driven, JSON)
//!
//! Все значения имеют defaults: пустой `{}` — валидный конфиг.
//! Векторы хранятся как `[f32; 2]` чтобы не тянуть serialize feature bevy_math.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BrawlError;
use crate::input::Keymap;
use crate::round::MatchLengthPolicy;

/// Главный конфиг (Resource)
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed для DeterministicRng (bot input)
    pub seed: u64,
    pub physics: PhysicsTuning,
    pub combat: CombatTuning,
    pub camera: CameraTuning,
    pub round: RoundTuning,
    pub keymap: Keymap,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            physics: PhysicsTuning::default(),
            combat: CombatTuning::default(),
            camera: CameraTuning::default(),
            round: RoundTuning::default(),
            keymap: Keymap::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, BrawlError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BrawlError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| BrawlError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// Кинематика и границы арены
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Гравитация (units/s²). В разных ревизиях прототипа: 10, 500, 1000, 2000
    pub gravity: f32,
    /// Горизонтальная скорость от move intent (units/s)
    pub move_speed: f32,
    /// Вертикальный импульс прыжка
    pub jump_impulse: f32,
    pub limit_left: f32,
    pub limit_right: f32,
    pub limit_bottom: f32,
    /// Интегрировать position += velocity * dt самим (false — это делает хост)
    pub integrate_positions: bool,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 1000.0,
            move_speed: 100.0,
            jump_impulse: 500.0,
            limit_left: -500.0,
            limit_right: 500.0,
            limit_bottom: 0.0,
            integrate_positions: true,
        }
    }
}

/// Параметры одного удара (hit / smash)
///
/// Default = hit. Частичный `smash` в JSON дополняется defaults smash'а.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackProfile {
    /// Задержка между нажатием и появлением hurter (follow-through)
    pub delay: f32,
    /// Animation lock после нажатия
    pub cooldown: f32,
    pub damage: f32,
    pub radius: f32,
    pub level: i32,
    /// Время жизни hurter если он ни в кого не попал
    pub ttl: f32,
    /// Offset от позиции игрока; x умножается на facing
    pub offset: [f32; 2],
    /// Скорость hurter; x умножается на facing
    pub velocity: [f32; 2],
}

impl AttackProfile {
    pub fn hit() -> Self {
        Self {
            delay: 0.15,
            cooldown: 0.4,
            damage: 10.0,
            radius: 20.0,
            level: 5,
            ttl: 0.1,
            offset: [36.0, -10.0],
            velocity: [0.0, 0.0],
        }
    }

    /// Удар в прыжке: сильнее, выше level, hurter летит вниз
    pub fn smash() -> Self {
        Self {
            delay: 0.1,
            cooldown: 0.7,
            damage: 15.0,
            radius: 30.0,
            level: 15,
            ttl: 0.2,
            offset: [20.0, -60.0],
            velocity: [0.0, -200.0],
        }
    }
}

impl Default for AttackProfile {
    fn default() -> Self {
        Self::hit()
    }
}

/// Поля AttackProfile, заданные в JSON; остальные берутся из базы
#[derive(Deserialize)]
struct AttackOverrides {
    delay: Option<f32>,
    cooldown: Option<f32>,
    damage: Option<f32>,
    radius: Option<f32>,
    level: Option<i32>,
    ttl: Option<f32>,
    offset: Option<[f32; 2]>,
    velocity: Option<[f32; 2]>,
}

impl AttackOverrides {
    fn apply(self, base: AttackProfile) -> AttackProfile {
        AttackProfile {
            delay: self.delay.unwrap_or(base.delay),
            cooldown: self.cooldown.unwrap_or(base.cooldown),
            damage: self.damage.unwrap_or(base.damage),
            radius: self.radius.unwrap_or(base.radius),
            level: self.level.unwrap_or(base.level),
            ttl: self.ttl.unwrap_or(base.ttl),
            offset: self.offset.unwrap_or(base.offset),
            velocity: self.velocity.unwrap_or(base.velocity),
        }
    }
}

fn smash_profile<'de, D>(deserializer: D) -> Result<AttackProfile, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = AttackOverrides::deserialize(deserializer)?;
    Ok(overrides.apply(AttackProfile::smash()))
}

/// Бросок гитары (FlyingGuitar)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrowProfile {
    pub delay: f32,
    pub cooldown: f32,
    pub damage: f32,
    pub radius: f32,
    pub level: i32,
    /// Через ttl гитара разворачивается, через 2*ttl исчезает
    pub ttl: f32,
    pub speed: f32,
    /// Угловая скорость (degrees/s)
    pub spin: f32,
    pub offset: [f32; 2],
}

impl Default for ThrowProfile {
    fn default() -> Self {
        Self {
            delay: 0.3,
            cooldown: 1.2,
            damage: 8.0,
            radius: 16.0,
            level: 5,
            ttl: 0.8,
            speed: 400.0,
            spin: 720.0,
            offset: [30.0, 40.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub max_health: f32,
    /// Box size игрока (полная ширина/высота)
    pub player_width: f32,
    pub player_height: f32,
    /// defence_level в состоянии block
    pub block_defence: i32,
    /// Коэффициент вертикального отбрасывания
    pub knockback: f32,
    pub hit: AttackProfile,
    #[serde(deserialize_with = "smash_profile")]
    pub smash: AttackProfile,
    pub throw: ThrowProfile,
    /// Заряд special meter за единицу нанесённого урона
    pub special_gain: f32,
    /// Полный special meter
    pub special_required: f32,
    /// Время жизни визуального эффекта попадания
    pub hit_effect_ttl: f32,
    /// Стартовые позиции игроков (x)
    pub spawn_left: f32,
    pub spawn_right: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            player_width: 32.0,
            player_height: 200.0,
            block_defence: 10,
            knockback: 300.0,
            hit: AttackProfile::hit(),
            smash: AttackProfile::smash(),
            throw: ThrowProfile::default(),
            special_gain: 1.0,
            special_required: 50.0,
            hit_effect_ttl: 0.3,
            spawn_left: -150.0,
            spawn_right: 150.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Запас вокруг bounding box целей
    pub pad: [f32; 2],
    /// Дополнительный запас после победы (драматичный отъезд)
    pub win_pad: [f32; 2],
    pub offset: [f32; 2],
    /// Viewport хостовой камеры (пиксели)
    pub viewport: [f32; 2],
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            pad: [50.0, 50.0],
            win_pad: [400.0, 400.0],
            offset: [0.0, 0.0],
            viewport: [1280.0, 720.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundTuning {
    /// Длительность раунда (секунды)
    pub round_time: f32,
    pub match_length: MatchLengthPolicy,
}

impl Default for RoundTuning {
    fn default() -> Self {
        Self {
            round_time: 60.0,
            match_length: MatchLengthPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = SimulationConfig::from_json_str("{}").unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.physics.gravity, 1000.0);
        assert_eq!(config.combat.block_defence, 10);
        assert_eq!(config.round.round_time, 60.0);
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{ "physics": { "gravity": 500.0 }, "round": { "round_time": 30.0 } }"#;
        let config = SimulationConfig::from_json_str(json).unwrap();

        assert_eq!(config.physics.gravity, 500.0);
        // Остальные поля секции — defaults
        assert_eq!(config.physics.move_speed, 100.0);
        assert_eq!(config.round.round_time, 30.0);
    }

    #[test]
    fn test_partial_attack_profiles_keep_their_defaults() {
        let json = r#"{ "combat": {
            "hit": { "damage": 20.0 },
            "smash": { "radius": 40.0 },
            "throw": { "speed": 250.0 }
        } }"#;
        let combat = SimulationConfig::from_json_str(json).unwrap().combat;

        assert_eq!(combat.hit.damage, 20.0);
        assert_eq!(combat.hit.radius, 20.0);
        assert_eq!(combat.hit.level, 5);

        // smash дополняется своими defaults, не hit'а
        assert_eq!(combat.smash.radius, 40.0);
        assert_eq!(combat.smash.level, 15);
        assert_eq!(combat.smash.velocity, [0.0, -200.0]);

        assert_eq!(combat.throw.speed, 250.0);
        assert_eq!(combat.throw.ttl, 0.8);
        assert_eq!(combat.throw.spin, 720.0);
    }

    #[test]
    fn test_missing_profiles_use_defaults() {
        let combat = SimulationConfig::from_json_str(r#"{ "combat": { "max_health": 50.0 } }"#)
            .unwrap()
            .combat;

        assert_eq!(combat.max_health, 50.0);
        assert_eq!(combat.hit, AttackProfile::hit());
        assert_eq!(combat.smash, AttackProfile::smash());
        assert_eq!(combat.throw, ThrowProfile::default());
    }

    #[test]
    fn test_broken_json_is_error() {
        let result = SimulationConfig::from_json_str("{ physics: ");
        assert!(matches!(result, Err(BrawlError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = SimulationConfig::load("/definitely/not/here.json");
        assert!(matches!(result, Err(BrawlError::ConfigRead { .. })));
    }
}
