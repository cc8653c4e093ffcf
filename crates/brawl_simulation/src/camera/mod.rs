//! Camera framing controller
//!
//! Кадрирует всех с тегом CameraTarget:
//! - центр = среднее по целям + собственная прошлая позиция (якорь, гасит рывки)
//! - bl / tr = min / max по тем же точкам
//! - position ← offset + meanP*interp + position*(1 − interp)
//! - target_size = 2*max(meanP − bl, tr − meanP) + pad
//! - interp на следующий тик = 2^(dt−1) / 2
//!
//! Zoom смешивается в пространстве 1/scale, чтобы не было резких скачков.
//! Хостовая камера представлена ресурсом `CameraRig`.

use bevy::prelude::*;

use crate::components::CameraTarget;
use crate::config::SimulationConfig;
use crate::schedule::{SimClock, SimulationTick, TickEventsAppExt, TickSet};

/// Сглаживание на следующий тик. Медленно при маленьком dt, быстро при большом.
///
/// Ограничено 1, чтобы многосекундный фриз не давал перелёт.
pub fn interp_for(dt: f32) -> f32 {
    (2.0_f32.powf(dt - 1.0) / 2.0).min(1.0)
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CameraController {
    /// Желаемый видимый размер (world units)
    pub target_size: Vec2,
    /// Коэффициент сглаживания, используемый в этом тике
    pub interp: f32,
    /// Текущий запас вокруг целей (расширяется после победы)
    pub pad: Vec2,
    /// Запас в начале раунда
    pub base_pad: Vec2,
    pub offset: Vec2,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            target_size: Vec2::new(100.0, 100.0),
            interp: 1.0,
            pad: Vec2::new(50.0, 50.0),
            base_pad: Vec2::new(50.0, 50.0),
            offset: Vec2::ZERO,
        }
    }
}

impl CameraController {
    pub fn from_config(config: &SimulationConfig) -> Self {
        let pad = Vec2::from(config.camera.pad);
        Self {
            pad,
            base_pad: pad,
            offset: Vec2::from(config.camera.offset),
            ..default()
        }
    }

    /// Один шаг кадрирования: двигает `position`, пересчитывает target_size и interp
    pub fn frame(&mut self, position: &mut Vec2, targets: impl IntoIterator<Item = Vec2>, dt: f32) {
        let anchor = *position;
        let mut sum = anchor;
        let mut count = 1.0;
        let mut bl = anchor;
        let mut tr = anchor;

        for target in targets {
            sum += target;
            count += 1.0;
            bl = bl.min(target);
            tr = tr.max(target);
        }

        let mean = sum / count;

        *position = self.offset + mean * self.interp + anchor * (1.0 - self.interp);
        self.target_size = 2.0 * (mean - bl).max(tr - mean) + self.pad;
        self.interp = interp_for(dt);
    }

    /// Записать центр и zoom в хостовую камеру
    pub fn apply_to_camera(&self, position: Vec2, rig: &mut CameraRig) {
        rig.center = position;

        let viewport = rig.viewport;
        if viewport.x <= 0.0 || viewport.y <= 0.0 || !rig.scale.is_finite() || rig.scale <= 0.0 {
            return;
        }

        let inv_current = 1.0 / rig.scale;
        let inv_target = (self.target_size.x / viewport.x).max(self.target_size.y / viewport.y);
        let blended = self.interp * inv_target + (1.0 - self.interp) * inv_current;

        if blended.is_finite() && blended > 0.0 {
            rig.scale = 1.0 / blended;
        }
    }

    /// Сразу показать кадр без сглаживания (initCamera)
    pub fn snap(&mut self, position: Vec2, rig: &mut CameraRig) {
        self.interp = 1.0;
        self.apply_to_camera(position, rig);
    }

    pub fn widen(&mut self, extra: Vec2) {
        self.pad += extra;
    }

    pub fn reset_pad(&mut self) {
        self.pad = self.base_pad;
    }
}

/// Хостовая камера: центр, zoom (пиксели на world unit), viewport
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub center: Vec2,
    pub scale: f32,
    pub viewport: Vec2,
    /// Controller, управляющий камерой (setController)
    pub controller: Option<Entity>,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            scale: 1.0,
            viewport: Vec2::new(1280.0, 720.0),
            controller: None,
        }
    }
}

impl CameraRig {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            ..default()
        }
    }

    /// World → screen (пиксели, начало в левом нижнем углу viewport)
    pub fn project(&self, world: Vec2) -> Vec2 {
        (world - self.center) * self.scale + self.viewport / 2.0
    }

    /// Screen → world. При вырожденном scale возвращает центр.
    pub fn unproject(&self, screen: Vec2) -> Vec2 {
        if self.scale == 0.0 {
            return self.center;
        }
        (screen - self.viewport / 2.0) / self.scale + self.center
    }
}

/// Событие: назначить controller камере (с мгновенным кадрированием)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachCamera {
    pub controller: Entity,
}

/// Система: кадрирование целей каждым controller'ом
pub fn frame_camera_targets(
    clock: Res<SimClock>,
    mut rig: ResMut<CameraRig>,
    mut controllers: Query<(Entity, &mut CameraController, &mut Transform)>,
    targets: Query<&Transform, (With<CameraTarget>, Without<CameraController>)>,
) {
    for (entity, mut controller, mut transform) in controllers.iter_mut() {
        let mut position = transform.translation.truncate();
        controller.frame(
            &mut position,
            targets.iter().map(|target| target.translation.truncate()),
            clock.dt,
        );
        transform.translation.x = position.x;
        transform.translation.y = position.y;

        if rig.controller == Some(entity) {
            controller.apply_to_camera(position, &mut rig);
        }
    }
}

/// Система: AttachCamera → snap (interp = 1 ровно на один update)
pub fn attach_camera(
    mut attach: EventReader<AttachCamera>,
    mut rig: ResMut<CameraRig>,
    mut controllers: Query<(&mut CameraController, &Transform)>,
) {
    for event in attach.read() {
        let Ok((mut controller, transform)) = controllers.get_mut(event.controller) else {
            continue;
        };
        rig.controller = Some(event.controller);
        controller.snap(transform.translation.truncate(), &mut rig);
    }
}

/// Camera Plugin
///
/// attach_camera идёт после кадрирования: interp = 1 доживает до
/// следующего тика и используется там один раз.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_tick_event::<AttachCamera>().add_systems(
            SimulationTick,
            (frame_camera_targets, attach_camera).chain().in_set(TickSet::Camera),
        );
    }
}
