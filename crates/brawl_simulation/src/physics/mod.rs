//! Physics simulation module
//!
//! 2D kinematics арены без внешнего physics engine:
//! - movement: velocity от move intent и гравитации, интеграция, границы, приземление
//! - collision: solid collision двух игроков

use bevy::prelude::*;

pub mod collision;
pub mod movement;

pub use collision::{resolve_pair, resolve_player_overlap, Intruder, SolidBody};
pub use movement::{clamp_to_arena, integrate_kinematics, positions_integrated_here, update_player_velocity};

use crate::schedule::{SimulationTick, TickSet};

/// Physics Plugin
///
/// Порядок внутри фазы Physics:
/// velocity → (интеграция, если хост её не делает) → clamp/landing → solid collision
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            SimulationTick,
            (
                update_player_velocity,
                integrate_kinematics.run_if(positions_integrated_here),
                clamp_to_arena,
                resolve_player_overlap,
            )
                .chain()
                .in_set(TickSet::Physics),
        );
    }
}
