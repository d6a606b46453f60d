//! First-person locomotion: sliding, wall running, air strafing and air jumps
//! layered over a simple ground/air mover, driven by bevy and avian3d.

pub mod air;
pub mod body;
pub mod camera;
pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod math;
pub mod messages;
pub mod movement;
pub mod player;
pub mod slide;
pub mod timer;
pub mod wall;
pub mod wall_run;


use bevy::prelude::{App, FixedUpdate, IntoScheduleConfigs, Plugin, Update, info};

use crate::camera::{FpsCamera, apply_camera_pose, update_camera_from_input};
use crate::config::LocomotionConfig;
use crate::controller::Locomotion;
use crate::input::{MoveIntent, latch_locomotion_input};
use crate::messages::{
    AirJumpEffect, Landed, SlideStarted, WallJumped, WallRunStarted, WallRunStopped,
    publish_locomotion_events,
};
use crate::movement::{
    CharacterMover, MovementConfig, apply_movement, detect_wall_contacts, drive_locomotion,
    update_ground_detection,
};

/// Locomotion systems and messages.
///
/// Expects avian's `PhysicsPlugins` (for `Gravity` and spatial queries) and,
/// when reading real devices, `InputManagerPlugin::<LocomotionAction>`.
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<LocomotionConfig>()
            .register_type::<MovementConfig>()
            .register_type::<CharacterMover>()
            .register_type::<Locomotion>()
            .register_type::<MoveIntent>()
            .register_type::<FpsCamera>();

        app.add_message::<WallRunStarted>()
            .add_message::<WallRunStopped>()
            .add_message::<AirJumpEffect>()
            .add_message::<SlideStarted>()
            .add_message::<WallJumped>()
            .add_message::<Landed>();

        app.add_systems(
            FixedUpdate,
            (
                update_ground_detection,
                detect_wall_contacts,
                drive_locomotion,
                apply_movement,
                publish_locomotion_events,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                latch_locomotion_input,
                update_camera_from_input,
                apply_camera_pose,
            )
                .chain(),
        );

        info!("Locomotion plugin ready");
    }
}
