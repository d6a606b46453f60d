//! First-person look and camera lean.
//!
//! `FpsCamera` holds the look angles driven by mouse input. `CameraTilt` is
//! the roll the locomotion core leans the view by while sliding or wall
//! running. `apply_camera_pose` combines both into the view.

use avian3d::prelude::Rotation;
use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;
use serde::{Deserialize, Serialize};

use crate::controller::Locomotion;
use crate::input::LocomotionAction;
use crate::math::{interp_to, is_nearly_equal};
use crate::player::PLAYER_EYE_OFFSET;

// ============================================================================
// COMPONENTS
// ============================================================================

/// Look angles in radians. Yaw turns the body, pitch only the view.
#[derive(Component, Reflect, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FpsCamera {
    pub pitch: f32,
    pub yaw: f32,
    pub sensitivity: f32,
}

impl Default for FpsCamera {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            yaw: 0.0,
            sensitivity: 0.002,
        }
    }
}

impl FpsCamera {
    /// Turn by a look delta in input units. Positive `x` turns right, positive `y` looks down.
    pub fn look(&mut self, delta: Vec2) {
        let scaled = delta * self.sensitivity;
        self.yaw -= scaled.x;
        self.pitch = (self.pitch - scaled.y).clamp(-PITCH_LIMIT_RADIANS, PITCH_LIMIT_RADIANS);
    }

    pub fn body_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// View rotation relative to the body.
    ///
    /// Positive `roll_degrees` leans the view clockwise, to the right.
    pub fn view_rotation(&self, roll_degrees: f32) -> Quat {
        Quat::from_euler(EulerRot::YXZ, 0.0, self.pitch, -roll_degrees.to_radians())
    }
}

/// Marks the camera that follows the player.
#[derive(Component, Default)]
pub struct PlayerCamera;

/// Camera roll in degrees.
#[derive(Reflect, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct CameraTilt {
    pub roll: f32,
}

impl CameraTilt {
    /// Ease the roll toward `target`. Returns false, without writing, once it is there.
    pub fn tilt_toward(&mut self, target: f32, speed: f32, delta_time: f32) -> bool {
        if is_nearly_equal(self.roll, target) {
            return false;
        }
        self.roll = interp_to(self.roll, target, delta_time, speed);
        true
    }
}

// ============================================================================
// CONSTANTS
// ============================================================================

pub const PITCH_LIMIT_RADIANS: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const LOOK_DEADZONE: f32 = 0.001;

/// Look axis for this frame, or `None` while it sits inside the deadzone.
pub fn look_input(action_state: &ActionState<LocomotionAction>) -> Option<Vec2> {
    let axis = action_state.axis_pair(&LocomotionAction::Look);
    (axis.length() >= LOOK_DEADZONE).then_some(axis)
}

// ============================================================================
// SYSTEMS
// ============================================================================

pub fn update_camera_from_input(
    mut query: Query<(&ActionState<LocomotionAction>, &mut FpsCamera)>,
) {
    for (action_state, mut camera) in query.iter_mut() {
        if action_state.disabled() {
            continue;
        }
        if let Some(delta) = look_input(action_state) {
            camera.look(delta);
        }
    }
}

/// Turn the body with yaw and place the camera at eye height with pitch and lean.
pub fn apply_camera_pose(
    mut players: Query<(&FpsCamera, &Locomotion, &Transform, &mut Rotation), Without<PlayerCamera>>,
    mut cameras: Query<&mut Transform, With<PlayerCamera>>,
) {
    for (camera, _, _, mut rotation) in players.iter_mut() {
        rotation.0 = camera.body_rotation();
    }

    let Ok(mut camera_transform) = cameras.single_mut() else {
        return;
    };
    let Ok((camera, locomotion, player_transform, rotation)) = players.single() else {
        return;
    };

    camera_transform.translation =
        player_transform.translation + Vec3::Y * PLAYER_EYE_OFFSET * player_transform.scale.y;
    camera_transform.rotation = rotation.0 * camera.view_rotation(locomotion.tilt.roll);
}

// ============================================================================
// TESTS
// ============================================================================
