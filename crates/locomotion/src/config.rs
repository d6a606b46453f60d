//! Tuning for the locomotion controller.
//!
//! Distances are engine units (centimetres), times are seconds, angles degrees.

use bevy::prelude::{Component, Reflect};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Component, Reflect, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LocomotionConfig {
    // Basic movement
    pub walk_speed: f32,
    pub crouch_speed: f32,
    pub jump_z_velocity: f32,
    pub default_ground_friction: f32,
    pub default_braking_factor: f32,
    pub default_air_control: f32,

    // Crouching
    /// Capsule vertical scale when standing.
    pub normal_scale: f32,
    /// Multiple of `normal_scale` used while crouched.
    pub crouch_scale: f32,
    /// Unscaled capsule half height, used to keep the feet planted while rescaling.
    pub capsule_half_height: f32,

    // Sliding
    pub slide_force: f32,
    pub gradual_slide_force: f32,
    /// Rate at which the sustained slide push decays to zero.
    pub gradual_slide_decay_rate: f32,
    pub gradual_slide_scale: f32,
    pub slide_friction: f32,
    pub slide_braking_factor: f32,
    pub min_slide_speed: f32,
    /// Downhill push while sliding on a slope.
    pub slope_slide_force: f32,

    // Wall running
    pub wall_run_counter_gravity: f32,
    pub wall_run_counter_gravity_factor: f32,
    pub wall_run_speed: f32,
    pub wall_run_forward_factor: f32,
    pub wall_jump_force: f32,
    pub wall_run_air_control: f32,
    /// Vertical velocity set when a wall run begins.
    pub wall_run_launch_velocity: f32,
    /// How long contact with the tracked wall may lapse before the run ends.
    pub wall_contact_grace: f32,

    // Air movement
    pub air_jump_max: u32,
    pub air_strafe_magnitude: f32,
    pub air_strafe_speed_cap: f32,
    pub air_strafe_gain: f32,
    pub falling_gravity_scale: f32,
    pub post_wall_air_control: f32,
    pub air_control_restore_delay: f32,
    /// How far below the body centre the air-jump effect is spawned.
    pub air_jump_effect_offset: f32,

    // Transitions
    pub slide_camera_tilt_speed: f32,
    pub slide_camera_tilt_angle: f32,
    pub crouch_transition_speed: f32,
    pub wall_run_transition_speed: f32,
    pub wall_run_camera_tilt_angle: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 1000.0,
            crouch_speed: 300.0,
            jump_z_velocity: 620.0,
            default_ground_friction: 8.0,
            default_braking_factor: 2.0,
            default_air_control: 0.7,

            normal_scale: 1.5,
            crouch_scale: 0.5,
            capsule_half_height: 50.0,

            slide_force: 1000.0,
            gradual_slide_force: 200.0,
            gradual_slide_decay_rate: 20.0,
            gradual_slide_scale: 60.0,
            slide_friction: 0.2,
            slide_braking_factor: 0.1,
            min_slide_speed: 500.0, // half of walk speed
            slope_slide_force: 10000.0,

            wall_run_counter_gravity: 1.0,
            wall_run_counter_gravity_factor: 0.4,
            wall_run_speed: 1000.0,
            wall_run_forward_factor: 0.2,
            wall_jump_force: 420.0,
            wall_run_air_control: 0.7,
            wall_run_launch_velocity: 250.0,
            wall_contact_grace: 0.1,

            air_jump_max: 1,
            air_strafe_magnitude: 1.0,
            air_strafe_speed_cap: 30.0,
            air_strafe_gain: 14.3,
            falling_gravity_scale: 1.5,
            post_wall_air_control: 0.1,
            air_control_restore_delay: 0.4,
            air_jump_effect_offset: 55.0,

            slide_camera_tilt_speed: 7.0,
            slide_camera_tilt_angle: -3.0,
            crouch_transition_speed: 25.0,
            wall_run_transition_speed: 10.0,
            wall_run_camera_tilt_angle: 10.0,
        }
    }
}

impl LocomotionConfig {
    /// Capsule vertical scale while crouched.
    pub fn crouched_scale(&self) -> f32 {
        self.normal_scale * self.crouch_scale
    }

    /// Reject tuning that would make the controller misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("walk_speed", self.walk_speed),
            ("crouch_speed", self.crouch_speed),
            ("jump_z_velocity", self.jump_z_velocity),
            ("default_ground_friction", self.default_ground_friction),
            ("default_braking_factor", self.default_braking_factor),
            ("default_air_control", self.default_air_control),
            ("slide_force", self.slide_force),
            ("gradual_slide_force", self.gradual_slide_force),
            ("gradual_slide_decay_rate", self.gradual_slide_decay_rate),
            ("gradual_slide_scale", self.gradual_slide_scale),
            ("slide_friction", self.slide_friction),
            ("slide_braking_factor", self.slide_braking_factor),
            ("min_slide_speed", self.min_slide_speed),
            ("slope_slide_force", self.slope_slide_force),
            ("wall_run_counter_gravity", self.wall_run_counter_gravity),
            ("wall_run_counter_gravity_factor", self.wall_run_counter_gravity_factor),
            ("wall_run_speed", self.wall_run_speed),
            ("wall_run_forward_factor", self.wall_run_forward_factor),
            ("wall_jump_force", self.wall_jump_force),
            ("wall_run_air_control", self.wall_run_air_control),
            ("air_strafe_magnitude", self.air_strafe_magnitude),
            ("air_strafe_speed_cap", self.air_strafe_speed_cap),
            ("air_strafe_gain", self.air_strafe_gain),
            ("falling_gravity_scale", self.falling_gravity_scale),
            ("post_wall_air_control", self.post_wall_air_control),
            ("air_jump_effect_offset", self.air_jump_effect_offset),
            ("slide_camera_tilt_speed", self.slide_camera_tilt_speed),
            ("crouch_transition_speed", self.crouch_transition_speed),
            ("wall_run_transition_speed", self.wall_run_transition_speed),
        ];
        let positive = [
            ("normal_scale", self.normal_scale),
            ("capsule_half_height", self.capsule_half_height),
            ("wall_contact_grace", self.wall_contact_grace),
            ("air_control_restore_delay", self.air_control_restore_delay),
        ];
        let signed = [
            ("wall_run_launch_velocity", self.wall_run_launch_velocity),
            ("slide_camera_tilt_angle", self.slide_camera_tilt_angle),
            ("wall_run_camera_tilt_angle", self.wall_run_camera_tilt_angle),
            ("crouch_scale", self.crouch_scale),
        ];

        for &(field, value) in non_negative.iter().chain(&positive).chain(&signed) {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
        }
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if self.crouch_scale <= 0.0 || self.crouch_scale > 1.0 {
            return Err(ConfigError::CrouchScaleOutOfRange(self.crouch_scale));
        }

        Ok(())
    }
}
