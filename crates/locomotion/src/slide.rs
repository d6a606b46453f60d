//! Crouching and sliding.
//!
//! Crouching swaps the body onto low-friction slide tuning. Entering a crouch
//! while moving fast enough on the ground applies a one-time impulse, then a
//! decaying push keeps the slide from bleeding out to friction immediately.
//! Slopes add a downhill push scaled by how squarely the player faces downhill.

use bevy::log::debug;
use bevy::prelude::{Reflect, Vec3};
use serde::{Deserialize, Serialize};

use crate::body::MoverBody;
use crate::config::LocomotionConfig;
use crate::math::{
    horizontal, interp_to, is_nearly_equal, plane_project, safe_normalize_horizontal,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlidePhase {
    Standing,
    Crouched,
    Sliding,
}

#[derive(Reflect, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct CrouchState {
    pub is_crouching: bool,
    /// Set when the entry impulse fires; cleared by landing or standing up on the ground.
    pub applied_slide_impulse: bool,
    /// Remaining sustained slide push, decays to zero.
    pub pending_slide_magnitude: f32,
    /// Capsule scale currently being approached.
    pub target_scale: f32,
}

impl CrouchState {
    pub fn new(config: &LocomotionConfig) -> Self {
        Self {
            target_scale: config.normal_scale,
            ..Default::default()
        }
    }

    pub fn phase(&self) -> SlidePhase {
        if !self.is_crouching {
            SlidePhase::Standing
        } else if self.pending_slide_magnitude > 0.0 {
            SlidePhase::Sliding
        } else {
            SlidePhase::Crouched
        }
    }

    /// Crouch input started. Returns true if a slide was kicked off.
    pub fn start_crouch(&mut self, body: &mut impl MoverBody, config: &LocomotionConfig) -> bool {
        self.is_crouching = true;

        body.set_ground_friction(config.slide_friction);
        body.set_braking_factor(config.slide_braking_factor);
        body.set_max_walk_speed(config.crouch_speed);

        body.is_grounded() && self.try_start_slide(body, config)
    }

    /// Crouch input ended.
    pub fn stop_crouch(&mut self, body: &mut impl MoverBody, config: &LocomotionConfig) {
        self.is_crouching = false;
        self.pending_slide_magnitude = 0.0;

        body.set_ground_friction(config.default_ground_friction);
        body.set_braking_factor(config.default_braking_factor);
        body.set_max_walk_speed(config.walk_speed);

        if body.is_grounded() {
            self.applied_slide_impulse = false;
        }
    }

    /// Apply the entry impulse if moving fast enough and none was applied this cycle.
    pub fn try_start_slide(
        &mut self,
        body: &mut impl MoverBody,
        config: &LocomotionConfig,
    ) -> bool {
        if self.applied_slide_impulse {
            return false;
        }

        let velocity = body.velocity();
        if horizontal(velocity).length_squared() <= config.min_slide_speed * config.min_slide_speed
        {
            return false;
        }

        body.add_velocity(safe_normalize_horizontal(velocity) * config.slide_force);
        self.applied_slide_impulse = true;
        self.pending_slide_magnitude = config.gradual_slide_force;
        debug!(
            "Slide impulse {} applied at horizontal speed {:.1}",
            config.slide_force,
            horizontal(velocity).length()
        );
        true
    }

    /// Landing re-evaluates the slide while crouched, otherwise re-enables it.
    pub fn on_landed(&mut self, body: &mut impl MoverBody, config: &LocomotionConfig) -> bool {
        if self.is_crouching {
            self.try_start_slide(body, config)
        } else {
            self.applied_slide_impulse = false;
            false
        }
    }

    /// Decay the sustained push and apply what is left of it.
    ///
    /// Returns true while the push is still active.
    pub fn gradual_slide(
        &mut self,
        body: &mut impl MoverBody,
        config: &LocomotionConfig,
        delta_time: f32,
    ) -> bool {
        if self.pending_slide_magnitude == 0.0 {
            return false;
        }

        self.pending_slide_magnitude = interp_to(
            self.pending_slide_magnitude,
            0.0,
            delta_time,
            config.gradual_slide_decay_rate,
        );

        if is_nearly_equal(self.pending_slide_magnitude, 0.0) {
            self.pending_slide_magnitude = 0.0;
            return false;
        }

        let direction = safe_normalize_horizontal(body.velocity());
        body.add_velocity(
            direction * self.pending_slide_magnitude * delta_time * config.gradual_slide_scale,
        );
        true
    }

    /// Ease the capsule toward crouched or standing height, keeping the feet in place.
    pub fn update_capsule(
        &mut self,
        body: &mut impl MoverBody,
        config: &LocomotionConfig,
        delta_time: f32,
    ) {
        self.target_scale = if self.is_crouching {
            config.crouched_scale()
        } else {
            config.normal_scale
        };

        let current = body.height_scale();
        if is_nearly_equal(current, self.target_scale) {
            return;
        }

        let next = interp_to(
            current,
            self.target_scale,
            delta_time,
            config.crouch_transition_speed,
        );
        body.set_height_scale(next);
        body.shift_vertical((next - current) * config.capsule_half_height);
    }
}

/// Downhill push for a slide on a slope. Zero on flat ground or when moving across the slope.
pub fn slope_slide_push(
    forward: Vec3,
    floor_normal: Vec3,
    config: &LocomotionConfig,
    delta_time: f32,
) -> Vec3 {
    let downhill = plane_project(Vec3::NEG_Y, floor_normal);
    let alignment = forward.dot(safe_normalize_horizontal(downhill)).abs();
    downhill * alignment * delta_time * config.slope_slide_force
}

pub fn apply_slope_slide(
    body: &mut impl MoverBody,
    config: &LocomotionConfig,
    delta_time: f32,
) -> Vec3 {
    let push = slope_slide_push(body.forward(), body.floor_normal(), config, delta_time);
    body.add_velocity(push);
    push
}
