//! Airborne behaviour: air strafing and a limited number of air jumps.

use bevy::log::debug;
use bevy::prelude::{Reflect, Vec3};
use serde::{Deserialize, Serialize};

use crate::body::MoverBody;
use crate::config::LocomotionConfig;
use crate::math::{horizontal, safe_normalize};

/// Wish speed after the air-strafe cap.
pub fn clamped_wish_speed(wish_velocity: Vec3, config: &LocomotionConfig) -> f32 {
    wish_velocity.length().min(config.air_strafe_speed_cap)
}

/// Velocity to add for one frame of air strafing.
///
/// Nothing is added once the current horizontal speed along the wish direction
/// already meets the capped wish speed, so holding one direction cannot build
/// speed without bound while turning into it keeps paying out.
pub fn air_strafe_acceleration(
    wish_velocity: Vec3,
    current_velocity: Vec3,
    air_control: f32,
    delta_time: f32,
    config: &LocomotionConfig,
) -> Vec3 {
    let wish_direction = safe_normalize(wish_velocity);
    let wish_speed = clamped_wish_speed(wish_velocity, config);

    let current_speed = wish_direction.dot(horizontal(current_velocity));
    let add_speed = wish_speed - current_speed;
    if add_speed <= 0.0 {
        return Vec3::ZERO;
    }

    let accel_speed = wish_velocity.length() * delta_time;
    wish_direction * accel_speed * config.air_strafe_gain * config.air_strafe_magnitude * air_control
}

/// Apply one frame of air strafing to `body`, returning what was added.
pub fn air_accelerate(
    body: &mut impl MoverBody,
    config: &LocomotionConfig,
    wish_velocity: Vec3,
    delta_time: f32,
) -> Vec3 {
    let add = air_strafe_acceleration(
        wish_velocity,
        body.velocity(),
        body.air_control(),
        delta_time,
        config,
    );
    body.add_velocity(add);
    add
}

#[derive(Reflect, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AirState {
    remaining_air_jumps: u32,
    max_air_jumps: u32,
}

impl AirState {
    pub fn new(max_air_jumps: u32) -> Self {
        Self {
            remaining_air_jumps: max_air_jumps,
            max_air_jumps,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining_air_jumps
    }

    pub fn max(&self) -> u32 {
        self.max_air_jumps
    }

    /// Refill the budget, on landing and on wall-run entry.
    pub fn reset(&mut self) {
        self.remaining_air_jumps = self.max_air_jumps;
    }

    /// Jump again while falling. Returns where the cosmetic effect belongs, or
    /// `None` when no air jump was available.
    pub fn air_jump(
        &mut self,
        body: &mut impl MoverBody,
        config: &LocomotionConfig,
        is_wall_running: bool,
    ) -> Option<Vec3> {
        if !body.is_falling() || is_wall_running || self.remaining_air_jumps == 0 {
            return None;
        }

        body.set_gravity_scale(config.falling_gravity_scale);

        let mut velocity = body.velocity();
        velocity.y = config.jump_z_velocity;
        body.set_velocity(velocity);

        self.remaining_air_jumps -= 1;
        debug!("Air jump, {} left", self.remaining_air_jumps);

        Some(body.position() - Vec3::Y * config.air_jump_effect_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_body::TestBody;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_wish_speed_caps_at_thirty() {
        let config = LocomotionConfig::default();
        assert_eq!(clamped_wish_speed(Vec3::new(500.0, 0.0, 0.0), &config), 30.0);
        assert_eq!(clamped_wish_speed(Vec3::new(31.0, 0.0, 0.0), &config), 30.0);
        assert_eq!(clamped_wish_speed(Vec3::new(0.0, 0.0, 12.0), &config), 12.0);
    }

    #[test]
    fn test_strafe_adds_along_wish_direction() {
        let config = LocomotionConfig::default();
        let add = air_strafe_acceleration(Vec3::new(0.0, 0.0, -1000.0), Vec3::ZERO, 0.7, DT, &config);

        assert!(add.z < 0.0);
        assert_eq!(add.x, 0.0);
        assert_eq!(add.y, 0.0);
        let expected = 1000.0 * DT * config.air_strafe_gain * config.air_strafe_magnitude * 0.7;
        assert!((add.length() - expected).abs() < 1.0e-3);
    }

    #[test]
    fn test_strafe_noop_when_already_fast_in_wish_direction() {
        let config = LocomotionConfig::default();
        let mut body = TestBody {
            velocity: Vec3::new(30.0, -200.0, 0.0),
            ..TestBody::airborne()
        };
        let before = body.velocity;

        let add = air_accelerate(&mut body, &config, Vec3::new(800.0, 0.0, 0.0), DT);

        assert_eq!(add, Vec3::ZERO);
        assert_eq!(body.velocity, before);
    }

    #[test]
    fn test_strafe_perpendicular_to_travel_still_accelerates() {
        let config = LocomotionConfig::default();
        let mut body = TestBody {
            velocity: Vec3::new(900.0, 0.0, 0.0),
            ..TestBody::airborne()
        };

        let add = air_accelerate(&mut body, &config, Vec3::new(0.0, 0.0, 800.0), DT);

        assert!(add.z > 0.0);
        assert_eq!(body.velocity.x, 900.0);
    }

    #[test]
    fn test_strafe_scales_with_air_control() {
        let config = LocomotionConfig::default();
        let wish = Vec3::new(0.0, 0.0, 600.0);
        let low = air_strafe_acceleration(wish, Vec3::ZERO, 0.1, DT, &config);
        let high = air_strafe_acceleration(wish, Vec3::ZERO, 0.7, DT, &config);
        assert!((high.length() / low.length() - 7.0).abs() < 1.0e-3);
    }

    #[test]
    fn test_zero_wish_adds_nothing() {
        let config = LocomotionConfig::default();
        let add = air_strafe_acceleration(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.7, DT, &config);
        assert_eq!(add, Vec3::ZERO);
        assert!(!add.is_nan());
    }

    #[test]
    fn test_air_jump_overrides_vertical_keeps_horizontal() {
        let config = LocomotionConfig::default();
        let mut body = TestBody {
            velocity: Vec3::new(300.0, -450.0, -20.0),
            position: Vec3::new(0.0, 200.0, 0.0),
            ..TestBody::airborne()
        };
        let mut air = AirState::new(1);

        let effect = air.air_jump(&mut body, &config, false);

        assert_eq!(effect, Some(Vec3::new(0.0, 145.0, 0.0)));
        assert_eq!(body.velocity, Vec3::new(300.0, config.jump_z_velocity, -20.0));
        assert_eq!(body.gravity_scale, config.falling_gravity_scale);
        assert_eq!(air.remaining(), 0);
    }

    #[test]
    fn test_air_jump_guards_are_silent() {
        let config = LocomotionConfig::default();
        let mut air = AirState::new(1);

        let mut grounded = TestBody::default();
        assert_eq!(air.air_jump(&mut grounded, &config, false), None);
        assert_eq!(grounded.gravity_scale, 1.0, "no side effects on a no-op");

        let mut airborne = TestBody::airborne();
        assert_eq!(air.air_jump(&mut airborne, &config, true), None);
        assert_eq!(air.remaining(), 1);
    }

    #[test]
    fn test_air_jump_counter_stays_in_range() {
        let config = LocomotionConfig::default();
        let mut body = TestBody::airborne();
        let mut air = AirState::new(2);

        // Jumps, a landing, more jumps than the budget allows.
        let script = [true, true, true, false, true, true, true, true];
        for jump in script {
            if jump {
                air.air_jump(&mut body, &config, false);
            } else {
                air.reset();
            }
            assert!(air.remaining() <= air.max());
        }
        assert_eq!(air.remaining(), 0);

        air.reset();
        assert_eq!(air.remaining(), 2);
    }
}
