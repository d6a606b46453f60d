//! Wall running and wall jumping.
//!
//! A run starts when a falling character touches a wall. While running, the
//! character is pulled into the wall, partly held up against gravity and
//! pushed along the wall in its direction of travel. Leaving the wall peels
//! the character off with a small outward impulse and briefly cuts air control.

use std::f32::consts::FRAC_PI_2;

use bevy::log::debug;
use bevy::prelude::{Reflect, Vec3};
use serde::{Deserialize, Serialize};

use crate::air::AirState;
use crate::body::MoverBody;
use crate::config::LocomotionConfig;
use crate::math::{plane_project, rotate, safe_normalize, safe_normalize_horizontal, sign};
use crate::timer::OneShot;
use crate::wall::{SurfaceHit, SurfaceId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallRunEntry {
    /// A new session began on this contact.
    Entered,
    /// Already running; wall geometry was refreshed from the contact.
    Refreshed,
}

#[derive(Reflect, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct WallRunState {
    pub is_wall_running: bool,
    /// Surface the current session is bound to. `None` exactly when not running.
    pub current_wall: Option<SurfaceId>,
    pub wall_normal: Vec3,
    /// Horizontal direction along the wall, pointing the way the character travels.
    pub wall_tangent: Vec3,
    /// -1, 0 or +1: which side the wall is on relative to the character's right.
    pub tilt_sign: f32,
}

/// Unit direction along a wall, signed to agree with `velocity`.
pub fn wall_tangent(wall_normal: Vec3, velocity: Vec3) -> Vec3 {
    let tangent = rotate(safe_normalize_horizontal(wall_normal), FRAC_PI_2, 0.0, 0.0);
    if velocity.dot(tangent) < 0.0 {
        -tangent
    } else {
        tangent
    }
}

/// Launch velocity for jumping off a wall: up and away from it.
pub fn wall_jump_velocity(wall_normal: Vec3, config: &LocomotionConfig) -> Vec3 {
    (Vec3::Y + plane_project(wall_normal, Vec3::Y) * 2.0) * config.wall_jump_force
}

impl WallRunState {
    /// Begin or refresh a wall run from a wall contact. Only possible while falling.
    pub fn start(
        &mut self,
        body: &mut impl MoverBody,
        config: &LocomotionConfig,
        hit: &SurfaceHit,
        air: &mut AirState,
    ) -> Option<WallRunEntry> {
        if !body.is_falling() {
            return None;
        }

        let entry = if self.is_wall_running {
            WallRunEntry::Refreshed
        } else {
            self.is_wall_running = true;
            self.current_wall = Some(hit.surface);

            let mut velocity = body.velocity();
            velocity.y = config.wall_run_launch_velocity;
            body.set_velocity(velocity);

            air.reset();
            body.set_gravity_scale(1.0);
            WallRunEntry::Entered
        };

        self.wall_normal = safe_normalize(hit.normal);
        self.tilt_sign = sign(body.right().dot(self.wall_normal));
        self.wall_tangent = wall_tangent(self.wall_normal, body.velocity());
        body.set_air_control(config.wall_run_air_control);

        if entry == WallRunEntry::Entered {
            debug!(
                "Wall run started on {:?}, tangent {:?}",
                hit.surface, self.wall_tangent
            );
        }
        Some(entry)
    }

    /// Per-frame forces while running: stick, counter gravity, forward push.
    pub fn update(&self, body: &mut impl MoverBody, config: &LocomotionConfig, delta_time: f32) {
        if !self.is_wall_running {
            return;
        }

        let stick = -self.wall_normal * delta_time * config.wall_run_speed;
        let counter_gravity = -body.gravity_direction()
            * delta_time
            * body.mass()
            * config.wall_run_counter_gravity
            * config.wall_run_counter_gravity_factor;
        let forward =
            self.wall_tangent * delta_time * config.wall_run_speed * config.wall_run_forward_factor;

        body.add_velocity(stick + counter_gravity + forward);
    }

    /// Camera roll the run leans toward.
    pub fn target_roll(&self, config: &LocomotionConfig) -> f32 {
        self.tilt_sign * config.wall_run_camera_tilt_angle
    }

    /// End the run. Returns false when there was no run to end.
    ///
    /// If still airborne, air control drops and `air_control_restore` is armed
    /// to bring it back later.
    pub fn stop(
        &mut self,
        body: &mut impl MoverBody,
        config: &LocomotionConfig,
        delta_time: f32,
        air_control_restore: &mut OneShot,
    ) -> bool {
        if !self.is_wall_running {
            return false;
        }

        body.add_velocity(self.wall_normal * config.wall_run_speed * delta_time);
        self.is_wall_running = false;
        self.current_wall = None;

        if body.is_falling() {
            body.set_gravity_scale(config.falling_gravity_scale);
            body.set_air_control(config.post_wall_air_control);
            air_control_restore.arm(config.air_control_restore_delay);
        }

        debug!("Wall run stopped");
        true
    }

    /// Jump off the wall. Overwrites the current velocity with the launch vector.
    pub fn wall_jump(
        &mut self,
        body: &mut impl MoverBody,
        config: &LocomotionConfig,
        delta_time: f32,
        air_control_restore: &mut OneShot,
    ) -> bool {
        if !self.stop(body, config, delta_time, air_control_restore) {
            return false;
        }

        let launch = wall_jump_velocity(self.wall_normal, config);
        body.set_velocity(launch);
        debug!("Wall jump, launch {:?}", launch);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_body::TestBody;

    const DT: f32 = 1.0 / 60.0;

    fn wall_hit(surface: u64, normal: Vec3) -> SurfaceHit {
        SurfaceHit {
            surface: SurfaceId(surface),
            normal,
        }
    }

    fn running(body: &mut TestBody, config: &LocomotionConfig) -> WallRunState {
        let mut state = WallRunState::default();
        let mut air = AirState::new(config.air_jump_max);
        state.start(body, config, &wall_hit(1, Vec3::X), &mut air);
        state
    }

    #[test]
    fn test_tangent_points_with_travel() {
        let normals = [
            Vec3::X,
            Vec3::NEG_Z,
            Vec3::new(0.8, 0.0, 0.6),
            Vec3::new(-0.6, 0.5, 0.62).normalize(),
        ];
        let velocities = [
            Vec3::new(0.0, 0.0, 500.0),
            Vec3::new(0.0, 0.0, -500.0),
            Vec3::new(300.0, -100.0, 200.0),
            Vec3::new(-50.0, 10.0, -400.0),
        ];

        for normal in normals {
            for velocity in velocities {
                if velocity.normalize().cross(normal).length() < 1.0e-3 {
                    continue;
                }
                let tangent = wall_tangent(normal, velocity);
                assert!(tangent.dot(velocity) >= 0.0, "{normal:?} {velocity:?}");
                assert!((tangent.length() - 1.0).abs() < 1.0e-4);
                assert!(tangent.dot(normal).abs() < 1.0e-4);
            }
        }
    }

    #[test]
    fn test_start_requires_falling() {
        let config = LocomotionConfig::default();
        let mut body = TestBody::default();
        let mut state = WallRunState::default();
        let mut air = AirState::new(1);

        assert_eq!(state.start(&mut body, &config, &wall_hit(1, Vec3::X), &mut air), None);
        assert!(!state.is_wall_running);
        assert_eq!(state.current_wall, None);
    }

    #[test]
    fn test_entry_pops_onto_wall_and_refills_air_jumps() {
        let config = LocomotionConfig::default();
        let mut body = TestBody {
            velocity: Vec3::new(0.0, -700.0, -400.0),
            gravity_scale: 1.5,
            ..TestBody::airborne()
        };
        let mut state = WallRunState::default();
        let mut air = AirState::new(2);
        air.air_jump(&mut body, &config, false);
        body.velocity.y = -700.0;

        let entry = state.start(&mut body, &config, &wall_hit(4, Vec3::X), &mut air);

        assert_eq!(entry, Some(WallRunEntry::Entered));
        assert!(state.is_wall_running);
        assert_eq!(state.current_wall, Some(SurfaceId(4)));
        assert_eq!(body.velocity.y, config.wall_run_launch_velocity);
        assert_eq!(air.remaining(), 2);
        assert_eq!(body.gravity_scale, 1.0);
        assert_eq!(body.air_control, config.wall_run_air_control);
        // Wall on the left (surface facing +X), travelling -Z.
        assert_eq!(state.tilt_sign, 1.0);
        assert!(state.wall_tangent.abs_diff_eq(Vec3::NEG_Z, 1.0e-5));
    }

    #[test]
    fn test_reentry_refreshes_geometry_only() {
        let config = LocomotionConfig::default();
        let mut body = TestBody {
            velocity: Vec3::new(0.0, -10.0, -400.0),
            ..TestBody::airborne()
        };
        let mut state = running(&mut body, &config);
        body.velocity.y = -30.0;

        let mut air = AirState::new(1);
        let entry = state.start(&mut body, &config, &wall_hit(9, Vec3::NEG_X), &mut air);

        assert_eq!(entry, Some(WallRunEntry::Refreshed));
        assert_eq!(state.current_wall, Some(SurfaceId(1)), "session keeps its surface");
        assert_eq!(body.velocity.y, -30.0, "no second pop");
        assert_eq!(state.wall_normal, Vec3::NEG_X);
        assert_eq!(state.tilt_sign, -1.0);
    }

    #[test]
    fn test_update_applies_three_contributions() {
        let config = LocomotionConfig::default();
        let mut body = TestBody {
            velocity: Vec3::new(0.0, 0.0, -400.0),
            ..TestBody::airborne()
        };
        let state = running(&mut body, &config);
        let before = body.velocity;

        state.update(&mut body, &config, DT);

        let delta = body.velocity - before;
        let stick = -DT * config.wall_run_speed;
        let lift = DT * body.mass * config.wall_run_counter_gravity * config.wall_run_counter_gravity_factor;
        let push = -DT * config.wall_run_speed * config.wall_run_forward_factor;
        assert!(delta.abs_diff_eq(Vec3::new(stick, lift, push), 1.0e-3), "{delta:?}");
    }

    #[test]
    fn test_stop_peels_off_and_arms_air_control_restore() {
        let config = LocomotionConfig::default();
        let mut body = TestBody {
            velocity: Vec3::new(0.0, 0.0, -400.0),
            ..TestBody::airborne()
        };
        let mut state = running(&mut body, &config);
        let mut restore = OneShot::default();
        let before = body.velocity;

        assert!(state.stop(&mut body, &config, DT, &mut restore));

        assert!(!state.is_wall_running);
        assert_eq!(state.current_wall, None);
        assert!((body.velocity.x - before.x - config.wall_run_speed * DT).abs() < 1.0e-3);
        assert_eq!(body.gravity_scale, config.falling_gravity_scale);
        assert_eq!(body.air_control, config.post_wall_air_control);
        assert!(restore.is_pending());
    }

    #[test]
    fn test_stop_without_run_is_noop() {
        let config = LocomotionConfig::default();
        let mut body = TestBody::airborne();
        let mut state = WallRunState::default();
        let mut restore = OneShot::default();
        let before = body.clone();

        assert!(!state.stop(&mut body, &config, DT, &mut restore));
        assert_eq!(body, before);
        assert!(!restore.is_pending());
    }

    #[test]
    fn test_wall_jump_launches_up_and_away() {
        let config = LocomotionConfig::default();
        let mut body = TestBody {
            velocity: Vec3::new(0.0, 0.0, -400.0),
            ..TestBody::airborne()
        };
        let mut state = WallRunState::default();
        let mut air = AirState::new(1);
        let leaning = Vec3::new(0.9, 0.3, 0.0).normalize();
        state.start(&mut body, &config, &wall_hit(2, leaning), &mut air);
        let mut restore = OneShot::default();

        assert!(state.wall_jump(&mut body, &config, DT, &mut restore));

        let horizontal_normal = Vec3::new(leaning.x, 0.0, leaning.z);
        let expected = (Vec3::Y + horizontal_normal * 2.0) * config.wall_jump_force;
        assert!(body.velocity.abs_diff_eq(expected, 1.0e-3));
        assert!(!state.is_wall_running);
    }

    #[test]
    fn test_wall_jump_without_run_is_noop() {
        let config = LocomotionConfig::default();
        let mut body = TestBody::airborne();
        let mut state = WallRunState::default();
        let mut restore = OneShot::default();

        assert!(!state.wall_jump(&mut body, &config, DT, &mut restore));
        assert_eq!(body.velocity, Vec3::ZERO);
    }
}
