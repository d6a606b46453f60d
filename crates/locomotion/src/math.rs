//! Vector and scalar helpers shared by the locomotion sub-controllers.
//!
//! Everything here is pure. Angles passed to [`rotate`] are radians,
//! world up is +Y.

use bevy::prelude::{EulerRot, Quat, Vec3};

/// Below this length a vector is treated as having no direction.
pub const NORMALIZE_EPSILON: f32 = 1.0e-4;

/// Tolerance used for "already there" checks on interpolated values.
pub const NEARLY_EQUAL_TOLERANCE: f32 = 1.0e-4;

/// Rotate `vector` by an intrinsic yaw -> pitch -> roll Euler rotation.
///
/// Yaw turns about +Y, pitch about the yawed +X, roll about the resulting +Z.
/// Rotating a wall normal by `(FRAC_PI_2, 0, 0)` yields a horizontal vector
/// lying in the wall plane.
pub fn rotate(vector: Vec3, yaw: f32, pitch: f32, roll: f32) -> Vec3 {
    Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll) * vector
}

/// Remove the component of `vector` along `plane_normal`.
///
/// `plane_normal` is expected to be unit length.
pub fn plane_project(vector: Vec3, plane_normal: Vec3) -> Vec3 {
    vector - plane_normal * vector.dot(plane_normal)
}

/// Unit vector in the direction of `vector`, or zero when it is too short to have one.
pub fn safe_normalize(vector: Vec3) -> Vec3 {
    let length = vector.length();
    if !length.is_finite() || length < NORMALIZE_EPSILON {
        Vec3::ZERO
    } else {
        vector / length
    }
}

/// `vector` with its vertical component dropped.
pub fn horizontal(vector: Vec3) -> Vec3 {
    Vec3::new(vector.x, 0.0, vector.z)
}

/// Horizontal direction of `vector`, or zero when it has no horizontal extent.
pub fn safe_normalize_horizontal(vector: Vec3) -> Vec3 {
    safe_normalize(horizontal(vector))
}

pub fn is_nearly_equal(a: f32, b: f32) -> bool {
    (a - b).abs() <= NEARLY_EQUAL_TOLERANCE
}

/// -1, 0 or +1 following the sign of `value`.
///
/// Unlike `f32::signum`, zero maps to zero.
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Move `current` toward `target` with exponential decay at `rate` per second.
///
/// Frame-rate independent: two half steps land where one full step does.
/// Never overshoots, and snaps onto `target` once within tolerance so the
/// caller can stop writing.
pub fn interp_to(current: f32, target: f32, delta_time: f32, rate: f32) -> f32 {
    let distance = target - current;
    if distance.abs() <= NEARLY_EQUAL_TOLERANCE {
        return target;
    }
    if rate <= 0.0 {
        return target;
    }

    let alpha = 1.0 - (-rate * delta_time.max(0.0)).exp();
    let next = current + distance * alpha.clamp(0.0, 1.0);

    if (target - next).abs() <= NEARLY_EQUAL_TOLERANCE {
        target
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!(a.abs_diff_eq(b, 1.0e-5), "expected {b:?}, got {a:?}");
    }

    #[test]
    fn test_rotate_quarter_yaw_turns_about_up_axis() {
        assert_vec_eq(rotate(Vec3::X, FRAC_PI_2, 0.0, 0.0), Vec3::NEG_Z);
        assert_vec_eq(rotate(Vec3::Z, FRAC_PI_2, 0.0, 0.0), Vec3::X);
        assert_vec_eq(rotate(Vec3::Y, FRAC_PI_2, 0.0, 0.0), Vec3::Y);
    }

    #[test]
    fn test_rotate_keeps_length() {
        let v = Vec3::new(3.0, -2.0, 5.0);
        let rotated = rotate(v, 0.3, -1.1, 2.4);
        assert!((rotated.length() - v.length()).abs() < 1.0e-4);
    }

    #[test]
    fn test_rotate_at_pitch_pole_stays_finite() {
        let rotated = rotate(Vec3::new(1.0, 2.0, 3.0), 0.5, FRAC_PI_2, 0.25);
        assert!(rotated.is_finite());
    }

    #[test]
    fn test_plane_project_removes_normal_component() {
        let projected = plane_project(Vec3::new(0.6, 0.8, 0.0), Vec3::Y);
        assert_vec_eq(projected, Vec3::new(0.6, 0.0, 0.0));
    }

    #[test]
    fn test_safe_normalize_zero_vector() {
        let n = safe_normalize(Vec3::ZERO);
        assert_eq!(n, Vec3::ZERO);
        assert!(!n.is_nan());
    }

    #[test]
    fn test_safe_normalize_tiny_and_regular_vectors() {
        assert_eq!(safe_normalize(Vec3::splat(1.0e-7)), Vec3::ZERO);
        assert_vec_eq(safe_normalize(Vec3::new(0.0, 0.0, 4.0)), Vec3::Z);
    }

    #[test]
    fn test_safe_normalize_horizontal_of_vertical_vector() {
        assert_eq!(safe_normalize_horizontal(Vec3::new(0.0, -50.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn test_sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.2), -1.0);
        assert_eq!(sign(7.0), 1.0);
    }

    #[test]
    fn test_interp_to_fixed_point_at_target() {
        for (dt, rate) in [(0.016, 7.0), (1.0, 0.0), (0.0, 25.0), (10.0, 1000.0)] {
            assert_eq!(interp_to(1.5, 1.5, dt, rate), 1.5);
        }
    }

    #[test]
    fn test_interp_to_never_overshoots() {
        let next = interp_to(0.0, 10.0, 5.0, 1000.0);
        assert_eq!(next, 10.0);

        let next = interp_to(10.0, -3.0, 0.5, 40.0);
        assert!(next >= -3.0);
    }

    #[test]
    fn test_interp_to_approaches_monotonically() {
        let mut value = 0.0;
        let mut last_gap = 1.0;
        for _ in 0..30 {
            value = interp_to(value, 1.0, 1.0 / 60.0, 7.0);
            let gap = 1.0 - value;
            assert!(gap >= 0.0 && gap <= last_gap);
            last_gap = gap;
        }
        assert!(value > 0.9);
    }

    #[test]
    fn test_interp_to_is_frame_rate_independent() {
        let one_step = interp_to(0.0, 1.0, 0.1, 5.0);
        let half = interp_to(0.0, 1.0, 0.05, 5.0);
        let two_steps = interp_to(half, 1.0, 0.05, 5.0);
        assert!((one_step - two_steps).abs() < 1.0e-5);
    }
}
