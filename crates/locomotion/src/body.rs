//! The seam between the locomotion core and whatever solves the character's physics.

use bevy::prelude::Vec3;

/// What the locomotion core reads from and writes to the character's physics body.
///
/// The body owns integration, collision and the ground/air movement solve. The
/// core only shapes velocity and tunes the movement parameters listed here.
pub trait MoverBody {
    fn position(&self) -> Vec3;

    fn velocity(&self) -> Vec3;

    fn set_velocity(&mut self, velocity: Vec3);

    fn add_velocity(&mut self, delta: Vec3) {
        let velocity = self.velocity();
        self.set_velocity(velocity + delta);
    }

    /// Facing direction, unit length.
    fn forward(&self) -> Vec3;

    /// Right-hand direction, unit length.
    fn right(&self) -> Vec3;

    fn is_grounded(&self) -> bool;

    fn is_falling(&self) -> bool;

    /// Normal of the floor currently stood on, `Vec3::Y` when flat or airborne.
    fn floor_normal(&self) -> Vec3;

    /// Unit direction gravity pulls in.
    fn gravity_direction(&self) -> Vec3;

    fn mass(&self) -> f32;

    /// Vertical scale of the collision capsule.
    fn height_scale(&self) -> f32;

    fn set_height_scale(&mut self, scale: f32);

    /// Move the body up (positive) or down without touching velocity.
    fn shift_vertical(&mut self, offset: f32);

    fn air_control(&self) -> f32;

    fn set_air_control(&mut self, air_control: f32);

    fn set_gravity_scale(&mut self, gravity_scale: f32);

    fn set_ground_friction(&mut self, friction: f32);

    fn set_braking_factor(&mut self, factor: f32);

    fn max_walk_speed(&self) -> f32;

    fn set_max_walk_speed(&mut self, speed: f32);
}
