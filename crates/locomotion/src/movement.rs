//! The physics side of the character: ground probing, wall probing and a
//! simple ground/air integrator on top of avian's rigid body.
//!
//! The locomotion core never touches ECS components directly. `BodyView`
//! borrows the components of one character and exposes them through
//! `MoverBody` for the duration of a system run.

use avian3d::prelude::*;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::body::MoverBody;
use crate::config::LocomotionConfig;
use crate::controller::{Locomotion, wish_velocity};
use crate::input::MoveIntent;
use crate::math::safe_normalize;
use crate::wall::{SurfaceHit, SurfaceId};

// ============================================================================
// COMPONENTS
// ============================================================================

/// Tuning for the ground/air integrator.
#[derive(Component, Reflect, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MovementConfig {
    pub acceleration: f32,
    /// Scaled by the mover's current air control.
    pub air_acceleration: f32,
    pub stop_speed: f32,
    pub friction_speed_cutoff: f32,
    pub traction_normal_cutoff: f32,
    pub grounded_distance: f32,
    pub ground_cast_distance: f32,
    pub wall_contact_distance: f32,
    pub max_velocity: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            acceleration: 10.0,
            air_acceleration: 10.0,
            stop_speed: 100.0,
            friction_speed_cutoff: 10.0,
            traction_normal_cutoff: 0.7,
            grounded_distance: 5.0,
            ground_cast_distance: 100.0,
            wall_contact_distance: 5.0,
            max_velocity: 6000.0,
        }
    }
}

/// Mutable movement state the locomotion core reads and tunes.
#[derive(Component, Reflect, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CharacterMover {
    pub grounded: bool,
    pub falling: bool,
    /// True for the one tick the body touches down.
    pub just_landed: bool,
    pub floor_normal: Vec3,
    pub ground_distance: f32,
    pub gravity_scale: f32,
    pub air_control: f32,
    pub ground_friction: f32,
    pub braking_factor: f32,
    pub max_walk_speed: f32,
}

impl Default for CharacterMover {
    fn default() -> Self {
        Self::from_config(&LocomotionConfig::default())
    }
}

impl CharacterMover {
    pub fn from_config(config: &LocomotionConfig) -> Self {
        Self {
            grounded: false,
            falling: true,
            just_landed: false,
            floor_normal: Vec3::Y,
            ground_distance: 0.0,
            gravity_scale: 1.0,
            air_control: config.default_air_control,
            ground_friction: config.default_ground_friction,
            braking_factor: config.default_braking_factor,
            max_walk_speed: config.walk_speed,
        }
    }
}

/// Contacts found by this tick's wall casts.
#[derive(Component, Clone, Debug, Default)]
pub struct SurfaceContacts {
    pub hits: Vec<SurfaceHit>,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct GroundHit {
    pub is_grounded: bool,
    pub ground_normal: Vec3,
    pub ground_distance: f32,
}

// ============================================================================
// BODY VIEW
// ============================================================================

/// `MoverBody` over the borrowed components of one character.
pub struct BodyView<'a> {
    pub mover: &'a mut CharacterMover,
    pub velocity: &'a mut LinearVelocity,
    pub position: &'a mut Position,
    pub transform: &'a mut Transform,
    pub rotation: Quat,
    pub mass: f32,
    pub gravity: Vec3,
}

impl MoverBody for BodyView<'_> {
    fn position(&self) -> Vec3 {
        self.position.0
    }

    fn velocity(&self) -> Vec3 {
        self.velocity.0
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity.0 = velocity;
    }

    fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    fn is_grounded(&self) -> bool {
        self.mover.grounded
    }

    fn is_falling(&self) -> bool {
        self.mover.falling
    }

    fn floor_normal(&self) -> Vec3 {
        self.mover.floor_normal
    }

    fn gravity_direction(&self) -> Vec3 {
        safe_normalize(self.gravity)
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn height_scale(&self) -> f32 {
        self.transform.scale.y
    }

    fn set_height_scale(&mut self, scale: f32) {
        self.transform.scale.y = scale;
    }

    fn shift_vertical(&mut self, offset: f32) {
        self.position.0.y += offset;
        self.transform.translation.y += offset;
    }

    fn air_control(&self) -> f32 {
        self.mover.air_control
    }

    fn set_air_control(&mut self, air_control: f32) {
        self.mover.air_control = air_control;
    }

    fn set_gravity_scale(&mut self, gravity_scale: f32) {
        self.mover.gravity_scale = gravity_scale;
    }

    fn set_ground_friction(&mut self, friction: f32) {
        self.mover.ground_friction = friction;
    }

    fn set_braking_factor(&mut self, factor: f32) {
        self.mover.braking_factor = factor;
    }

    fn max_walk_speed(&self) -> f32 {
        self.mover.max_walk_speed
    }

    fn set_max_walk_speed(&mut self, speed: f32) {
        self.mover.max_walk_speed = speed;
    }
}

// ============================================================================
// PURE FUNCTIONS
// ============================================================================

/// Cast the body's collider straight down.
pub fn detect_ground(
    entity: Entity,
    collider: &Collider,
    position: Vec3,
    rotation: Quat,
    spatial_query: &SpatialQueryPipeline,
    config: &MovementConfig,
) -> GroundHit {
    let filter = SpatialQueryFilter::default().with_excluded_entities([entity]);

    match spatial_query.cast_shape(
        collider,
        position,
        rotation,
        Dir3::NEG_Y,
        &ShapeCastConfig::from_max_distance(config.ground_cast_distance),
        &filter,
    ) {
        Some(hit) => {
            let has_traction = hit.normal1.dot(Vec3::Y) > config.traction_normal_cutoff;
            GroundHit {
                is_grounded: has_traction && hit.distance <= config.grounded_distance,
                ground_normal: hit.normal1,
                ground_distance: hit.distance,
            }
        }
        None => GroundHit::default(),
    }
}

/// Horizontal directions to cast for walls: travel, both sides, and the tracked wall.
pub fn wall_cast_directions(velocity: Vec3, rotation: Quat, wall_normal: Option<Vec3>) -> Vec<Dir3> {
    let travel = Vec3::new(velocity.x, 0.0, velocity.z);
    let candidates = [
        Some(travel),
        Some(rotation * Vec3::X),
        Some(rotation * Vec3::NEG_X),
        wall_normal.map(|normal| -Vec3::new(normal.x, 0.0, normal.z)),
    ];

    let mut directions: Vec<Dir3> = Vec::with_capacity(candidates.len());
    for candidate in candidates.into_iter().flatten() {
        let Ok(direction) = Dir3::new(candidate) else {
            continue;
        };
        if directions.iter().all(|existing| existing.dot(*direction) < 0.999) {
            directions.push(direction);
        }
    }
    directions
}

pub fn calculate_acceleration(
    wish_direction: Vec3,
    wish_speed: f32,
    acceleration: f32,
    current_velocity: Vec3,
    dt: f32,
) -> Vec3 {
    let add_speed = wish_speed - current_velocity.dot(wish_direction);
    if add_speed <= 0.0 {
        return Vec3::ZERO;
    }

    let acceleration_speed = (acceleration * wish_speed * dt).min(add_speed);
    wish_direction * acceleration_speed
}

/// Scale lateral speed down by `friction`, stopping outright below the cutoff.
pub fn apply_ground_friction(
    velocity: &mut LinearVelocity,
    friction: f32,
    config: &MovementConfig,
    dt: f32,
) {
    let lateral_speed = velocity.0.xz().length();

    if lateral_speed > config.friction_speed_cutoff {
        let control = lateral_speed.max(config.stop_speed);
        let drop = control * friction * dt;
        let new_speed = ((lateral_speed - drop) / lateral_speed).max(0.0);
        velocity.0.x *= new_speed;
        velocity.0.z *= new_speed;
    } else {
        velocity.0.x = 0.0;
        velocity.0.z = 0.0;
    }
}

/// Remove velocity pointing into the ground, keep velocity leaving it.
pub fn remove_ground_penetration(velocity: &mut LinearVelocity, ground_normal: Vec3) {
    let into_ground = velocity.0.dot(ground_normal);
    if into_ground < 0.0 {
        velocity.0 -= into_ground * ground_normal;
    }
}

pub fn clamp_max_velocity(velocity: &mut LinearVelocity, max_velocity: f32) {
    velocity.0 = velocity.0.clamp_length_max(max_velocity);
}

// ============================================================================
// SYSTEMS
// ============================================================================

pub fn update_ground_detection(
    spatial_query: Res<SpatialQueryPipeline>,
    mut query: Query<(
        Entity,
        &Position,
        &Rotation,
        &Collider,
        &MovementConfig,
        &mut CharacterMover,
    )>,
) {
    for (entity, position, rotation, collider, config, mut mover) in query.iter_mut() {
        let ground = detect_ground(
            entity,
            collider,
            position.0,
            rotation.0,
            &spatial_query,
            config,
        );

        let was_grounded = mover.grounded;
        mover.grounded = ground.is_grounded;
        mover.falling = !ground.is_grounded;
        mover.just_landed = ground.is_grounded && !was_grounded;
        mover.ground_distance = ground.ground_distance;
        mover.floor_normal = if ground.is_grounded {
            ground.ground_normal
        } else {
            Vec3::Y
        };

        if mover.just_landed {
            debug!("{entity} landed, floor normal {:?}", mover.floor_normal);
        }
    }
}

/// Cast sideways for walls while airborne and collect the contacts.
pub fn detect_wall_contacts(
    spatial_query: Res<SpatialQueryPipeline>,
    mut query: Query<(
        Entity,
        &Position,
        &Rotation,
        &Collider,
        &LinearVelocity,
        &MovementConfig,
        &CharacterMover,
        &Locomotion,
        &mut SurfaceContacts,
    )>,
) {
    for (entity, position, rotation, collider, velocity, config, mover, locomotion, mut contacts) in
        query.iter_mut()
    {
        contacts.hits.clear();
        if mover.grounded {
            continue;
        }

        let tracked_normal = locomotion
            .is_wall_running()
            .then_some(locomotion.wall_run.wall_normal);
        let filter = SpatialQueryFilter::default().with_excluded_entities([entity]);
        let cast_config = ShapeCastConfig::from_max_distance(config.wall_contact_distance);

        for direction in wall_cast_directions(velocity.0, rotation.0, tracked_normal) {
            let Some(hit) = spatial_query.cast_shape(
                collider,
                position.0,
                rotation.0,
                direction,
                &cast_config,
                &filter,
            ) else {
                continue;
            };

            let surface = SurfaceId::from(hit.entity);
            if contacts.hits.iter().any(|existing| existing.surface == surface) {
                continue;
            }
            contacts.hits.push(SurfaceHit {
                surface,
                normal: hit.normal1,
            });
        }
    }
}

/// Feed this tick's physics events and input edges into the locomotion core, then advance it.
pub fn drive_locomotion(
    time: Res<Time>,
    gravity: Res<Gravity>,
    mut query: Query<(
        &LocomotionConfig,
        &mut Locomotion,
        &MoveIntent,
        &SurfaceContacts,
        &mut CharacterMover,
        &mut LinearVelocity,
        &mut Position,
        &mut Transform,
        &Rotation,
        &Mass,
    )>,
) {
    let dt = time.delta_secs();

    for (
        config,
        mut locomotion,
        intent,
        contacts,
        mut mover,
        mut velocity,
        mut position,
        mut transform,
        rotation,
        mass,
    ) in query.iter_mut()
    {
        let mut body = BodyView {
            mover: &mut *mover,
            velocity: &mut *velocity,
            position: &mut *position,
            transform: &mut *transform,
            rotation: rotation.0,
            mass: mass.0,
            gravity: gravity.0,
        };

        if body.mover.just_landed {
            locomotion.on_landed(&mut body, config);
        }
        for hit in &contacts.hits {
            locomotion.on_surface_contact(&mut body, config, hit);
        }

        if intent.jump_pressed {
            locomotion.on_jump_pressed(&mut body, config);
        }
        if intent.crouch_pressed {
            locomotion.on_crouch_pressed(&mut body, config);
        }
        if intent.crouch_released {
            locomotion.on_crouch_released(&mut body, config);
        }
        // A release and re-press inside one tick leaves the button held.
        if intent.crouch_held && !locomotion.is_crouching() {
            locomotion.on_crouch_pressed(&mut body, config);
        }

        let wish = wish_velocity(
            intent.move_axis,
            body.forward(),
            body.right(),
            body.max_walk_speed(),
        );
        locomotion.on_move_input(&mut body, config, wish, dt);

        locomotion.update(&mut body, config, dt);
    }
}

/// Ground friction and acceleration, ground jumps, air control and gravity.
pub fn apply_movement(
    time: Res<Time>,
    gravity: Res<Gravity>,
    mut query: Query<(
        &MovementConfig,
        &LocomotionConfig,
        &CharacterMover,
        &Rotation,
        &mut MoveIntent,
        &mut LinearVelocity,
    )>,
) {
    let dt = time.delta_secs();

    for (config, locomotion_config, mover, rotation, mut intent, mut velocity) in query.iter_mut() {
        let wish = wish_velocity(
            intent.move_axis,
            rotation.0 * Vec3::NEG_Z,
            rotation.0 * Vec3::X,
            mover.max_walk_speed,
        );
        let wish_direction = safe_normalize(Vec3::new(wish.x, 0.0, wish.z));
        let wish_speed = wish.length();

        if mover.grounded {
            let friction = if wish_speed > 0.0 {
                mover.ground_friction
            } else {
                mover.ground_friction * mover.braking_factor
            };
            apply_ground_friction(&mut velocity, friction, config, dt);

            let add = calculate_acceleration(
                wish_direction,
                wish_speed,
                config.acceleration,
                velocity.0,
                dt,
            );
            velocity.0 += add;

            remove_ground_penetration(&mut velocity, mover.floor_normal);

            if intent.jump_held {
                velocity.0.y = locomotion_config.jump_z_velocity;
            }
        } else {
            let add = calculate_acceleration(
                wish_direction,
                wish_speed,
                config.air_acceleration * mover.air_control,
                velocity.0,
                dt,
            );
            velocity.0 += add;
            velocity.0 += gravity.0 * mover.gravity_scale * dt;
        }

        clamp_max_velocity(&mut velocity, config.max_velocity);
        intent.clear_edges();
    }
}

// ============================================================================
// TESTS
// ============================================================================
