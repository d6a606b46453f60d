use avian3d::prelude::{
    AngularDamping, Collider, Friction, GravityScale, LinearDamping, LockedAxes, Mass,
    Restitution, RigidBody,
};
use bevy::prelude::{
    Bundle, Camera3d, Commands, Entity, Name, PerspectiveProjection, Projection, Transform, Vec3,
    default, info,
};
use leafwing_input_manager::prelude::ActionState;

use crate::camera::{FpsCamera, PlayerCamera};
use crate::config::LocomotionConfig;
use crate::controller::Locomotion;
use crate::error::ConfigError;
use crate::input::{LocomotionAction, MoveIntent, default_input_map};
use crate::movement::{CharacterMover, MovementConfig, SurfaceContacts};

pub const PLAYER_CAPSULE_RADIUS: f32 = 30.0;
/// Length of the capsule's cylindrical part at height scale 1.
pub const PLAYER_CAPSULE_LENGTH: f32 = 40.0;
/// Eye height above the body centre at height scale 1.
pub const PLAYER_EYE_OFFSET: f32 = 40.0;

#[derive(Bundle)]
pub struct PlayerPhysicsBundle {
    pub rigid_body: RigidBody,
    pub collider: Collider,
    pub mass: Mass,
    pub restitution: Restitution,
    pub friction: Friction,
    pub linear_damping: LinearDamping,
    pub angular_damping: AngularDamping,
    pub locked_axes: LockedAxes,
    /// Gravity is integrated by `apply_movement` so the locomotion core can scale it.
    pub gravity_scale: GravityScale,
}

impl Default for PlayerPhysicsBundle {
    fn default() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            collider: Collider::capsule(PLAYER_CAPSULE_RADIUS, PLAYER_CAPSULE_LENGTH),
            mass: Mass(100.0),
            restitution: Restitution::ZERO,
            friction: Friction::ZERO,
            linear_damping: LinearDamping(0.0),
            angular_damping: AngularDamping(8.0),
            locked_axes: LockedAxes::ROTATION_LOCKED.unlock_rotation_y(),
            gravity_scale: GravityScale(0.0),
        }
    }
}

/// Components that make an entity a locomotion-driven character.
#[derive(Bundle)]
pub struct LocomotionBundle {
    pub locomotion: Locomotion,
    pub config: LocomotionConfig,
    pub movement: MovementConfig,
    pub mover: CharacterMover,
    pub intent: MoveIntent,
    pub contacts: SurfaceContacts,
    pub camera: FpsCamera,
}

impl LocomotionBundle {
    pub fn new(config: LocomotionConfig, movement: MovementConfig) -> Self {
        Self {
            locomotion: Locomotion::new(&config),
            mover: CharacterMover::from_config(&config),
            config,
            movement,
            intent: MoveIntent::default(),
            contacts: SurfaceContacts::default(),
            camera: FpsCamera::default(),
        }
    }
}

/// Spawn a player standing at `translation`. Fails on an invalid config.
pub fn spawn_player(
    commands: &mut Commands,
    config: LocomotionConfig,
    movement: MovementConfig,
    translation: Vec3,
) -> Result<Entity, ConfigError> {
    config.validate()?;

    let transform = Transform::from_translation(translation)
        .with_scale(Vec3::new(1.0, config.normal_scale, 1.0));
    let entity = commands
        .spawn((
            Name::new("Player"),
            transform,
            PlayerPhysicsBundle::default(),
            LocomotionBundle::new(config, movement),
            default_input_map(),
            ActionState::<LocomotionAction>::default(),
        ))
        .id();

    info!("Spawned player {entity} at {translation:?}");
    Ok(entity)
}

pub fn spawn_player_camera(commands: &mut Commands) -> Entity {
    commands
        .spawn((
            Name::new("Player Camera"),
            PlayerCamera,
            Camera3d::default(),
            Projection::Perspective(PerspectiveProjection {
                far: 100_000.0,
                ..default()
            }),
            Transform::default(),
        ))
        .id()
}
