use avian3d::prelude::{Collider, Position, RigidBody, Rotation};
use bevy::prelude::{
    Assets, Color, Commands, Component, Cuboid, Dir3, Mesh, Mesh3d, MeshMaterial3d, Name, Plane3d,
    Quat, ResMut, StandardMaterial, Vec2, Vec3, default, info,
};

pub const FLOOR_THICKNESS: f32 = 100.0;
pub const ROOM_SIZE: f32 = 4000.0;
pub const WALL_THICKNESS: f32 = 40.0;
pub const WALL_HEIGHT: f32 = 800.0;

/// Free-standing panel to the right of the spawn point, long enough for a full wall run.
pub const RUN_WALL_X: f32 = 420.0;
pub const RUN_WALL_LENGTH: f32 = 3000.0;

pub const RAMP_ANGLE_DEGREES: f32 = 20.0;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GymGeometry;

struct Block {
    name: &'static str,
    position: Vec3,
    rotation: Quat,
    size: Vec3,
    color: Color,
}

fn gym_blocks() -> Vec<Block> {
    let half_room = ROOM_SIZE / 2.0;
    let wall_y = WALL_HEIGHT / 2.0;
    let wall_color = Color::srgb(0.55, 0.55, 0.6);

    let mut blocks = vec![
        Block {
            name: "Wall East",
            position: Vec3::new(half_room, wall_y, 0.0),
            rotation: Quat::IDENTITY,
            size: Vec3::new(WALL_THICKNESS, WALL_HEIGHT, ROOM_SIZE),
            color: wall_color,
        },
        Block {
            name: "Wall West",
            position: Vec3::new(-half_room, wall_y, 0.0),
            rotation: Quat::IDENTITY,
            size: Vec3::new(WALL_THICKNESS, WALL_HEIGHT, ROOM_SIZE),
            color: wall_color,
        },
        Block {
            name: "Wall North",
            position: Vec3::new(0.0, wall_y, -half_room),
            rotation: Quat::IDENTITY,
            size: Vec3::new(ROOM_SIZE, WALL_HEIGHT, WALL_THICKNESS),
            color: wall_color,
        },
        Block {
            name: "Wall South",
            position: Vec3::new(0.0, wall_y, half_room),
            rotation: Quat::IDENTITY,
            size: Vec3::new(ROOM_SIZE, WALL_HEIGHT, WALL_THICKNESS),
            color: wall_color,
        },
        Block {
            name: "Wall Run Panel",
            position: Vec3::new(RUN_WALL_X, wall_y, -RUN_WALL_LENGTH / 2.0),
            rotation: Quat::IDENTITY,
            size: Vec3::new(WALL_THICKNESS, WALL_HEIGHT, RUN_WALL_LENGTH),
            color: Color::srgb(0.2, 0.45, 0.8),
        },
    ];

    let ramp_length = 1200.0;
    let ramp_angle = RAMP_ANGLE_DEGREES.to_radians();
    blocks.push(Block {
        name: "Slide Ramp",
        position: Vec3::new(
            -600.0,
            ramp_length / 2.0 * ramp_angle.sin() - WALL_THICKNESS,
            -800.0,
        ),
        // Rises toward -Z so sliding back down runs toward the spawn.
        rotation: Quat::from_rotation_x(ramp_angle),
        size: Vec3::new(600.0, WALL_THICKNESS, ramp_length),
        color: Color::srgb(0.7, 0.4, 0.2),
    });

    blocks
}

pub fn setup_gym_level(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>, // None when running headless
) {
    let mut floor_entity = commands.spawn((
        Name::new("Floor"),
        GymGeometry,
        Position::from(Vec3::new(0.0, -FLOOR_THICKNESS / 2.0, 0.0)),
        Mesh3d(meshes.add(Plane3d {
            normal: Dir3::Y,
            half_size: Vec2::splat(ROOM_SIZE / 2.0),
        })),
        RigidBody::Static,
        Collider::cuboid(ROOM_SIZE, FLOOR_THICKNESS, ROOM_SIZE),
    ));

    if let Some(ref mut mats) = materials {
        floor_entity.insert(MeshMaterial3d(mats.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.32, 0.3),
            ..default()
        })));
    }

    let blocks = gym_blocks();
    let block_count = blocks.len();
    for block in blocks {
        let mut block_entity = commands.spawn((
            Name::new(block.name),
            GymGeometry,
            Position::from(block.position),
            Rotation::from(block.rotation),
            Mesh3d(meshes.add(Cuboid {
                half_size: block.size / 2.0,
            })),
            RigidBody::Static,
            Collider::cuboid(block.size.x, block.size.y, block.size.z),
        ));

        if let Some(ref mut mats) = materials {
            block_entity.insert(MeshMaterial3d(mats.add(StandardMaterial {
                base_color: block.color,
                ..default()
            })));
        }
    }

    info!("Gym ready: floor and {block_count} blocks");
}

#[cfg(test)]
mod tests {
    use super::*;
    use locomotion::wall::{SurfaceKind, classify};

    #[test]
    fn test_gym_walls_classify_as_runnable() {
        for block in gym_blocks().iter().filter(|b| b.name.starts_with("Wall")) {
            let side_normal = block.rotation * Vec3::X;
            let end_normal = block.rotation * Vec3::Z;
            assert_eq!(classify(side_normal), SurfaceKind::Wall, "{}", block.name);
            assert_eq!(classify(end_normal), SurfaceKind::Wall, "{}", block.name);
        }
    }

    #[test]
    fn test_ramp_is_walkable_not_a_wall() {
        let blocks = gym_blocks();
        let ramp = blocks.iter().find(|b| b.name == "Slide Ramp").unwrap();
        let top_normal = ramp.rotation * Vec3::Y;
        assert_ne!(classify(top_normal), SurfaceKind::Wall);
        assert!(top_normal.y > 0.9);
    }
}
