use std::time::Duration;

use avian3d::prelude::{Gravity, PhysicsPlugins};
use bevy::log::LogPlugin;
use bevy::prelude::{
    App, Commands, DefaultPlugins, DirectionalLight, EulerRot, Fixed, IntoScheduleConfigs,
    MinimalPlugins, PluginGroup, Quat, Res, Resource, Startup, Time, Transform, Update, Vec3,
    Window, WindowPlugin, default, error, info,
};
use bevy::time::TimeUpdateStrategy;
use bevy::window::PresentMode;
use bevy_inspector_egui::{bevy_egui::EguiPlugin, quick::WorldInspectorPlugin};
use leafwing_input_manager::prelude::{ActionState, InputManagerPlugin, InputMap};
use locomotion::LocomotionPlugin;
use locomotion::config::LocomotionConfig;
use locomotion::input::{LocomotionAction, latch_locomotion_input};
use locomotion::movement::MovementConfig;
use locomotion::player::{spawn_player, spawn_player_camera};

use crate::autopilot::{Autopilot, report_autopilot, run_autopilot, tally_locomotion_messages};
use crate::gym::setup_gym_level;

pub const FIXED_TIMESTEP_HZ: f64 = 60.0;
pub const GRAVITY: f32 = 980.0;
pub const LOG_FILTER: &str = "wgpu=error,bevy_render=info,avian3d=info";
pub const SPAWN_POINT: Vec3 = Vec3::new(0.0, 150.0, 0.0);

#[derive(Resource, Clone, Debug)]
pub struct SandboxSettings {
    pub headless: bool,
    pub config: LocomotionConfig,
    pub movement: MovementConfig,
}

pub fn create_sandbox_app(settings: SandboxSettings, frame_limit: u32) -> App {
    let mut app = App::new();
    let headless = settings.headless;

    if headless {
        app.add_plugins((
            MinimalPlugins,
            LogPlugin {
                filter: LOG_FILTER.to_string(),
                ..default()
            },
            bevy::transform::TransformPlugin,
            bevy::diagnostic::DiagnosticsPlugin,
            bevy::asset::AssetPlugin::default(),
            bevy::scene::ScenePlugin,
            bevy::mesh::MeshPlugin,
        ));
        // Every frame advances exactly one fixed step so the script is frame-exact.
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / FIXED_TIMESTEP_HZ,
        )));
        app.insert_resource(Autopilot::new(frame_limit));
        app.add_systems(
            Update,
            (
                run_autopilot.after(latch_locomotion_input),
                tally_locomotion_messages,
                report_autopilot,
            )
                .chain(),
        );
    } else {
        app.add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Locomotion Sandbox".to_string(),
                        resolution: (1280, 720).into(),
                        present_mode: PresentMode::AutoVsync,
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: LOG_FILTER.to_string(),
                    ..default()
                }),
        );
        app.add_plugins(InputManagerPlugin::<LocomotionAction>::default());
        app.add_plugins((EguiPlugin::default(), WorldInspectorPlugin::default()));
        app.add_systems(Startup, (spawn_camera, spawn_light));
    }

    app.insert_resource(Time::<Fixed>::from_hz(FIXED_TIMESTEP_HZ));
    app.add_plugins(PhysicsPlugins::default());
    app.insert_resource(Gravity(Vec3::NEG_Y * GRAVITY));
    app.add_plugins(LocomotionPlugin);

    app.insert_resource(settings);
    app.add_systems(Startup, (setup_gym_level, spawn_sandbox_player).chain());

    info!(
        "Sandbox app created ({})",
        if headless { "headless" } else { "windowed" }
    );
    app
}

fn spawn_sandbox_player(mut commands: Commands, settings: Res<SandboxSettings>) {
    let spawned = spawn_player(
        &mut commands,
        settings.config.clone(),
        settings.movement.clone(),
        SPAWN_POINT,
    );

    match spawned {
        // Headless runs are driven by the autopilot, not by devices.
        Ok(player) if settings.headless => {
            commands
                .entity(player)
                .remove::<(InputMap<LocomotionAction>, ActionState<LocomotionAction>)>();
        }
        Ok(_) => {}
        Err(err) => error!("Player not spawned: {err}"),
    }
}

fn spawn_camera(mut commands: Commands) {
    spawn_player_camera(&mut commands);
}

fn spawn_light(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::YXZ, 0.6, -0.9, 0.0)),
    ));
}
