//! Scripted input for headless runs: walks, slides, jumps and runs along the panel wall.

use avian3d::prelude::{LinearVelocity, Position};
use bevy::prelude::{
    AppExit, Entity, MessageReader, MessageWriter, Query, Res, ResMut, Resource, Vec2, With,
    debug, info,
};
use locomotion::camera::FpsCamera;
use locomotion::controller::Locomotion;
use locomotion::input::MoveIntent;
use locomotion::messages::{
    AirJumpEffect, Landed, SlideStarted, WallJumped, WallRunStarted, WallRunStopped,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cue {
    Walk(Vec2),
    Crouch,
    Uncrouch,
    /// Ground jump while standing, air jump or wall jump otherwise.
    Jump,
    Turn(f32),
}

/// Frame at which each cue fires, in order.
pub const SCRIPT: &[(u32, Cue)] = &[
    (0, Cue::Walk(Vec2::Y)),
    (90, Cue::Crouch),
    (150, Cue::Uncrouch),
    (180, Cue::Jump),
    (200, Cue::Jump),
    (260, Cue::Turn(0.0)),
    (260, Cue::Walk(Vec2::new(0.6, 1.0))),
    (320, Cue::Jump),
    (360, Cue::Walk(Vec2::Y)),
    (420, Cue::Jump),
    (480, Cue::Walk(Vec2::ZERO)),
];

#[derive(Resource, Clone, Debug, Default)]
pub struct Autopilot {
    pub frame: u32,
    pub frame_limit: u32,
    pub wall_runs: u32,
    pub air_jumps: u32,
    pub slides: u32,
}

impl Autopilot {
    pub fn new(frame_limit: u32) -> Self {
        Self {
            frame_limit,
            ..Default::default()
        }
    }
}

pub fn cues_at(frame: u32) -> impl Iterator<Item = Cue> {
    SCRIPT
        .iter()
        .filter(move |(at, _)| *at == frame)
        .map(|(_, cue)| *cue)
}

pub fn apply_cue(cue: Cue, intent: &mut MoveIntent, camera: &mut FpsCamera) {
    match cue {
        Cue::Walk(axis) => intent.move_axis = axis.clamp_length_max(1.0),
        Cue::Crouch => {
            intent.crouch_held = true;
            intent.crouch_pressed = true;
        }
        Cue::Uncrouch => {
            intent.crouch_held = false;
            intent.crouch_released = true;
        }
        Cue::Jump => {
            intent.jump_held = true;
            intent.jump_pressed = true;
        }
        Cue::Turn(yaw) => camera.yaw = yaw,
    }
}

pub fn run_autopilot(
    mut autopilot: ResMut<Autopilot>,
    mut players: Query<(&mut MoveIntent, &mut FpsCamera), With<Locomotion>>,
    mut exit: MessageWriter<AppExit>,
) {
    let frame = autopilot.frame;
    for (mut intent, mut camera) in players.iter_mut() {
        // A jump is held for a single frame.
        intent.jump_held = false;
        for cue in cues_at(frame) {
            debug!("Autopilot frame {frame}: {cue:?}");
            apply_cue(cue, &mut intent, &mut camera);
        }
    }

    autopilot.frame += 1;
    if autopilot.frame >= autopilot.frame_limit {
        exit.write(AppExit::Success);
    }
}

pub fn tally_locomotion_messages(
    mut autopilot: ResMut<Autopilot>,
    mut wall_run_started: MessageReader<WallRunStarted>,
    mut wall_run_stopped: MessageReader<WallRunStopped>,
    mut air_jumps: MessageReader<AirJumpEffect>,
    mut slides: MessageReader<SlideStarted>,
    mut wall_jumps: MessageReader<WallJumped>,
    mut landings: MessageReader<Landed>,
) {
    for message in wall_run_started.read() {
        info!("{} started wall running on {:?}", message.entity, message.surface);
        autopilot.wall_runs += 1;
    }
    for message in wall_run_stopped.read() {
        info!("{} stopped wall running", message.entity);
    }
    for message in air_jumps.read() {
        info!("{} air jumped, effect at {:?}", message.entity, message.location);
        autopilot.air_jumps += 1;
    }
    for message in slides.read() {
        info!("{} started sliding", message.entity);
        autopilot.slides += 1;
    }
    for message in wall_jumps.read() {
        info!("{} jumped off a wall", message.entity);
    }
    for message in landings.read() {
        debug!("{} landed", message.entity);
    }
}

pub fn report_autopilot(
    autopilot: Res<Autopilot>,
    players: Query<(Entity, &Position, &LinearVelocity, &Locomotion)>,
) {
    if autopilot.frame < autopilot.frame_limit {
        return;
    }

    for (entity, position, velocity, locomotion) in players.iter() {
        info!(
            "{entity} after {} frames: position {:?}, speed {:.0}, phase {:?}, air jumps left {}",
            autopilot.frame,
            position.0,
            velocity.0.length(),
            locomotion.slide_phase(),
            locomotion.remaining_air_jumps(),
        );
    }
    info!(
        "Autopilot saw {} slides, {} air jumps, {} wall runs",
        autopilot.slides, autopilot.air_jumps, autopilot.wall_runs
    );
}
