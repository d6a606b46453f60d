//! Cosmetic notifications for presentation code. Nothing here feeds back into movement.

use bevy::prelude::{Entity, Message, MessageWriter, Query, Vec3};

use crate::controller::{Locomotion, LocomotionEvent};
use crate::wall::SurfaceId;

#[derive(Message, Clone, Debug, PartialEq)]
pub struct WallRunStarted {
    pub entity: Entity,
    pub surface: SurfaceId,
}

#[derive(Message, Clone, Debug, PartialEq)]
pub struct WallRunStopped {
    pub entity: Entity,
}

/// Where to spawn the air-jump burst.
#[derive(Message, Clone, Debug, PartialEq)]
pub struct AirJumpEffect {
    pub entity: Entity,
    pub location: Vec3,
}

#[derive(Message, Clone, Debug, PartialEq)]
pub struct SlideStarted {
    pub entity: Entity,
}

#[derive(Message, Clone, Debug, PartialEq)]
pub struct WallJumped {
    pub entity: Entity,
}

#[derive(Message, Clone, Debug, PartialEq)]
pub struct Landed {
    pub entity: Entity,
}

pub fn publish_locomotion_events(
    mut query: Query<(Entity, &mut Locomotion)>,
    mut wall_run_started: MessageWriter<WallRunStarted>,
    mut wall_run_stopped: MessageWriter<WallRunStopped>,
    mut air_jump_effects: MessageWriter<AirJumpEffect>,
    mut slide_started: MessageWriter<SlideStarted>,
    mut wall_jumped: MessageWriter<WallJumped>,
    mut landed: MessageWriter<Landed>,
) {
    for (entity, mut locomotion) in query.iter_mut() {
        if locomotion.events().is_empty() {
            continue;
        }

        for event in locomotion.drain_events() {
            match event {
                LocomotionEvent::WallRunStarted { surface } => {
                    wall_run_started.write(WallRunStarted { entity, surface });
                }
                LocomotionEvent::WallRunStopped => {
                    wall_run_stopped.write(WallRunStopped { entity });
                }
                LocomotionEvent::AirJumped { effect_location } => {
                    air_jump_effects.write(AirJumpEffect {
                        entity,
                        location: effect_location,
                    });
                }
                LocomotionEvent::SlideStarted => {
                    slide_started.write(SlideStarted { entity });
                }
                LocomotionEvent::WallJumped => {
                    wall_jumped.write(WallJumped { entity });
                }
                LocomotionEvent::Landed => {
                    landed.write(Landed { entity });
                }
            }
        }
    }
}
