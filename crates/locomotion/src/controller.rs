//! Per-character locomotion state machine.
//!
//! `Locomotion` owns the slide, air, wall-run and camera-lean state of one
//! character together with its two deferred actions (the wall-contact
//! debounce and the air-control restore). Input edges and physics
//! notifications arrive through the `on_*` hooks; `update` advances
//! everything once per fixed tick.

use std::time::Duration;

use bevy::log::debug;
use bevy::prelude::{Component, Reflect, Vec2, Vec3};

use crate::air::{AirState, air_accelerate};
use crate::body::MoverBody;
use crate::camera::CameraTilt;
use crate::config::LocomotionConfig;
use crate::slide::{CrouchState, SlidePhase, apply_slope_slide};
use crate::timer::OneShot;
use crate::wall::{SurfaceHit, SurfaceId, WallDetector};
use crate::wall_run::{WallRunEntry, WallRunState};

/// Something presentation code may want to react to.
#[derive(Clone, Debug, PartialEq)]
pub enum LocomotionEvent {
    SlideStarted,
    WallRunStarted { surface: SurfaceId },
    WallRunStopped,
    WallJumped,
    AirJumped { effect_location: Vec3 },
    Landed,
}

/// Desired velocity from a move axis: `x` strafes along `right`, `y` along `forward`.
pub fn wish_velocity(move_axis: Vec2, forward: Vec3, right: Vec3, max_walk_speed: f32) -> Vec3 {
    (right * move_axis.x + forward * move_axis.y) * max_walk_speed
}

#[derive(Component, Reflect, Clone, Debug)]
pub struct Locomotion {
    pub crouch: CrouchState,
    pub air: AirState,
    pub wall_run: WallRunState,
    pub tilt: CameraTilt,
    wall_detector: WallDetector,
    air_control_restore: OneShot,
    /// Step length of the last update, used by input-driven exits between updates.
    last_delta: f32,
    #[reflect(ignore)]
    events: Vec<LocomotionEvent>,
}

impl Locomotion {
    pub fn new(config: &LocomotionConfig) -> Self {
        Self {
            crouch: CrouchState::new(config),
            air: AirState::new(config.air_jump_max),
            wall_run: WallRunState::default(),
            tilt: CameraTilt::default(),
            wall_detector: WallDetector::default(),
            air_control_restore: OneShot::default(),
            last_delta: 0.0,
            events: Vec::new(),
        }
    }

    pub fn is_crouching(&self) -> bool {
        self.crouch.is_crouching
    }

    pub fn is_wall_running(&self) -> bool {
        self.wall_run.is_wall_running
    }

    pub fn slide_phase(&self) -> SlidePhase {
        self.crouch.phase()
    }

    pub fn remaining_air_jumps(&self) -> u32 {
        self.air.remaining()
    }

    /// Current camera lean in degrees.
    pub fn camera_roll(&self) -> f32 {
        self.tilt.roll
    }

    pub fn is_air_control_restore_pending(&self) -> bool {
        self.air_control_restore.is_pending()
    }

    pub fn is_wall_contact_pending(&self) -> bool {
        self.wall_detector.is_pending()
    }

    pub fn events(&self) -> &[LocomotionEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<LocomotionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Move input for this tick. Air-strafes while falling off the wall.
    pub fn on_move_input(
        &mut self,
        body: &mut impl MoverBody,
        config: &LocomotionConfig,
        wish_velocity: Vec3,
        delta_time: f32,
    ) -> Vec3 {
        if body.is_falling() && !self.wall_run.is_wall_running {
            air_accelerate(body, config, wish_velocity, delta_time)
        } else {
            Vec3::ZERO
        }
    }

    /// Jump edge: jump off the wall when running on one, then try an air jump.
    ///
    /// Leaving the wall keeps the character falling, so the same press also
    /// spends an air jump when one is left.
    pub fn on_jump_pressed(&mut self, body: &mut impl MoverBody, config: &LocomotionConfig) -> bool {
        let wall_jumped = self.wall_run.is_wall_running && self.wall_jump(body, config);

        match self.air.air_jump(body, config, self.wall_run.is_wall_running) {
            Some(effect_location) => {
                self.events.push(LocomotionEvent::AirJumped { effect_location });
                true
            }
            None => wall_jumped,
        }
    }

    pub fn on_crouch_pressed(&mut self, body: &mut impl MoverBody, config: &LocomotionConfig) -> bool {
        let slid = self.crouch.start_crouch(body, config);
        if slid {
            self.events.push(LocomotionEvent::SlideStarted);
        }
        slid
    }

    pub fn on_crouch_released(&mut self, body: &mut impl MoverBody, config: &LocomotionConfig) {
        self.crouch.stop_crouch(body, config);
    }

    /// The body touched down after being airborne.
    pub fn on_landed(&mut self, body: &mut impl MoverBody, config: &LocomotionConfig) {
        self.events.push(LocomotionEvent::Landed);

        if self.crouch.on_landed(body, config) {
            self.events.push(LocomotionEvent::SlideStarted);
        }
        self.stop_wall_run(body, config, self.last_delta);
        self.air.reset();
        body.set_gravity_scale(1.0);
        debug!("Landed, air jumps reset to {}", self.air.remaining());
    }

    /// Any physical contact. Returns true if it started or refreshed a wall run.
    pub fn on_surface_contact(
        &mut self,
        body: &mut impl MoverBody,
        config: &LocomotionConfig,
        hit: &SurfaceHit,
    ) -> bool {
        let tracked = self.wall_run.current_wall;
        match self
            .wall_detector
            .on_surface_contact(hit, tracked, config.wall_contact_grace)
        {
            Some(wall) => self.start_wall_run(body, config, &wall).is_some(),
            None => false,
        }
    }

    pub fn start_wall_run(
        &mut self,
        body: &mut impl MoverBody,
        config: &LocomotionConfig,
        hit: &SurfaceHit,
    ) -> Option<WallRunEntry> {
        let entry = self.wall_run.start(body, config, hit, &mut self.air)?;
        if entry == WallRunEntry::Entered {
            self.air_control_restore.cancel();
            self.wall_detector.arm(config.wall_contact_grace);
            self.events
                .push(LocomotionEvent::WallRunStarted { surface: hit.surface });
        }
        Some(entry)
    }

    pub fn stop_wall_run(
        &mut self,
        body: &mut impl MoverBody,
        config: &LocomotionConfig,
        delta_time: f32,
    ) -> bool {
        if !self
            .wall_run
            .stop(body, config, delta_time, &mut self.air_control_restore)
        {
            return false;
        }
        self.wall_detector.cancel();
        self.events.push(LocomotionEvent::WallRunStopped);
        true
    }

    pub fn wall_jump(&mut self, body: &mut impl MoverBody, config: &LocomotionConfig) -> bool {
        if !self
            .wall_run
            .wall_jump(body, config, self.last_delta, &mut self.air_control_restore)
        {
            return false;
        }
        self.wall_detector.cancel();
        self.events.push(LocomotionEvent::WallRunStopped);
        self.events.push(LocomotionEvent::WallJumped);
        true
    }

    /// Advance one tick: deferred actions, then slide, then wall run.
    ///
    /// The wall run goes last so its camera lean is the one that sticks.
    pub fn update(&mut self, body: &mut impl MoverBody, config: &LocomotionConfig, delta_time: f32) {
        self.last_delta = delta_time;
        let delta = Duration::try_from_secs_f32(delta_time).unwrap_or_default();

        if self.wall_detector.tick(delta) {
            self.stop_wall_run(body, config, delta_time);
        }
        if self.air_control_restore.tick(delta) {
            body.set_air_control(config.default_air_control);
        }

        let wall_running = self.wall_run.is_wall_running;
        if self.crouch.is_crouching {
            if !wall_running {
                self.tilt.tilt_toward(
                    config.slide_camera_tilt_angle,
                    config.slide_camera_tilt_speed,
                    delta_time,
                );
            }
            self.crouch.update_capsule(body, config, delta_time);
            if body.is_grounded() {
                apply_slope_slide(body, config, delta_time);
                self.crouch.gradual_slide(body, config, delta_time);
            }
        } else {
            if !wall_running {
                self.tilt
                    .tilt_toward(0.0, config.slide_camera_tilt_speed, delta_time);
            }
            self.crouch.update_capsule(body, config, delta_time);
        }

        if self.wall_run.is_wall_running {
            self.wall_run.update(body, config, delta_time);
            self.tilt.tilt_toward(
                self.wall_run.target_roll(config),
                config.wall_run_transition_speed,
                delta_time,
            );
        }
    }
}
