use bevy::prelude::*;

use leafwing_input_manager::Actionlike;
use leafwing_input_manager::prelude::{ActionState, InputMap, MouseMove, VirtualDPad};
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug, Reflect, Serialize, Deserialize, Actionlike, Default,
)]
pub enum LocomotionAction {
    #[default]
    #[actionlike(DualAxis)]
    Move,

    #[actionlike(DualAxis)]
    Look,

    #[actionlike(Button)]
    Jump,

    #[actionlike(Button)]
    Crouch,
}

const MOVEMENT_DEADZONE_SQUARED: f32 = 0.000001;

pub fn default_input_map() -> InputMap<LocomotionAction> {
    InputMap::<LocomotionAction>::default()
        .with(LocomotionAction::Jump, KeyCode::Space)
        .with(LocomotionAction::Crouch, KeyCode::ControlLeft)
        .with(LocomotionAction::Crouch, KeyCode::KeyC)
        .with_dual_axis(LocomotionAction::Move, VirtualDPad::wasd())
        .with_dual_axis(LocomotionAction::Move, VirtualDPad::arrow_keys())
        .with_dual_axis(LocomotionAction::Look, MouseMove::default())
}

/// Move axis with dead zone, clamped to unit length.
pub fn get_movement_direction(action_state: &ActionState<LocomotionAction>) -> Vec2 {
    let move_input = action_state.axis_pair(&LocomotionAction::Move);
    if move_input.length_squared() < MOVEMENT_DEADZONE_SQUARED {
        Vec2::ZERO
    } else {
        move_input.clamp_length_max(1.0)
    }
}

/// Input sampled every frame and consumed by the fixed-step systems.
///
/// Edges accumulate until the next fixed tick clears them, so a press that
/// lands between two ticks is seen exactly once.
#[derive(Component, Reflect, Clone, Debug, Default, PartialEq)]
pub struct MoveIntent {
    pub move_axis: Vec2,
    pub jump_held: bool,
    pub jump_pressed: bool,
    pub crouch_held: bool,
    pub crouch_pressed: bool,
    pub crouch_released: bool,
}

impl MoveIntent {
    pub fn latch(&mut self, action_state: &ActionState<LocomotionAction>) {
        self.move_axis = get_movement_direction(action_state);
        self.jump_held = action_state.pressed(&LocomotionAction::Jump);
        self.crouch_held = action_state.pressed(&LocomotionAction::Crouch);
        self.jump_pressed |= action_state.just_pressed(&LocomotionAction::Jump);
        self.crouch_pressed |= action_state.just_pressed(&LocomotionAction::Crouch);
        self.crouch_released |= action_state.just_released(&LocomotionAction::Crouch);
    }

    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.crouch_pressed = false;
        self.crouch_released = false;
    }
}

pub fn latch_locomotion_input(mut query: Query<(&ActionState<LocomotionAction>, &mut MoveIntent)>) {
    for (action_state, mut intent) in query.iter_mut() {
        if action_state.disabled() {
            *intent = MoveIntent::default();
        } else {
            intent.latch(action_state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_deadzone_and_clamp() {
        let mut action_state = ActionState::<LocomotionAction>::default();

        action_state.set_axis_pair(&LocomotionAction::Move, Vec2::new(0.0001, 0.0));
        assert_eq!(get_movement_direction(&action_state), Vec2::ZERO);

        action_state.set_axis_pair(&LocomotionAction::Move, Vec2::new(1.0, 1.0));
        let direction = get_movement_direction(&action_state);
        assert!((direction.length() - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn test_edges_accumulate_until_cleared() {
        let mut intent = MoveIntent::default();
        let mut action_state = ActionState::<LocomotionAction>::default();

        action_state.press(&LocomotionAction::Jump);
        intent.latch(&action_state);
        assert!(intent.jump_pressed);
        assert!(intent.jump_held);

        action_state.release(&LocomotionAction::Jump);
        intent.latch(&action_state);
        assert!(intent.jump_pressed, "edge survives until a fixed tick consumes it");
        assert!(!intent.jump_held);

        intent.clear_edges();
        assert!(!intent.jump_pressed);
    }

    #[test]
    fn test_latch_system_resets_disabled_input() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, latch_locomotion_input);

        let mut action_state = ActionState::<LocomotionAction>::default();
        action_state.press(&LocomotionAction::Crouch);
        action_state.disable();
        let entity = app
            .world_mut()
            .spawn((
                action_state,
                MoveIntent {
                    crouch_pressed: true,
                    ..Default::default()
                },
            ))
            .id();

        app.update();

        assert_eq!(
            app.world().get::<MoveIntent>(entity).unwrap(),
            &MoveIntent::default()
        );
    }
}
