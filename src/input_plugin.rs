use bevy::{input::mouse::MouseMotion, prelude::*};

use crate::LocomotionAction;

/// Turns keyboard, mouse and gamepad state into [`LocomotionAction`] events.
/// Runs in `PreUpdate`, after bevy's own input processing.
pub struct LocomotionInputPlugin;

impl Plugin for LocomotionInputPlugin {
    fn build(&self, app: &mut App) {
        use bevy::input::{gamepad, keyboard, mouse};

        app.add_event::<LocomotionAction>()
            .init_resource::<LocomotionBindings>()
            .add_systems(
                PreUpdate,
                device_input
                    .after(mouse::mouse_button_input_system)
                    .after(keyboard::keyboard_input_system)
                    .after(gamepad::gamepad_event_processing_system)
                    .after(gamepad::gamepad_connection_system),
            );
    }
}

#[derive(Resource)]
pub struct LocomotionBindings {
    pub enable_input: bool,
    /// Full-stick seconds of turn per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    pub key_forward: KeyCode,
    pub key_back: KeyCode,
    pub key_left: KeyCode,
    pub key_right: KeyCode,
    pub key_sprint: KeyCode,
    pub key_jump: KeyCode,
    pub pad_sprint: GamepadButton,
    pub pad_jump: GamepadButton,
}

impl Default for LocomotionBindings {
    fn default() -> Self {
        Self {
            enable_input: true,
            mouse_sensitivity: 0.003,
            key_forward: KeyCode::KeyW,
            key_back: KeyCode::KeyS,
            key_left: KeyCode::KeyA,
            key_right: KeyCode::KeyD,
            key_sprint: KeyCode::ShiftLeft,
            key_jump: KeyCode::Space,
            pad_sprint: GamepadButton::LeftThumb,
            pad_jump: GamepadButton::South,
        }
    }
}

/// Edge state so held buttons produce start/stop events once.
#[derive(Default)]
struct HeldInput {
    moving: bool,
    sprinting: bool,
}

fn device_input(
    time: Res<Time>,
    bindings: Res<LocomotionBindings>,
    key_input: Res<ButtonInput<KeyCode>>,
    mut mouse_events: EventReader<MouseMotion>,
    gamepads: Query<&Gamepad>,
    mut held: Local<HeldInput>,
    mut actions: EventWriter<LocomotionAction>,
) {
    let mut mouse_delta = Vec2::ZERO;
    for mouse_event in mouse_events.read() {
        mouse_delta += mouse_event.delta;
    }

    if !bindings.enable_input {
        if held.moving {
            actions.write(LocomotionAction::MoveStopped);
        }
        if held.sprinting {
            actions.write(LocomotionAction::SprintStopped);
        }
        *held = HeldInput::default();
        return;
    }

    let mut movement = Vec2::new(
        get_axis(&key_input, bindings.key_right, bindings.key_left),
        get_axis(&key_input, bindings.key_forward, bindings.key_back),
    );
    let mut look_stick = Vec2::ZERO;
    let mut sprint = key_input.pressed(bindings.key_sprint);
    let mut jump = key_input.just_pressed(bindings.key_jump);

    for gamepad in &gamepads {
        movement += gamepad.left_stick();
        look_stick += gamepad.right_stick();
        sprint |= gamepad.pressed(bindings.pad_sprint);
        jump |= gamepad.just_pressed(bindings.pad_jump);
    }

    if movement != Vec2::ZERO {
        actions.write(LocomotionAction::Move(movement));
        held.moving = true;
    } else if held.moving {
        actions.write(LocomotionAction::MoveStopped);
        held.moving = false;
    }

    let dt = time.delta_secs();
    if let Some(input) = look_rate(mouse_delta, look_stick, bindings.mouse_sensitivity, dt) {
        actions.write(LocomotionAction::Look { input, dt });
    }

    if sprint != held.sprinting {
        actions.write(if sprint {
            LocomotionAction::SprintStarted
        } else {
            LocomotionAction::SprintStopped
        });
        held.sprinting = sprint;
    }

    if jump {
        actions.write(LocomotionAction::Jump);
    }
}

/// Combined look rate for one frame of `dt` seconds.
///
/// Sticks are already rates. Mouse motion is a displacement, so it is divided
/// by `dt` to turn the same distance however the motion is split over frames.
fn look_rate(mouse_delta: Vec2, stick: Vec2, sensitivity: f32, dt: f32) -> Option<Vec2> {
    if dt <= 0.0 {
        return None;
    }
    let mouse = Vec2::new(mouse_delta.x, -mouse_delta.y) * sensitivity / dt;
    let look = mouse + stick;
    (look != Vec2::ZERO).then_some(look)
}

fn get_pressed(key_input: &ButtonInput<KeyCode>, key: KeyCode) -> f32 {
    if key_input.pressed(key) { 1.0 } else { 0.0 }
}

fn get_axis(key_input: &ButtonInput<KeyCode>, key_pos: KeyCode, key_neg: KeyCode) -> f32 {
    get_pressed(key_input, key_pos) - get_pressed(key_input, key_neg)
}
