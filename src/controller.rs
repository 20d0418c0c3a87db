use bevy::{log::debug, math::Vec2};

use crate::{
    AnimationDriver, AnimationError, CameraFrame, ClipId, DirectionResolver, Host, JumpTiming,
    LandingTiming, LocomotionAction, LocomotionConfig, LocomotionInput, LookRig, MovementState,
    StateContext, StateMachine, update_facing,
};

/// Third-person locomotion for one character.
///
/// Hosts feed [`LocomotionAction`]s as they arrive and call [`tick`] once per
/// simulation frame. Within a tick the camera is sampled first, then movement
/// is resolved and applied, then the state machine runs. Host capabilities are
/// borrowed per call through a [`Host`]; missing ones are skipped.
///
/// [`tick`]: LocomotionController::tick
#[derive(Debug)]
pub struct LocomotionController {
    config: LocomotionConfig,
    input: LocomotionInput,
    look: LookRig,
    camera: CameraFrame,
    resolver: DirectionResolver,
    machine: StateMachine,
    jump: Option<JumpTiming>,
    landing: Option<LandingTiming>,
    animation: AnimationDriver,
    clock: f32,
    started: bool,
}

impl Default for LocomotionController {
    fn default() -> Self {
        Self::new(LocomotionConfig::default())
    }
}

impl LocomotionController {
    pub fn new(config: LocomotionConfig) -> Self {
        Self {
            config,
            input: LocomotionInput::default(),
            look: LookRig::default(),
            camera: CameraFrame::default(),
            resolver: DirectionResolver::default(),
            machine: StateMachine::default(),
            jump: None,
            landing: None,
            animation: AnimationDriver::default(),
            clock: 0.0,
            started: false,
        }
    }

    pub fn with_look_rig(mut self, look: LookRig) -> Self {
        self.look = look;
        self
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Samples the camera, seeds the movement angle from it and enters Idle.
    ///
    /// Every entry point that can switch state calls this first, so Idle is
    /// always entered before anything else.
    pub fn begin(&mut self, host: &mut Host<'_>) {
        if self.started {
            return;
        }
        self.started = true;

        self.camera.refresh(host.camera);
        self.resolver.seed(self.camera.yaw());

        self.with_state_context(host, |machine, ctx| machine.start(ctx));
    }

    pub fn handle_action(&mut self, action: LocomotionAction, host: &mut Host<'_>) {
        self.begin(host);
        match action {
            LocomotionAction::Move(raw) => self.set_move_input(raw),
            LocomotionAction::MoveStopped => self.clear_move_input(),
            LocomotionAction::Look { input, dt } => self.add_look_input(input, dt),
            LocomotionAction::SprintStarted => self.set_sprinting(true),
            LocomotionAction::SprintStopped => self.set_sprinting(false),
            LocomotionAction::Jump => {
                self.request_jump(host);
            }
        }
    }

    pub fn set_move_input(&mut self, raw: Vec2) {
        self.input.set_move_input(raw);
    }

    /// Zeroes move input and abandons any angle transition in progress.
    pub fn clear_move_input(&mut self) {
        self.input.clear_move_input();
        self.resolver.cancel_transition();
    }

    /// Turns the look rig by `look` held for `dt` seconds.
    pub fn add_look_input(&mut self, look: Vec2, dt: f32) {
        if look.is_finite() && dt.is_finite() {
            self.look.apply_look(look, dt, &self.config);
        }
    }

    pub fn set_sprinting(&mut self, sprinting: bool) {
        self.input.set_sprinting(sprinting);
    }

    /// Starts a jump. Only honored from Idle while grounded.
    pub fn request_jump(&mut self, host: &mut Host<'_>) -> bool {
        self.begin(host);
        if self.machine.current() != MovementState::Idle || !host.is_grounded() {
            debug!("ignoring jump request in {}", self.machine.current());
            return false;
        }
        self.change_state(MovementState::Jump, host);
        true
    }

    /// Switches state through the exit/enter hooks. No-op for the current state.
    pub fn change_state(&mut self, next: MovementState, host: &mut Host<'_>) {
        self.begin(host);
        self.with_state_context(host, |machine, ctx| machine.change_state(next, ctx));
    }

    /// Advances the controller by `dt` seconds.
    pub fn tick(&mut self, dt: f32, host: &mut Host<'_>) {
        self.begin(host);
        self.clock += dt;

        if !self.camera.refresh(host.camera) {
            debug!("no camera bound, keeping yaw {:.1}", self.camera.yaw());
        }

        self.update_movement(dt, host);
        self.with_state_context(host, |machine, ctx| machine.update(ctx, dt));
    }

    fn with_state_context<R>(
        &mut self,
        host: &mut Host<'_>,
        f: impl FnOnce(&mut StateMachine, &mut StateContext<'_, '_>) -> R,
    ) -> R {
        let mut ctx = StateContext {
            config: &self.config,
            input: &self.input,
            jump: &mut self.jump,
            landing: &mut self.landing,
            animation: &mut self.animation,
            host,
            now: self.clock,
        };
        f(&mut self.machine, &mut ctx)
    }

    fn update_movement(&mut self, dt: f32, host: &mut Host<'_>) {
        let state = self.machine.current();
        if state.is_airborne_sequence() {
            return;
        }

        if !self.has_movement_input() {
            self.resolver.deactivate();
            return;
        }

        if state == MovementState::Idle {
            self.resolver.activate(self.camera.yaw(), host.camera.is_some());
        }
        self.resolver.update(self.input.move_input(), &self.config, dt);

        let direction = self.movement_direction();
        let intensity = self.input.intensity(self.config.min_move_intensity);
        match host.body.as_deref_mut() {
            Some(body) => body.apply_planar_move(direction, intensity),
            None => debug!("no movement body bound, skipping planar move"),
        }

        update_facing(host, direction, dt, self.config.rotation_interp_speed);
    }

    pub fn current_state(&self) -> MovementState {
        self.machine.current()
    }

    pub fn previous_state(&self) -> MovementState {
        self.machine.previous()
    }

    pub fn is_idle(&self) -> bool {
        self.machine.current() == MovementState::Idle
    }

    pub fn is_walking(&self) -> bool {
        self.machine.current() == MovementState::Walk
    }

    pub fn is_running(&self) -> bool {
        self.machine.current() == MovementState::Run
    }

    pub fn is_jumping(&self) -> bool {
        self.machine.current() == MovementState::Jump
    }

    pub fn is_landing(&self) -> bool {
        self.machine.current() == MovementState::Landing
    }

    pub fn move_input(&self) -> Vec2 {
        self.input.move_input()
    }

    pub fn is_sprinting(&self) -> bool {
        self.input.is_sprinting()
    }

    pub fn has_movement_input(&self) -> bool {
        self.input.has_movement_input(self.config.input_deadzone)
    }

    pub fn camera_yaw(&self) -> f32 {
        self.camera.yaw()
    }

    pub fn look_rig(&self) -> &LookRig {
        &self.look
    }

    pub fn current_movement_angle(&self) -> f32 {
        self.resolver.angle().current
    }

    pub fn is_transitioning_angle(&self) -> bool {
        self.resolver.angle().transitioning
    }

    pub fn is_continuous_mode(&self) -> bool {
        self.resolver.is_continuous()
    }

    /// Planar direction the character is asked to move in, zero without input.
    pub fn movement_direction(&self) -> Vec2 {
        self.resolver
            .direction(self.camera.yaw(), self.input.move_input(), self.has_movement_input())
    }

    /// `"None"` at rest, otherwise the angle being moved along like `"90.0°"`.
    pub fn movement_direction_name(&self) -> String {
        if !self.has_movement_input() {
            return "None".to_string();
        }
        let angle = self
            .resolver
            .resolved_angle(self.camera.yaw(), self.input.move_input());
        format!("{angle:.1}°")
    }

    pub fn current_animation(&self) -> Option<&ClipId> {
        self.animation.current()
    }

    /// Plays a clip outside the state machine, e.g. for a cinematic.
    pub fn play_animation_direct(
        &mut self,
        clip: &ClipId,
        host: &mut Host<'_>,
    ) -> Result<(), AnimationError> {
        self.animation.play(host, Some(clip))
    }

    pub fn play_animation_with_speed(
        &mut self,
        clip: &ClipId,
        rate: f32,
        host: &mut Host<'_>,
    ) -> Result<(), AnimationError> {
        self.animation.play_with_speed(host, Some(clip), rate)
    }

    pub fn stop_animation_direct(&mut self, host: &mut Host<'_>) {
        self.animation.stop(host);
    }
}
