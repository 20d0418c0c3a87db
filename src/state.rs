//! Movement states and the machine that switches between them.
//!
//! Each state is a unit type implementing [`StateBehavior`]; the enum only
//! names them. Hooks return the next state they want instead of switching
//! directly, so every switch goes through [`StateMachine::change_state`].

use std::fmt;

use bevy::log::debug;

use crate::{AnimationDriver, Host, JumpTiming, LandingTiming, LocomotionConfig, LocomotionInput};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MovementState {
    #[default]
    Idle,
    Walk,
    Run,
    Jump,
    Landing,
}

impl MovementState {
    pub fn behavior(self) -> &'static dyn StateBehavior {
        match self {
            MovementState::Idle => &Idle,
            MovementState::Walk => &Walk,
            MovementState::Run => &Run,
            MovementState::Jump => &Jump,
            MovementState::Landing => &Landing,
        }
    }

    /// Jump and Landing own the body; planar movement is suspended.
    pub fn is_airborne_sequence(self) -> bool {
        matches!(self, MovementState::Jump | MovementState::Landing)
    }
}

impl fmt::Display for MovementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything a state hook may read or touch during one call.
pub struct StateContext<'a, 'h> {
    pub config: &'a LocomotionConfig,
    pub input: &'a LocomotionInput,
    pub jump: &'a mut Option<JumpTiming>,
    pub landing: &'a mut Option<LandingTiming>,
    pub animation: &'a mut AnimationDriver,
    pub host: &'a mut Host<'h>,
    /// Controller clock in seconds.
    pub now: f32,
}

impl StateContext<'_, '_> {
    fn has_movement_input(&self) -> bool {
        self.input.has_movement_input(self.config.input_deadzone)
    }
}

pub trait StateBehavior: Sync {
    /// Runs after the state becomes current. May redirect straight to another state.
    fn enter(&self, _ctx: &mut StateContext<'_, '_>) -> Option<MovementState> {
        None
    }

    /// Runs once per tick while current. Returns the state to switch to, if any.
    fn update(&self, _ctx: &mut StateContext<'_, '_>, _dt: f32) -> Option<MovementState> {
        None
    }

    fn exit(&self, _ctx: &mut StateContext<'_, '_>) {}
}

struct Idle;
struct Walk;
struct Run;
struct Jump;
struct Landing;

impl StateBehavior for Idle {
    fn enter(&self, ctx: &mut StateContext<'_, '_>) -> Option<MovementState> {
        ctx.host.set_target_speed(0.0);
        ctx.animation.play_state_clip(ctx.host, ctx.config.clips.idle.as_ref());
        None
    }

    fn update(&self, ctx: &mut StateContext<'_, '_>, _dt: f32) -> Option<MovementState> {
        if !ctx.has_movement_input() {
            None
        } else if ctx.input.is_sprinting() {
            Some(MovementState::Run)
        } else {
            Some(MovementState::Walk)
        }
    }
}

impl StateBehavior for Walk {
    fn enter(&self, ctx: &mut StateContext<'_, '_>) -> Option<MovementState> {
        ctx.host.set_target_speed(ctx.config.walk_speed);
        ctx.animation.play_state_clip(ctx.host, ctx.config.clips.walk.as_ref());
        None
    }

    fn update(&self, ctx: &mut StateContext<'_, '_>, _dt: f32) -> Option<MovementState> {
        if !ctx.has_movement_input() {
            Some(MovementState::Idle)
        } else if ctx.input.is_sprinting() {
            Some(MovementState::Run)
        } else {
            None
        }
    }
}

impl StateBehavior for Run {
    fn enter(&self, ctx: &mut StateContext<'_, '_>) -> Option<MovementState> {
        ctx.host.set_target_speed(ctx.config.run_speed);
        ctx.animation.play_state_clip(ctx.host, ctx.config.clips.run.as_ref());
        None
    }

    fn update(&self, ctx: &mut StateContext<'_, '_>, _dt: f32) -> Option<MovementState> {
        if !ctx.has_movement_input() {
            Some(MovementState::Idle)
        } else if !ctx.input.is_sprinting() {
            Some(MovementState::Walk)
        } else {
            None
        }
    }
}

impl StateBehavior for Jump {
    fn enter(&self, ctx: &mut StateContext<'_, '_>) -> Option<MovementState> {
        let mut timing = JumpTiming::begin(ctx.now);
        ctx.animation.play_state_clip(ctx.host, ctx.config.clips.jump_start.as_ref());

        match ctx.host.body.as_deref_mut() {
            Some(body) => {
                body.begin_airborne();
                let launch = body.vertical_velocity().max(ctx.config.jump_impulse);
                body.set_vertical_velocity(launch);
                timing.previous_vertical_velocity = launch;
            }
            None => debug!("jump without a movement body, skipping launch"),
        }

        *ctx.jump = Some(timing);
        None
    }

    fn update(&self, ctx: &mut StateContext<'_, '_>, _dt: f32) -> Option<MovementState> {
        let Some(body) = ctx.host.body.as_deref() else {
            return None;
        };
        let vertical_velocity = body.vertical_velocity();
        let airborne = body.is_airborne();
        let grounded = body.is_grounded();

        let timing = ctx.jump.get_or_insert_with(|| JumpTiming::begin(ctx.now));
        let apex = timing.observe(ctx.now, vertical_velocity, ctx.config.apex_timeout);
        if airborne {
            timing.is_falling = true;
        }
        let land = timing.is_falling && grounded;

        if apex {
            debug!("jump apex reached");
            ctx.animation.play_state_clip(ctx.host, ctx.config.clips.jump_fall.as_ref());
        }

        land.then_some(MovementState::Landing)
    }

    fn exit(&self, ctx: &mut StateContext<'_, '_>) {
        *ctx.jump = None;
    }
}

impl StateBehavior for Landing {
    fn enter(&self, ctx: &mut StateContext<'_, '_>) -> Option<MovementState> {
        ctx.host.set_target_speed(0.0);
        ctx.host.stop_animation();

        let Some(clip) = ctx.config.clips.landing.as_ref() else {
            return Some(MovementState::Idle);
        };

        let length = ctx
            .host
            .animator
            .as_deref()
            .and_then(|animator| animator.clip_length(clip))
            .unwrap_or(0.0);
        *ctx.landing = Some(LandingTiming::begin(ctx.now, length));
        ctx.animation.play_state_clip(ctx.host, Some(clip));
        None
    }

    fn update(&self, ctx: &mut StateContext<'_, '_>, _dt: f32) -> Option<MovementState> {
        let timing = ctx.landing.as_mut()?;
        if !timing.poll(ctx.now, ctx.config.landing_lead_time) {
            return None;
        }
        ctx.host.stop_animation();
        Some(MovementState::Idle)
    }

    fn exit(&self, ctx: &mut StateContext<'_, '_>) {
        *ctx.landing = None;
    }
}

/// Current and previous state, with transitions routed through the hooks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateMachine {
    current: MovementState,
    previous: MovementState,
}

impl StateMachine {
    pub fn current(&self) -> MovementState {
        self.current
    }

    pub fn previous(&self) -> MovementState {
        self.previous
    }

    /// Runs the current state's enter hook without a transition.
    pub fn start(&mut self, ctx: &mut StateContext<'_, '_>) {
        if let Some(next) = self.current.behavior().enter(ctx) {
            self.change_state(next, ctx);
        }
    }

    /// Exits the current state, swaps, and enters `next`. Switching to the
    /// current state does nothing.
    pub fn change_state(&mut self, next: MovementState, ctx: &mut StateContext<'_, '_>) {
        let mut next = next;
        while next != self.current {
            self.current.behavior().exit(ctx);
            debug!("movement state {} -> {}", self.current, next);
            self.previous = self.current;
            self.current = next;

            match next.behavior().enter(ctx) {
                Some(redirect) => next = redirect,
                None => break,
            }
        }
    }

    pub fn update(&mut self, ctx: &mut StateContext<'_, '_>, dt: f32) {
        if let Some(next) = self.current.behavior().update(ctx, dt) {
            self.change_state(next, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    struct Parts {
        config: LocomotionConfig,
        input: LocomotionInput,
        jump: Option<JumpTiming>,
        landing: Option<LandingTiming>,
        animation: AnimationDriver,
        now: f32,
    }

    impl Parts {
        fn new() -> Self {
            Self {
                config: LocomotionConfig::default(),
                input: LocomotionInput::default(),
                jump: None,
                landing: None,
                animation: AnimationDriver::default(),
                now: 0.0,
            }
        }

        fn run<R>(&mut self, f: impl FnOnce(&mut StateContext<'_, '_>) -> R) -> R {
            let mut host = Host::new();
            let mut ctx = StateContext {
                config: &self.config,
                input: &self.input,
                jump: &mut self.jump,
                landing: &mut self.landing,
                animation: &mut self.animation,
                host: &mut host,
                now: self.now,
            };
            f(&mut ctx)
        }
    }

    #[test]
    fn idle_picks_walk_or_run_from_sprint() {
        let mut parts = Parts::new();
        let mut machine = StateMachine::default();

        parts.input.set_move_input(Vec2::new(0.0, 1.0));
        parts.run(|ctx| machine.update(ctx, 0.016));
        assert_eq!(machine.current(), MovementState::Walk);

        parts.input.set_sprinting(true);
        parts.run(|ctx| machine.update(ctx, 0.016));
        assert_eq!(machine.current(), MovementState::Run);
        assert_eq!(machine.previous(), MovementState::Walk);
    }

    #[test]
    fn no_input_wins_over_sprint() {
        let mut parts = Parts::new();
        let mut machine = StateMachine::default();
        parts.run(|ctx| machine.change_state(MovementState::Run, ctx));

        parts.input.set_sprinting(true);
        parts.run(|ctx| machine.update(ctx, 0.016));
        assert_eq!(machine.current(), MovementState::Idle);
    }

    #[test]
    fn landing_without_clip_falls_through_to_idle() {
        let mut parts = Parts::new();
        let mut machine = StateMachine::default();
        parts.run(|ctx| machine.change_state(MovementState::Jump, ctx));
        assert!(parts.jump.is_some());

        parts.run(|ctx| machine.change_state(MovementState::Landing, ctx));
        assert_eq!(machine.current(), MovementState::Idle);
        assert_eq!(machine.previous(), MovementState::Landing);
        assert!(parts.jump.is_none());
        assert!(parts.landing.is_none());
    }

    #[test]
    fn changing_to_jump_while_jumping_keeps_timing() {
        let mut parts = Parts::new();
        let mut machine = StateMachine::default();
        parts.now = 2.0;
        parts.run(|ctx| machine.change_state(MovementState::Jump, ctx));
        if let Some(timing) = parts.jump.as_mut() {
            timing.apex_reached = true;
        }
        let before = parts.jump;

        parts.now = 2.5;
        parts.run(|ctx| machine.change_state(MovementState::Jump, ctx));
        assert_eq!(parts.jump, before);
        assert_eq!(parts.jump.map(|timing| timing.start_time), Some(2.0));
        assert_eq!(machine.previous(), MovementState::Idle);
    }

    #[test]
    fn jump_without_body_stays_put() {
        let mut parts = Parts::new();
        let mut machine = StateMachine::default();
        parts.run(|ctx| machine.change_state(MovementState::Jump, ctx));
        parts.run(|ctx| machine.update(ctx, 0.016));
        assert_eq!(machine.current(), MovementState::Jump);
    }
}
