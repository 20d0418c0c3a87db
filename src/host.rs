//! Capabilities the controller borrows from its host engine.
//!
//! The controller owns none of these. Each tick the host hands over whatever
//! it currently has in a [`Host`]; any slot may be empty and the controller
//! degrades instead of failing.

use bevy::math::Vec2;

use crate::ClipId;

/// The active view camera.
pub trait CameraSource {
    /// Current camera yaw in degrees.
    fn current_yaw(&self) -> f32;
}

/// The character's movement body, driven by the host's physics.
pub trait MovementBody {
    fn set_target_speed(&mut self, speed: f32);
    fn set_vertical_velocity(&mut self, velocity: f32);
    fn vertical_velocity(&self) -> f32;
    fn is_grounded(&self) -> bool;
    fn is_airborne(&self) -> bool;
    /// Switch the body into its airborne movement mode.
    fn begin_airborne(&mut self);
    /// Request planar motion along `direction` at `intensity` in `[0, 1]` of the target speed.
    fn apply_planar_move(&mut self, direction: Vec2, intensity: f32);
    fn set_yaw(&mut self, yaw: f32);
    fn yaw(&self) -> f32;
}

/// Plays animation clips on the character.
pub trait ClipPlayer {
    fn play(&mut self, clip: &ClipId, looping: bool, rate: f32);
    fn stop(&mut self);
    /// Length of `clip` in seconds, if the host knows it.
    fn clip_length(&self, clip: &ClipId) -> Option<f32>;
}

/// Borrowed host capabilities for a single tick.
#[derive(Default)]
pub struct Host<'h> {
    pub camera: Option<&'h dyn CameraSource>,
    pub body: Option<&'h mut dyn MovementBody>,
    pub animator: Option<&'h mut dyn ClipPlayer>,
}

impl<'h> Host<'h> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_camera(mut self, camera: &'h dyn CameraSource) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_body(mut self, body: &'h mut dyn MovementBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_animator(mut self, animator: &'h mut dyn ClipPlayer) -> Self {
        self.animator = Some(animator);
        self
    }

    /// False when no body is bound yet.
    pub fn is_grounded(&self) -> bool {
        self.body.as_deref().is_some_and(|body| body.is_grounded())
    }

    pub fn is_airborne(&self) -> bool {
        self.body.as_deref().is_some_and(|body| body.is_airborne())
    }

    /// Sets the body's target speed, skipped when no body is bound.
    pub fn set_target_speed(&mut self, speed: f32) {
        if let Some(body) = self.body.as_deref_mut() {
            body.set_target_speed(speed);
        }
    }

    /// Stops whatever clip the animator is playing.
    pub fn stop_animation(&mut self) {
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.stop();
        }
    }
}
