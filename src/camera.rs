use bevy::math::Vec2;

use crate::{CameraSource, LocomotionConfig, wrap_degrees};

/// Camera yaw sampled once per tick, the reference frame for movement.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraFrame {
    yaw: f32,
}

impl CameraFrame {
    /// Samples the camera. Without one, the previous yaw is kept.
    pub fn refresh(&mut self, camera: Option<&dyn CameraSource>) -> bool {
        match camera {
            Some(camera) => {
                self.yaw = wrap_degrees(camera.current_yaw());
                true
            }
            None => false,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }
}

/// Orbit yaw/pitch driven by look input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LookRig {
    pub yaw: f32,
    pub pitch: f32,
}

impl LookRig {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw: wrap_degrees(yaw),
            pitch,
        }
    }

    /// Applies one frame of look input, scaled by the configured turn rates.
    pub fn apply_look(&mut self, look: Vec2, dt: f32, config: &LocomotionConfig) {
        self.yaw = wrap_degrees(self.yaw + look.x * config.base_turn_rate * dt);
        self.pitch = (self.pitch + look.y * config.base_look_up_rate * dt)
            .clamp(-config.pitch_limit, config.pitch_limit);
    }
}

impl CameraSource for LookRig {
    fn current_yaw(&self) -> f32 {
        self.yaw
    }
}
