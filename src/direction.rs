//! Camera-relative movement direction.
//!
//! Input is mapped to the ground plane in one of two ways. The instantaneous
//! mapping follows the live camera yaw every tick. The continuous mapping
//! locks the camera yaw when movement starts from rest and eases the movement
//! angle toward each new input angle, so a stick swing curves the path
//! instead of snapping it.

use bevy::math::Vec2;

use crate::{
    LocomotionConfig, NEARLY_ZERO_SQUARED, direction_from_yaw, shortest_angle_path, wrap_degrees,
};

/// World yaw an input vector points along when `reference_yaw` is forward.
///
/// The lateral axis is inverted so that screen-left steers left of the camera.
pub fn input_world_angle(input: Vec2, reference_yaw: f32) -> f32 {
    let inverted = Vec2::new(-input.x, input.y);
    let input_angle = wrap_degrees(inverted.y.atan2(inverted.x).to_degrees());
    wrap_degrees(input_angle + reference_yaw - 90.0)
}

/// Instantaneous camera-relative direction, scaled by the input magnitude.
pub fn camera_relative_direction(camera_yaw: f32, input: Vec2) -> Vec2 {
    if input.length_squared() <= NEARLY_ZERO_SQUARED {
        return Vec2::ZERO;
    }
    direction_from_yaw(input_world_angle(input, camera_yaw)) * input.length()
}

/// Smoothed movement angle for continuous mode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContinuousAngle {
    pub locked_camera_yaw: f32,
    pub current: f32,
    pub target: f32,
    pub transitioning: bool,
}

impl ContinuousAngle {
    /// Locks `camera_yaw` and restarts from it with no transition running.
    pub fn lock(&mut self, camera_yaw: f32) {
        let yaw = wrap_degrees(camera_yaw);
        self.locked_camera_yaw = yaw;
        self.current = yaw;
        self.target = yaw;
        self.transitioning = false;
    }

    /// Points both angles at `yaw` without touching the lock.
    pub fn seed(&mut self, yaw: f32) {
        self.current = wrap_degrees(yaw);
        self.target = self.current;
    }

    /// Advances `current` toward the angle `input` asks for.
    ///
    /// The step scales with the remaining arc, so it catches up fast from far
    /// away and settles gently. Once inside the settle threshold it snaps.
    pub fn step(&mut self, input: Vec2, config: &LocomotionConfig, dt: f32) {
        if input.length_squared() <= NEARLY_ZERO_SQUARED {
            self.target = self.current;
            self.transitioning = false;
            return;
        }
        self.target = input_world_angle(input, self.locked_camera_yaw);
        let delta = shortest_angle_path(self.current, self.target);

        if delta.abs() <= config.angle_snap_threshold {
            self.current = self.target;
            self.transitioning = false;
            return;
        }

        self.transitioning = true;
        let rate = config.continuous_rotation_speed * (delta.abs() / 180.0) * config.angle_catch_up_gain;
        self.current = wrap_degrees(self.current + delta * rate * dt);

        if shortest_angle_path(self.current, self.target).abs() < config.angle_settle_threshold {
            self.current = self.target;
            self.transitioning = false;
        }
    }
}

/// Chooses between the instantaneous and continuous mappings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DirectionResolver {
    angle: ContinuousAngle,
    continuous: bool,
}

impl DirectionResolver {
    /// Engages continuous mode, locking `camera_yaw`.
    ///
    /// Fails when already engaged or when no camera is bound.
    pub fn activate(&mut self, camera_yaw: f32, camera_bound: bool) -> bool {
        if self.continuous || !camera_bound {
            return false;
        }
        self.angle.lock(camera_yaw);
        self.continuous = true;
        true
    }

    /// Leaves continuous mode. The angles are kept.
    pub fn deactivate(&mut self) {
        if self.continuous {
            self.continuous = false;
            self.angle.transitioning = false;
        }
    }

    pub fn cancel_transition(&mut self) {
        self.angle.transitioning = false;
    }

    pub fn seed(&mut self, yaw: f32) {
        self.angle.seed(yaw);
    }

    /// Runs one smoothing step. Only continuous mode has state to advance.
    pub fn update(&mut self, input: Vec2, config: &LocomotionConfig, dt: f32) {
        if self.continuous {
            self.angle.step(input, config, dt);
        }
    }

    /// Planar movement direction for this tick, zero without input.
    pub fn direction(&self, camera_yaw: f32, input: Vec2, has_input: bool) -> Vec2 {
        if !has_input {
            Vec2::ZERO
        } else if self.continuous {
            direction_from_yaw(self.angle.current)
        } else {
            camera_relative_direction(camera_yaw, input)
        }
    }

    /// World angle the body is moving along: the smoothed angle in
    /// continuous mode, otherwise the live camera-relative input angle.
    pub fn resolved_angle(&self, camera_yaw: f32, input: Vec2) -> f32 {
        if self.continuous {
            self.angle.current
        } else {
            input_world_angle(input, camera_yaw)
        }
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn angle(&self) -> &ContinuousAngle {
        &self.angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1.0e-4;

    #[test]
    fn forward_input_follows_camera_forward() {
        let dir = camera_relative_direction(90.0, Vec2::new(0.0, 1.0));
        let forward = direction_from_yaw(90.0);
        assert!((dir - forward).length() < EPS);
    }

    #[test]
    fn lateral_axis_is_inverted() {
        // Right on the stick turns a quarter circle positive from camera forward.
        assert!((input_world_angle(Vec2::new(1.0, 0.0), 0.0) - 90.0).abs() < EPS);
        assert!((input_world_angle(Vec2::new(-1.0, 0.0), 0.0) - 270.0).abs() < EPS);
        assert!((input_world_angle(Vec2::new(0.0, -1.0), 0.0) - 180.0).abs() < EPS);
    }

    #[test]
    fn direction_keeps_partial_magnitude() {
        let dir = camera_relative_direction(0.0, Vec2::new(0.0, 0.5));
        assert!((dir.length() - 0.5).abs() < EPS);
        assert_eq!(camera_relative_direction(0.0, Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn small_change_snaps_without_transition() {
        let config = LocomotionConfig::default();
        let mut angle = ContinuousAngle::default();
        angle.lock(90.0);
        angle.step(Vec2::new(0.0, 1.0), &config, 1.0 / 60.0);
        assert_eq!(angle.current, 90.0);
        assert!(!angle.transitioning);
    }

    #[test]
    fn no_input_holds_current_angle() {
        let config = LocomotionConfig::default();
        let mut angle = ContinuousAngle::default();
        angle.lock(0.0);
        angle.step(Vec2::X, &config, 1.0 / 60.0);
        let current = angle.current;

        angle.step(Vec2::ZERO, &config, 1.0 / 60.0);
        assert_eq!(angle.current, current);
        assert_eq!(angle.target, current);
        assert!(!angle.transitioning);
    }

    #[test]
    fn continuous_angle_converges_monotonically() {
        let config = LocomotionConfig::default();
        let mut angle = ContinuousAngle::default();
        angle.lock(0.0);

        // Pull the stick backward: the target sits half a turn away.
        let input = Vec2::new(0.3, -1.0).normalize();
        let dt = 1.0 / 60.0;
        let mut remaining = f32::MAX;

        for _ in 0..100_000 {
            angle.step(input, &config, dt);
            let now = shortest_angle_path(angle.current, angle.target).abs();
            if !angle.transitioning {
                assert_eq!(angle.current, angle.target);
                return;
            }
            assert!(now < remaining, "distance grew from {remaining} to {now}");
            assert!(now >= config.angle_settle_threshold);
            remaining = now;
        }
        panic!("angle never settled");
    }

    #[test]
    fn resolver_activates_once_and_needs_a_camera() {
        let mut resolver = DirectionResolver::default();
        assert!(!resolver.activate(30.0, false));
        assert!(resolver.activate(30.0, true));
        assert!(!resolver.activate(60.0, true));
        assert_eq!(resolver.angle().locked_camera_yaw, 30.0);

        resolver.deactivate();
        assert!(!resolver.is_continuous());
        assert_eq!(resolver.angle().current, 30.0);
    }

    #[test]
    fn continuous_direction_ignores_live_camera() {
        let config = LocomotionConfig::default();
        let mut resolver = DirectionResolver::default();
        resolver.activate(90.0, true);
        resolver.update(Vec2::Y, &config, 1.0 / 60.0);

        let dir = resolver.direction(180.0, Vec2::Y, true);
        assert!((dir - Vec2::Y).length() < EPS);
        assert_eq!(resolver.direction(180.0, Vec2::Y, false), Vec2::ZERO);
    }

    #[test]
    fn resolved_angle_tracks_the_mapping_in_use() {
        let config = LocomotionConfig::default();
        let mut resolver = DirectionResolver::default();
        resolver.seed(0.0);
        assert!((resolver.resolved_angle(120.0, Vec2::Y) - 120.0).abs() < EPS);

        resolver.activate(90.0, true);
        resolver.update(Vec2::Y, &config, 1.0 / 60.0);
        assert_eq!(resolver.resolved_angle(200.0, Vec2::Y), 90.0);
    }
}
