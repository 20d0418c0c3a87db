//! Degree-based angle helpers.
//!
//! Every yaw in this crate is measured in degrees on the planar `(x, y)` ground
//! plane, counter-clockwise from `+x`, and canonicalized to `[0, 360)`. Signed
//! deltas live in `[-180, 180]`.

use bevy::math::Vec2;

/// Below this squared length a planar vector counts as "no direction".
pub const NEARLY_ZERO_SQUARED: f32 = 1.0e-8;

/// Wraps any angle into `[0, 360)`.
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed delta that rotates `current` onto `target` along the shorter arc.
///
/// The result is always in `[-180, 180]` and `current + result` is congruent
/// to `target` modulo 360, whatever ranges the inputs come from.
pub fn shortest_angle_path(current: f32, target: f32) -> f32 {
    let difference = (target - current).rem_euclid(360.0);
    if difference > 180.0 {
        difference - 360.0
    } else {
        difference
    }
}

/// Yaw of a planar direction, in `[0, 360)`.
pub fn yaw_of(direction: Vec2) -> f32 {
    wrap_degrees(direction.y.atan2(direction.x).to_degrees())
}

/// Unit planar vector pointing along `yaw`.
pub fn direction_from_yaw(yaw: f32) -> Vec2 {
    let (sin, cos) = yaw.to_radians().sin_cos();
    Vec2::new(cos, sin)
}

/// Moves `current` toward `target` by a fraction of the remaining arc.
///
/// The fraction is `dt * speed`, clamped to `[0, 1]`, so large frame times
/// land exactly on the target instead of overshooting. A non-positive speed
/// snaps straight to the target.
pub fn interp_yaw(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return wrap_degrees(target);
    }

    let delta = shortest_angle_path(current, target);
    if delta.abs() < 1.0e-4 {
        return wrap_degrees(target);
    }

    let alpha = (dt * speed).clamp(0.0, 1.0);
    wrap_degrees(current + delta * alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1.0e-4;

    fn congruent(a: f32, b: f32) -> bool {
        let d = (a - b).rem_euclid(360.0);
        d < EPS || (360.0 - d) < EPS
    }

    #[test]
    fn wrap_degrees_stays_in_range() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert!((wrap_degrees(-90.0) - 270.0).abs() < EPS);
        assert!((wrap_degrees(725.0) - 5.0).abs() < EPS);
        assert!(wrap_degrees(-1.0e-7) < 360.0);
    }

    #[test]
    fn shortest_path_takes_the_short_arc() {
        assert!((shortest_angle_path(350.0, 10.0) - 20.0).abs() < EPS);
        assert!((shortest_angle_path(10.0, 350.0) + 20.0).abs() < EPS);
        assert!((shortest_angle_path(90.0, 0.0) + 90.0).abs() < EPS);
        assert_eq!(shortest_angle_path(45.0, 45.0), 0.0);
    }

    #[test]
    fn shortest_path_is_bounded_and_congruent() {
        let samples = [-720.0, -359.5, -180.0, -1.0, 0.0, 0.4, 179.9, 180.0, 181.0, 359.9, 540.0];
        for &a in &samples {
            for &b in &samples {
                let d = shortest_angle_path(a, b);
                assert!((-180.0..=180.0).contains(&d), "{a} -> {b} gave {d}");
                assert!(congruent(a + d, b), "{a} + {d} is not {b}");
            }
        }
    }

    #[test]
    fn yaw_and_direction_agree() {
        assert!((yaw_of(Vec2::Y) - 90.0).abs() < EPS);
        assert!((yaw_of(Vec2::NEG_X) - 180.0).abs() < EPS);
        assert!((yaw_of(Vec2::NEG_Y) - 270.0).abs() < EPS);

        let dir = direction_from_yaw(90.0);
        assert!(dir.x.abs() < EPS && (dir.y - 1.0).abs() < EPS);
    }

    #[test]
    fn interp_yaw_moves_partway_along_short_arc() {
        let next = interp_yaw(350.0, 30.0, 0.1, 5.0);
        assert!((next - 10.0).abs() < EPS);
    }

    #[test]
    fn interp_yaw_clamps_large_steps_to_target() {
        assert!((interp_yaw(0.0, 120.0, 1.0, 13.0) - 120.0).abs() < EPS);
        assert!((interp_yaw(0.0, 120.0, 0.016, 0.0) - 120.0).abs() < EPS);
    }
}
