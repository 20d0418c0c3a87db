use bevy::math::Vec2;

use crate::{Host, NEARLY_ZERO_SQUARED, interp_yaw, yaw_of};

/// Next yaw when turning from `current_yaw` toward `direction`.
///
/// Returns `None` for a zero direction, leaving the last facing in place.
pub fn facing_step(current_yaw: f32, direction: Vec2, dt: f32, rate: f32) -> Option<f32> {
    if direction.length_squared() <= NEARLY_ZERO_SQUARED {
        return None;
    }
    Some(interp_yaw(current_yaw, yaw_of(direction), dt, rate))
}

/// Turns the body toward `direction`. Only yaw is written.
pub fn update_facing(host: &mut Host<'_>, direction: Vec2, dt: f32, rate: f32) {
    let Some(body) = host.body.as_deref_mut() else {
        return;
    };
    if let Some(yaw) = facing_step(body.yaw(), direction, dt, rate) {
        body.set_yaw(yaw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_direction_keeps_facing() {
        assert_eq!(facing_step(42.0, Vec2::ZERO, 0.016, 13.0), None);
    }

    #[test]
    fn turn_is_gradual_not_a_snap() {
        let dt = 1.0 / 60.0;
        let yaw = facing_step(0.0, Vec2::Y, dt, 13.0).unwrap();
        assert!(yaw > 0.0 && yaw < 90.0);

        // Repeated steps close in on the target.
        let mut yaw = 0.0;
        for _ in 0..240 {
            yaw = facing_step(yaw, Vec2::Y, dt, 13.0).unwrap();
        }
        assert!((yaw - 90.0).abs() < 0.01);
    }

    #[test]
    fn turn_takes_the_short_way_round() {
        let yaw = facing_step(10.0, Vec2::new(1.0, -0.2), 0.05, 13.0).unwrap();
        assert!(yaw < 10.0 || yaw > 300.0);
    }
}
