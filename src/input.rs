use bevy::prelude::*;

/// Discrete input events delivered to the locomotion controller.
///
/// Hosts translate their raw devices into these; the controller never polls.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum LocomotionAction {
    /// The move stick or keys changed. Magnitudes above one are renormalized.
    Move(Vec2),
    /// The move input was released.
    MoveStopped,
    /// Look stick `input` held for `dt` seconds. Displacement devices such as
    /// a mouse pre-divide by `dt`, so every source turns at `input × rate × dt`.
    Look { input: Vec2, dt: f32 },
    SprintStarted,
    SprintStopped,
    Jump,
}

/// Latched input for the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocomotionInput {
    move_input: Vec2,
    sprinting: bool,
}

impl LocomotionInput {
    /// Stores a raw move vector, capping its magnitude at 1.0.
    ///
    /// Partial presses keep their magnitude so analog intensity survives.
    pub fn set_move_input(&mut self, raw: Vec2) {
        self.move_input = if !raw.is_finite() {
            Vec2::ZERO
        } else if raw.length() > 1.0 {
            raw.normalize_or_zero()
        } else {
            raw
        };
    }

    pub fn clear_move_input(&mut self) {
        self.move_input = Vec2::ZERO;
    }

    pub fn set_sprinting(&mut self, sprinting: bool) {
        self.sprinting = sprinting;
    }

    pub fn move_input(&self) -> Vec2 {
        self.move_input
    }

    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    /// True when either axis leaves the per-axis deadzone.
    pub fn has_movement_input(&self, deadzone: f32) -> bool {
        self.move_input.x.abs() > deadzone || self.move_input.y.abs() > deadzone
    }

    /// Planar move intensity, never below `min_intensity` while moving.
    pub fn intensity(&self, min_intensity: f32) -> f32 {
        self.move_input.length().clamp(min_intensity, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_input_is_renormalized() {
        let mut input = LocomotionInput::default();
        for raw in [Vec2::new(1.0, 1.0), Vec2::new(-3.0, 4.0), Vec2::new(0.0, 1.5)] {
            input.set_move_input(raw);
            let stored = input.move_input();
            assert!((stored.length() - 1.0).abs() < 1.0e-5);
            assert!((stored - raw.normalize()).length() < 1.0e-5);
        }
    }

    #[test]
    fn partial_input_passes_through_unscaled() {
        let mut input = LocomotionInput::default();
        for raw in [Vec2::new(0.3, 0.0), Vec2::new(0.3, 0.4), Vec2::ZERO] {
            input.set_move_input(raw);
            assert_eq!(input.move_input(), raw);
        }
    }

    #[test]
    fn non_finite_input_is_dropped() {
        let mut input = LocomotionInput::default();
        input.set_move_input(Vec2::new(f32::NAN, 0.5));
        assert_eq!(input.move_input(), Vec2::ZERO);
    }

    #[test]
    fn deadzone_is_per_axis() {
        let mut input = LocomotionInput::default();
        input.set_move_input(Vec2::new(0.05, 0.0));
        assert!(input.has_movement_input(0.01));

        input.set_move_input(Vec2::new(0.009, -0.009));
        assert!(!input.has_movement_input(0.01));

        input.clear_move_input();
        assert!(!input.has_movement_input(0.01));
    }

    #[test]
    fn intensity_is_clamped() {
        let mut input = LocomotionInput::default();
        input.set_move_input(Vec2::new(0.05, 0.0));
        assert_eq!(input.intensity(0.1), 0.1);
        input.set_move_input(Vec2::new(0.0, 0.5));
        assert_eq!(input.intensity(0.1), 0.5);
    }

    #[test]
    fn sprint_flag_is_latched() {
        let mut input = LocomotionInput::default();
        input.set_sprinting(true);
        input.set_move_input(Vec2::X);
        assert!(input.is_sprinting());
        input.set_sprinting(false);
        assert!(!input.is_sprinting());
        assert_eq!(input.move_input(), Vec2::X);
    }
}
