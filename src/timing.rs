/// Bookkeeping for one jump, alive while the Jump state is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpTiming {
    pub start_time: f32,
    pub apex_reached: bool,
    pub is_falling: bool,
    pub previous_vertical_velocity: f32,
}

impl JumpTiming {
    pub fn begin(now: f32) -> Self {
        Self {
            start_time: now,
            ..Self::default()
        }
    }

    /// Feeds this tick's vertical velocity. Returns true on the tick the apex is reached.
    ///
    /// The apex is the first positive-to-non-positive crossing. If none shows
    /// up within `timeout` seconds the apex is declared anyway.
    pub fn observe(&mut self, now: f32, vertical_velocity: f32, timeout: f32) -> bool {
        let mut reached = false;

        if !self.apex_reached && self.previous_vertical_velocity > 0.0 && vertical_velocity <= 0.0 {
            self.apex_reached = true;
            reached = true;
        }
        self.previous_vertical_velocity = vertical_velocity;

        if !self.apex_reached && now - self.start_time > timeout {
            self.apex_reached = true;
            reached = true;
        }

        reached
    }
}

/// Bookkeeping for one landing, alive while the Landing state is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LandingTiming {
    pub start_time: f32,
    pub animation_length: f32,
    pub completed: bool,
    pub active: bool,
}

impl LandingTiming {
    pub fn begin(now: f32, animation_length: f32) -> Self {
        Self {
            start_time: now,
            animation_length,
            completed: false,
            active: true,
        }
    }

    /// Returns true exactly once, when `lead` seconds remain in the clip.
    pub fn poll(&mut self, now: f32, lead: f32) -> bool {
        if self.completed || !self.active {
            return false;
        }
        if now - self.start_time >= self.animation_length - lead {
            self.completed = true;
            self.active = false;
            return true;
        }
        false
    }
}
