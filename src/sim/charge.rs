//! Press-and-hold charge to jump power
//!
//! Power is a pure function of elapsed press time, so the live preview shown
//! while charging and the value released always agree.

/// Power for a press held `elapsed_ms`, clamped to [0, 1]
#[inline]
pub fn power_for(elapsed_ms: f64, max_press_ms: f64) -> f32 {
    (elapsed_ms.max(0.0) / max_press_ms).min(1.0) as f32
}

/// Tracks a single press from start to release
#[derive(Debug, Clone)]
pub struct ChargeController {
    max_press_ms: f64,
    /// Session clock at press start
    pressed_at: Option<f64>,
    max_reported: bool,
}

impl ChargeController {
    pub fn new(max_press_ms: f32) -> Self {
        Self {
            max_press_ms: max_press_ms as f64,
            pressed_at: None,
            max_reported: false,
        }
    }

    pub fn is_charging(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Start charging. A second press while already charging is ignored.
    pub fn press(&mut self, now_ms: f64) -> bool {
        if self.pressed_at.is_some() {
            return false;
        }
        self.pressed_at = Some(now_ms);
        self.max_reported = false;
        true
    }

    /// Live power of the press in progress
    pub fn power_at(&self, now_ms: f64) -> Option<f32> {
        self.pressed_at
            .map(|start| power_for(now_ms - start, self.max_press_ms))
    }

    /// End the press and return its power; `None` if nothing was pressed
    pub fn release(&mut self, now_ms: f64) -> Option<f32> {
        let power = self.power_at(now_ms)?;
        self.pressed_at = None;
        Some(power)
    }

    /// True exactly once per press, on the first sample at full power
    pub fn take_max_reached(&mut self, now_ms: f64) -> bool {
        match self.power_at(now_ms) {
            Some(power) if power >= 1.0 && !self.max_reported => {
                self.max_reported = true;
                true
            }
            _ => false,
        }
    }

    /// Drop any press in progress without producing power
    pub fn reset(&mut self) {
        self.pressed_at = None;
        self.max_reported = false;
    }
}
