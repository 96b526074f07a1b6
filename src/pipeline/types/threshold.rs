use std::fmt;

use crate::error::AppError;

const STEPS_PER_UNIT: f64 = 20.0;

pub const THRESHOLD_STEP: f64 = 1.0 / STEPS_PER_UNIT;

/// Minimum similarity a candidate needs to be shown. Always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    pub const MIN: Threshold = Threshold(0.0);
    pub const MAX: Threshold = Threshold(1.0);

    pub fn new(value: f64) -> Result<Self, AppError> {
        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return Err(AppError::InvalidThreshold(value));
        }
        Ok(Self(value))
    }

    /// Clamps into [0, 1]; NaN becomes 0.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn step_up(&self) -> Self {
        self.offset_steps(1.0)
    }

    pub fn step_down(&self) -> Self {
        self.offset_steps(-1.0)
    }

    // Steps are counted on the 0.05 grid so repeated steps never drift.
    fn offset_steps(&self, steps: f64) -> Self {
        let grid = (self.0 * STEPS_PER_UNIT).round() + steps;
        Self::clamped(grid / STEPS_PER_UNIT)
    }

    pub fn label(&self) -> &'static str {
        if self.0 < 0.3 {
            "Loose"
        } else if self.0 < 0.7 {
            "Good"
        } else {
            "Precise"
        }
    }

    pub fn admits(&self, similarity: f64) -> bool {
        similarity >= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(0.5)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ({})", self.0, self.label())
    }
}
