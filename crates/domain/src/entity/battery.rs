//! Battery level interpretation for battery sensors.

use crate::entity::EntityReading;

/// Batteries below this percentage are flagged low.
pub const LOW_BATTERY_PERCENT: f64 = 20.0;

/// A battery sensor's reading as a percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryLevel {
    percent: f64,
}

impl BatteryLevel {
    /// Interpret a battery reading. `None` when the reading failed or is not numeric.
    ///
    /// Out-of-range values are clamped to `0..=100`.
    #[must_use]
    pub fn from_reading(reading: &EntityReading) -> Option<Self> {
        reading.numeric().map(|percent| Self {
            percent: percent.clamp(0.0, 100.0),
        })
    }

    #[must_use]
    pub fn percent(self) -> f64 {
        self.percent
    }

    /// Level as a `0.0..=1.0` fraction (progress-bar value).
    #[must_use]
    pub fn fraction(self) -> f64 {
        self.percent / 100.0
    }

    #[must_use]
    pub fn is_low(self) -> bool {
        self.percent < LOW_BATTERY_PERCENT
    }
}
