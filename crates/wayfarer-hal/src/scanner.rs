//! `RangeScanner` trait for a servo-mounted distance sensor.

use wayfarer_types::NavError;

/// A distance sensor that can be pointed at a given angle.
pub trait RangeScanner: Send {
    /// Stable identifier, e.g. `"ultrasonic_front"`.
    fn id(&self) -> &str;

    /// Point the sensor at `angle_degrees` (0 = straight ahead, positive =
    /// left, so a left-to-right sweep runs from high to low angles) and
    /// return the measured distance.
    ///
    /// Negative return values are "no reading" sentinels and are passed
    /// through untouched; the occupancy mapper clamps them.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::HardwareFault`] if the servo or sensor is
    /// unreachable.
    fn sample(&mut self, angle_degrees: i32) -> Result<i32, NavError>;
}
