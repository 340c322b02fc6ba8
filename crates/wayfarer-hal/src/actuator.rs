//! `DriveBase` trait for the vehicle's locomotion hardware.
//!
//! The navigation core only ever issues four fire-and-forget primitives:
//! drive forward, turn left in place, turn right in place, and stop.  Timing
//! is owned by the caller, which sleeps between a motion command and the
//! following `stop`.  Drivers can be swapped without touching planning logic.

use wayfarer_types::NavError;

/// Locomotion hardware for a skid-steer ground vehicle.
///
/// Methods take `&self` so a single driver can be shared between the drive
/// task and the emergency-stop path; implementations use interior
/// mutability for any state they keep.
pub trait DriveBase: Send + Sync {
    /// Stable identifier for this driver, e.g. `"picar"` or `"sim_drive"`.
    fn id(&self) -> &str;

    /// Start driving forward at `speed` (driver-specific units).
    ///
    /// # Errors
    ///
    /// Returns [`NavError::HardwareFault`] if the command cannot be applied.
    fn forward(&self, speed: u8) -> Result<(), NavError>;

    /// Start rotating counter-clockwise in place at `speed`.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::HardwareFault`] if the command cannot be applied.
    fn turn_left(&self, speed: u8) -> Result<(), NavError>;

    /// Start rotating clockwise in place at `speed`.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::HardwareFault`] if the command cannot be applied.
    fn turn_right(&self, speed: u8) -> Result<(), NavError>;

    /// Halt all motion.
    ///
    /// Must be callable at any time, from any thread, including during
    /// teardown after a fault.  Drivers log failures instead of returning
    /// them.
    fn stop(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Minimal in-process drive base used only for tests.
    struct MockDriveBase {
        moving: Mutex<bool>,
    }

    impl DriveBase for MockDriveBase {
        fn id(&self) -> &str {
            "mock_drive"
        }

        fn forward(&self, _speed: u8) -> Result<(), NavError> {
            *self.moving.lock().unwrap() = true;
            Ok(())
        }

        fn turn_left(&self, _speed: u8) -> Result<(), NavError> {
            *self.moving.lock().unwrap() = true;
            Ok(())
        }

        fn turn_right(&self, _speed: u8) -> Result<(), NavError> {
            *self.moving.lock().unwrap() = true;
            Ok(())
        }

        fn stop(&self) {
            *self.moving.lock().unwrap() = false;
        }
    }

    #[test]
    fn mock_drive_base_forward_then_stop() {
        let base = MockDriveBase {
            moving: Mutex::new(false),
        };
        assert_eq!(base.id(), "mock_drive");

        base.forward(8).unwrap();
        assert!(*base.moving.lock().unwrap());

        base.stop();
        assert!(!*base.moving.lock().unwrap());
    }

    #[test]
    fn drive_base_is_object_safe() {
        let base: std::sync::Arc<dyn DriveBase> = std::sync::Arc::new(MockDriveBase {
            moving: Mutex::new(false),
        });
        base.turn_right(30).unwrap();
        // Repeated stops must be harmless.
        base.stop();
        base.stop();
        assert_eq!(base.id(), "mock_drive");
    }
}
