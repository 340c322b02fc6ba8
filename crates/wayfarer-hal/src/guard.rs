//! [`StopGuard`] – scoped stop-on-exit around a [`DriveBase`].
//!
//! Hold a guard for as long as the vehicle may be moving.  Whatever way the
//! scope is left (normal return, `?` propagation, or a panic unwinding
//! through it) the guard issues a final `stop()`.

use std::sync::Arc;

use tracing::debug;

use crate::actuator::DriveBase;

/// Issues [`DriveBase::stop`] when dropped.
pub struct StopGuard {
    base: Arc<dyn DriveBase>,
}

impl StopGuard {
    pub fn new(base: Arc<dyn DriveBase>) -> Self {
        Self { base }
    }

    /// The guarded drive base.
    pub fn base(&self) -> &Arc<dyn DriveBase> {
        &self.base
    }
}

impl Drop for StopGuard {
    fn drop(&mut self) {
        debug!(drive = self.base.id(), "stop guard released; halting drive base");
        self.base.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{DriveCommand, SimDriveBase};

    #[test]
    fn dropping_guard_stops_the_base() {
        let sim = Arc::new(SimDriveBase::new());
        {
            let guard = StopGuard::new(sim.clone());
            guard.base().forward(8).unwrap();
        }
        assert_eq!(
            sim.commands(),
            vec![DriveCommand::Forward { speed: 8 }, DriveCommand::Stop]
        );
    }

    #[test]
    fn guard_stops_on_early_return() {
        fn drive_then_fail(base: Arc<dyn DriveBase>) -> Result<(), String> {
            let _guard = StopGuard::new(base.clone());
            base.forward(5).map_err(|e| e.to_string())?;
            Err("sensor lost".to_string())
        }

        let sim = Arc::new(SimDriveBase::new());
        assert!(drive_then_fail(sim.clone()).is_err());
        assert_eq!(sim.commands().last(), Some(&DriveCommand::Stop));
    }

    #[test]
    fn guard_stops_during_panic_unwind() {
        let sim = Arc::new(SimDriveBase::new());
        let inner = sim.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = StopGuard::new(inner.clone());
            inner.turn_left(30).unwrap();
            panic!("actuation thread crashed");
        });
        assert!(result.is_err());
        assert_eq!(sim.commands().last(), Some(&DriveCommand::Stop));
    }
}
