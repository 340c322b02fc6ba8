//! [`EmergencyStop`] – synchronous operator interrupt.
//!
//! The process bootstrap (e.g. a Ctrl-C handler) calls
//! [`EmergencyStop::trigger`], which halts the drive base immediately from
//! the calling thread and latches a flag.  The drive controller checks the
//! flag at every segment boundary and aborts the mission with
//! [`NavError::EmergencyStopped`][wayfarer_types::NavError::EmergencyStopped].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;
use wayfarer_hal::DriveBase;

/// Cloneable emergency-stop handle bound to one drive base.
#[derive(Clone)]
pub struct EmergencyStop {
    halted: Arc<AtomicBool>,
    base: Arc<dyn DriveBase>,
}

impl EmergencyStop {
    pub fn new(base: Arc<dyn DriveBase>) -> Self {
        Self {
            halted: Arc::new(AtomicBool::new(false)),
            base,
        }
    }

    /// Halt the vehicle now and latch the stop flag.
    ///
    /// Safe to call from any thread, any number of times.  The drive base's
    /// `stop` is issued on every call.
    pub fn trigger(&self) {
        if !self.halted.swap(true, Ordering::SeqCst) {
            warn!(drive = self.base.id(), "EMERGENCY STOP triggered");
        }
        self.base.stop();
    }

    pub fn is_triggered(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for EmergencyStop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmergencyStop")
            .field("halted", &self.is_triggered())
            .field("drive", &self.base.id())
            .finish()
    }
}
