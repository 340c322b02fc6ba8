//! Physical timing for motion primitives.
//!
//! Every blocking wait the drive task performs (driving a segment, turning,
//! hazard cooldown) goes through a [`Sleeper`] so that simulations and tests
//! can record the waits instead of spending wall-clock time on them.

use std::time::Duration;

/// Blocks the calling task for a physical duration.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Real-time sleeper backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn thread_sleeper_blocks_for_duration() {
        let started = Instant::now();
        ThreadSleeper.sleep(Duration::from_millis(15));
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn zero_duration_returns_immediately() {
        let started = Instant::now();
        ThreadSleeper.sleep(Duration::ZERO);
        assert!(started.elapsed() < Duration::from_millis(50));
    }
}
