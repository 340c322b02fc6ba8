//! [`SafetySignal`] – the only state shared between the perception task and
//! the drive task.
//!
//! Two independent flags, each with exactly one writer:
//!
//! | Flag | Writer | Reader |
//! |---|---|---|
//! | hazard | [`HazardLink`] (perception) | [`DriveLink`] (drive) |
//! | drive complete | [`DriveLink`] (drive) | [`HazardLink`] (perception) |
//!
//! The writer handles are not `Clone`, so the single-writer rule is enforced
//! by ownership.  Any number of read-only [`SafetySignal`] observers may be
//! cloned for supervisors and tests.
//!
//! The hazard flag is never cleared.  Instead of a plain boolean it stores a
//! monotonically increasing episode counter: each new detection episode bumps
//! it, so the drive side can honour every episode exactly once while
//! `hazard_detected` still reads as a sticky boolean.
//!
//! # Example
//!
//! ```
//! use wayfarer_kernel::signal::SafetySignal;
//!
//! let (observer, perception, drive) = SafetySignal::pair();
//! assert!(!drive.hazard_detected());
//!
//! perception.raise_hazard();
//! assert!(drive.hazard_detected());
//!
//! drive.mark_drive_complete();
//! assert!(perception.drive_complete());
//! assert!(observer.drive_complete());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::{debug, info};

#[derive(Debug, Default)]
struct Flags {
    hazard_episodes: AtomicU64,
    drive_complete: AtomicBool,
}

// ────────────────────────────────────────────────────────────────────────────
// Observer
// ────────────────────────────────────────────────────────────────────────────

/// Read-only view over both flags.
#[derive(Debug, Clone)]
pub struct SafetySignal {
    flags: Arc<Flags>,
}

impl SafetySignal {
    /// Create a fresh signal pair for one mission.
    ///
    /// Returns a read-only observer, the perception-side writer, and the
    /// drive-side writer.
    pub fn pair() -> (SafetySignal, HazardLink, DriveLink) {
        let flags = Arc::new(Flags::default());
        (
            SafetySignal {
                flags: flags.clone(),
            },
            HazardLink {
                flags: flags.clone(),
            },
            DriveLink { flags },
        )
    }

    pub fn hazard_detected(&self) -> bool {
        self.hazard_episode() > 0
    }

    /// Number of hazard episodes raised so far.
    pub fn hazard_episode(&self) -> u64 {
        self.flags.hazard_episodes.load(Ordering::Acquire)
    }

    pub fn drive_complete(&self) -> bool {
        self.flags.drive_complete.load(Ordering::Acquire)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Perception side
// ────────────────────────────────────────────────────────────────────────────

/// Perception-task handle: writes the hazard flag, reads drive completion.
#[derive(Debug)]
pub struct HazardLink {
    flags: Arc<Flags>,
}

impl HazardLink {
    /// Start a new hazard episode.  Returns the episode number (1-based).
    pub fn raise_hazard(&self) -> u64 {
        let episode = self.flags.hazard_episodes.fetch_add(1, Ordering::AcqRel) + 1;
        info!(episode, "hazard flag raised");
        episode
    }

    /// `true` once the drive task has finished its path.
    pub fn drive_complete(&self) -> bool {
        self.flags.drive_complete.load(Ordering::Acquire)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Drive side
// ────────────────────────────────────────────────────────────────────────────

/// Drive-task handle: reads the hazard flag, writes drive completion.
#[derive(Debug)]
pub struct DriveLink {
    flags: Arc<Flags>,
}

impl DriveLink {
    pub fn hazard_detected(&self) -> bool {
        self.hazard_episode() > 0
    }

    /// Number of hazard episodes raised so far.
    pub fn hazard_episode(&self) -> u64 {
        self.flags.hazard_episodes.load(Ordering::Acquire)
    }

    /// Signal that the drive task has finished.  Idempotent.
    pub fn mark_drive_complete(&self) {
        if !self.flags.drive_complete.swap(true, Ordering::AcqRel) {
            debug!("drive complete flag set");
        }
    }
}
