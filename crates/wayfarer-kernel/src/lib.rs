//! `wayfarer-kernel` – Safety & Coordination
//!
//! The rules every other layer must obey.  It does not plan or drive; it
//! defines what may cross the task boundary and what counts as a legal move.
//!
//! # Modules
//!
//! - [`signal`] – [`SafetySignal`][signal::SafetySignal]: the two
//!   single-writer flags (hazard, drive complete) shared by the perception
//!   and drive tasks.  Nothing else crosses that boundary.
//! - [`estop`] – [`EmergencyStop`][estop::EmergencyStop]: synchronous
//!   operator interrupt that halts the drive base and latches.
//! - [`step`] – [`step_between`][step::step_between] and
//!   [`turn_between`][step::turn_between]: the axis-aligned move and
//!   quarter-turn contract, rejecting diagonal, zero-length, and reversing
//!   motion before any hardware is touched.

pub mod estop;
pub mod signal;
pub mod step;

pub use estop::EmergencyStop;
pub use signal::{DriveLink, HazardLink, SafetySignal};
pub use step::{Turn, step_between, turn_between, verify_path};
