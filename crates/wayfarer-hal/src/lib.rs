//! `wayfarer-hal` – Hardware Abstraction Layer.
//!
//! The navigation core never talks to a GPIO pin, servo, or camera directly.
//! It talks to the traits in this crate, which real drivers and the
//! simulated stubs in [`sim`] both implement.
//!
//! # Modules
//!
//! - [`actuator`] – [`DriveBase`][actuator::DriveBase]: forward / turn /
//!   stop primitives for the locomotion hardware.
//! - [`scanner`] – [`RangeScanner`][scanner::RangeScanner]: a distance
//!   sensor that can be pointed at an angle.
//! - [`camera`] – [`Camera`][camera::Camera] and
//!   [`FrameClassifier`][camera::FrameClassifier] for hazard perception.
//! - [`guard`] – [`StopGuard`][guard::StopGuard]: stops the drive base on
//!   every exit path.
//! - [`timing`] – [`Sleeper`][timing::Sleeper]: injected physical timing.
//! - [`sim`] – recording stubs for tests and headless missions.

pub mod actuator;
pub mod camera;
pub mod guard;
pub mod scanner;
pub mod sim;
pub mod timing;

pub use actuator::DriveBase;
pub use camera::{Camera, CameraFrame, FrameClassifier};
pub use guard::StopGuard;
pub use scanner::RangeScanner;
pub use timing::{Sleeper, ThreadSleeper};
