//! `wayfarer-perception` – turning sensor data into navigation input.
//!
//! # Modules
//!
//! - [`sweep`] – [`ScanSweep`][sweep::ScanSweep]: drives a
//!   [`RangeScanner`][wayfarer_hal::RangeScanner] across its angular range
//!   and returns ordered polar samples.
//! - [`occupancy`] – [`OccupancyMapper`][occupancy::OccupancyMapper]:
//!   projects polar samples into map-space obstacle points, and
//!   [`walls_from_points`][occupancy::walls_from_points] rescales them to
//!   grid cells.
//! - [`hazard`] – [`HazardMonitor`][hazard::HazardMonitor]: the perception
//!   task that watches the camera for the hazard label and raises the hazard
//!   flag.

pub mod hazard;
pub mod occupancy;
pub mod sweep;

pub use hazard::{HazardMonitor, MonitorStats};
pub use occupancy::{OccupancyMapper, walls_from_points};
pub use sweep::ScanSweep;
