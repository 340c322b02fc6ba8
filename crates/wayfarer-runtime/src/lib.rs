//! `wayfarer-runtime` – mission execution.
//!
//! Ties perception, planning, and actuation together into one run.
//!
//! # Modules
//!
//! - [`drive`] – [`DriveController`][drive::DriveController]: the grid-level
//!   motion state machine.  Follows a planned path one axis-aligned segment
//!   at a time, turning by quarter turns, pausing once per hazard episode,
//!   and aborting on an emergency stop.
//! - [`mission`] – [`Mission`][mission::Mission]: the orchestrator.  Sweeps
//!   the range sensor, rebuilds the wall set, plans with A*, and drives the
//!   route while a perception thread watches for hazards.  Produces a
//!   [`MissionReport`][wayfarer_types::MissionReport].
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   initialises the global `tracing` subscriber with an optional OTLP span
//!   exporter.  Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace export
//!   to Jaeger, Grafana Tempo, or any OTLP-compatible collector.
//!
//! # Emergency stop
//!
//! [`EmergencyStop`] is re-exported here so that a process bootstrap can
//! hold the handle returned by [`Mission::emergency_stop`] without an
//! additional explicit dependency on `wayfarer-kernel`.

pub mod drive;
pub mod mission;
pub mod telemetry;

pub use drive::{DriveController, DriveStats};
pub use mission::{Mission, MissionHardware, RoutePlan, plan_route, survey};
pub use telemetry::{TracerProviderGuard, init_tracing};

pub use wayfarer_kernel::EmergencyStop;
