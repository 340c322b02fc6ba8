//! In-process simulated drivers for CI/CD and hardware-free missions.
//!
//! Each stub implements one HAL trait, records what it was asked to do, and
//! returns plausible data.  Tests assert on the recorded history; the CLI's
//! simulation mode uses the same stubs to run a full mission headless.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wayfarer_hal::actuator::DriveBase;
//! use wayfarer_hal::sim::{DriveCommand, SimDriveBase};
//!
//! let base = Arc::new(SimDriveBase::new());
//! base.forward(8).expect("sim drive must succeed");
//! base.stop();
//! assert_eq!(base.commands().len(), 2);
//! assert!(matches!(base.commands()[0], DriveCommand::Forward { speed: 8 }));
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use wayfarer_types::{Detection, NavError};

use crate::actuator::DriveBase;
use crate::camera::{Camera, CameraFrame, FrameClassifier};
use crate::scanner::RangeScanner;
use crate::timing::Sleeper;

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ────────────────────────────────────────────────────────────────────────────
// Drive base
// ────────────────────────────────────────────────────────────────────────────

/// A command received by [`SimDriveBase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveCommand {
    Forward { speed: u8 },
    TurnLeft { speed: u8 },
    TurnRight { speed: u8 },
    Stop,
}

/// A simulated drive base that records every command in order.
#[derive(Debug, Default)]
pub struct SimDriveBase {
    log: Mutex<Vec<DriveCommand>>,
    jammed: AtomicBool,
}

impl SimDriveBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent motion command fail with a hardware fault.
    /// `stop` keeps working.
    pub fn jam(&self) {
        self.jammed.store(true, Ordering::SeqCst);
    }

    /// Every command received so far, oldest first.
    pub fn commands(&self) -> Vec<DriveCommand> {
        locked(&self.log).clone()
    }

    pub fn forward_count(&self) -> usize {
        self.count(|c| matches!(c, DriveCommand::Forward { .. }))
    }

    pub fn turn_count(&self) -> usize {
        self.count(|c| matches!(c, DriveCommand::TurnLeft { .. } | DriveCommand::TurnRight { .. }))
    }

    fn count(&self, pred: impl Fn(&DriveCommand) -> bool) -> usize {
        locked(&self.log).iter().filter(|c| pred(c)).count()
    }

    fn motion(&self, command: DriveCommand) -> Result<(), NavError> {
        if self.jammed.load(Ordering::SeqCst) {
            return Err(NavError::HardwareFault {
                component: self.id().to_string(),
                details: format!("motor jammed, rejected {command:?}"),
            });
        }
        locked(&self.log).push(command);
        Ok(())
    }
}

impl DriveBase for SimDriveBase {
    fn id(&self) -> &str {
        "sim_drive"
    }

    fn forward(&self, speed: u8) -> Result<(), NavError> {
        self.motion(DriveCommand::Forward { speed })
    }

    fn turn_left(&self, speed: u8) -> Result<(), NavError> {
        self.motion(DriveCommand::TurnLeft { speed })
    }

    fn turn_right(&self, speed: u8) -> Result<(), NavError> {
        self.motion(DriveCommand::TurnRight { speed })
    }

    fn stop(&self) {
        locked(&self.log).push(DriveCommand::Stop);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Range scanner
// ────────────────────────────────────────────────────────────────────────────

/// A simulated range sensor backed by a table of commanded angle → distance.
/// Angles without an entry return the `-1` "no reading" sentinel.
#[derive(Debug, Default)]
pub struct SimRangeScanner {
    readings: HashMap<i32, i32>,
    requested: Vec<i32>,
}

impl SimRangeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `distance` whenever the sensor is pointed at `angle`.
    pub fn with_reading(mut self, angle: i32, distance: i32) -> Self {
        self.readings.insert(angle, distance);
        self
    }

    /// Angles the sensor was pointed at, in request order.
    pub fn requested_angles(&self) -> &[i32] {
        &self.requested
    }
}

impl RangeScanner for SimRangeScanner {
    fn id(&self) -> &str {
        "sim_range"
    }

    fn sample(&mut self, angle_degrees: i32) -> Result<i32, NavError> {
        self.requested.push(angle_degrees);
        Ok(self.readings.get(&angle_degrees).copied().unwrap_or(-1))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Camera and classifier
// ────────────────────────────────────────────────────────────────────────────

/// A simulated camera that returns a blank (all-zero) 4×4 greyscale frame.
/// Optionally fails after a fixed number of captures.
#[derive(Debug)]
pub struct SimCamera {
    id: String,
    captured: u32,
    fail_after: Option<u32>,
}

impl SimCamera {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            captured: 0,
            fail_after: None,
        }
    }

    /// Fail every capture after the first `frames` succeed.
    pub fn failing_after(mut self, frames: u32) -> Self {
        self.fail_after = Some(frames);
        self
    }

    pub fn frames_captured(&self) -> u32 {
        self.captured
    }
}

impl Camera for SimCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn capture(&mut self) -> Result<CameraFrame, NavError> {
        if self.fail_after.is_some_and(|n| self.captured >= n) {
            return Err(NavError::HardwareFault {
                component: self.id.clone(),
                details: "frame buffer unavailable".to_string(),
            });
        }
        self.captured += 1;
        Ok(CameraFrame {
            width: 4,
            height: 4,
            data: vec![0u8; 16],
        })
    }
}

/// A scripted classifier: reports `label` on the listed classification
/// calls (1-based) and nothing otherwise.
#[derive(Debug)]
pub struct SimClassifier {
    label: String,
    hits: BTreeSet<u32>,
    calls: u32,
}

impl SimClassifier {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            hits: BTreeSet::new(),
            calls: 0,
        }
    }

    /// Report the label on classification call number `call`.
    pub fn with_hit_on(mut self, call: u32) -> Self {
        self.hits.insert(call);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }
}

impl FrameClassifier for SimClassifier {
    fn classify(&mut self, _frame: &CameraFrame) -> Result<Vec<Detection>, NavError> {
        self.calls += 1;
        if self.hits.contains(&self.calls) {
            Ok(vec![Detection {
                label: self.label.clone(),
                score: 0.87,
            }])
        } else {
            Ok(Vec::new())
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sleeper
// ────────────────────────────────────────────────────────────────────────────

/// A [`Sleeper`] that records requested durations without blocking.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
    calls: AtomicU32,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        locked(&self.waits).clone()
    }

    /// Number of waits exactly equal to `duration`.
    pub fn count_of(&self, duration: Duration) -> usize {
        locked(&self.waits).iter().filter(|&&d| d == duration).count()
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        locked(&self.waits).push(duration);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
