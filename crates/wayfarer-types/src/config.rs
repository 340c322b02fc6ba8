//! Mission parameters, fixed at process start.
//!
//! All fields carry serde defaults so a partial `config.toml` is valid.  The
//! defaults describe the reference vehicle: an 11×11 grid of 10-unit cells,
//! a ±90° ultrasonic sweep in 5° steps, and a stop-sign hazard label.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{GridCell, Heading, NavError};

/// Order in which the range sensor is swept.  Samples are always reported
/// left to right regardless of the physical sweep order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SweepDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// Range-sensor sweep geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub min_angle: i32,
    pub max_angle: i32,
    pub step_angle: i32,
    /// Added to every commanded angle to cancel the servo's mounting error.
    pub servo_offset: i32,
    pub direction: SweepDirection,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_angle: -90,
            max_angle: 90,
            step_angle: 5,
            servo_offset: -5,
            direction: SweepDirection::LeftToRight,
        }
    }
}

impl ScanConfig {
    /// Sweep angles ordered left to right: `max_angle` down to `min_angle`.
    pub fn angles(&self) -> Vec<i32> {
        if self.step_angle <= 0 || self.min_angle > self.max_angle {
            return Vec::new();
        }
        let mut angles: Vec<i32> = (self.min_angle..=self.max_angle)
            .step_by(self.step_angle as usize)
            .collect();
        angles.reverse();
        angles
    }
}

/// Actuation speeds and timing.  The hardware owns calibration; these values
/// only scale how long each primitive runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub forward_speed: u8,
    /// Time spent driving forward per grid cell travelled.
    pub forward_time_per_unit_ms: u64,
    pub turn_speed: u8,
    /// Time for one quarter turn in place.
    pub turn_time_ms: u64,
    /// Pause inserted at a segment boundary after a hazard is observed.
    pub hazard_cooldown_ms: u64,
    pub initial_heading: Heading,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            forward_speed: 8,
            forward_time_per_unit_ms: 400,
            turn_speed: 30,
            turn_time_ms: 1000,
            hazard_cooldown_ms: 3000,
            initial_heading: Heading::South,
        }
    }
}

impl DriveConfig {
    pub fn forward_time(&self, cells: u32) -> Duration {
        Duration::from_millis(self.forward_time_per_unit_ms * u64::from(cells))
    }

    pub fn turn_time(&self) -> Duration {
        Duration::from_millis(self.turn_time_ms)
    }

    pub fn hazard_cooldown(&self) -> Duration {
        Duration::from_millis(self.hazard_cooldown_ms)
    }

    /// A configuration with every duration set to zero, for simulation.
    pub fn instantaneous() -> Self {
        Self {
            forward_time_per_unit_ms: 0,
            turn_time_ms: 0,
            hazard_cooldown_ms: 0,
            ..Self::default()
        }
    }
}

/// Hazard detection settings for the perception task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    pub hazard_label: String,
    /// Only every `frame_stride`-th captured frame is classified.
    pub frame_stride: u32,
    /// Number of frames averaged for the frame-rate log line.
    pub fps_window: u32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            hazard_label: "stop sign".to_string(),
            frame_stride: 2,
            fps_window: 10,
        }
    }
}

/// Everything a mission needs, fixed at process start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    /// Side length of the square grid.  Odd sizes give a centre start column.
    pub grid_size: u32,
    /// Defaults to the middle of the first row.
    pub start: Option<GridCell>,
    /// Defaults to the far corner.
    pub goal: Option<GridCell>,
    /// Scan units per grid cell.
    pub cell_size: u32,
    /// Points further than this (in scan units) are not mapped.
    pub mapping_radius: u32,
    pub scan: ScanConfig,
    pub drive: DriveConfig,
    pub perception: PerceptionConfig,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            grid_size: 11,
            start: None,
            goal: None,
            cell_size: 10,
            mapping_radius: 50,
            scan: ScanConfig::default(),
            drive: DriveConfig::default(),
            perception: PerceptionConfig::default(),
        }
    }
}

impl MissionConfig {
    pub fn start(&self) -> GridCell {
        self.start
            .unwrap_or(GridCell::new(self.grid_size as i32 / 2, 0))
    }

    pub fn goal(&self) -> GridCell {
        let last = self.grid_size as i32 - 1;
        self.goal.unwrap_or(GridCell::new(last, last))
    }

    /// Reject parameter sets the navigation core cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), NavError> {
        if self.grid_size == 0 {
            return Err(NavError::Config("grid_size must be positive".to_string()));
        }
        if self.cell_size == 0 {
            return Err(NavError::Config("cell_size must be positive".to_string()));
        }
        if self.mapping_radius == 0 {
            return Err(NavError::Config("mapping_radius must be positive".to_string()));
        }
        let size = self.grid_size as i32;
        for (name, cell) in [("start", self.start()), ("goal", self.goal())] {
            if cell.x < 0 || cell.y < 0 || cell.x >= size || cell.y >= size {
                return Err(NavError::Config(format!(
                    "{name} {cell} lies outside the {size}x{size} grid"
                )));
            }
        }
        if self.scan.step_angle <= 0 {
            return Err(NavError::Config("scan.step_angle must be positive".to_string()));
        }
        if self.scan.min_angle > self.scan.max_angle {
            return Err(NavError::Config(format!(
                "scan.min_angle {} exceeds scan.max_angle {}",
                self.scan.min_angle, self.scan.max_angle
            )));
        }
        if self.perception.frame_stride == 0 {
            return Err(NavError::Config("perception.frame_stride must be at least 1".to_string()));
        }
        if self.perception.hazard_label.trim().is_empty() {
            return Err(NavError::Config("perception.hazard_label must not be empty".to_string()));
        }
        Ok(())
    }
}
