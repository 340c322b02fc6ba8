//! Shared vocabulary for the Wayfarer navigation stack.
//!
//! Every crate in the workspace talks in terms of the types defined here:
//! grid coordinates, headings, raw scan samples, perception detections, the
//! mission configuration, and the workspace-wide [`NavError`].

pub mod config;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use config::{DriveConfig, MissionConfig, PerceptionConfig, ScanConfig, SweepDirection};

/// A cell of the occupancy grid, addressed by 0-indexed `(x, y)`.
///
/// `x` grows to the East, `y` grows to the South (forward from the start
/// row).  Coordinates are signed so that out-of-bounds neighbours and mapped
/// points can be represented before they are range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (`|dx| + |dy|`) distance to `other`.
    pub fn manhattan(&self, other: &GridCell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The cell reached by moving `distance` cells towards `heading`.
    pub fn advanced(&self, heading: Heading, distance: u32) -> GridCell {
        let d = distance as i32;
        match heading {
            Heading::North => GridCell::new(self.x, self.y - d),
            Heading::East => GridCell::new(self.x + d, self.y),
            Heading::South => GridCell::new(self.x, self.y + d),
            Heading::West => GridCell::new(self.x - d, self.y),
        }
    }
}

impl From<(i32, i32)> for GridCell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Vehicle heading on the grid.
///
/// The variants form the clockwise cycle North → East → South → West → North.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    North,
    East,
    #[default]
    South,
    West,
}

impl Heading {
    /// All headings in clockwise order starting at North.
    pub const CLOCKWISE: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    fn index(self) -> usize {
        match self {
            Heading::North => 0,
            Heading::East => 1,
            Heading::South => 2,
            Heading::West => 3,
        }
    }

    /// One quarter turn to the right.
    pub fn clockwise(self) -> Heading {
        Self::CLOCKWISE[(self.index() + 1) % 4]
    }

    /// One quarter turn to the left.
    pub fn counter_clockwise(self) -> Heading {
        Self::CLOCKWISE[(self.index() + 3) % 4]
    }
}

impl std::fmt::Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Heading::North => write!(f, "N"),
            Heading::East => write!(f, "E"),
            Heading::South => write!(f, "S"),
            Heading::West => write!(f, "W"),
        }
    }
}

/// Where the vehicle is and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehiclePose {
    pub location: GridCell,
    pub heading: Heading,
}

/// A single axis-aligned move: which way to face and how many cells to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepVector {
    pub heading: Heading,
    /// Number of cells travelled.  Always at least 1.
    pub distance: u32,
}

/// One range reading taken while sweeping the distance sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSample {
    /// Nominal sweep angle in degrees; 0 is straight ahead and positive
    /// angles project onto `+x`.
    pub angle: i32,
    /// Raw sensor distance.  Negative values are "no reading" sentinels.
    pub distance: i32,
}

impl ScanSample {
    pub fn new(angle: i32, distance: i32) -> Self {
        Self { angle, distance }
    }

    /// The distance clamped to `[0, i32::MAX]`; sentinel readings become 0.
    pub fn clamped_distance(&self) -> u32 {
        self.distance.max(0) as u32
    }

    /// `true` when the sensor reported a "no reading" sentinel.
    pub fn is_dropout(&self) -> bool {
        self.distance < 0
    }
}

/// A labelled object reported by the frame classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Category label, e.g. `"stop sign"`.
    pub label: String,
    /// Classifier confidence in `[0, 1]`.
    pub score: f32,
}

/// How a mission ended when no fault occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionOutcome {
    /// The vehicle reached the goal cell.
    Completed,
    /// The planner exhausted the frontier; the drive phase was skipped.
    NoPath,
}

/// Summary of a finished mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionReport {
    pub mission_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: MissionOutcome,
    pub start: GridCell,
    pub goal: GridCell,
    /// Planned path, start and goal inclusive.  Empty for [`MissionOutcome::NoPath`].
    pub path: Vec<GridCell>,
    pub walls: usize,
    pub moves: usize,
    pub turns: usize,
    pub hazard_pauses: usize,
    /// ASCII rendering of the planned map, one entry per grid row.
    #[serde(default)]
    pub map: Vec<String>,
}

/// Workspace-wide error type.
///
/// [`NavError::Unreachable`] is an expected planning outcome; everything
/// else aborts the mission.  See [`NavError::is_fatal`].
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NavError {
    #[error("Goal {goal} is unreachable from {start}")]
    Unreachable { start: GridCell, goal: GridCell },

    #[error("Invalid step from {from} to {to}: must be a non-zero axis-aligned move")]
    InvalidStep { from: GridCell, to: GridCell },

    #[error("Unsupported turn from {from} to {to}")]
    UnsupportedTurn { from: Heading, to: Heading },

    #[error("Actuation mismatch: expected to be at {expected}, computed {actual}")]
    ActuationMismatch { expected: GridCell, actual: GridCell },

    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Emergency stop requested by operator")]
    EmergencyStopped,

    #[error("Invalid mission configuration: {0}")]
    Config(String),
}

impl NavError {
    /// `true` for contract violations and faults that must halt the vehicle.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, NavError::Unreachable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_cycle_is_clockwise() {
        assert_eq!(Heading::North.clockwise(), Heading::East);
        assert_eq!(Heading::West.clockwise(), Heading::North);
        assert_eq!(Heading::North.counter_clockwise(), Heading::West);
        assert_eq!(Heading::South.counter_clockwise(), Heading::East);
        for h in Heading::CLOCKWISE {
            assert_eq!(h.clockwise().counter_clockwise(), h);
        }
    }

    #[test]
    fn advanced_moves_along_heading() {
        let c = GridCell::new(2, 2);
        assert_eq!(c.advanced(Heading::South, 3), GridCell::new(2, 5));
        assert_eq!(c.advanced(Heading::North, 1), GridCell::new(2, 1));
        assert_eq!(c.advanced(Heading::East, 2), GridCell::new(4, 2));
        assert_eq!(c.advanced(Heading::West, 2), GridCell::new(0, 2));
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(GridCell::new(2, 0).manhattan(&GridCell::new(4, 4)), 6);
        assert_eq!(GridCell::new(3, 3).manhattan(&GridCell::new(3, 3)), 0);
    }

    #[test]
    fn sentinel_distance_clamps_to_zero() {
        let s = ScanSample::new(0, -1);
        assert!(s.is_dropout());
        assert_eq!(s.clamped_distance(), 0);
        assert_eq!(ScanSample::new(10, 42).clamped_distance(), 42);
    }

    #[test]
    fn only_unreachable_is_recoverable() {
        let start = GridCell::new(0, 0);
        let goal = GridCell::new(1, 1);
        assert!(!NavError::Unreachable { start, goal }.is_fatal());
        assert!(NavError::InvalidStep { from: start, to: start }.is_fatal());
        assert!(NavError::EmergencyStopped.is_fatal());
    }

    #[test]
    fn nav_error_display() {
        let err = NavError::UnsupportedTurn {
            from: Heading::North,
            to: Heading::South,
        };
        assert!(err.to_string().contains("N to S"));

        let err = NavError::HardwareFault {
            component: "range_scanner".to_string(),
            details: "i2c timeout".to_string(),
        };
        assert!(err.to_string().contains("range_scanner"));
    }

    #[test]
    fn mission_report_roundtrip() {
        let report = MissionReport {
            mission_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcome: MissionOutcome::Completed,
            start: GridCell::new(2, 0),
            goal: GridCell::new(4, 4),
            path: vec![GridCell::new(2, 0), GridCell::new(3, 0)],
            walls: 0,
            moves: 1,
            turns: 1,
            hazard_pauses: 0,
            map: vec![". A".to_string(), ". Z".to_string()],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"completed\""));
        let back: MissionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mission_id, report.mission_id);
        assert_eq!(back.path, report.path);
        assert_eq!(back.map.len(), 2);
    }
}
