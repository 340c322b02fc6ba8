//! Occupancy mapping: polar range samples → grid-relative obstacle cells.
//!
//! # Frames
//!
//! The vehicle sits at the origin facing `+y`.  A sample at angle `θ` and
//! distance `d` projects to `(d·sin θ, d·cos θ)`, rounded half-to-even to
//! the nearest integer.  Points beyond `mapping_radius` (either `|x|` or
//! `y`) and the origin itself are discarded.  Survivors are shifted right by
//! `mapping_radius` so the vehicle sits in the middle column of the map.
//!
//! [`walls_from_points`] then divides by the cell size to get grid cells.
//!
//! # Example
//!
//! ```rust
//! use wayfarer_perception::occupancy::{OccupancyMapper, walls_from_points};
//! use wayfarer_types::{GridCell, ScanSample};
//!
//! let mapper = OccupancyMapper::new(50);
//! let points = mapper.map(&[ScanSample::new(0, 25), ScanSample::new(0, -1)]);
//! assert_eq!(points, vec![(50, 25)]);
//! assert_eq!(walls_from_points(&points, 10), vec![GridCell::new(5, 2)]);
//! ```

use std::collections::HashSet;

use tracing::debug;
use wayfarer_types::{GridCell, ScanSample};

/// Projects range samples into map-space obstacle points.
#[derive(Debug, Clone, Copy)]
pub struct OccupancyMapper {
    radius: i64,
}

impl OccupancyMapper {
    pub fn new(mapping_radius: u32) -> Self {
        Self {
            radius: i64::from(mapping_radius),
        }
    }

    /// Vehicle-relative integer offset of `sample`, before any filtering.
    ///
    /// Sentinel distances are clamped to zero and therefore project onto
    /// the origin.
    pub fn project(&self, sample: &ScanSample) -> (i64, i64) {
        let distance = f64::from(sample.clamped_distance());
        let theta = f64::from(sample.angle).to_radians();
        let x = (distance * theta.sin()).round_ties_even() as i64;
        let y = (distance * theta.cos()).round_ties_even() as i64;
        (x, y)
    }

    /// Map-space point for `sample`, or `None` if it is out of range or
    /// lands on the vehicle.
    pub fn locate(&self, sample: &ScanSample) -> Option<(i32, i32)> {
        let (x, y) = self.project(sample);
        if x.abs() > self.radius || y > self.radius || (x == 0 && y == 0) {
            return None;
        }
        // Bounded by the radius checks above, so both fit in i32.
        Some(((x + self.radius) as i32, y as i32))
    }

    /// Map every sample, keeping input order and dropping discarded ones.
    pub fn map(&self, samples: &[ScanSample]) -> Vec<(i32, i32)> {
        let points: Vec<(i32, i32)> = samples.iter().filter_map(|s| self.locate(s)).collect();
        debug!(
            samples = samples.len(),
            dropouts = samples.iter().filter(|s| s.is_dropout()).count(),
            mapped = points.len(),
            "occupancy map built"
        );
        points
    }
}

/// Rescale map-space points to grid cells of `cell_size` units, dropping
/// repeats while keeping first-seen order.
///
/// Floor division is used so that points just behind the vehicle (negative
/// `y`) land in row `-1` instead of collapsing onto row `0`.
pub fn walls_from_points(points: &[(i32, i32)], cell_size: u32) -> Vec<GridCell> {
    let size = cell_size.max(1) as i32;
    let mut seen = HashSet::new();
    points
        .iter()
        .map(|&(x, y)| GridCell::new(x.div_euclid(size), y.div_euclid(size)))
        .filter(|cell| seen.insert(*cell))
        .collect()
}
