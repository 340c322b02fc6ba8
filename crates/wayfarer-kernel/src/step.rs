//! Motion contract between the planner and the drive controller.
//!
//! Every path segment must be a non-zero, axis-aligned move, and every
//! heading change must be a single quarter turn.  Anything else is a logic
//! fault upstream and is rejected here before any hardware is commanded.

use wayfarer_types::{GridCell, Heading, NavError, StepVector};

/// A quarter turn in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

/// Direction and distance of the straight move from `from` to `to`.
///
/// `y` grows to the South, so a positive `y` delta faces South and a
/// positive `x` delta faces East.
///
/// # Errors
///
/// Returns [`NavError::InvalidStep`] when the cells are identical or differ
/// along both axes.
pub fn step_between(from: GridCell, to: GridCell) -> Result<StepVector, NavError> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let heading = match (dx, dy) {
        (0, dy) if dy > 0 => Heading::South,
        (0, dy) if dy < 0 => Heading::North,
        (dx, 0) if dx > 0 => Heading::East,
        (dx, 0) if dx < 0 => Heading::West,
        _ => return Err(NavError::InvalidStep { from, to }),
    };
    Ok(StepVector {
        heading,
        distance: dx.unsigned_abs() + dy.unsigned_abs(),
    })
}

/// The single turn that rotates `current` onto `required`, or `None` when
/// already aligned.
///
/// # Errors
///
/// Returns [`NavError::UnsupportedTurn`] for a 180° reversal; no reverse
/// primitive exists.
pub fn turn_between(current: Heading, required: Heading) -> Result<Option<Turn>, NavError> {
    if current == required {
        Ok(None)
    } else if current.clockwise() == required {
        Ok(Some(Turn::Right))
    } else if current.counter_clockwise() == required {
        Ok(Some(Turn::Left))
    } else {
        Err(NavError::UnsupportedTurn {
            from: current,
            to: required,
        })
    }
}

/// Check that a path is a chain of unit axis-aligned steps from its first
/// cell to its last.
///
/// # Errors
///
/// Returns [`NavError::InvalidStep`] for the first offending pair.
pub fn verify_path(path: &[GridCell]) -> Result<(), NavError> {
    for pair in path.windows(2) {
        let step = step_between(pair[0], pair[1])?;
        if step.distance != 1 {
            return Err(NavError::InvalidStep {
                from: pair[0],
                to: pair[1],
            });
        }
    }
    Ok(())
}
