//! [`WeightedGrid`] – fixed-size 4-connected occupancy grid.
//!
//! Cells are unit cost and movement is axis-aligned only.  The wall set is
//! replaced wholesale by the owner after a mapping pass; the planner only
//! ever reads it.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use wayfarer_types::GridCell;

/// Neighbour offsets in enumeration order: East, North, West, South.
///
/// Search tie-breaking follows this order, so it must never change.
const NEIGHBOUR_OFFSETS: [(i32, i32); 4] = [(1, 0), (0, -1), (-1, 0), (0, 1)];

/// A rectangular grid of unit-cost cells with a set of impassable walls.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedGrid {
    width: u32,
    height: u32,
    walls: HashSet<GridCell>,
}

impl WeightedGrid {
    /// Create an empty `width` × `height` grid with no walls.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            walls: HashSet::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Replace the wall set.  Walls outside the grid are kept but have no
    /// effect on search.
    pub fn set_walls(&mut self, walls: impl IntoIterator<Item = GridCell>) {
        self.walls = walls.into_iter().collect();
    }

    /// Builder-style variant of [`set_walls`][Self::set_walls].
    pub fn with_walls(mut self, walls: impl IntoIterator<Item = GridCell>) -> Self {
        self.set_walls(walls);
        self
    }

    pub fn walls(&self) -> &HashSet<GridCell> {
        &self.walls
    }

    pub fn in_bounds(&self, cell: GridCell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    /// `false` iff `cell` is a wall.
    pub fn passable(&self, cell: GridCell) -> bool {
        !self.walls.contains(&cell)
    }

    /// In-bounds, passable cells one axis-aligned step from `cell`, in
    /// East, North, West, South order.
    pub fn neighbors(&self, cell: GridCell) -> Vec<GridCell> {
        NEIGHBOUR_OFFSETS
            .iter()
            .map(|&(dx, dy)| GridCell::new(cell.x + dx, cell.y + dy))
            .filter(|&n| self.in_bounds(n) && self.passable(n))
            .collect()
    }

    /// Cost of stepping from `a` to the adjacent cell `b`.  Uniform.
    pub fn cost(&self, _a: GridCell, _b: GridCell) -> u32 {
        1
    }

    /// Draw the grid as ASCII art, one line per row (y grows downwards).
    ///
    /// `#` wall, `A` start, `Z` goal, `@` path, `>` `<` `^` `v` predecessor
    /// pointers, `.` free.
    pub fn render(&self, overlay: &GridOverlay<'_>) -> String {
        let path: HashSet<GridCell> = overlay.path.map(|p| p.iter().copied().collect()).unwrap_or_default();
        let mut out = String::with_capacity(render_capacity(self.width, self.height));
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let cell = GridCell::new(x, y);
                let glyph = if self.walls.contains(&cell) {
                    '#'
                } else if overlay.start == Some(cell) {
                    'A'
                } else if overlay.goal == Some(cell) {
                    'Z'
                } else if path.contains(&cell) {
                    '@'
                } else if let Some(Some(parent)) = overlay.came_from.and_then(|m| m.get(&cell)) {
                    pointer_glyph(cell, *parent)
                } else {
                    '.'
                };
                let _ = write!(out, "{glyph} ");
            }
            out.pop();
            out.push('\n');
        }
        out
    }
}

/// Optional annotations for [`WeightedGrid::render`].
#[derive(Debug, Default, Clone, Copy)]
pub struct GridOverlay<'a> {
    pub start: Option<GridCell>,
    pub goal: Option<GridCell>,
    pub path: Option<&'a [GridCell]>,
    pub came_from: Option<&'a HashMap<GridCell, Option<GridCell>>>,
}

/// Upper bound on the up-front allocation for [`WeightedGrid::render`].
const RENDER_CAPACITY_HINT_MAX: usize = 1 << 16;

/// Bytes in a rendered grid (two per cell, the last space per row replaced
/// by a newline), capped at [`RENDER_CAPACITY_HINT_MAX`].
fn render_capacity(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(2)
        .saturating_mul(height as usize)
        .min(RENDER_CAPACITY_HINT_MAX)
}

fn pointer_glyph(cell: GridCell, parent: GridCell) -> char {
    match (parent.x - cell.x, parent.y - cell.y) {
        (1, 0) => '>',
        (-1, 0) => '<',
        (0, 1) => 'v',
        (0, -1) => '^',
        _ => '*',
    }
}
