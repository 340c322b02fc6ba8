//! `wayfarer-planner` – grid route planning.
//!
//! # Modules
//!
//! - [`grid`] – [`WeightedGrid`][grid::WeightedGrid]: a fixed-size,
//!   4-connected, unit-cost occupancy grid with a replaceable wall set and an
//!   ASCII renderer for logs.
//! - [`astar`] – [`astar_search`][astar::astar_search] and
//!   [`reconstruct_path`][astar::reconstruct_path]: deterministic A* with a
//!   Manhattan heuristic and insertion-order tie-breaking.

pub mod astar;
pub mod grid;

pub use astar::{SearchResult, astar_search, plan, reconstruct_path};
pub use grid::{GridOverlay, WeightedGrid};
