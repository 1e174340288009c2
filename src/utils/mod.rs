//! # Utilities Module
//!
//! Geometry, grid mapping and pathfinding shared by the game systems.

pub mod grid;
pub mod math;
pub mod pathfinding;

pub use grid::*;
pub use math::*;
pub use pathfinding::*;
