//! # Grid Mapping
//!
//! Conversion between continuous world coordinates and discrete tile cells,
//! and rasterization of wall rectangles into occupied cells.

use crate::utils::math::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A discrete `(column, row)` index over the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub col: i32,
    pub row: i32,
}

impl GridCell {
    /// Creates a new grid cell.
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Manhattan distance to another cell.
    pub fn manhattan_distance(self, other: GridCell) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }

    /// Whether `other` is one of the 8 cells surrounding this one.
    pub fn is_adjacent(self, other: GridCell) -> bool {
        self != other && self.col.abs_diff(other.col) <= 1 && self.row.abs_diff(other.row) <= 1
    }
}

/// Set of cells that path search may not enter.
pub type ObstacleSet = HashSet<GridCell>;

/// Maps world space onto a square tile grid.
///
/// # Examples
///
/// ```
/// use pythy::{GridCell, GridMapper, Vec2};
///
/// let mapper = GridMapper::new(48);
/// assert_eq!(mapper.world_to_grid(Vec2::new(100.0, -1.0)), GridCell::new(2, -1));
/// assert_eq!(mapper.grid_to_world(GridCell::new(2, 0)), Vec2::new(120.0, 24.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMapper {
    /// Pixels per grid cell
    pub tile_size: u32,
    /// Extra cells added to each wall's covered span per axis
    pub cover_margin: u32,
}

impl GridMapper {
    /// Creates a mapper with the default cover margin of one cell.
    pub fn new(tile_size: u32) -> Self {
        Self::with_cover_margin(tile_size, crate::config::DEFAULT_COVER_MARGIN)
    }

    /// Creates a mapper with an explicit cover margin.
    ///
    /// A margin of 1 reproduces the tuned wall padding, which over-covers a
    /// wall by up to one cell at its far edge. Larger margins pad further.
    /// The margin is at least 1: with less, a wall that starts partway into
    /// a cell would leave its last fully covered cell walkable.
    pub fn with_cover_margin(tile_size: u32, cover_margin: u32) -> Self {
        Self {
            tile_size: tile_size.max(1),
            cover_margin: cover_margin.max(1),
        }
    }

    fn tile(&self) -> f64 {
        self.tile_size as f64
    }

    /// Floors a world position onto the cell containing it.
    ///
    /// Negative coordinates floor toward negative infinity, so `-1.0` lands in cell `-1`.
    pub fn world_to_grid(&self, point: Vec2) -> GridCell {
        GridCell::new(
            (point.x / self.tile()).floor() as i32,
            (point.y / self.tile()).floor() as i32,
        )
    }

    /// Returns the world-space center of a cell.
    pub fn grid_to_world(&self, cell: GridCell) -> Vec2 {
        let half = (self.tile_size / 2) as f64;
        Vec2::new(
            cell.col as f64 * self.tile() + half,
            cell.row as f64 * self.tile() + half,
        )
    }

    /// Converts wall rectangles into the set of cells they occupy.
    ///
    /// Each rectangle covers `floor(width / tile) + cover_margin` cells
    /// horizontally, starting at the cell of its top-left corner, and likewise
    /// vertically. Rectangles without area are ignored.
    pub fn rectangles_to_occupied_cells(&self, rects: &[Rect]) -> ObstacleSet {
        let mut occupied = ObstacleSet::new();

        for rect in rects.iter().filter(|rect| rect.has_area()) {
            let start = self.world_to_grid(Vec2::new(rect.x, rect.y));
            let margin = self.cover_margin.max(1) as i32;
            let tiles_wide = (rect.width / self.tile()) as i32 + margin;
            let tiles_high = (rect.height / self.tile()) as i32 + margin;

            for offset_x in 0..tiles_wide {
                for offset_y in 0..tiles_high {
                    occupied.insert(GridCell::new(start.col + offset_x, start.row + offset_y));
                }
            }
        }

        occupied
    }
}

impl Default for GridMapper {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TILE_SIZE)
    }
}
