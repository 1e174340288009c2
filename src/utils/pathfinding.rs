//! # Pathfinding Algorithms
//!
//! A* search over an 8-connected, bounded tile grid.
//!
//! The search uses a Manhattan heuristic with a diagonal step cost of 1.4.
//! That heuristic can overestimate once diagonals are cheaper than two
//! orthogonal steps, so routes around obstacles are not always globally
//! shortest. Enemy movement is tuned against this behavior and it is kept
//! as is.

use crate::utils::grid::{GridCell, GridMapper, ObstacleSet};
use crate::utils::math::{Rect, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

/// Cost of a horizontal or vertical step.
pub const ORTHOGONAL_COST: f64 = 1.0;

/// Cost of a diagonal step, approximating the square root of two.
pub const DIAGONAL_COST: f64 = 1.4;

const NEIGHBOR_OFFSETS: [(i32, i32, f64); 8] = [
    (0, 1, ORTHOGONAL_COST),
    (1, 0, ORTHOGONAL_COST),
    (0, -1, ORTHOGONAL_COST),
    (-1, 0, ORTHOGONAL_COST),
    (1, 1, DIAGONAL_COST),
    (1, -1, DIAGONAL_COST),
    (-1, 1, DIAGONAL_COST),
    (-1, -1, DIAGONAL_COST),
];

/// An ordered list of world-space waypoints (cell centers).
///
/// The start position is never part of a path. Waypoints are consumed from
/// the front as they are reached.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    waypoints: VecDeque<Vec2>,
}

impl Path {
    /// Creates a path from waypoints in travel order.
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self {
            waypoints: waypoints.into(),
        }
    }

    /// Number of remaining waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether every waypoint has been consumed.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The waypoint currently being walked toward.
    pub fn next_waypoint(&self) -> Option<Vec2> {
        self.waypoints.front().copied()
    }

    /// The final waypoint of the path.
    pub fn destination(&self) -> Option<Vec2> {
        self.waypoints.back().copied()
    }

    /// Pops the current waypoint.
    pub fn advance(&mut self) -> Option<Vec2> {
        self.waypoints.pop_front()
    }

    /// Drops all remaining waypoints.
    pub fn clear(&mut self) {
        self.waypoints.clear();
    }

    /// Iterates the remaining waypoints in travel order.
    pub fn waypoints(&self) -> impl Iterator<Item = &Vec2> {
        self.waypoints.iter()
    }
}

/// Bounds of the searchable grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Number of columns, cells span `[0, grid_width)`
    pub grid_width: u32,
    /// Number of rows, cells span `[0, grid_height)`
    pub grid_height: u32,
    /// Optional cap on expanded cells before giving up
    #[serde(default)]
    pub max_expansions: Option<usize>,
}

impl SearchLimits {
    /// Creates unbounded-effort limits for a grid of the given size.
    pub fn new(grid_width: u32, grid_height: u32) -> Self {
        Self {
            grid_width,
            grid_height,
            max_expansions: None,
        }
    }

    /// Caps the number of cells a single search may expand.
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    /// Checks whether a cell lies inside the grid.
    pub fn contains(&self, cell: GridCell) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && (cell.col as i64) < self.grid_width as i64
            && (cell.row as i64) < self.grid_height as i64
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_GRID_WIDTH,
            crate::config::DEFAULT_GRID_HEIGHT,
        )
    }
}

/// Path search over a fixed obstacle set.
///
/// Building the obstacle set once and sharing the pathfinder lets every agent
/// search the same static walls in a tick without rasterizing them again.
#[derive(Debug, Clone)]
pub struct Pathfinder {
    mapper: GridMapper,
    limits: SearchLimits,
    obstacles: ObstacleSet,
}

impl Pathfinder {
    /// Rasterizes `walls` and creates a pathfinder over them.
    pub fn new(mapper: GridMapper, limits: SearchLimits, walls: &[Rect]) -> Self {
        let obstacles = mapper.rectangles_to_occupied_cells(walls);
        Self::with_obstacles(mapper, limits, obstacles)
    }

    /// Creates a pathfinder over an already rasterized obstacle set.
    pub fn with_obstacles(mapper: GridMapper, limits: SearchLimits, obstacles: ObstacleSet) -> Self {
        Self {
            mapper,
            limits,
            obstacles,
        }
    }

    /// The grid mapping used by this pathfinder.
    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    /// The search bounds.
    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    /// Cells the search will never enter.
    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    /// Checks whether a cell is inside the grid and not occupied.
    pub fn is_walkable(&self, cell: GridCell) -> bool {
        self.limits.contains(cell) && !self.obstacles.contains(&cell)
    }

    /// Finds a path of cell centers from `start` to the cell containing `goal`.
    ///
    /// Returns `None` when the goal cell cannot be reached. When start and goal
    /// share a cell the result is an empty path.
    pub fn find_path(&self, start: Vec2, goal: Vec2) -> Option<Path> {
        let start_cell = self.mapper.world_to_grid(start);
        let goal_cell = self.mapper.world_to_grid(goal);

        if start_cell == goal_cell {
            return Some(Path::default());
        }

        // Neighbor pruning would reject this cell anyway; skip the exhaustive search.
        if !self.is_walkable(goal_cell) {
            debug!("No path: goal cell {:?} is blocked or out of bounds", goal_cell);
            return None;
        }

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<GridCell, GridCell> = HashMap::new();
        let mut g_score: HashMap<GridCell, f64> = HashMap::new();
        let mut visited: HashSet<GridCell> = HashSet::new();
        let mut expansions = 0usize;

        g_score.insert(start_cell, 0.0);
        open_set.push(OpenNode {
            f_score: heuristic(start_cell, goal_cell),
            g_score: 0.0,
            cell: start_cell,
        });

        while let Some(OpenNode { g_score: current_g, cell: current, .. }) = open_set.pop() {
            // Lazy deletion: the first pop of a cell finalizes it
            if !visited.insert(current) {
                continue;
            }

            if current == goal_cell {
                let path = self.reconstruct_path(&came_from, goal_cell);
                debug!(
                    "Path found from {:?} to {:?}: {} waypoints, {} cells expanded",
                    start_cell,
                    goal_cell,
                    path.len(),
                    expansions
                );
                return Some(path);
            }

            expansions += 1;
            if let Some(max_expansions) = self.limits.max_expansions {
                if expansions > max_expansions {
                    debug!(
                        "No path: search from {:?} to {:?} hit the cap of {} expansions",
                        start_cell, goal_cell, max_expansions
                    );
                    return None;
                }
            }

            for &(dx, dy, move_cost) in NEIGHBOR_OFFSETS.iter() {
                let neighbor = GridCell::new(current.col + dx, current.row + dy);

                if !self.is_walkable(neighbor) || visited.contains(&neighbor) {
                    continue;
                }

                let tentative_g = current_g + move_cost;
                if tentative_g < *g_score.get(&neighbor).unwrap_or(&f64::INFINITY) {
                    came_from.insert(neighbor, current);
                    g_score.insert(neighbor, tentative_g);
                    open_set.push(OpenNode {
                        f_score: tentative_g + heuristic(neighbor, goal_cell),
                        g_score: tentative_g,
                        cell: neighbor,
                    });
                }
            }
        }

        debug!(
            "No path from {:?} to {:?} after {} cells expanded",
            start_cell, goal_cell, expansions
        );
        None
    }

    fn reconstruct_path(&self, came_from: &HashMap<GridCell, GridCell>, goal: GridCell) -> Path {
        let mut waypoints = Vec::new();
        let mut current = goal;

        while let Some(&previous) = came_from.get(&current) {
            waypoints.push(self.mapper.grid_to_world(current));
            current = previous;
        }

        waypoints.reverse();
        Path::new(waypoints)
    }
}

/// Finds a path between two world positions around `walls`.
///
/// Rasterizes the walls on every call. Hosts that search the same walls
/// repeatedly should build a [`Pathfinder`] once instead.
///
/// # Examples
///
/// ```
/// use pythy::{find_path, Vec2};
///
/// let path = find_path(Vec2::new(10.0, 10.0), Vec2::new(200.0, 10.0), &[], 48, 100, 100).unwrap();
/// assert_eq!(path.len(), 4);
/// assert_eq!(path.destination(), Some(Vec2::new(216.0, 24.0)));
/// ```
pub fn find_path(
    start: Vec2,
    goal: Vec2,
    walls: &[Rect],
    tile_size: u32,
    grid_width: u32,
    grid_height: u32,
) -> Option<Path> {
    Pathfinder::new(
        GridMapper::new(tile_size),
        SearchLimits::new(grid_width, grid_height),
        walls,
    )
    .find_path(start, goal)
}

/// Total step cost of walking `path` starting from the cell of `start`.
pub fn path_cost(mapper: &GridMapper, start: Vec2, path: &Path) -> f64 {
    let mut previous = mapper.world_to_grid(start);
    let mut cost = 0.0;

    for waypoint in path.waypoints() {
        let cell = mapper.world_to_grid(*waypoint);
        cost += if cell.col != previous.col && cell.row != previous.row {
            DIAGONAL_COST
        } else {
            ORTHOGONAL_COST
        };
        previous = cell;
    }

    cost
}

fn heuristic(cell: GridCell, goal: GridCell) -> f64 {
    cell.manhattan_distance(goal) as f64
}

/// Open-set entry for A* search.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    f_score: f64,
    g_score: f64,
    cell: GridCell,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the lowest f, then lowest g, then lowest cell
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.g_score.total_cmp(&self.g_score))
            .then_with(|| other.cell.cmp(&self.cell))
    }
}
