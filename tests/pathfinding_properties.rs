//! Property tests for grid mapping and path search.

use pathfinding::prelude::{bfs, dijkstra};
use proptest::prelude::*;
use pythy::{
    find_path, path_cost, GridCell, GridMapper, Path, Pathfinder, Rect, SearchLimits, Vec2,
};

const TILE: u32 = 48;
const GRID: u32 = 20;

fn walkable_neighbors(pathfinder: &Pathfinder, cell: GridCell) -> Vec<GridCell> {
    let mut neighbors = Vec::new();
    for dx in -1..=1 {
        for dy in -1..=1 {
            let neighbor = GridCell::new(cell.col + dx, cell.row + dy);
            if neighbor != cell && pathfinder.is_walkable(neighbor) {
                neighbors.push(neighbor);
            }
        }
    }
    neighbors
}

fn assert_path_valid(pathfinder: &Pathfinder, start: Vec2, goal: Vec2, path: &Path) {
    let mapper = pathfinder.mapper();
    let mut previous = mapper.world_to_grid(start);

    for waypoint in path.waypoints() {
        let cell = mapper.world_to_grid(*waypoint);
        assert!(previous.is_adjacent(cell), "{:?} -> {:?} is not 8-adjacent", previous, cell);
        assert!(!pathfinder.obstacles().contains(&cell), "{:?} is an obstacle", cell);
        assert_eq!(*waypoint, mapper.grid_to_world(cell), "waypoints are cell centers");
        previous = cell;
    }

    if let Some(destination) = path.destination() {
        assert_eq!(mapper.world_to_grid(destination), mapper.world_to_grid(goal));
    }
}

fn cell_strategy() -> impl Strategy<Value = (i32, i32)> {
    (0..GRID as i32, 0..GRID as i32)
}

fn wall_strategy() -> impl Strategy<Value = Vec<Rect>> {
    prop::collection::vec((0..GRID as i32, 0..GRID as i32, 1..4i32, 1..4i32), 0..12).prop_map(
        |walls| {
            walls
                .into_iter()
                .map(|(col, row, wide, high)| {
                    let tile = TILE as f64;
                    Rect::new(col as f64 * tile, row as f64 * tile, wide as f64 * tile, high as f64 * tile)
                })
                .collect()
        },
    )
}

fn center(mapper: &GridMapper, (col, row): (i32, i32)) -> Vec2 {
    mapper.grid_to_world(GridCell::new(col, row))
}

proptest! {
    #[test]
    fn grid_round_trip(tile in 1u32..200, col in -1000i32..1000, row in -1000i32..1000) {
        let mapper = GridMapper::new(tile);
        let cell = GridCell::new(col, row);
        prop_assert_eq!(mapper.world_to_grid(mapper.grid_to_world(cell)), cell);
    }

    #[test]
    fn obstacle_coverage_contains_interior_cells(
        tile in 8u32..64,
        margin in 0u32..3,
        x in -300i32..300,
        y in -300i32..300,
        width in 1i32..400,
        height in 1i32..400,
    ) {
        let mapper = GridMapper::with_cover_margin(tile, margin);
        let rect = Rect::new(x as f64, y as f64, width as f64, height as f64);
        let occupied = mapper.rectangles_to_occupied_cells(&[rect]);
        let t = tile as i32;

        let col_first = x.div_euclid(t) + if x.rem_euclid(t) == 0 { 0 } else { 1 };
        let col_last = (x + width).div_euclid(t) - 1;
        let row_first = y.div_euclid(t) + if y.rem_euclid(t) == 0 { 0 } else { 1 };
        let row_last = (y + height).div_euclid(t) - 1;

        for col in col_first..=col_last {
            for row in row_first..=row_last {
                prop_assert!(occupied.contains(&GridCell::new(col, row)), "missing {} {}", col, row);
            }
        }
    }

    #[test]
    fn larger_margin_never_uncovers_cells(
        tile in 8u32..64,
        margin in 0u32..3,
        rects in prop::collection::vec((-300.0f64..300.0, -300.0f64..300.0, 0.0f64..300.0, 0.0f64..300.0), 0..6),
    ) {
        let rects: Vec<Rect> = rects.into_iter().map(|(x, y, w, h)| Rect::new(x, y, w, h)).collect();
        let narrow = GridMapper::with_cover_margin(tile, margin).rectangles_to_occupied_cells(&rects);
        let wide = GridMapper::with_cover_margin(tile, margin + 1).rectangles_to_occupied_cells(&rects);
        prop_assert!(narrow.is_subset(&wide));
    }

    #[test]
    fn returned_paths_are_valid(walls in wall_strategy(), start in cell_strategy(), goal in cell_strategy()) {
        let pathfinder = Pathfinder::new(GridMapper::new(TILE), SearchLimits::new(GRID, GRID), &walls);
        let start = center(pathfinder.mapper(), start);
        let goal = center(pathfinder.mapper(), goal);

        if let Some(path) = pathfinder.find_path(start, goal) {
            assert_path_valid(&pathfinder, start, goal, &path);
        }
    }

    #[test]
    fn path_found_exactly_when_reachable(walls in wall_strategy(), start in cell_strategy(), goal in cell_strategy()) {
        let pathfinder = Pathfinder::new(GridMapper::new(TILE), SearchLimits::new(GRID, GRID), &walls);
        let start_cell = GridCell::new(start.0, start.1);
        let goal_cell = GridCell::new(goal.0, goal.1);

        let reachable = bfs(
            &start_cell,
            |&cell| walkable_neighbors(&pathfinder, cell),
            |&cell| cell == goal_cell,
        )
        .is_some();

        let found = pathfinder
            .find_path(center(pathfinder.mapper(), start), center(pathfinder.mapper(), goal))
            .is_some();
        prop_assert_eq!(found, reachable);
    }

    #[test]
    fn paths_cost_no_less_than_shortest(walls in wall_strategy(), start in cell_strategy(), goal in cell_strategy()) {
        let pathfinder = Pathfinder::new(GridMapper::new(TILE), SearchLimits::new(GRID, GRID), &walls);
        let start_cell = GridCell::new(start.0, start.1);
        let goal_cell = GridCell::new(goal.0, goal.1);
        let start = center(pathfinder.mapper(), start);

        if let Some(path) = pathfinder.find_path(start, center(pathfinder.mapper(), goal)) {
            // Costs scaled by ten to stay in integers
            let (_, shortest) = dijkstra(
                &start_cell,
                |&cell| {
                    walkable_neighbors(&pathfinder, cell).into_iter().map(move |next| {
                        let cost = if next.col != cell.col && next.row != cell.row { 14u32 } else { 10 };
                        (next, cost)
                    })
                },
                |&cell| cell == goal_cell,
            )
            .expect("a found path implies reachability");

            let cost = path_cost(pathfinder.mapper(), start, &path);
            prop_assert!(cost * 10.0 >= shortest as f64 - 1e-6);
        }
    }

    #[test]
    fn open_grid_paths_are_optimal(start in (0i32..30, 0i32..30), goal in (0i32..30, 0i32..30), offset in (0.0f64..47.0, 0.0f64..47.0)) {
        let mapper = GridMapper::new(TILE);
        let tile = TILE as f64;
        let start_point = Vec2::new(start.0 as f64 * tile + offset.0, start.1 as f64 * tile + offset.1);
        let goal_point = center(&mapper, goal);

        let path = find_path(start_point, goal_point, &[], TILE, 30, 30);
        prop_assert!(path.is_some());
        let path = path.unwrap();

        let dx = (start.0 - goal.0).unsigned_abs() as f64;
        let dy = (start.1 - goal.1).unsigned_abs() as f64;
        let expected = 1.4 * dx.min(dy) + (dx.max(dy) - dx.min(dy));

        prop_assert!((path_cost(&mapper, start_point, &path) - expected).abs() < 1e-9);
        prop_assert_eq!(path.len() as f64, dx.max(dy));
    }
}

#[test]
fn enclosed_goal_has_no_path() {
    // Closed ring of walls around the block of cells (8..12, 8..12)
    let tile = TILE as f64;
    let walls = vec![
        Rect::new(8.0 * tile, 8.0 * tile, 5.0 * tile, tile),
        Rect::new(8.0 * tile, 12.0 * tile, 5.0 * tile, tile),
        Rect::new(8.0 * tile, 8.0 * tile, tile, 5.0 * tile),
        Rect::new(12.0 * tile, 8.0 * tile, tile, 5.0 * tile),
    ];
    let mapper = GridMapper::new(TILE);
    let start = Vec2::new(tile, tile);
    let goal = mapper.grid_to_world(GridCell::new(10, 10));

    assert!(find_path(start, goal, &walls, TILE, GRID, GRID).is_none());

    // Searching out of the ring fails the same way
    assert!(find_path(goal, start, &walls, TILE, GRID, GRID).is_none());
}

#[test]
fn gap_in_ring_is_found() {
    let tile = TILE as f64;
    // Ring with the left side missing rows 10..12
    let walls = vec![
        Rect::new(8.0 * tile, 6.0 * tile, 8.0 * tile, tile),
        Rect::new(8.0 * tile, 14.0 * tile, 8.0 * tile, tile),
        Rect::new(8.0 * tile, 6.0 * tile, tile, 3.0 * tile),
        Rect::new(15.0 * tile, 6.0 * tile, tile, 9.0 * tile),
    ];
    let pathfinder = Pathfinder::new(GridMapper::new(TILE), SearchLimits::new(GRID, GRID), &walls);
    let start = Vec2::new(tile, tile);
    let goal = pathfinder.mapper().grid_to_world(GridCell::new(12, 11));

    let path = pathfinder.find_path(start, goal).expect("gap leaves the inside reachable");
    assert_path_valid(&pathfinder, start, goal, &path);
}
