//! # World Representation
//!
//! Tile maps and their collision geometry.
//!
//! A map is a set of named layers, each a row-major grid of tile ids. The
//! `collision` layer decides what blocks movement and where interactive
//! objects sit; other layers are carried along for the host to draw.

use crate::utils::math::{Rect, Vec2};
use crate::{PythyError, PythyResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path as FsPath;

/// Name of the layer that defines walls and interactive tiles.
pub const COLLISION_LAYER: &str = "collision";

/// Tile ids that block movement: wall, minigame terminals and signs.
pub const BLOCKING_TILES: [u32; 4] = [1, 2, 3, 4];

/// Tile ids the player can interact with.
pub const INTERACTIVE_TILES: [u32; 5] = [2, 3, 4, 5, 9];

/// A tile id found near a point together with its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionTile {
    pub tile_id: u32,
    pub row: usize,
    pub col: usize,
}

/// On-disk map formats: a bare collision grid or a full set of layers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MapFile {
    Grid { grid: Vec<Vec<u32>> },
    Layers(BTreeMap<String, Vec<Vec<u32>>>),
}

/// A layered tile map with derived wall rectangles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    /// Pixels per tile
    pub tile_size: u32,
    /// Tile layers by name
    pub layers: BTreeMap<String, Vec<Vec<u32>>>,
    /// Width in tiles
    pub map_width: usize,
    /// Height in tiles
    pub map_height: usize,
    walls: Vec<Rect>,
}

impl TileMap {
    /// Creates a map from a collision grid alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use pythy::TileMap;
    ///
    /// let map = TileMap::from_collision_grid(48, vec![vec![1, 0, 0], vec![0, 0, 3]]).unwrap();
    /// assert_eq!(map.walls().len(), 2);
    /// assert_eq!(map.pixel_size(), (144.0, 96.0));
    /// ```
    pub fn from_collision_grid(tile_size: u32, grid: Vec<Vec<u32>>) -> PythyResult<Self> {
        let mut layers = BTreeMap::new();
        layers.insert(COLLISION_LAYER.to_string(), grid);
        Self::from_layers(tile_size, layers)
    }

    /// Creates a map from named layers. The collision layer is required.
    pub fn from_layers(tile_size: u32, layers: BTreeMap<String, Vec<Vec<u32>>>) -> PythyResult<Self> {
        if tile_size == 0 {
            return Err(PythyError::InvalidMap("Tile size must be positive".to_string()));
        }

        let collision = layers.get(COLLISION_LAYER).ok_or_else(|| {
            PythyError::InvalidMap(format!("Map has no '{}' layer", COLLISION_LAYER))
        })?;

        let map_height = collision.len();
        let map_width = collision.first().map_or(0, Vec::len);

        let mut map = Self {
            tile_size,
            layers,
            map_width,
            map_height,
            walls: Vec::new(),
        };
        map.generate_walls();
        Ok(map)
    }

    /// Parses a map from JSON text.
    ///
    /// Accepts either `{"grid": [[...]]}`, taken as the collision layer, or an
    /// object of named layers.
    pub fn from_json_str(json: &str, tile_size: u32) -> PythyResult<Self> {
        match serde_json::from_str::<MapFile>(json)? {
            MapFile::Grid { grid } => Self::from_collision_grid(tile_size, grid),
            MapFile::Layers(layers) => Self::from_layers(tile_size, layers),
        }
    }

    /// Loads a map from a JSON file.
    pub fn load_from_file<P: AsRef<FsPath>>(path: P, tile_size: u32) -> PythyResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let map = Self::from_json_str(&json, tile_size)?;
        info!(
            "Loaded map {} ({}x{} tiles, {} walls)",
            path.display(),
            map.map_width,
            map.map_height,
            map.walls.len()
        );
        Ok(map)
    }

    /// One tile-sized rectangle per blocking tile of the collision layer.
    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    /// Map size in pixels.
    pub fn pixel_size(&self) -> (f64, f64) {
        let tile = self.tile_size as f64;
        (self.map_width as f64 * tile, self.map_height as f64 * tile)
    }

    /// Checks whether a tile id blocks movement.
    pub fn is_blocking(tile_id: u32) -> bool {
        BLOCKING_TILES.contains(&tile_id)
    }

    fn generate_walls(&mut self) {
        let tile = self.tile_size as f64;
        self.walls = self
            .layers
            .get(COLLISION_LAYER)
            .map(|grid| {
                grid.iter()
                    .enumerate()
                    .flat_map(|(row, tiles)| {
                        tiles.iter().enumerate().filter_map(move |(col, &tile_id)| {
                            Self::is_blocking(tile_id)
                                .then(|| Rect::new(col as f64 * tile, row as f64 * tile, tile, tile))
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
    }

    fn cell_index(&self, value: f64) -> Option<usize> {
        let index = (value / self.tile_size as f64).floor();
        (index >= 0.0).then_some(index as usize)
    }

    /// Returns the tile id of `layer` under a world position.
    pub fn get_tile(&self, layer: &str, point: Vec2) -> Option<u32> {
        let grid = self.layers.get(layer)?;
        let col = self.cell_index(point.x)?;
        let row = self.cell_index(point.y)?;
        if row >= self.map_height || col >= self.map_width {
            return None;
        }
        grid.get(row)?.get(col).copied()
    }

    /// Finds the first interactive tile within `radius` of a world position.
    ///
    /// Scans the cells under the square around the point row by row.
    pub fn interaction_tile_at(&self, point: Vec2, radius: f64) -> Option<InteractionTile> {
        let grid = self.layers.get(COLLISION_LAYER)?;
        let tile = self.tile_size as f64;

        let col_start = ((point.x - radius) / tile).floor() as i64;
        let col_end = ((point.x + radius) / tile).floor() as i64;
        let row_start = ((point.y - radius) / tile).floor() as i64;
        let row_end = ((point.y + radius) / tile).floor() as i64;

        for row in row_start.max(0)..=row_end.min(self.map_height as i64 - 1) {
            for col in col_start.max(0)..=col_end.min(self.map_width as i64 - 1) {
                let (row, col) = (row as usize, col as usize);
                if let Some(&tile_id) = grid.get(row).and_then(|tiles| tiles.get(col)) {
                    if INTERACTIVE_TILES.contains(&tile_id) {
                        return Some(InteractionTile { tile_id, row, col });
                    }
                }
            }
        }

        None
    }
}

/// Walls of the fixed test arena: a 1600x800 room with two interior walls.
pub fn arena_walls() -> Vec<Rect> {
    vec![
        Rect::new(0.0, 0.0, 1600.0, 50.0),
        Rect::new(0.0, 750.0, 1600.0, 50.0),
        Rect::new(0.0, 0.0, 50.0, 800.0),
        Rect::new(1550.0, 0.0, 50.0, 800.0),
        Rect::new(400.0, 200.0, 200.0, 50.0),
        Rect::new(800.0, 400.0, 50.0, 200.0),
    ]
}

/// Pixel size of the test arena.
pub const ARENA_SIZE: (f64, f64) = (1600.0, 800.0);

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> Vec<Vec<u32>> {
        vec![
            vec![1, 1, 1, 1, 1],
            vec![1, 0, 0, 5, 1],
            vec![1, 0, 9, 0, 1],
            vec![1, 1, 1, 1, 1],
        ]
    }

    #[test]
    fn test_walls_from_collision_layer() {
        let map = TileMap::from_collision_grid(48, sample_grid()).unwrap();
        assert_eq!(map.map_width, 5);
        assert_eq!(map.map_height, 4);
        // Border only; 5 and 9 do not block
        assert_eq!(map.walls().len(), 14);
        assert!(map.walls().contains(&Rect::new(192.0, 96.0, 48.0, 48.0)));
    }

    #[test]
    fn test_get_tile() {
        let map = TileMap::from_collision_grid(48, sample_grid()).unwrap();
        assert_eq!(map.get_tile(COLLISION_LAYER, Vec2::new(150.0, 60.0)), Some(5));
        assert_eq!(map.get_tile(COLLISION_LAYER, Vec2::new(-1.0, 60.0)), None);
        assert_eq!(map.get_tile(COLLISION_LAYER, Vec2::new(10.0, 500.0)), None);
        assert_eq!(map.get_tile("background", Vec2::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_interaction_lookup() {
        let map = TileMap::from_collision_grid(48, sample_grid()).unwrap();

        let found = map.interaction_tile_at(Vec2::new(72.0, 72.0), 40.0).unwrap();
        assert_eq!(found, InteractionTile { tile_id: 9, row: 2, col: 2 });

        assert!(map.interaction_tile_at(Vec2::new(72.0, 72.0), 10.0).is_none());
    }

    #[test]
    fn test_json_formats() {
        let grid = TileMap::from_json_str(r#"{"grid": [[0, 1], [1, 0]]}"#, 32).unwrap();
        assert_eq!(grid.walls().len(), 2);

        let layered = TileMap::from_json_str(
            r#"{"background": [[7, 7], [7, 7]], "collision": [[0, 0], [4, 0]]}"#,
            32,
        )
        .unwrap();
        assert_eq!(layered.walls(), &[Rect::new(0.0, 32.0, 32.0, 32.0)]);
        assert!(layered.layers.contains_key("background"));
    }

    #[test]
    fn test_missing_collision_layer() {
        let result = TileMap::from_json_str(r#"{"background": [[0]]}"#, 48);
        assert!(matches!(result, Err(PythyError::InvalidMap(_))));

        assert!(matches!(TileMap::from_json_str("not json", 48), Err(PythyError::Serde(_))));
    }
}
