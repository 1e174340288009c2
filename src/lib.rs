//! # Pythy
//!
//! Enemy AI and pathfinding for Pythy, a top-down tile-based game, plus a
//! headless simulation of the level around it.
//!
//! ## Architecture Overview
//!
//! The crate is a pure, single-threaded, frame-stepped simulation. The host
//! calls it once per fixed tick and polls positions and states afterwards.
//!
//! - **Grid Mapping**: world pixels to tile cells and wall rectangles to blocked cells
//! - **Path Search**: A* over an 8-connected bounded grid
//! - **Motion**: separate-axis movement with wall collision
//! - **Behavior**: per-enemy idle / chase / attack / recover state machine
//! - **Separation**: pairwise repulsion between enemies
//! - **Simulation**: player, enemies, walls and camera stepped together
//!
//! None of the simulation paths fail: an unreachable target yields no path
//! and the enemy holds position. Errors only come from loading maps and
//! configuration.

pub mod game;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use utils::*;

/// Core error type for the Pythy simulation.
#[derive(thiserror::Error, Debug)]
pub enum PythyError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Map data is unusable
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type used throughout the Pythy codebase.
pub type PythyResult<T> = Result<T, PythyError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation configuration constants.
pub mod config {
    /// Default tile size in pixels
    pub const DEFAULT_TILE_SIZE: u32 = 48;

    /// Default searchable grid width in cells
    pub const DEFAULT_GRID_WIDTH: u32 = 100;

    /// Default searchable grid height in cells
    pub const DEFAULT_GRID_HEIGHT: u32 = 100;

    /// Extra cells added per axis when rasterizing a wall
    pub const DEFAULT_COVER_MARGIN: u32 = 1;

    /// Enemies closer than this push each other apart
    pub const DEFAULT_SEPARATION_DISTANCE: f64 = 90.0;

    /// Damage an enemy deals on contact
    pub const DEFAULT_CONTACT_DAMAGE: u32 = 10;

    /// Default player starting health
    pub const DEFAULT_PLAYER_HEALTH: u32 = 100;

    /// Pixels the player moves per tick
    pub const DEFAULT_PLAYER_SPEED: f64 = 2.0;

    /// Invincibility after a hit, 2.5 seconds at 60 ticks per second
    pub const DEFAULT_PLAYER_INVINCIBILITY_TICKS: u32 = 150;

    /// Default view width in pixels
    pub const DEFAULT_VIEW_WIDTH: f64 = 1440.0;

    /// Default view height in pixels
    pub const DEFAULT_VIEW_HEIGHT: f64 = 960.0;

    /// Ticks per second of the fixed timestep
    pub const TARGET_FPS: u64 = 60;
}
