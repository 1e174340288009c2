//! # Game Module
//!
//! Enemy behavior and the host-side simulation around it.
//!
//! This module contains the moving parts of a Pythy level:
//! - Enemy agents and their behavior state machine
//! - Axis-separated motion with wall collision
//! - Separation between enemies
//! - The player, camera and tile map the enemies live in
//! - The per-tick simulation loop tying them together

pub mod agent;
pub mod camera;
pub mod motion;
pub mod player;
pub mod separation;
pub mod state;
pub mod world;

pub use agent::*;
pub use camera::*;
pub use motion::*;
pub use player::*;
pub use separation::*;
pub use state::*;
pub use world::*;
