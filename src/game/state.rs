//! # Simulation State
//!
//! The host side of the enemy simulation: owns the player, the enemy roster
//! and the walls, and steps everything once per fixed tick.
//!
//! Each tick the player moves first, then every enemy in roster order runs
//! its state machine, is separated from its peers and is checked for
//! contact with the player. State changes are detected by comparing each
//! enemy's state before and after its update.

use crate::config;
use crate::game::agent::{Agent, AgentId, AgentKind, AgentProfile, AgentState};
use crate::game::camera::Camera;
use crate::game::player::Player;
use crate::game::separation::{separate, DEFAULT_SEPARATION_STRENGTH};
use crate::game::world::TileMap;
use crate::utils::grid::GridMapper;
use crate::utils::math::{Rect, Vec2};
use crate::utils::pathfinding::{Pathfinder, SearchLimits};
use crate::{PythyError, PythyResult};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;

/// Configuration for a simulation run.
///
/// Every field has a default, so a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Pixels per grid cell
    pub tile_size: u32,
    /// Searchable grid width in cells
    pub grid_width: u32,
    /// Searchable grid height in cells
    pub grid_height: u32,
    /// Extra cells each wall covers per axis when rasterized for path search
    pub cover_margin: u32,
    /// Optional cap on cells expanded by one path search
    pub max_expansions: Option<usize>,
    /// Enemies closer than this push each other apart
    pub separation_distance: f64,
    /// Multiplier on each neighbor's push
    pub separation_strength: f64,
    /// Damage dealt when an enemy touches the player
    pub contact_damage: u32,
    /// Player start position
    pub player_spawn: Vec2,
    /// Enemy start positions
    pub enemy_spawns: Vec<Vec2>,
    /// Behavior parameters for spawned enemies
    pub agent_profile: AgentProfile,
    /// View width used by the camera
    pub view_width: f64,
    /// View height used by the camera
    pub view_height: f64,
}

impl SimulationConfig {
    /// Creates the default configuration of the cathedral level.
    pub fn new() -> Self {
        Self {
            tile_size: config::DEFAULT_TILE_SIZE,
            grid_width: config::DEFAULT_GRID_WIDTH,
            grid_height: config::DEFAULT_GRID_HEIGHT,
            cover_margin: config::DEFAULT_COVER_MARGIN,
            max_expansions: None,
            separation_distance: config::DEFAULT_SEPARATION_DISTANCE,
            separation_strength: DEFAULT_SEPARATION_STRENGTH,
            contact_damage: config::DEFAULT_CONTACT_DAMAGE,
            player_spawn: Vec2::new(256.0, 144.0),
            enemy_spawns: vec![Vec2::new(200.0, 100.0), Vec2::new(350.0, 200.0)],
            agent_profile: AgentProfile::dog(),
            view_width: config::DEFAULT_VIEW_WIDTH,
            view_height: config::DEFAULT_VIEW_HEIGHT,
        }
    }

    /// Creates a configuration for tests: a small grid and no enemies.
    pub fn for_testing() -> Self {
        Self {
            grid_width: 40,
            grid_height: 40,
            enemy_spawns: Vec::new(),
            ..Self::new()
        }
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<FsPath>>(path: P) -> PythyResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the simulation cannot run with.
    pub fn validate(&self) -> PythyResult<()> {
        if self.tile_size == 0 {
            return Err(PythyError::InvalidConfig("tile_size must be positive".to_string()));
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(PythyError::InvalidConfig("grid dimensions must be positive".to_string()));
        }
        if self.cover_margin == 0 {
            return Err(PythyError::InvalidConfig("cover_margin must be at least 1".to_string()));
        }
        if self.separation_distance < 0.0 || self.separation_distance.is_nan() {
            return Err(PythyError::InvalidConfig(
                "separation_distance must not be negative".to_string(),
            ));
        }

        let profile = &self.agent_profile;
        for (name, value) in [
            ("move_speed", profile.move_speed),
            ("lunge_multiplier", profile.lunge_multiplier),
            ("waypoint_reach", profile.waypoint_reach),
            ("detection_range", profile.detection_range),
            ("attack_range", profile.attack_range),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PythyError::InvalidConfig(format!(
                    "agent_profile.{} must be finite and not negative, got {}",
                    name, value
                )));
            }
        }
        if profile.attack_range > profile.detection_range {
            return Err(PythyError::InvalidConfig(
                "attack_range must not exceed detection_range".to_string(),
            ));
        }
        Ok(())
    }

    /// Grid mapping for path search.
    pub fn mapper(&self) -> GridMapper {
        GridMapper::with_cover_margin(self.tile_size, self.cover_margin)
    }

    /// Search bounds for path search.
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            max_expansions: self.max_expansions,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Things that happened during a tick, for the host to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An enemy's state differs from the previous tick
    AgentStateChanged {
        agent: AgentId,
        from: AgentState,
        to: AgentState,
        tick: u64,
    },
    /// An enemy touched the player and damage went through
    PlayerDamaged {
        agent: AgentId,
        amount: u32,
        health: u32,
        tick: u64,
    },
    /// The player's health reached zero
    PlayerDied { tick: u64 },
}

/// Serializable view of one enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub kind: AgentKind,
    pub state: AgentState,
    pub position: Vec2,
}

/// Serializable view of the whole simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub tick: u64,
    pub player_position: Vec2,
    pub player_health: u32,
    pub camera_offset: Vec2,
    pub game_over: bool,
    pub agents: Vec<AgentSnapshot>,
}

/// A running enemy simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    walls: Vec<Rect>,
    map_size: (f64, f64),
    pathfinder: Pathfinder,
    player: Player,
    agents: Vec<Agent>,
    camera: Camera,
    tick: u64,
    game_over: bool,
}

impl Simulation {
    /// Creates a simulation over `walls` in a map of `map_size` pixels.
    ///
    /// Spawns the player and one enemy per configured spawn point.
    pub fn new(config: SimulationConfig, walls: Vec<Rect>, map_size: (f64, f64)) -> PythyResult<Self> {
        config.validate()?;

        let pathfinder = Pathfinder::new(config.mapper(), config.limits(), &walls);
        let player = Player::new(config.player_spawn);
        let camera = Camera::new(config.view_width, config.view_height);
        let agents = config
            .enemy_spawns
            .iter()
            .map(|&spawn| Agent::with_profile(AgentKind::Dog, config.agent_profile.clone(), spawn))
            .collect::<Vec<_>>();

        info!(
            "Simulation ready: {} walls ({} blocked cells), {} enemies",
            walls.len(),
            pathfinder.obstacles().len(),
            agents.len()
        );

        Ok(Self {
            config,
            walls,
            map_size,
            pathfinder,
            player,
            agents,
            camera,
            tick: 0,
            game_over: false,
        })
    }

    /// Creates a simulation over the walls of a tile map.
    pub fn from_tile_map(config: SimulationConfig, map: &TileMap) -> PythyResult<Self> {
        if map.tile_size != config.tile_size {
            return Err(PythyError::InvalidConfig(format!(
                "map tile size {} does not match configured tile size {}",
                map.tile_size, config.tile_size
            )));
        }
        Self::new(config, map.walls().to_vec(), map.pixel_size())
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    /// Map size in pixels.
    pub fn map_size(&self) -> (f64, f64) {
        self.map_size
    }

    /// The shared pathfinder over this simulation's walls.
    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Number of ticks simulated so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Whether the player has died and the simulation has stopped.
    pub fn is_over(&self) -> bool {
        self.game_over
    }

    /// Adds an enemy with the configured profile.
    pub fn spawn_agent(&mut self, kind: AgentKind, position: Vec2) -> AgentId {
        let agent = Agent::with_profile(kind, self.config.agent_profile.clone(), position);
        let id = agent.id();
        self.agents.push(agent);
        debug!("Spawned {:?} {} at {:?}", kind, id, position);
        id
    }

    /// Removes an enemy from the roster.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        let index = self.agents.iter().position(|agent| agent.id() == id)?;
        Some(self.agents.remove(index))
    }

    /// Advances the simulation by one fixed tick.
    ///
    /// `input` is the held movement direction, one unit per axis, and is
    /// scaled by the player's speed. Returns the events of this tick; after
    /// the player dies, ticks do nothing.
    pub fn tick(&mut self, input: Vec2) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.game_over {
            return events;
        }

        self.tick += 1;

        let speed = self.player.move_speed;
        self.player.move_by(input * speed, &self.walls);
        self.player.update();
        self.camera
            .follow(self.player.center(), self.map_size.0, self.map_size.1);

        let target = self.player.position();

        for index in 0..self.agents.len() {
            let before = self.agents[index].state();
            let after = self.agents[index].update(target, &self.walls, &self.pathfinder);

            if before != after {
                events.push(GameEvent::AgentStateChanged {
                    agent: self.agents[index].id(),
                    from: before,
                    to: after,
                    tick: self.tick,
                });
            }

            separate(
                &mut self.agents,
                index,
                self.config.separation_distance,
                self.config.separation_strength,
            );

            let agent = &self.agents[index];
            if self.player.body.overlaps(agent.body()) {
                let amount = self.player.take_damage(self.config.contact_damage);
                if amount > 0 {
                    events.push(GameEvent::PlayerDamaged {
                        agent: agent.id(),
                        amount,
                        health: self.player.health,
                        tick: self.tick,
                    });
                }
            }
        }

        if !self.player.is_alive() {
            self.game_over = true;
            info!("Player died on tick {}", self.tick);
            events.push(GameEvent::PlayerDied { tick: self.tick });
        }

        events
    }

    /// Captures the current state for reporting.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: self.tick,
            player_position: self.player.position(),
            player_health: self.player.health,
            camera_offset: self.camera.offset,
            game_over: self.game_over,
            agents: self
                .agents
                .iter()
                .map(|agent| AgentSnapshot {
                    id: agent.id(),
                    kind: agent.kind(),
                    state: agent.state(),
                    position: agent.position(),
                })
                .collect(),
        }
    }
}
