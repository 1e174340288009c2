//! # Pythy Headless Runner
//!
//! Loads a level, spawns the player and enemies, and steps the simulation
//! with a randomly wandering player, logging what the enemies do.

use clap::Parser;
use log::{info, warn};
use pythy::{
    arena_walls, AgentKind, AgentState, Body, GameEvent, PythyResult, Rect, Simulation,
    SimulationConfig, TileMap, Vec2, ARENA_SIZE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::path::PathBuf;

/// Command line arguments for the Pythy runner.
#[derive(Parser, Debug)]
#[command(name = "pythy")]
#[command(about = "Headless enemy simulation for the Pythy tile game")]
#[command(version)]
struct Args {
    /// Collision map JSON file; the built-in arena is used when omitted
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Simulation configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Random seed for the wandering player and extra spawns
    #[arg(short, long)]
    seed: Option<u64>,

    /// Extra enemies spawned at random open positions
    #[arg(long, default_value_t = 0)]
    enemies: usize,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> PythyResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting Pythy simulation v{}", pythy::VERSION);

    run(&args)
}

/// Initializes logging; `RUST_LOG` takes precedence over the command line level.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_target(false)
        .init();
}

fn run(args: &Args) -> PythyResult<()> {
    let config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };

    let mut simulation = match &args.map {
        Some(path) => {
            let map = TileMap::load_from_file(path, config.tile_size)?;
            Simulation::from_tile_map(config, &map)?
        }
        None => {
            info!("No map given, using the test arena");
            Simulation::new(config, arena_walls(), ARENA_SIZE)?
        }
    };

    let seed = args.seed.unwrap_or(12345);
    info!("Simulating {} ticks with seed {}", args.ticks, seed);
    let mut rng = StdRng::seed_from_u64(seed);

    spawn_extra_enemies(&mut simulation, args.enemies, &mut rng);

    let mut wander = Wander::default();
    let mut entered: HashMap<AgentState, u32> = HashMap::new();
    let mut damage_taken = 0;

    for _ in 0..args.ticks {
        let input = wander.next_input(&mut rng);

        for event in simulation.tick(input) {
            match event {
                GameEvent::AgentStateChanged { agent, from, to, tick } => {
                    *entered.entry(to).or_default() += 1;
                    info!("[tick {}] enemy {} {} -> {}", tick, agent, from, to);
                }
                GameEvent::PlayerDamaged { agent, amount, health, tick } => {
                    damage_taken += amount;
                    info!("[tick {}] enemy {} hit the player for {} (health {})", tick, agent, amount, health);
                }
                GameEvent::PlayerDied { tick } => {
                    warn!("[tick {}] the player died", tick);
                }
            }
        }

        if simulation.is_over() {
            break;
        }
    }

    let snapshot = simulation.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("Ticks simulated: {}", snapshot.tick);
        println!(
            "Player: health {} at ({:.1}, {:.1}){}",
            snapshot.player_health,
            snapshot.player_position.x,
            snapshot.player_position.y,
            if snapshot.game_over { ", dead" } else { "" }
        );
        println!("Damage taken: {}", damage_taken);
        for state in [AgentState::Chase, AgentState::Attack, AgentState::Recover, AgentState::Idle] {
            println!("Entered {}: {}", state, entered.get(&state).copied().unwrap_or(0));
        }
        for agent in &snapshot.agents {
            println!(
                "Enemy {}: {} at ({:.1}, {:.1})",
                agent.id, agent.state, agent.position.x, agent.position.y
            );
        }
    }

    Ok(())
}

/// Places enemies at random positions that do not overlap a wall.
fn spawn_extra_enemies(simulation: &mut Simulation, count: usize, rng: &mut StdRng) {
    let (map_width, map_height) = simulation.map_size();
    let profile = simulation.config().agent_profile.clone();
    if map_width <= profile.width || map_height <= profile.height {
        return;
    }

    let walls: Vec<Rect> = simulation.walls().to_vec();
    for _ in 0..count {
        let spot = (0..100).map(|_| {
            Vec2::new(
                rng.gen_range(0.0..map_width - profile.width),
                rng.gen_range(0.0..map_height - profile.height),
            )
        })
        .find(|&position| !Body::new(position, profile.width, profile.height).collides_with(&walls));

        match spot {
            Some(position) => {
                simulation.spawn_agent(AgentKind::Dog, position);
            }
            None => warn!("Could not find an open spot for an extra enemy"),
        }
    }
}

/// Random walk for the player: holds a direction for a while, then picks another.
#[derive(Debug, Default)]
struct Wander {
    direction: Vec2,
    ticks_left: u32,
}

impl Wander {
    fn next_input(&mut self, rng: &mut StdRng) -> Vec2 {
        if self.ticks_left == 0 {
            self.direction = Vec2::new(
                rng.gen_range(-1..=1) as f64,
                rng.gen_range(-1..=1) as f64,
            );
            self.ticks_left = rng.gen_range(30..120);
        }
        self.ticks_left -= 1;
        self.direction
    }
}
