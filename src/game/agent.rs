//! # Enemy Agents
//!
//! Per-enemy behavior: a four-state machine (idle, chase, attack, recover)
//! driven by distance to the target and by timers, with A* re-planning
//! while chasing and a straight-line lunge while attacking.
//!
//! Every tunable lives in [`AgentProfile`], so new enemy kinds are data,
//! not new types.

use crate::game::motion::Body;
use crate::utils::math::{Rect, Vec2};
use crate::utils::pathfinding::{Path, Pathfinder};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for enemy agents.
pub type AgentId = Uuid;

/// Behavioral state of an agent. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    /// Target out of detection range; holds position
    #[default]
    Idle,
    /// Following a planned path toward the target
    Chase,
    /// Lunging straight at the target until the attack timer runs out
    Attack,
    /// Standing still after an attack until the recovery timer runs out
    Recover,
}

impl AgentState {
    /// Lowercase name of the state.
    pub fn name(self) -> &'static str {
        match self {
            AgentState::Idle => "idle",
            AgentState::Chase => "chase",
            AgentState::Attack => "attack",
            AgentState::Recover => "recover",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kinds of enemy the game spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// Chases the player and attacks with a short lunge
    Dog,
}

impl AgentKind {
    /// Behavior parameters used when spawning this kind without an explicit profile.
    pub fn default_profile(self) -> AgentProfile {
        match self {
            AgentKind::Dog => AgentProfile::dog(),
        }
    }
}

/// Tunable behavior parameters for an agent.
///
/// Ranges and distances are in world units (pixels); durations are in ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Body width
    pub width: f64,
    /// Body height
    pub height: f64,
    /// Distance moved per tick while chasing
    pub move_speed: f64,
    /// Target closer than this starts a chase
    pub detection_range: f64,
    /// Target closer than this starts an attack
    pub attack_range: f64,
    /// Lunge speed as a multiple of `move_speed`
    pub lunge_multiplier: f64,
    /// Length of an attack
    pub max_attack_duration: u32,
    /// Length of the pause after an attack
    pub max_recovery_time: u32,
    /// Ticks between forced re-plans while chasing
    pub path_recalculation_interval: u32,
    /// A waypoint closer than this counts as reached
    pub waypoint_reach: f64,
    /// Added to the target position to aim paths at the target's body center
    pub goal_offset: Vec2,
}

impl AgentProfile {
    /// Profile of the dog enemy.
    ///
    /// # Examples
    ///
    /// ```
    /// use pythy::AgentProfile;
    ///
    /// let dog = AgentProfile::dog();
    /// assert!(dog.attack_range < dog.detection_range);
    /// ```
    pub fn dog() -> Self {
        Self {
            width: 24.0,
            height: 16.0,
            move_speed: 1.0,
            detection_range: 300.0,
            attack_range: 40.0,
            lunge_multiplier: 3.0,
            max_attack_duration: 15,
            max_recovery_time: 90,
            path_recalculation_interval: 30,
            waypoint_reach: 25.0,
            goal_offset: Vec2::new(24.0, 46.0),
        }
    }
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self::dog()
    }
}

/// An enemy driven by the behavior state machine.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    kind: AgentKind,
    profile: AgentProfile,
    body: Body,
    state: AgentState,
    path: Path,
    attack_timer: u32,
    recovery_timer: u32,
    path_timer: u32,
    route_found: bool,
}

impl Agent {
    /// Spawns an agent of `kind` at `spawn` with the kind's default profile.
    pub fn new(kind: AgentKind, spawn: Vec2) -> Self {
        Self::with_profile(kind, kind.default_profile(), spawn)
    }

    /// Spawns an agent with an explicit profile.
    pub fn with_profile(kind: AgentKind, profile: AgentProfile, spawn: Vec2) -> Self {
        let body = Body::new(spawn, profile.width, profile.height);
        Self {
            id: Uuid::new_v4(),
            kind,
            profile,
            body,
            state: AgentState::Idle,
            path: Path::default(),
            attack_timer: 0,
            recovery_timer: 0,
            path_timer: 0,
            route_found: false,
        }
    }

    /// Unique id of this agent.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// The kind of enemy this agent is.
    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Behavior parameters in use.
    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// The agent's collision box.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Top-left corner of the agent's body.
    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Teleports the agent, keeping its state and timers.
    pub fn set_position(&mut self, position: Vec2) {
        self.body.position = position;
    }

    /// Current behavioral state.
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Remaining waypoints of the current path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The waypoint the agent is currently walking toward.
    pub fn current_waypoint(&self) -> Option<Vec2> {
        self.path.next_waypoint()
    }

    /// Ticks left in the current attack.
    pub fn attack_timer(&self) -> u32 {
        self.attack_timer
    }

    /// Ticks left before the agent may act again.
    pub fn recovery_timer(&self) -> u32 {
        self.recovery_timer
    }

    /// Distance and raw direction vector from the agent to `target`.
    pub fn find_target(&self, target: Vec2) -> (f64, Vec2) {
        let direction = target - self.body.position;
        (direction.length(), direction)
    }

    /// Advances the agent by one tick and returns its state afterwards.
    ///
    /// `target` is the player's position; `walls` are the collision
    /// rectangles for motion and `pathfinder` holds the same walls rasterized
    /// for path search.
    pub fn update(&mut self, target: Vec2, walls: &[Rect], pathfinder: &Pathfinder) -> AgentState {
        let (distance, direction) = self.find_target(target);
        let previous = self.state;

        self.determine_state(distance);

        if self.state != previous {
            debug!(
                "Agent {} {} -> {} at distance {:.1}",
                self.id, previous, self.state, distance
            );
        }

        match self.state {
            AgentState::Idle => {}
            AgentState::Chase => self.handle_chase(target, walls, pathfinder),
            AgentState::Attack => self.handle_attack(direction, walls),
            AgentState::Recover => self.handle_recover(),
        }

        self.state
    }

    /// Applies the transition rules in priority order.
    fn determine_state(&mut self, distance: f64) {
        let previous = self.state;

        self.state = if self.attack_timer > 0 {
            AgentState::Attack
        } else if self.recovery_timer > 0 {
            AgentState::Recover
        } else if distance < self.profile.attack_range {
            self.attack_timer = self.profile.max_attack_duration;
            AgentState::Attack
        } else if distance < self.profile.detection_range {
            AgentState::Chase
        } else {
            AgentState::Idle
        };

        if self.state == AgentState::Chase && previous != AgentState::Chase {
            // A path from an earlier chase is stale
            self.path.clear();
            self.path_timer = 0;
            self.route_found = false;
        }
    }

    /// Follows the planned path toward the target.
    ///
    /// With at most one waypoint left the agent is next to the goal cell and
    /// steers straight at the target instead.
    fn handle_chase(&mut self, target: Vec2, walls: &[Rect], pathfinder: &Pathfinder) {
        self.path_timer = self.path_timer.saturating_sub(1);

        let waypoint_reached = self
            .path
            .next_waypoint()
            .map_or(true, |waypoint| self.has_reached(waypoint));

        if self.path_timer == 0 || waypoint_reached {
            self.replan(target, pathfinder);
        }

        while let Some(waypoint) = self.path.next_waypoint() {
            if !self.has_reached(waypoint) {
                break;
            }
            self.path.advance();
        }

        if !self.route_found {
            return;
        }

        let heading = match self.path.next_waypoint() {
            Some(waypoint) if self.path.len() > 1 => waypoint,
            _ => target,
        };

        let speed = self.profile.move_speed;
        self.body.move_toward(heading - self.body.position, speed, walls);
        trace!("Agent {} chasing toward {:?}", self.id, heading);
    }

    fn handle_attack(&mut self, direction: Vec2, walls: &[Rect]) {
        let lunge_speed = self.profile.move_speed * self.profile.lunge_multiplier;
        self.body.move_toward(direction, lunge_speed, walls);

        self.attack_timer = self.attack_timer.saturating_sub(1);
        if self.attack_timer == 0 {
            self.state = AgentState::Recover;
            self.recovery_timer = self.profile.max_recovery_time;
            debug!("Agent {} attack finished, recovering", self.id);
        }
    }

    fn handle_recover(&mut self) {
        self.recovery_timer = self.recovery_timer.saturating_sub(1);
    }

    fn replan(&mut self, target: Vec2, pathfinder: &Pathfinder) {
        let goal = target + self.profile.goal_offset;
        let found = pathfinder.find_path(self.body.position, goal);
        self.route_found = found.is_some();
        self.path = found.unwrap_or_default();
        self.path_timer = self.profile.path_recalculation_interval;
    }

    fn has_reached(&self, waypoint: Vec2) -> bool {
        self.body.position.distance(waypoint) < self.profile.waypoint_reach
    }

    /// Moves one unit along `push`, ignoring walls.
    pub(crate) fn nudge(&mut self, push: Vec2) {
        self.body.move_toward(push, 1.0, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::grid::GridMapper;
    use crate::utils::pathfinding::SearchLimits;

    fn open_pathfinder() -> Pathfinder {
        Pathfinder::new(GridMapper::new(48), SearchLimits::default(), &[])
    }

    fn test_profile() -> AgentProfile {
        AgentProfile {
            detection_range: 600.0,
            attack_range: 200.0,
            ..AgentProfile::dog()
        }
    }

    #[test]
    fn test_agent_creation() {
        let agent = Agent::new(AgentKind::Dog, Vec2::new(200.0, 100.0));
        assert_eq!(agent.state(), AgentState::Idle);
        assert_eq!(agent.position(), Vec2::new(200.0, 100.0));
        assert_eq!(agent.body().width, 24.0);
        assert!(agent.path().is_empty());
    }

    #[test]
    fn test_idle_holds_position() {
        let pathfinder = open_pathfinder();
        let mut agent = Agent::with_profile(AgentKind::Dog, test_profile(), Vec2::new(0.0, 0.0));

        for _ in 0..10 {
            assert_eq!(agent.update(Vec2::new(1000.0, 0.0), &[], &pathfinder), AgentState::Idle);
        }
        assert_eq!(agent.position(), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_chase_plans_and_moves() {
        let pathfinder = open_pathfinder();
        let mut agent = Agent::with_profile(AgentKind::Dog, test_profile(), Vec2::new(0.0, 0.0));

        assert_eq!(agent.update(Vec2::new(500.0, 0.0), &[], &pathfinder), AgentState::Chase);
        assert!(!agent.path().is_empty());
        assert!(agent.position().x > 0.0);
        assert!((agent.position().distance(Vec2::ZERO) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_attack_lunges_at_raw_target() {
        let pathfinder = open_pathfinder();
        let mut agent = Agent::with_profile(AgentKind::Dog, test_profile(), Vec2::new(0.0, 0.0));

        assert_eq!(agent.update(Vec2::new(100.0, 0.0), &[], &pathfinder), AgentState::Attack);
        assert!((agent.position().x - 3.0).abs() < 1e-9);
        assert_eq!(agent.position().y, 0.0);
        assert_eq!(agent.attack_timer(), agent.profile().max_attack_duration - 1);
    }

    #[test]
    fn test_attack_cannot_end_early() {
        let pathfinder = open_pathfinder();
        let profile = test_profile();
        let duration = profile.max_attack_duration;
        let mut agent = Agent::with_profile(AgentKind::Dog, profile, Vec2::new(0.0, 0.0));

        assert_eq!(agent.update(Vec2::new(100.0, 0.0), &[], &pathfinder), AgentState::Attack);

        // Target leaves every range; the attack still runs to completion
        for _ in 1..duration - 1 {
            assert_eq!(agent.update(Vec2::new(4000.0, 0.0), &[], &pathfinder), AgentState::Attack);
        }
        assert_eq!(agent.update(Vec2::new(4000.0, 0.0), &[], &pathfinder), AgentState::Recover);
        assert_eq!(agent.recovery_timer(), agent.profile().max_recovery_time);
    }

    #[test]
    fn test_recover_then_idle() {
        let pathfinder = open_pathfinder();
        let profile = AgentProfile {
            max_attack_duration: 2,
            max_recovery_time: 3,
            ..test_profile()
        };
        let mut agent = Agent::with_profile(AgentKind::Dog, profile, Vec2::new(0.0, 0.0));
        let far = Vec2::new(4000.0, 0.0);

        let states: Vec<AgentState> = std::iter::once(agent.update(Vec2::new(50.0, 0.0), &[], &pathfinder))
            .chain((0..5).map(|_| agent.update(far, &[], &pathfinder)))
            .collect();

        assert_eq!(
            states,
            vec![
                AgentState::Attack,
                AgentState::Recover,
                AgentState::Recover,
                AgentState::Recover,
                AgentState::Recover,
                AgentState::Idle,
            ]
        );
    }

    #[test]
    fn test_recover_does_not_move() {
        let pathfinder = open_pathfinder();
        let profile = AgentProfile {
            max_attack_duration: 1,
            ..test_profile()
        };
        let mut agent = Agent::with_profile(AgentKind::Dog, profile, Vec2::new(0.0, 0.0));

        assert_eq!(agent.update(Vec2::new(100.0, 0.0), &[], &pathfinder), AgentState::Recover);
        let resting = agent.position();
        assert_eq!(agent.update(Vec2::new(100.0, 0.0), &[], &pathfinder), AgentState::Recover);
        assert_eq!(agent.position(), resting);
    }

    #[test]
    fn test_unreachable_target_holds_position() {
        // Ring of walls around the target's cell block
        let walls = [
            Rect::new(480.0, 480.0, 240.0, 48.0),
            Rect::new(480.0, 672.0, 240.0, 48.0),
            Rect::new(480.0, 480.0, 48.0, 240.0),
            Rect::new(672.0, 480.0, 48.0, 240.0),
        ];
        let pathfinder = Pathfinder::new(GridMapper::new(48), SearchLimits::new(20, 20), &walls);
        let mut agent = Agent::with_profile(AgentKind::Dog, test_profile(), Vec2::new(300.0, 300.0));

        // Target body center lands inside the ring
        let target = Vec2::new(600.0 - 24.0, 600.0 - 46.0);
        assert_eq!(agent.update(target, &walls, &pathfinder), AgentState::Chase);
        assert!(agent.path().is_empty());
        assert_eq!(agent.position(), Vec2::new(300.0, 300.0));
    }

    #[test]
    fn test_replans_on_interval() {
        let pathfinder = open_pathfinder();
        let interval = test_profile().path_recalculation_interval;
        let mut agent = Agent::with_profile(AgentKind::Dog, test_profile(), Vec2::new(0.0, 0.0));

        agent.update(Vec2::new(500.0, 0.0), &[], &pathfinder);
        let first_goal = Some(Vec2::new(504.0, 24.0));
        assert_eq!(agent.path().destination(), first_goal);

        // Target moves; the old path stands until the timer runs out
        let moved = Vec2::new(500.0, 300.0);
        for _ in 1..interval {
            assert_eq!(agent.update(moved, &[], &pathfinder), AgentState::Chase);
            assert_eq!(agent.path().destination(), first_goal);
        }

        agent.update(moved, &[], &pathfinder);
        assert_eq!(agent.path().destination(), Some(Vec2::new(504.0, 360.0)));
    }

    #[test]
    fn test_reached_waypoint_is_popped() {
        let pathfinder = open_pathfinder();
        let target = Vec2::new(500.0, 0.0);
        let mut agent = Agent::with_profile(AgentKind::Dog, test_profile(), Vec2::new(0.0, 0.0));

        agent.update(target, &[], &pathfinder);
        let initial_len = agent.path().len();
        let first_waypoint = agent.current_waypoint();
        assert_eq!(first_waypoint, Some(Vec2::new(72.0, 24.0)));

        for _ in 0..60 {
            agent.update(target, &[], &pathfinder);
        }

        assert!(agent.path().len() < initial_len);
        assert_ne!(agent.current_waypoint(), first_waypoint);
        let waypoint = agent.current_waypoint().unwrap();
        assert!(agent.position().distance(waypoint) >= agent.profile().waypoint_reach);
    }

    #[test]
    fn test_default_dog_closes_to_attack() {
        let pathfinder = open_pathfinder();
        let target = Vec2::new(500.0, 500.0);
        let spawns = [
            Vec2::new(300.0, 500.0),
            Vec2::new(500.0, 700.0),
            Vec2::new(700.0, 500.0),
            Vec2::new(500.0, 300.0),
            Vec2::new(350.0, 350.0),
            Vec2::new(650.0, 650.0),
        ];

        for spawn in spawns {
            let mut agent = Agent::new(AgentKind::Dog, spawn);
            let attacked = (0..3000).any(|_| agent.update(target, &[], &pathfinder) == AgentState::Attack);
            assert!(attacked, "dog from {:?} stalled at {:?}", spawn, agent.position());
        }
    }

    #[test]
    fn test_state_names() {
        assert_eq!(AgentState::Recover.to_string(), "recover");
        assert_eq!(serde_json::to_string(&AgentState::Chase).unwrap(), "\"chase\"");
    }
}
