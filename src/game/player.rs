//! # Player
//!
//! The player character as the enemy simulation sees it: a box that moves
//! with wall collision, takes contact damage and flashes through a window of
//! invincibility frames afterwards.

use crate::config::{
    DEFAULT_PLAYER_HEALTH, DEFAULT_PLAYER_INVINCIBILITY_TICKS, DEFAULT_PLAYER_SPEED,
};
use crate::game::motion::Body;
use crate::utils::math::{Rect, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};

/// Player body width in pixels.
pub const PLAYER_WIDTH: f64 = 48.0;

/// Player body height in pixels.
pub const PLAYER_HEIGHT: f64 = 92.0;

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Position and size
    pub body: Body,
    /// Pixels moved per tick for each held direction
    pub move_speed: f64,
    /// Current health
    pub health: u32,
    /// Health cap for healing
    pub max_health: u32,
    /// Whether damage is currently ignored
    pub invincible: bool,
    /// Remaining invincibility ticks
    pub invincibility_timer: u32,
    /// Invincibility ticks granted by each hit
    pub invincibility_duration: u32,
}

impl Player {
    /// Creates a player at `spawn` with full health.
    ///
    /// # Examples
    ///
    /// ```
    /// use pythy::{Player, Vec2};
    ///
    /// let player = Player::new(Vec2::new(256.0, 144.0));
    /// assert_eq!(player.health, 100);
    /// assert!(player.is_alive());
    /// ```
    pub fn new(spawn: Vec2) -> Self {
        Self {
            body: Body::new(spawn, PLAYER_WIDTH, PLAYER_HEIGHT),
            move_speed: DEFAULT_PLAYER_SPEED,
            health: DEFAULT_PLAYER_HEALTH,
            max_health: DEFAULT_PLAYER_HEALTH,
            invincible: false,
            invincibility_timer: 0,
            invincibility_duration: DEFAULT_PLAYER_INVINCIBILITY_TICKS,
        }
    }

    /// Top-left corner of the player's body.
    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Center of the player's body.
    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Moves by a raw displacement with separate-axis wall collision.
    pub fn move_by(&mut self, delta: Vec2, walls: &[Rect]) {
        self.body.move_by(delta, walls);
    }

    /// Counts down invincibility frames. Call once per tick.
    pub fn update(&mut self) {
        if self.invincibility_timer > 0 {
            self.invincibility_timer -= 1;
            self.invincible = true;
        } else {
            self.invincible = false;
        }
    }

    /// Applies damage unless invincible and starts the invincibility window.
    ///
    /// Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        if self.invincible {
            return 0;
        }

        let taken = amount.min(self.health);
        self.health -= taken;
        self.invincibility_timer = self.invincibility_duration;
        debug!("Player took {} damage, health {}", taken, self.health);
        taken
    }

    /// Restores health without exceeding the maximum.
    pub fn heal(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    /// Whether the player should be hidden this tick for the damage flash.
    pub fn is_flash_hidden(&self) -> bool {
        self.invincible && (self.invincibility_timer / 5) % 2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_movement() {
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        player.move_by(Vec2::new(10.0, 0.0), &[]);
        assert_eq!(player.position().x, 110.0);
    }

    #[test]
    fn test_player_collision_wall() {
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        let wall = Rect::new(120.0, 100.0, 50.0, 150.0);

        player.move_by(Vec2::new(10.0, 0.0), &[wall]);
        assert_eq!(player.position().x, 100.0);
    }

    #[test]
    fn test_player_take_damage() {
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        assert_eq!(player.take_damage(20), 20);
        assert_eq!(player.health, 80);
        assert_eq!(player.invincibility_timer, 150);
    }

    #[test]
    fn test_invincibility_frames() {
        let mut player = Player::new(Vec2::ZERO);
        player.take_damage(10);
        player.update();
        assert!(player.invincible);

        // Further hits are ignored while invincible
        assert_eq!(player.take_damage(10), 0);
        assert_eq!(player.health, 90);

        for _ in 0..player.invincibility_duration {
            player.update();
        }
        assert!(!player.invincible);
        assert_eq!(player.take_damage(10), 10);
        assert_eq!(player.health, 80);
    }

    #[test]
    fn test_health_bounds() {
        let mut player = Player::new(Vec2::ZERO);
        assert_eq!(player.take_damage(250), 100);
        assert_eq!(player.health, 0);
        assert!(!player.is_alive());

        player.heal(30);
        assert_eq!(player.health, 30);
        player.heal(500);
        assert_eq!(player.health, player.max_health);
    }
}
