//! # Camera
//!
//! Deadzone camera: the view only scrolls once the followed point leaves a
//! box in the middle of the screen, and never shows space past the map edge.

use crate::utils::math::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Default deadzone width in pixels.
pub const DEFAULT_DEADZONE_WIDTH: f64 = 400.0;

/// Default deadzone height in pixels.
pub const DEFAULT_DEADZONE_HEIGHT: f64 = 300.0;

/// Scrolling view over the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World position of the view's top-left corner
    pub offset: Vec2,
    /// View width in pixels
    pub view_width: f64,
    /// View height in pixels
    pub view_height: f64,
    /// Deadzone box in screen space
    pub deadzone: Rect,
}

impl Camera {
    /// Creates a camera at the origin with the default deadzone centered in the view.
    pub fn new(view_width: f64, view_height: f64) -> Self {
        Self::with_deadzone(view_width, view_height, DEFAULT_DEADZONE_WIDTH, DEFAULT_DEADZONE_HEIGHT)
    }

    /// Creates a camera with a custom deadzone size, centered in the view.
    pub fn with_deadzone(view_width: f64, view_height: f64, deadzone_width: f64, deadzone_height: f64) -> Self {
        Self {
            offset: Vec2::ZERO,
            view_width,
            view_height,
            deadzone: Rect::new(
                ((view_width - deadzone_width) / 2.0).floor(),
                ((view_height - deadzone_height) / 2.0).floor(),
                deadzone_width,
                deadzone_height,
            ),
        }
    }

    /// Scrolls so that `focus` (world space) is back inside the deadzone, then
    /// clamps the view to a map of `map_width` by `map_height` pixels.
    ///
    /// # Examples
    ///
    /// ```
    /// use pythy::{Camera, Vec2};
    ///
    /// let mut camera = Camera::new(1440.0, 960.0);
    /// camera.follow(Vec2::new(720.0, 480.0), 4800.0, 4800.0);
    /// assert_eq!(camera.offset, Vec2::ZERO);
    ///
    /// camera.follow(Vec2::new(1500.0, 480.0), 4800.0, 4800.0);
    /// assert_eq!(camera.offset.x, 1500.0 - 920.0);
    /// ```
    pub fn follow(&mut self, focus: Vec2, map_width: f64, map_height: f64) {
        let screen = self.apply(focus);

        if screen.x < self.deadzone.x {
            self.offset.x = focus.x - self.deadzone.x;
        } else if screen.x > self.deadzone.right() {
            self.offset.x = focus.x - self.deadzone.right();
        }

        if screen.y < self.deadzone.y {
            self.offset.y = focus.y - self.deadzone.y;
        } else if screen.y > self.deadzone.bottom() {
            self.offset.y = focus.y - self.deadzone.bottom();
        }

        self.offset.x = self.offset.x.min(map_width - self.view_width).max(0.0);
        self.offset.y = self.offset.y.min(map_height - self.view_height).max(0.0);
    }

    /// Converts a world position to screen space.
    pub fn apply(&self, point: Vec2) -> Vec2 {
        point - self.offset
    }

    /// Converts a world rectangle to screen space.
    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        Rect::from_origin(self.apply(Vec2::new(rect.x, rect.y)), rect.width, rect.height)
    }
}
