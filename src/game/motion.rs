//! # Motion
//!
//! Axis-separated movement with wall collision for anything with a box.

use crate::utils::math::{Rect, Vec2};
use log::trace;
use serde::{Deserialize, Serialize};

/// A moving box in world space.
///
/// `position` is the top-left corner of the box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub width: f64,
    pub height: f64,
}

impl Body {
    /// Creates a body at `position` with the given size.
    pub fn new(position: Vec2, width: f64, height: f64) -> Self {
        Self {
            position,
            width,
            height,
        }
    }

    /// The body's bounding box at its current position.
    pub fn rect(&self) -> Rect {
        Rect::from_origin(self.position, self.width, self.height)
    }

    /// Center of the body's bounding box.
    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    /// Checks whether the body overlaps any of `walls`.
    pub fn collides_with(&self, walls: &[Rect]) -> bool {
        let rect = self.rect();
        walls.iter().any(|wall| rect.intersects(wall))
    }

    /// Checks whether two bodies overlap.
    pub fn overlaps(&self, other: &Body) -> bool {
        self.rect().intersects(&other.rect())
    }

    /// Moves by a raw displacement, resolving each axis separately.
    ///
    /// The horizontal step is applied first and undone entirely if the box then
    /// overlaps a wall; the vertical step follows with the same rule. A blocked
    /// axis never moves partially, while the other axis can still slide along
    /// the wall.
    pub fn move_by(&mut self, delta: Vec2, walls: &[Rect]) {
        if delta.x != 0.0 {
            self.position.x += delta.x;
            if self.collides_with(walls) {
                self.position.x -= delta.x;
                trace!("Horizontal move blocked at {:?}", self.position);
            }
        }

        if delta.y != 0.0 {
            self.position.y += delta.y;
            if self.collides_with(walls) {
                self.position.y -= delta.y;
                trace!("Vertical move blocked at {:?}", self.position);
            }
        }
    }

    /// Moves `speed` units along `direction`, resolving collisions like [`Body::move_by`].
    ///
    /// A zero-length direction leaves the body where it is.
    ///
    /// # Examples
    ///
    /// ```
    /// use pythy::{Body, Rect, Vec2};
    ///
    /// let mut body = Body::new(Vec2::new(100.0, 100.0), 24.0, 16.0);
    /// let wall = Rect::new(120.0, 100.0, 50.0, 150.0);
    ///
    /// body.move_toward(Vec2::new(10.0, 0.0), 10.0, &[wall]);
    /// assert_eq!(body.position.x, 100.0);
    /// ```
    pub fn move_toward(&mut self, direction: Vec2, speed: f64, walls: &[Rect]) {
        if let Some(unit) = direction.normalized() {
            self.move_by(unit * speed, walls);
        }
    }
}
