//! Circle vs axis-aligned rectangle overlap
//!
//! The only collision primitive the game needs: the bird is a circle, pipes
//! are rectangles described by their center and size.

use glam::Vec2;

/// Axis-aligned rectangle described by its center and full size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.size * 0.5
    }

    /// Point inside (or on) the rectangle closest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    #[inline]
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        circle_intersects_rect(center, radius, self.center, self.size)
    }
}

/// Check whether a circle overlaps a rectangle centered at `rect_center`
///
/// Clamps the circle center onto the rectangle to find the nearest point and
/// compares the squared distance against `radius²`. Touching is not overlap.
#[inline]
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect_center: Vec2, rect_size: Vec2) -> bool {
    let half = rect_size * 0.5;
    let nearest = center.clamp(rect_center - half, rect_center + half);
    center.distance_squared(nearest) < radius * radius
}
