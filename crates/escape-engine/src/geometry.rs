//! Polyline and circle hit-testing in world coordinates.

use glam::Vec2;

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// An open polyline: consecutive points joined by straight segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Vec2>,
}

impl Polyline {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Build from `[x, y]` pairs.
    pub fn from_pairs(pairs: &[[f32; 2]]) -> Self {
        Self::new(pairs.iter().map(|&[x, y]| Vec2::new(x, y)).collect())
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Shift every point by `offset`.
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.points.iter().map(|&p| p + offset).collect())
    }

    /// Minimum distance from `p` to any segment. A single point degenerates
    /// to point distance; an empty polyline is infinitely far away.
    pub fn distance_to(&self, p: Vec2) -> f32 {
        match self.points.as_slice() {
            [] => f32::INFINITY,
            [only] => p.distance(*only),
            pts => pts
                .windows(2)
                .map(|w| distance_to_segment(p, w[0], w[1]))
                .fold(f32::INFINITY, f32::min),
        }
    }

    /// True if `p` lies within `half_width` of the centerline.
    pub fn within(&self, p: Vec2, half_width: f32) -> bool {
        self.distance_to(p) <= half_width
    }
}

/// A circular region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.distance_squared(self.center) <= self.radius * self.radius
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.center + offset, self.radius)
    }
}
