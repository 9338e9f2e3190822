//! Circle-circle intersection
//!
//! Every collision and every echo band is decided by this one primitive.

use glam::Vec2;

/// Outcome of intersecting two circles
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircleIntersection {
    /// Centers are farther apart than the sum of the radii
    Disjoint,
    /// One circle lies inside the other (or the centers coincide): they
    /// overlap, but their boundaries never cross
    Contained,
    /// Boundaries cross at two points (equal when tangent)
    Crossing([Vec2; 2]),
}

impl CircleIntersection {
    /// True for both overlapping outcomes
    #[inline]
    pub fn is_intersecting(&self) -> bool {
        !matches!(self, CircleIntersection::Disjoint)
    }

    /// Boundary crossing points, if any
    #[inline]
    pub fn points(&self) -> Option<[Vec2; 2]> {
        match self {
            CircleIntersection::Crossing(points) => Some(*points),
            _ => None,
        }
    }
}

/// Intersect circle (`c1`, `r0`) with circle (`c2`, `r1`)
///
/// Uses the radical-line construction: `a` is the distance from `c1` to the
/// chord midpoint along the center line, `h` the half-chord length.
/// Radii are not validated.
pub fn intersect_circles(c1: Vec2, r0: f32, c2: Vec2, r1: f32) -> CircleIntersection {
    let diff = c2 - c1;
    let distance_sq = diff.length_squared();
    let distance = distance_sq.sqrt();

    if distance > r0 + r1 {
        return CircleIntersection::Disjoint;
    }
    if distance < (r0 - r1).abs() || distance == 0.0 {
        return CircleIntersection::Contained;
    }

    let a = (r0 * r0 - r1 * r1 + distance_sq) / (2.0 * distance);
    // Near-tangent circles can push the radicand slightly negative
    let h = (r0 * r0 - a * a).max(0.0).sqrt();

    let dir = diff / distance;
    let base = c1 + dir * a;
    let perp = Vec2::new(dir.y, -dir.x) * h;

    CircleIntersection::Crossing([base + perp, base - perp])
}

/// Squared-distance overlap test used by the collision pass
#[inline]
pub fn circles_overlap(c1: Vec2, r0: f32, c2: Vec2, r1: f32) -> bool {
    let reach = r0 + r1;
    c1.distance_squared(c2) <= reach * reach
}
