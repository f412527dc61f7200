//! Collision queries between the ball and world geometry
//!
//! Pure functions only: the per-kind collision *responses* live in `tick`,
//! which calls these predicates while scanning the platform list.

use glam::Vec2;

use super::platform::Rect;

/// Closest point on a rectangle to an arbitrary point
pub fn closest_point_on_rect(point: Vec2, rect: &Rect) -> Vec2 {
    Vec2::new(
        point.x.clamp(rect.x, rect.right()),
        point.y.clamp(rect.y, rect.bottom()),
    )
}

/// Circle/rectangle overlap via the closest-point test (used for hazards,
/// which hurt from any side)
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = closest_point_on_rect(center, rect);
    center.distance_squared(closest) <= radius * radius
}

/// Horizontal overlap between the ball and a platform
pub fn overlaps_horizontally(center: Vec2, radius: f32, rect: &Rect) -> bool {
    center.x + radius > rect.x && center.x - radius < rect.right()
}

/// Landing predicate: a descending ball whose bottom edge is at (or just
/// above) the platform top this tick and would cross it with its current
/// velocity. Holds every tick while the ball rests on the platform, since a
/// resting ball has dy == 0 with its bottom edge exactly on the top.
pub fn landing_on_top(center: Vec2, vel: Vec2, radius: f32, rect: &Rect) -> bool {
    vel.y >= 0.0
        && overlaps_horizontally(center, radius, rect)
        && center.y + radius <= rect.y + 1.5
        && center.y + radius + vel.y >= rect.y
}
