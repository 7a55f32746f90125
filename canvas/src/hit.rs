#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Point, Size, Transform};
use crate::consts::{HOVER_TOLERANCE_REFERENCE, HOVER_TOLERANCE_SCALE};
use crate::doc::Marker;

/// Whether `c` lies on segment `a`-`b`.
///
/// `tolerance` bounds the cross product, so it grows with segment length as
/// well as with distance from the line.
#[must_use]
pub fn is_point_on_line(a: Point, b: Point, c: Point, tolerance: f64) -> bool {
    let cross = (c.y - a.y) * (b.x - a.x) - (c.x - a.x) * (b.y - a.y);
    if cross.abs() > tolerance {
        return false;
    }

    let dot = (c.x - a.x) * (b.x - a.x) + (c.y - a.y) * (b.y - a.y);
    if dot < 0.0 {
        return false;
    }

    dot <= a.distance_sq(b)
}

/// Hover tolerance for the given window size.
#[must_use]
pub fn hover_tolerance(window: Size) -> f64 {
    ((window.width * window.height).sqrt() / HOVER_TOLERANCE_REFERENCE) * HOVER_TOLERANCE_SCALE
}

/// Index of the first custom marker under `screen`, tested in screen space.
#[must_use]
pub fn hovered_custom_marker(transform: &Transform, custom: &[Marker], window: Size, screen: Point) -> Option<usize> {
    let tolerance = hover_tolerance(window);
    custom
        .iter()
        .position(|m| is_point_on_line(transform.forward(m.p0), transform.forward(m.p1), screen, tolerance))
}
