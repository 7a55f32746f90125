//! Firing solution geometry.
//!
//! Everything here is a pure function of a segment's endpoints, its length in
//! meters and the terrain altitude difference between its ends.

#[cfg(test)]
#[path = "ballistics_test.rs"]
mod ballistics_test;

use std::f64::consts::{FRAC_PI_2, PI};

use serde::Serialize;

use crate::camera::Point;
use crate::consts::{GRAVITY, MILS_PER_CIRCLE, VELOCITY};

/// Round half toward positive infinity, matching how labels are displayed.
#[must_use]
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Elevation in mils that lands a shell `meters` away at `alt_delta` meters
/// above the gun. Uses the high-angle solution.
///
/// Returns NaN when the target is out of range.
#[must_use]
pub fn mils_from_range_and_altitude(meters: f64, alt_delta: f64) -> f64 {
    let v2 = VELOCITY * VELOCITY;
    let v4 = v2 * v2;
    let radicand = v4 - GRAVITY * (GRAVITY * meters * meters + 2.0 * alt_delta * v2);
    let p = radicand.sqrt();
    let angle = ((v2 + p) / (GRAVITY * meters)).atan();
    angle * 180.0 / PI / (360.0 / MILS_PER_CIRCLE)
}

/// A firing elevation, or the explicit out-of-range condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "mils", rename_all = "snake_case")]
pub enum Elevation {
    Mils(f64),
    OutOfRange,
}

impl Elevation {
    #[must_use]
    pub fn solve(meters: f64, alt_delta: f64) -> Self {
        let mils = mils_from_range_and_altitude(meters, alt_delta);
        if mils.is_nan() { Self::OutOfRange } else { Self::Mils(mils) }
    }
}

/// Raw angle of the segment, measured from `p1` toward `p0`.
#[must_use]
pub fn segment_angle(p0: Point, p1: Point) -> f64 {
    (p0.y - p1.y).atan2(p0.x - p1.x)
}

/// Compass bearings in degrees, 0 at map up, both in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bearings {
    pub forward: f64,
    pub backward: f64,
}

impl Bearings {
    #[must_use]
    pub fn from_angle(angle: f64) -> Self {
        let mut forward = angle.to_degrees();
        if forward > 0.0 {
            forward -= 90.0;
            if forward < 0.0 {
                forward += 360.0;
            }
        } else {
            forward += 270.0;
        }
        // Adding 360 to a tiny negative rounds up to 360 itself.
        if forward >= 360.0 {
            forward -= 360.0;
        }
        Self { forward, backward: (forward + 180.0) % 360.0 }
    }
}

/// Whether the segment points into the right half-plane, which swaps which
/// label reads forward.
#[must_use]
pub fn is_flipped(angle: f64) -> bool {
    (-FRAC_PI_2..=FRAC_PI_2).contains(&angle)
}

/// Label baseline rotation, folded so text is never drawn upside down.
#[must_use]
pub fn text_angle(angle: f64) -> f64 {
    if angle >= FRAC_PI_2 {
        angle - PI
    } else if angle <= -FRAC_PI_2 {
        angle + PI
    } else {
        angle
    }
}

/// One side's firing data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DirectionLabel {
    pub bearing: f64,
    pub elevation: Elevation,
    pub alt_delta: f64,
}

impl DirectionLabel {
    fn solve(bearing: f64, meters: f64, alt_delta: f64) -> Self {
        Self { bearing, elevation: Elevation::solve(meters, alt_delta), alt_delta }
    }
}

/// Firing data for both ends of a segment, keyed by which side of the
/// rotated baseline it is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiringLabels {
    /// Drawn left of the midpoint, pointing left.
    pub leftward: DirectionLabel,
    /// Drawn right of the midpoint, pointing right.
    pub rightward: DirectionLabel,
}

impl FiringLabels {
    /// `alt_delta` is the altitude of `p1` minus that of `p0`.
    #[must_use]
    pub fn solve(angle: f64, meters: f64, alt_delta: f64) -> Self {
        let bearings = Bearings::from_angle(angle);
        let forward = DirectionLabel::solve(bearings.forward, meters, alt_delta);
        let backward = DirectionLabel::solve(bearings.backward, meters, -alt_delta);
        if is_flipped(angle) {
            Self { leftward: forward, rightward: backward }
        } else {
            Self { leftward: backward, rightward: forward }
        }
    }
}
