//! Marker model and the two marker collections.
//!
//! Detected markers come from the producer's vision pass; custom markers are
//! drawn by the operator. Both collections are replaced wholesale by inbound
//! `Markers` events and never edited in place. A custom marker's index is its
//! deletion handle, so the order seen by hover detection must be the order the
//! producer holds.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use frames::{MarkerSet, Segment};
use serde::Serialize;

use crate::camera::Point;
use crate::consts::Color;

/// A line segment in map space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub p0: Point,
    pub p1: Point,
}

impl Marker {
    #[must_use]
    pub fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }

    /// Length in map pixels.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.p0.distance_sq(self.p1).sqrt()
    }

    /// Narrow to the wire representation.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_segment(&self) -> Segment {
        Segment::new(
            [self.p0.x as f32, self.p0.y as f32],
            [self.p1.x as f32, self.p1.y as f32],
        )
    }
}

impl From<Segment> for Marker {
    fn from(segment: Segment) -> Self {
        Self {
            p0: Point::new(f64::from(segment.p0[0]), f64::from(segment.p0[1])),
            p1: Point::new(f64::from(segment.p1[0]), f64::from(segment.p1[1])),
        }
    }
}

/// Ordered detected and custom marker collections.
#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    detected: Vec<Marker>,
    custom: Vec<Marker>,
}

impl MarkerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn detected(&self) -> &[Marker] {
        &self.detected
    }

    #[must_use]
    pub fn custom(&self) -> &[Marker] {
        &self.custom
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detected.is_empty() && self.custom.is_empty()
    }

    /// Replace one collection in full.
    pub fn replace(&mut self, set: MarkerSet, markers: Vec<Marker>) {
        match set {
            MarkerSet::Detected => self.detected = markers,
            MarkerSet::Custom => self.custom = markers,
        }
    }

    /// Drop detected markers; they belong to the map frame they were found in.
    pub fn clear_detected(&mut self) {
        self.detected.clear();
    }

    /// Remove the custom marker at `index`, keeping the others in order.
    ///
    /// A stale index leaves the collection untouched and returns `None`.
    pub fn delete_custom(&mut self, index: usize) -> Option<Marker> {
        if index >= self.custom.len() {
            tracing::warn!(index, len = self.custom.len(), "ignoring delete of unknown custom marker");
            return None;
        }
        Some(self.custom.remove(index))
    }
}

/// Red-to-green gradient over the detected markers, by position.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn detected_color(index: usize, len: usize) -> Color {
    if len == 0 {
        return [0, 255, 0];
    }
    let f = ((index + 1) as f64 / len as f64).clamp(0.0, 1.0);
    [((1.0 - f) * 255.0).round() as u8, (f * 255.0).round() as u8, 0]
}
