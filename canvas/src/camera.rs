//! Zoom/pan viewport and the affine transform between map and screen space.
//!
//! The map image is letterboxed into the window, then optionally magnified
//! toward a zoom anchor and shifted by a pan offset. The resulting transform
//! is memoized and dropped on every state mutation, so callers always go
//! through [`Viewport::transform`] and never hold a copy across a change.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::cell::Cell;

use serde::Serialize;

use crate::consts::{MAX_ZOOM, PAN_ACCELERATION, ZOOM_LEVELS};

/// A point in either screen or map space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance to `other`.
    #[must_use]
    pub fn distance_sq(self, other: Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Map-to-screen affine transform with independent axis scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub top_left: Point,
}

impl Transform {
    const IDENTITY: Transform = Transform { scale_x: 1.0, scale_y: 1.0, top_left: Point { x: 0.0, y: 0.0 } };

    /// Map-space point to screen pixels.
    #[must_use]
    pub fn forward(&self, map: Point) -> Point {
        Point::new(self.forward_x(map.x), self.forward_y(map.y))
    }

    /// Screen pixels to map-space point.
    #[must_use]
    pub fn inverse(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.top_left.x) / self.scale_x,
            (screen.y - self.top_left.y) / self.scale_y,
        )
    }

    #[must_use]
    pub fn forward_x(&self, x: f64) -> f64 {
        x * self.scale_x + self.top_left.x
    }

    #[must_use]
    pub fn forward_y(&self, y: f64) -> f64 {
        y * self.scale_y + self.top_left.y
    }
}

/// Zoom level, anchor and pan state plus the memoized transform.
///
/// `pan_offset` is in map-canvas pixels and only has meaning while zoomed;
/// dropping back to level 0 always clears it.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    map: Size,
    window: Size,
    zoom_level: u32,
    zoom_anchor: Point,
    pan_offset: Point,
    /// Screen position of the previous pan event while the pan button is held.
    pan_start: Option<Point>,
    cached: Cell<Option<Transform>>,
}

impl Viewport {
    #[must_use]
    pub fn new(window: Size) -> Self {
        Self { window, ..Self::default() }
    }

    // --- Queries ---

    #[must_use]
    pub fn zoom_level(&self) -> u32 {
        self.zoom_level
    }

    #[must_use]
    pub fn zoom_anchor(&self) -> Point {
        self.zoom_anchor
    }

    #[must_use]
    pub fn pan_offset(&self) -> Point {
        self.pan_offset
    }

    #[must_use]
    pub fn is_zoomed(&self) -> bool {
        self.zoom_level != 0
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.pan_start.is_some()
    }

    #[must_use]
    pub fn window(&self) -> Size {
        self.window
    }

    #[must_use]
    pub fn map_size(&self) -> Size {
        self.map
    }

    /// The current map-to-screen transform, recomputed after any mutation.
    #[must_use]
    pub fn transform(&self) -> Transform {
        if let Some(transform) = self.cached.get() {
            return transform;
        }
        let transform = self.compute();
        self.cached.set(Some(transform));
        transform
    }

    #[must_use]
    pub fn forward(&self, map: Point) -> Point {
        self.transform().forward(map)
    }

    #[must_use]
    pub fn inverse(&self, screen: Point) -> Point {
        self.transform().inverse(screen)
    }

    // --- Mutations ---

    pub fn resize(&mut self, window: Size) {
        self.window = window;
        self.invalidate();
    }

    pub fn set_map_size(&mut self, map: Size) {
        self.map = map;
        self.invalidate();
    }

    /// Step one zoom level in toward `pointer`. Returns `false` at the limit.
    ///
    /// Entering zoom from level 0 anchors exactly on the pointer; further
    /// steps move the anchor halfway toward it.
    pub fn zoom_in(&mut self, pointer: Point) -> bool {
        if self.zoom_level >= ZOOM_LEVELS {
            return false;
        }
        let from_zero = self.zoom_level == 0;
        self.zoom_level += 1;

        let fraction = self.pointer_fraction(pointer);
        self.zoom_anchor = if from_zero { fraction } else { self.zoom_anchor.midpoint(fraction) };

        self.invalidate();
        true
    }

    /// Step one zoom level out. Reaching level 0 drops any pan.
    pub fn zoom_out(&mut self) -> bool {
        if self.zoom_level == 0 {
            return false;
        }
        self.zoom_level -= 1;
        if self.zoom_level == 0 {
            self.pan_start = None;
            self.pan_offset = Point::default();
        }
        self.invalidate();
        true
    }

    /// Wheel input: scrolling up (negative delta) zooms in, anything else out.
    pub fn on_wheel(&mut self, delta_y: f64, pointer: Point) -> bool {
        if -delta_y > 0.0 { self.zoom_in(pointer) } else { self.zoom_out() }
    }

    /// Track the pointer while the pan button may be held.
    ///
    /// While zoomed and `held`, each move adds the accelerated delta from the
    /// previous position to the pan offset. Releasing ends the pan. Returns
    /// whether the transform changed.
    pub fn drag_pan(&mut self, pointer: Point, held: bool) -> bool {
        if self.is_zoomed() && held {
            if let Some(start) = self.pan_start {
                self.pan_offset.x += (pointer.x - start.x) * PAN_ACCELERATION;
                self.pan_offset.y += (pointer.y - start.y) * PAN_ACCELERATION;
            }
            self.pan_start = Some(pointer);
            self.invalidate();
            true
        } else if self.pan_start.is_some() {
            self.end_pan();
            true
        } else {
            false
        }
    }

    pub fn end_pan(&mut self) {
        self.pan_start = None;
        self.invalidate();
    }

    // --- Internals ---

    fn invalidate(&self) {
        self.cached.set(None);
    }

    fn pointer_fraction(&self, pointer: Point) -> Point {
        if self.window.is_empty() {
            return Point::default();
        }
        Point::new(
            (pointer.x / self.window.width).min(1.0),
            (pointer.y / self.window.height).min(1.0),
        )
    }

    fn compute(&self) -> Transform {
        // No map or no window yet: nothing sensible to fit.
        if self.map.is_empty() || self.window.is_empty() {
            return Transform::IDENTITY;
        }

        let map_aspect = self.map.width / self.map.height;
        let window_aspect = self.window.width / self.window.height;

        let mut size = if window_aspect > map_aspect {
            Size::new(self.window.height * map_aspect, self.window.height)
        } else {
            Size::new(self.window.width, self.window.width * (self.map.height / self.map.width))
        };

        let mut top_left = Point::new(
            (self.window.width - size.width) / 2.0,
            (self.window.height - size.height) / 2.0,
        );

        if self.is_zoomed() {
            let zoom_amount = (f64::from(self.zoom_level) / f64::from(ZOOM_LEVELS)).min(1.0) * MAX_ZOOM;

            top_left.x -= self.zoom_anchor.x * size.width * zoom_amount;
            top_left.y -= self.zoom_anchor.y * size.height * zoom_amount;

            // Pan distance scales with the fitted size, not the zoomed one.
            top_left.x += self.pan_offset.x * (size.width / self.map.width);
            top_left.y += self.pan_offset.y * (size.height / self.map.height);

            size.width *= zoom_amount + 1.0;
            size.height *= zoom_amount + 1.0;
        }

        Transform {
            scale_x: size.width / self.map.width,
            scale_y: size.height / self.map.height,
            top_left,
        }
    }
}
