//! Terrain elevation sampling.
//!
//! The heightmap grid covers the minimap footprint on the map, shifted by its
//! own alignment offset. Map-space points are carried into grid space through
//! the current screen transform, so the sampler always agrees with what the
//! operator sees.

#[cfg(test)]
#[path = "heightmap_test.rs"]
mod heightmap_test;

use frames::{HeightmapGrid, MinimapBounds};

use crate::ballistics::round_half_up;
use crate::camera::{Point, Transform};
use crate::consts::{HEIGHTMAP_SAMPLE_MAX, HEIGHTMAP_SCALE_UNIT};

/// Row-major elevation grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    width: usize,
    height: usize,
    offset: [f64; 2],
    scale: f64,
    samples: Vec<u16>,
}

impl From<HeightmapGrid> for Heightmap {
    fn from(grid: HeightmapGrid) -> Self {
        Self {
            width: usize::try_from(grid.width).unwrap_or(0),
            height: usize::try_from(grid.height).unwrap_or(0),
            offset: [f64::from(grid.offset[0]), f64::from(grid.offset[1])],
            scale: f64::from(grid.scale),
            samples: grid.samples,
        }
    }
}

impl Heightmap {
    /// Grid width in cells (test-only accessor).
    #[cfg(test)]
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    /// Raw sample at grid cell `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn sample(&self, x: usize, y: usize) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(y * self.width + x).copied()
    }

    /// Convert a raw sample to meters.
    #[must_use]
    pub fn altitude(&self, raw: u16) -> f64 {
        (f64::from(raw) / HEIGHTMAP_SAMPLE_MAX) * (self.scale / HEIGHTMAP_SCALE_UNIT)
    }

    /// Round a fractional grid position to the nearest in-bounds cell.
    fn cell(&self, grid: Point) -> Option<(usize, usize)> {
        let x = round_half_up(grid.x);
        let y = round_half_up(grid.y);
        #[allow(clippy::cast_precision_loss)]
        let in_bounds = x >= 0.0 && y >= 0.0 && x < self.width as f64 && y < self.height as f64;
        if !in_bounds {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let cell = (x as usize, y as usize);
        Some(cell)
    }
}

/// Where the heightmap footprint sits on the map, in map pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapViewport {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl From<MinimapBounds> for MinimapViewport {
    fn from(bounds: MinimapBounds) -> Self {
        Self {
            left: f64::from(bounds.left),
            top: f64::from(bounds.top),
            right: f64::from(bounds.right),
            bottom: f64::from(bounds.bottom),
        }
    }
}

/// Terrain-derived altitude difference and distance between two map points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeSample {
    /// Altitude of `p1` minus altitude of `p0`, rounded to whole meters.
    pub delta_meters: i64,
    /// Unrounded distance in grid cells, one cell per meter.
    pub distance_meters: f64,
}

/// Sample the terrain under both ends of a map-space segment.
///
/// Returns `None` when either end rounds to a cell outside the grid.
#[must_use]
pub fn altitude_delta(
    heightmap: &Heightmap,
    transform: &Transform,
    minimap: &MinimapViewport,
    p0: Point,
    p1: Point,
) -> Option<AltitudeSample> {
    let s0 = transform.forward(p0);
    let s1 = transform.forward(p1);

    #[allow(clippy::cast_precision_loss)]
    let (grid_w, grid_h) = (heightmap.width as f64, heightmap.height as f64);

    let hm_scale_w = (minimap.right - minimap.left) / (grid_w + heightmap.offset[0]);
    let hm_scale_h = (minimap.bottom - minimap.top) / (grid_h + heightmap.offset[1]);
    let offset = Point::new(
        heightmap.offset[0] * hm_scale_w * transform.scale_x,
        heightmap.offset[1] * hm_scale_h * transform.scale_y,
    );

    let left = transform.forward_x(minimap.left) + offset.x;
    let top = transform.forward_y(minimap.top) + offset.y;
    let right = transform.forward_x(minimap.right);
    let bottom = transform.forward_y(minimap.bottom);

    let to_grid = |s: Point| {
        Point::new(
            (s.x - left) / (right - left) * grid_w,
            (s.y - top) / (bottom - top) * grid_h,
        )
    };
    let g0 = to_grid(s0);
    let g1 = to_grid(s1);

    let distance_meters = g0.distance_sq(g1).sqrt();

    let (x0, y0) = heightmap.cell(g0)?;
    let (x1, y1) = heightmap.cell(g1)?;
    let alt0 = heightmap.altitude(heightmap.sample(x0, y0)?);
    let alt1 = heightmap.altitude(heightmap.sample(x1, y1)?);

    #[allow(clippy::cast_possible_truncation)]
    let delta_meters = round_half_up(alt1 - alt0) as i64;

    Some(AltitudeSample { delta_meters, distance_meters })
}
