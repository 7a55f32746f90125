//! Shared numeric constants for the canvas crate.

// ── Viewport ────────────────────────────────────────────────────

/// Multiplier applied to pointer deltas while panning.
pub const PAN_ACCELERATION: f64 = 2.0;

/// Extra magnification at the deepest zoom level (5x total).
pub const MAX_ZOOM: f64 = 4.0;

/// Number of discrete zoom steps above the fitted view.
pub const ZOOM_LEVELS: u32 = 10;

// ── Input ───────────────────────────────────────────────────────

/// Minimum squared map-space length of a drawn segment (6 px).
pub const MOUSE_DRAG_THRESHOLD: f64 = 6.0 * 6.0;

/// Window diagonal-ish size the hover tolerance is calibrated against.
pub const HOVER_TOLERANCE_REFERENCE: f64 = 554.0;

/// Cross-product tolerance at the reference window size.
pub const HOVER_TOLERANCE_SCALE: f64 = 2000.0;

// ── Ballistics ──────────────────────────────────────────────────

/// Gravitational acceleration in m/s².
pub const GRAVITY: f64 = 9.8;

/// Projectile muzzle velocity in m/s.
pub const VELOCITY: f64 = 109.890938;

/// NATO mils in a full circle.
pub const MILS_PER_CIRCLE: f64 = 6400.0;

// ── Heightmap ───────────────────────────────────────────────────

/// Largest raw elevation sample.
pub const HEIGHTMAP_SAMPLE_MAX: f64 = 65535.0;

/// Divisor applied to the grid scale when converting samples to meters.
pub const HEIGHTMAP_SCALE_UNIT: f64 = 0.1953125;

// ── Colors ──────────────────────────────────────────────────────

/// RGB color handed to the renderer.
pub type Color = [u8; 3];

/// Operator-drawn markers.
pub const CUSTOM_MARKER_COLOR: Color = [255, 0, 255];

/// In-progress measurement preview.
pub const MEASURE_MARKER_COLOR: Color = [255, 0, 0];
