#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

/// 1000x500 map in a 1000x1000 window: fits horizontally, letterboxed vertically.
fn letterboxed() -> Viewport {
    let mut vp = Viewport::new(Size::new(1000.0, 1000.0));
    vp.set_map_size(Size::new(1000.0, 500.0));
    vp
}

// --- Point ---

#[test]
fn point_distance_and_midpoint() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(3.0, 4.0);
    assert_eq!(a.distance_sq(b), 25.0);
    assert_eq!(a.midpoint(b), Point::new(1.5, 2.0));
}

// --- Fit ---

#[test]
fn empty_map_uses_identity_transform() {
    let vp = Viewport::new(Size::new(800.0, 600.0));
    let t = vp.transform();
    assert_eq!(t.scale_x, 1.0);
    assert_eq!(t.scale_y, 1.0);
    assert_eq!(t.top_left, Point::default());
}

#[test]
fn wide_map_is_letterboxed_and_centered() {
    let t = letterboxed().transform();
    assert!(approx_eq(t.scale_x, 1.0));
    assert!(approx_eq(t.scale_y, 1.0));
    assert!(point_approx_eq(t.top_left, Point::new(0.0, 250.0)));
}

#[test]
fn tall_window_pillarboxes_square_map() {
    let mut vp = Viewport::new(Size::new(2000.0, 1000.0));
    vp.set_map_size(Size::new(500.0, 500.0));
    let t = vp.transform();
    assert!(approx_eq(t.scale_x, 2.0));
    assert!(approx_eq(t.scale_y, 2.0));
    assert!(point_approx_eq(t.top_left, Point::new(500.0, 0.0)));
}

// --- Zoom ---

#[test]
fn first_zoom_in_anchors_on_pointer_fraction() {
    let mut vp = letterboxed();
    assert!(vp.zoom_in(Point::new(250.0, 750.0)));
    assert_eq!(vp.zoom_level(), 1);
    assert_eq!(vp.zoom_anchor(), Point::new(0.25, 0.75));
}

#[test]
fn second_zoom_in_averages_anchor() {
    let mut vp = letterboxed();
    vp.zoom_in(Point::new(250.0, 750.0));
    vp.zoom_in(Point::new(750.0, 250.0));
    assert_eq!(vp.zoom_level(), 2);
    assert_eq!(vp.zoom_anchor(), Point::new(0.5, 0.5));
}

#[test]
fn pointer_fraction_is_clamped_to_one() {
    let mut vp = letterboxed();
    vp.zoom_in(Point::new(5000.0, 1000.0));
    assert_eq!(vp.zoom_anchor(), Point::new(1.0, 1.0));
}

#[test]
fn zoom_in_stops_at_max_level() {
    let mut vp = letterboxed();
    for _ in 0..ZOOM_LEVELS {
        assert!(vp.zoom_in(Point::new(500.0, 500.0)));
    }
    assert!(!vp.zoom_in(Point::new(500.0, 500.0)));
    assert_eq!(vp.zoom_level(), ZOOM_LEVELS);
}

#[test]
fn max_zoom_scales_by_five() {
    let mut vp = letterboxed();
    for _ in 0..ZOOM_LEVELS {
        vp.zoom_in(Point::new(0.0, 0.0));
    }
    let t = vp.transform();
    assert!(approx_eq(t.scale_x, 5.0));
    assert!(approx_eq(t.scale_y, 5.0));
}

#[test]
fn zoom_shifts_toward_anchor() {
    let mut vp = letterboxed();
    vp.zoom_in(Point::new(500.0, 500.0));
    let t = vp.transform();
    // zoom_amount = 0.1 * 4 = 0.4; fitted size 1000x500
    assert!(approx_eq(t.top_left.x, 0.0 - 0.5 * 1000.0 * 0.4));
    assert!(approx_eq(t.top_left.y, 250.0 - 0.5 * 500.0 * 0.4));
    assert!(approx_eq(t.scale_x, 1.4));
}

#[test]
fn zoom_out_at_zero_is_noop() {
    let mut vp = letterboxed();
    assert!(!vp.zoom_out());
}

#[test]
fn zoom_out_to_zero_resets_pan() {
    let mut vp = letterboxed();
    vp.zoom_in(Point::new(500.0, 500.0));
    vp.drag_pan(Point::new(0.0, 0.0), true);
    vp.drag_pan(Point::new(10.0, 5.0), true);
    assert_ne!(vp.pan_offset(), Point::default());

    assert!(vp.zoom_out());
    assert_eq!(vp.pan_offset(), Point::default());
    assert!(!vp.is_panning());
}

#[test]
fn wheel_direction_selects_zoom() {
    let mut vp = letterboxed();
    assert!(vp.on_wheel(-120.0, Point::new(10.0, 10.0)));
    assert_eq!(vp.zoom_level(), 1);
    assert!(vp.on_wheel(120.0, Point::new(10.0, 10.0)));
    assert_eq!(vp.zoom_level(), 0);
}

// --- Pan ---

#[test]
fn pan_is_noop_when_not_zoomed() {
    let mut vp = letterboxed();
    assert!(!vp.drag_pan(Point::new(0.0, 0.0), true));
    assert!(!vp.drag_pan(Point::new(50.0, 50.0), true));
    assert_eq!(vp.pan_offset(), Point::default());
}

#[test]
fn pan_accumulates_accelerated_delta() {
    let mut vp = letterboxed();
    vp.zoom_in(Point::new(500.0, 500.0));
    vp.drag_pan(Point::new(100.0, 100.0), true);
    vp.drag_pan(Point::new(110.0, 95.0), true);
    vp.drag_pan(Point::new(120.0, 95.0), true);
    assert_eq!(vp.pan_offset(), Point::new(40.0, -10.0));
}

#[test]
fn pan_release_ends_drag_but_keeps_offset() {
    let mut vp = letterboxed();
    vp.zoom_in(Point::new(500.0, 500.0));
    vp.drag_pan(Point::new(0.0, 0.0), true);
    vp.drag_pan(Point::new(5.0, 0.0), true);
    assert!(vp.drag_pan(Point::new(5.0, 0.0), false));
    assert!(!vp.is_panning());
    assert_eq!(vp.pan_offset(), Point::new(10.0, 0.0));
    assert!(!vp.drag_pan(Point::new(5.0, 0.0), false));
}

#[test]
fn pan_moves_transform_by_fitted_scale() {
    let mut vp = letterboxed();
    vp.zoom_in(Point::new(500.0, 500.0));
    let before = vp.transform().top_left;
    vp.drag_pan(Point::new(0.0, 0.0), true);
    vp.drag_pan(Point::new(10.0, 0.0), true);
    let after = vp.transform().top_left;
    // fitted width equals map width, so one pan unit is one pixel
    assert!(approx_eq(after.x - before.x, 20.0));
    assert!(approx_eq(after.y, before.y));
}

// --- Caching ---

#[test]
fn resize_invalidates_cached_transform() {
    let mut vp = letterboxed();
    let before = vp.transform();
    vp.resize(Size::new(500.0, 500.0));
    let after = vp.transform();
    assert_ne!(before, after);
    assert!(approx_eq(after.scale_x, 0.5));
}

// --- Round trip ---

#[test]
fn forward_inverts_inverse_across_states() {
    let mut vp = Viewport::new(Size::new(1280.0, 720.0));
    vp.set_map_size(Size::new(1024.0, 1024.0));

    let probes = [
        Point::new(0.0, 0.0),
        Point::new(640.0, 360.0),
        Point::new(1279.5, 0.25),
        Point::new(-40.0, 900.0),
    ];

    for step in 0..6 {
        if step > 0 {
            vp.zoom_in(Point::new(100.0 * f64::from(step), 50.0 * f64::from(step)));
            vp.drag_pan(Point::new(10.0, 10.0), true);
            vp.drag_pan(Point::new(13.0, 7.0 + f64::from(step)), true);
        }
        for s in probes {
            let round_trip = vp.forward(vp.inverse(s));
            assert!(point_approx_eq(round_trip, s), "step {step}: {s:?} -> {round_trip:?}");
        }
    }
}
