#![allow(clippy::float_cmp)]

use frames::{HeightmapGrid, MinimapBounds};

use super::*;
use crate::consts::{CUSTOM_MARKER_COLOR, MEASURE_MARKER_COLOR};

fn identity() -> Transform {
    Transform { scale_x: 1.0, scale_y: 1.0, top_left: Point::default() }
}

fn flat(ratio: Option<f64>) -> MeasureContext<'static> {
    MeasureContext { transform: identity(), heightmap: None, minimap: None, meters_per_pixel: ratio }
}

/// 1000x1000 grid over a 1000x1000 minimap, 50 m peak at cell (600, 800).
fn terrain() -> (Heightmap, MinimapViewport) {
    let mut samples = vec![0u16; 1_000_000];
    samples[800 * 1000 + 600] = 65535;
    let hm = Heightmap::from(HeightmapGrid { width: 1000, height: 1000, offset: [0, 0], scale: 9.765_625, samples });
    let minimap = MinimapViewport::from(MinimapBounds { left: 0, top: 0, right: 1000, bottom: 1000 });
    (hm, minimap)
}

fn with_terrain<'a>(hm: &'a Heightmap, minimap: &'a MinimapViewport, ratio: Option<f64>) -> MeasureContext<'a> {
    MeasureContext { transform: identity(), heightmap: Some(hm), minimap: Some(minimap), meters_per_pixel: ratio }
}

fn strings(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| (*s).to_owned()).collect()
}

// =============================================================
// annotate
// =============================================================

#[test]
fn no_scale_information_draws_bare_marker() {
    let marker = Marker::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    let annotation = annotate(marker, CUSTOM_MARKER_COLOR, &flat(None));

    assert_eq!(annotation.marker, marker);
    assert_eq!(annotation.color, CUSTOM_MARKER_COLOR);
    assert_eq!(annotation.label, None);
    assert_eq!(annotation.text(false), None);
}

#[test]
fn flat_label_uses_ratio_distance() {
    let marker = Marker::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    let label = annotate(marker, MEASURE_MARKER_COLOR, &flat(Some(5.0))).label.expect("ratio set");

    assert_eq!(label.meters, 500.0);
    assert_eq!(label.midpoint, Point::new(50.0, 0.0));
    assert!(label.text_angle.abs() < 1e-12);
    assert!(matches!(label.detail, AnnotationDetail::Flat { flipped: false, .. }));
}

#[test]
fn terrain_sample_takes_precedence_over_ratio() {
    let (hm, minimap) = terrain();
    let ctx = with_terrain(&hm, &minimap, Some(9.0));
    let marker = Marker::new(Point::new(0.0, 0.0), Point::new(600.0, 800.0));
    let label = annotate(marker, CUSTOM_MARKER_COLOR, &ctx).label.expect("terrain");

    assert_eq!(label.meters, 1000.0);
    let AnnotationDetail::Terrain { alt_delta, .. } = label.detail else {
        panic!("expected terrain detail");
    };
    assert_eq!(alt_delta, 50);
}

#[test]
fn off_grid_falls_back_to_ratio() {
    let (hm, minimap) = terrain();
    let ctx = with_terrain(&hm, &minimap, Some(2.0));
    let marker = Marker::new(Point::new(0.0, 0.0), Point::new(0.0, 1500.0));
    let label = annotate(marker, CUSTOM_MARKER_COLOR, &ctx).label.expect("ratio fallback");

    assert_eq!(label.meters, 3000.0);
    assert!(matches!(label.detail, AnnotationDetail::Flat { elevation: Elevation::OutOfRange, .. }));
}

#[test]
fn heightmap_without_minimap_is_ignored() {
    let (hm, _) = terrain();
    let ctx = MeasureContext { transform: identity(), heightmap: Some(&hm), minimap: None, meters_per_pixel: None };
    let marker = Marker::new(Point::new(0.0, 0.0), Point::new(600.0, 800.0));
    assert_eq!(annotate(marker, CUSTOM_MARKER_COLOR, &ctx).label, None);
}

// =============================================================
// Text
// =============================================================

#[test]
fn terrain_text_per_direction() {
    let (hm, minimap) = terrain();
    let ctx = with_terrain(&hm, &minimap, None);
    let marker = Marker::new(Point::new(0.0, 0.0), Point::new(600.0, 800.0));
    let text = annotate(marker, CUSTOM_MARKER_COLOR, &ctx).text(false).expect("label");

    assert_eq!(text.center, strings(&["1000m", "±50m alt"]));
    assert_eq!(text.left, strings(&["<- 1134 mil", "323°", "-50m alt"]));
    assert_eq!(text.right, strings(&["1098 mil ->", "143°", "50m alt"]));
}

#[test]
fn release_hides_direction_altitude() {
    let (hm, minimap) = terrain();
    let ctx = with_terrain(&hm, &minimap, None);
    let marker = Marker::new(Point::new(0.0, 0.0), Point::new(600.0, 800.0));
    let text = annotate(marker, CUSTOM_MARKER_COLOR, &ctx).text(true).expect("label");

    assert_eq!(text.center, strings(&["1000m", "±50m alt"]));
    assert_eq!(text.left, strings(&["<- 1134 mil", "323°"]));
    assert_eq!(text.right, strings(&["1098 mil ->", "143°"]));
}

#[test]
fn terrain_out_of_range_reads_range() {
    let angle = 0.0;
    let label = Label {
        midpoint: Point::default(),
        text_angle: angle,
        meters: 4000.0,
        detail: AnnotationDetail::Terrain { alt_delta: -3, labels: FiringLabels::solve(angle, 4000.0, -3.0) },
    };
    let text = label.text(false);

    assert_eq!(text.center, strings(&["4000m", "±3m alt"]));
    assert_eq!(text.left[0], "<- RANGE!");
    assert_eq!(text.right[0], "RANGE! ->");
}

#[test]
fn flat_text_eastward() {
    let marker = Marker::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    let text = annotate(marker, CUSTOM_MARKER_COLOR, &flat(Some(5.0))).text(false).expect("label");

    assert_eq!(text.center, strings(&["500m", "1387 mils", "-> 90°", "<- 270°"]));
    assert!(text.left.is_empty());
    assert!(text.right.is_empty());
}

#[test]
fn flat_text_westward_swaps_arrows() {
    let marker = Marker::new(Point::new(100.0, 0.0), Point::new(0.0, 0.0));
    let text = annotate(marker, CUSTOM_MARKER_COLOR, &flat(Some(5.0))).text(false).expect("label");

    assert_eq!(text.center, strings(&["500m", "1387 mils", "-> 90°", "<- 270°"]));
}

#[test]
fn flat_text_out_of_range() {
    let marker = Marker::new(Point::new(0.0, 0.0), Point::new(0.0, 200.0));
    let text = annotate(marker, CUSTOM_MARKER_COLOR, &flat(Some(10.0))).text(false).expect("label");

    assert_eq!(text.center, strings(&["2000m", "RANGE!", "-> 0°", "<- 180°"]));
}

#[test]
fn annotation_serializes_with_mode_tag() {
    let marker = Marker::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    let annotation = annotate(marker, CUSTOM_MARKER_COLOR, &flat(Some(5.0)));
    let json = serde_json::to_value(&annotation).expect("serialize");

    assert_eq!(json["color"], serde_json::json!([255, 0, 255]));
    assert_eq!(json["label"]["detail"]["mode"], "flat");
    assert_eq!(json["label"]["detail"]["elevation"]["kind"], "mils");
}
