//! Annotation data for an external renderer.
//!
//! This module decides what each marker says, not how it looks. It turns a
//! map-space segment plus whatever terrain and scale data are available into
//! an [`Annotation`], and formats the label lines. Font metrics, line spacing
//! and painting belong to the host.
//!
//! With a terrain sample the label carries altitude and a firing solution per
//! direction. With only a meters-per-pixel ratio it falls back to distance, a
//! flat-ground elevation and both bearings. With neither, the marker is drawn
//! bare.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use serde::Serialize;

use crate::ballistics::{self, Bearings, DirectionLabel, Elevation, FiringLabels};
use crate::camera::{Point, Transform};
use crate::consts::Color;
use crate::doc::Marker;
use crate::heightmap::{self, Heightmap, MinimapViewport};

/// Everything needed to turn map pixels into meters.
#[derive(Debug, Clone, Copy)]
pub struct MeasureContext<'a> {
    pub transform: Transform,
    pub heightmap: Option<&'a Heightmap>,
    pub minimap: Option<&'a MinimapViewport>,
    pub meters_per_pixel: Option<f64>,
}

/// One marker as it should be drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub marker: Marker,
    pub color: Color,
    pub label: Option<Label>,
}

/// Text placement and content, anchored at the segment midpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub midpoint: Point,
    /// Baseline rotation in radians.
    pub text_angle: f64,
    pub meters: f64,
    pub detail: AnnotationDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnnotationDetail {
    /// Heightmap sampled at both ends.
    Terrain { alt_delta: i64, labels: FiringLabels },
    /// Scale ratio only; elevation assumes level ground.
    Flat { elevation: Elevation, bearings: Bearings, flipped: bool },
}

/// Label lines grouped by where they sit relative to the midpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationText {
    /// Centered under the midpoint.
    pub center: Vec<String>,
    /// Right-aligned, left of the midpoint.
    pub left: Vec<String>,
    /// Left-aligned, right of the midpoint.
    pub right: Vec<String>,
}

/// Build the annotation for `marker`.
#[must_use]
pub fn annotate(marker: Marker, color: Color, ctx: &MeasureContext<'_>) -> Annotation {
    Annotation { marker, color, label: label_for(marker, ctx) }
}

fn label_for(marker: Marker, ctx: &MeasureContext<'_>) -> Option<Label> {
    let terrain = match (ctx.heightmap, ctx.minimap) {
        (Some(hm), Some(minimap)) => heightmap::altitude_delta(hm, &ctx.transform, minimap, marker.p0, marker.p1),
        _ => None,
    };

    let angle = ballistics::segment_angle(marker.p0, marker.p1);

    let (meters, detail) = if let Some(sample) = terrain {
        #[allow(clippy::cast_precision_loss)]
        let labels = FiringLabels::solve(angle, sample.distance_meters, sample.delta_meters as f64);
        (sample.distance_meters, AnnotationDetail::Terrain { alt_delta: sample.delta_meters, labels })
    } else {
        let ratio = ctx.meters_per_pixel?;
        let meters = ratio * marker.length();
        let detail = AnnotationDetail::Flat {
            elevation: Elevation::solve(meters, 0.0),
            bearings: Bearings::from_angle(angle),
            flipped: ballistics::is_flipped(angle),
        };
        (meters, detail)
    };

    Some(Label {
        midpoint: marker.p0.midpoint(marker.p1),
        text_angle: ballistics::text_angle(angle),
        meters,
        detail,
    })
}

impl Annotation {
    /// Display lines for this marker's label, if it has one.
    ///
    /// `release` hides the per-direction altitude lines.
    #[must_use]
    pub fn text(&self, release: bool) -> Option<AnnotationText> {
        self.label.as_ref().map(|label| label.text(release))
    }
}

impl Label {
    #[must_use]
    pub fn text(&self, release: bool) -> AnnotationText {
        let meters = format!("{}m", whole(self.meters));
        match &self.detail {
            AnnotationDetail::Terrain { alt_delta, labels } => AnnotationText {
                center: vec![meters, format!("±{}m alt", alt_delta.unsigned_abs())],
                left: direction_lines(&labels.leftward, Side::Left, release),
                right: direction_lines(&labels.rightward, Side::Right, release),
            },
            AnnotationDetail::Flat { elevation, bearings, flipped } => {
                let mils = match elevation {
                    Elevation::Mils(mils) => format!("{} mils", whole(*mils)),
                    Elevation::OutOfRange => "RANGE!".to_owned(),
                };
                let (toward, back) =
                    if *flipped { (bearings.backward, bearings.forward) } else { (bearings.forward, bearings.backward) };
                AnnotationText {
                    center: vec![meters, mils, format!("-> {}°", whole(toward)), format!("<- {}°", whole(back))],
                    ..AnnotationText::default()
                }
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

fn direction_lines(label: &DirectionLabel, side: Side, release: bool) -> Vec<String> {
    let elevation = match (label.elevation, side) {
        (Elevation::Mils(mils), Side::Left) => format!("<- {} mil", whole(mils)),
        (Elevation::Mils(mils), Side::Right) => format!("{} mil ->", whole(mils)),
        (Elevation::OutOfRange, Side::Left) => "<- RANGE!".to_owned(),
        (Elevation::OutOfRange, Side::Right) => "RANGE! ->".to_owned(),
    };

    let mut lines = vec![elevation, format!("{}°", whole(label.bearing))];
    if !release {
        lines.push(format!("{}m alt", whole(label.alt_delta)));
    }
    lines
}

#[allow(clippy::cast_possible_truncation)]
fn whole(x: f64) -> i64 {
    ballistics::round_half_up(x) as i64
}
