//! Output side of the client: what the external renderer receives.

use std::io::{self, Write};

use canvas::camera::Transform;
use canvas::engine::Cursor;
use canvas::render::{Annotation, AnnotationText};
use serde::Serialize;

/// A marker with its label lines already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMarker {
    #[serde(flatten)]
    pub annotation: Annotation,
    pub text: Option<AnnotationText>,
}

impl RenderedMarker {
    #[must_use]
    pub fn new(annotation: Annotation, release: bool) -> Self {
        let text = annotation.text(release);
        Self { annotation, text }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkEvent {
    Status { text: Option<String> },
    Cursor { cursor: Cursor },
    Viewport { transform: Transform },
    /// Full replacement of the marker overlay.
    Overlay { markers: Vec<RenderedMarker> },
    /// Drag or measurement preview; `None` clears it.
    Draft { marker: Option<RenderedMarker> },
}

pub trait OverlaySink {
    /// # Errors
    ///
    /// Returns an error when the renderer can no longer be reached.
    fn emit(&mut self, event: SinkEvent) -> io::Result<()>;
}

/// Writes one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OverlaySink for JsonLinesSink<W> {
    fn emit(&mut self, event: SinkEvent) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, &event)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use canvas::camera::Point;
    use canvas::doc::Marker;
    use canvas::render::{MeasureContext, annotate};

    use super::*;

    #[test]
    fn writes_one_tagged_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.emit(SinkEvent::Status { text: Some("Connecting...".into()) }).expect("status");
        sink.emit(SinkEvent::Cursor { cursor: Cursor::Pointer }).expect("cursor");

        let out = String::from_utf8(sink.into_inner()).expect("utf8");
        let lines: Vec<serde_json::Value> =
            out.lines().map(|l| serde_json::from_str(l).expect("json line")).collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], serde_json::json!({"type": "status", "text": "Connecting..."}));
        assert_eq!(lines[1], serde_json::json!({"type": "cursor", "cursor": "pointer"}));
    }

    #[test]
    fn rendered_marker_flattens_annotation_and_text() {
        let ctx = MeasureContext {
            transform: Transform { scale_x: 1.0, scale_y: 1.0, top_left: Point::default() },
            heightmap: None,
            minimap: None,
            meters_per_pixel: Some(5.0),
        };
        let annotation = annotate(Marker::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)), [255, 0, 255], &ctx);
        let value = serde_json::to_value(RenderedMarker::new(annotation, true)).expect("serialize");

        assert_eq!(value["marker"]["p1"]["x"], 100.0);
        assert_eq!(value["text"]["center"][0], "500m");
    }
}
