use frames::{Event, Interaction};
use serde::Serialize;

use crate::camera::{Point, Size, Transform, Viewport};
use crate::consts::{CUSTOM_MARKER_COLOR, MEASURE_MARKER_COLOR};
use crate::doc::{self, Marker, MarkerStore};
use crate::heightmap::{Heightmap, MinimapViewport};
use crate::hit;
use crate::input::{Button, ButtonCounters, InputState, Key, is_line_long_enough};
use crate::render::{self, Annotation, MeasureContext};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Write this interaction to the producer.
    Send(Interaction),
    SetCursor(Cursor),
    /// Stored markers or their labels changed.
    RedrawMarkers,
    /// The in-progress drag or measurement preview changed.
    RedrawDraft,
    /// Zoom, pan, window or map size changed.
    ViewportChanged(Transform),
}

/// Pointer cursor shown over the overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cursor {
    #[default]
    Default,
    /// Over a custom marker that a click would delete.
    Pointer,
}

/// Last map frame received, as raw RGBA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Core engine state: every piece of client state, and the only place it
/// changes.
///
/// Server-driven state changes through [`EngineCore::apply_event`]; operator
/// input through the `on_*` handlers. Nothing here performs I/O.
#[derive(Debug, Default)]
pub struct EngineCore {
    pub viewport: Viewport,
    pub markers: MarkerStore,
    pub heightmap: Option<Heightmap>,
    pub minimap: Option<MinimapViewport>,
    pub meters_per_pixel: Option<f64>,
    pub map: Option<MapImage>,
    pub buttons: ButtonCounters,
    pub input: InputState,
    /// Set after a delete-by-click or a cancelled interaction; blocks new
    /// drags until both primary and secondary are released.
    pub debounce: bool,
    pub hovered: Option<usize>,
    pub cursor: Cursor,
    /// Hide debug-only label lines.
    pub release: bool,
    /// Last pointer position in screen pixels.
    pub pointer: Option<Point>,
}

impl EngineCore {
    #[must_use]
    pub fn new(window: Size, release: bool) -> Self {
        Self { viewport: Viewport::new(window), release, ..Self::default() }
    }

    // --- Server events ---

    /// Apply one decoded producer event.
    pub fn apply_event(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::MapFrame { width, height, rgba } => {
                self.viewport.set_map_size(Size::new(f64::from(width), f64::from(height)));
                self.map = Some(MapImage { width, height, rgba });
                self.markers.clear_detected();
                tracing::debug!(width, height, "map frame");
                vec![Action::ViewportChanged(self.viewport.transform()), Action::RedrawMarkers]
            }
            Event::Markers { set, segments } => {
                tracing::debug!(?set, count = segments.len(), "markers");
                self.markers.replace(set, segments.into_iter().map(Marker::from).collect());
                vec![Action::RedrawMarkers]
            }
            Event::UpdateState { meters_per_pixel, minimap } => {
                self.meters_per_pixel = meters_per_pixel;
                self.minimap = minimap.map(MinimapViewport::from);
                vec![Action::RedrawMarkers]
            }
            Event::Heightmap(grid) => {
                self.heightmap = grid.map(Heightmap::from);
                vec![Action::RedrawMarkers]
            }
        }
    }

    // --- Pointer and keyboard ---

    pub fn on_pointer_down(&mut self, button: Button, screen: Point) -> Vec<Action> {
        self.buttons.press(button);
        self.on_pointer_move(screen)
    }

    pub fn on_pointer_up(&mut self, button: Button, screen: Point) -> Vec<Action> {
        self.buttons.release(button);
        self.on_pointer_move(screen)
    }

    /// Run the pointer pipeline: hover and delete, drag and measure, pan,
    /// then the draft preview.
    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        let mut actions = Vec::new();
        let had_draft = !self.input.is_idle();
        self.pointer = Some(screen);

        self.hover_and_delete(screen, &mut actions);
        self.drag_and_measure(screen, &mut actions);
        if self.viewport.drag_pan(screen, self.buttons.held(Button::Middle)) {
            actions.push(Action::ViewportChanged(self.viewport.transform()));
        }
        if had_draft || !self.input.is_idle() {
            actions.push(Action::RedrawDraft);
        }
        actions
    }

    pub fn on_wheel(&mut self, delta_y: f64, screen: Point) -> Vec<Action> {
        if self.viewport.on_wheel(delta_y, screen) {
            vec![Action::ViewportChanged(self.viewport.transform())]
        } else {
            Vec::new()
        }
    }

    /// Escape cancels a drag or measurement in progress.
    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if !key.is_escape() || self.input.is_idle() {
            return Vec::new();
        }
        self.input = InputState::Idle;
        self.debounce = true;
        vec![Action::RedrawDraft]
    }

    /// The pointer left the overlay; any release that follows is lost, so
    /// start over.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.buttons.reset();
        self.input = InputState::Idle;
        self.debounce = false;
        if self.viewport.is_panning() {
            self.viewport.end_pan();
        }
        vec![Action::RedrawDraft]
    }

    pub fn resize(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.viewport.resize(Size::new(width, height));
        vec![Action::ViewportChanged(self.viewport.transform())]
    }

    fn hover_and_delete(&mut self, screen: Point, actions: &mut Vec<Action>) {
        if matches!(self.input, InputState::Dragging { .. }) {
            return;
        }

        let transform = self.viewport.transform();
        self.hovered = hit::hovered_custom_marker(&transform, self.markers.custom(), self.viewport.window(), screen);

        if let Some(index) = self.hovered {
            if self.buttons.held(Button::Primary) && !self.debounce {
                self.debounce = true;
                if let Ok(index) = u32::try_from(index) {
                    actions.push(Action::Send(Interaction::DeleteCustomMarker(index)));
                }
            }
        }

        let cursor = if self.hovered.is_some() { Cursor::Pointer } else { Cursor::Default };
        if cursor != self.cursor {
            self.cursor = cursor;
            actions.push(Action::SetCursor(cursor));
        }
    }

    fn drag_and_measure(&mut self, screen: Point, actions: &mut Vec<Action>) {
        let primary = self.buttons.held(Button::Primary);
        let secondary = self.buttons.held(Button::Secondary);

        if self.debounce {
            if !primary && !secondary {
                self.debounce = false;
            }
            return;
        }

        let pointer = self.viewport.inverse(screen);
        match self.input {
            InputState::Idle => {
                if secondary {
                    self.input = InputState::Measuring { start: pointer };
                } else if primary {
                    self.input = InputState::Dragging { start: pointer };
                }
            }
            InputState::Measuring { .. } => {
                if !secondary {
                    self.input = InputState::Idle;
                    self.debounce = true;
                }
            }
            InputState::Dragging { start } => {
                if !primary {
                    if is_line_long_enough(start, pointer) {
                        let segment = Marker::new(start, pointer).to_segment();
                        actions.push(Action::Send(Interaction::AddCustomMarker(segment)));
                    }
                    self.input = InputState::Idle;
                }
            }
        }
    }

    // --- Queries ---

    fn measure_context(&self) -> MeasureContext<'_> {
        MeasureContext {
            transform: self.viewport.transform(),
            heightmap: self.heightmap.as_ref(),
            minimap: self.minimap.as_ref(),
            meters_per_pixel: self.meters_per_pixel,
        }
    }

    /// Every stored marker, detected first, then custom.
    #[must_use]
    pub fn annotations(&self) -> Vec<Annotation> {
        let ctx = self.measure_context();
        let detected = self.markers.detected();
        let custom = self.markers.custom();

        let mut out = Vec::with_capacity(detected.len() + custom.len());
        for (i, marker) in detected.iter().enumerate() {
            out.push(render::annotate(*marker, doc::detected_color(i, detected.len()), &ctx));
        }
        for marker in custom {
            out.push(render::annotate(*marker, CUSTOM_MARKER_COLOR, &ctx));
        }
        out
    }

    /// Preview of the drag or measurement in progress, once it is long enough.
    #[must_use]
    pub fn draft_annotation(&self) -> Option<Annotation> {
        let (start, color) = match self.input {
            InputState::Idle => return None,
            InputState::Dragging { start } => (start, CUSTOM_MARKER_COLOR),
            InputState::Measuring { start } => (start, MEASURE_MARKER_COLOR),
        };
        let end = self.viewport.inverse(self.pointer?);
        if !is_line_long_enough(start, end) {
            return None;
        }
        Some(render::annotate(Marker::new(start, end), color, &self.measure_context()))
    }
}
