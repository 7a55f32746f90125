//! Binary wire protocol between the overlay producer and its map clients.
//!
//! Every message is a little-endian `u16` tag followed by a tag-specific
//! payload. There is no length prefix: the transport delivers exactly one
//! message per binary websocket frame, so the payload runs to the end of the
//! buffer.
//!
//! Inbound [`Event`]s carry the rendered map, marker sets, scale state and the
//! terrain elevation grid to the client. Outbound [`Interaction`]s carry the
//! operator's marker edits back to the producer. Both directions are encoded
//! and decoded here so the producer and the client stay interoperable.

use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

/// Size of the event/interaction tag that prefixes every message.
pub const TAG_LEN: usize = 2;

/// Four `f32` coordinates.
const SEGMENT_LEN: usize = 4 * 4;

/// Error returned by the decoders.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The message is too short to carry a tag.
    #[error("message of {len} bytes has no tag")]
    MissingTag { len: usize },
    /// The tag does not name a known inbound event.
    #[error("unknown event tag: {0}")]
    UnknownEvent(u16),
    /// The tag does not name a known outbound interaction.
    #[error("unknown interaction tag: {0}")]
    UnknownInteraction(u16),
    /// The payload ends before its declared fixed fields.
    #[error("payload truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    /// Declared dimensions overflow the address space.
    #[error("dimensions {width}x{height} are too large")]
    DimensionsOverflow { width: u32, height: u32 },
    /// The elevation grid holds fewer samples than `width * height`.
    #[error("elevation grid too short: expected {expected} samples, got {actual}")]
    GridTooShort { expected: usize, actual: usize },
    /// A fixed-size interaction payload has the wrong length.
    #[error("invalid payload length: expected {expected} bytes, got {actual}")]
    PayloadLength { expected: usize, actual: usize },
    /// Low-level read failure.
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

/// Inbound event tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EventKind {
    MapFrame = 1,
    Markers = 2,
    UpdateState = 3,
    Heightmap = 4,
}

impl EventKind {
    #[must_use]
    pub fn tag(self) -> u16 {
        self as u16
    }
}

/// Outbound interaction tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum InteractionKind {
    AddCustomMarker = 1,
    DeleteCustomMarker = 2,
}

impl InteractionKind {
    #[must_use]
    pub fn tag(self) -> u16 {
        self as u16
    }
}

/// A line segment in map space, as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub p0: [f32; 2],
    pub p1: [f32; 2],
}

impl Segment {
    #[must_use]
    pub fn new(p0: [f32; 2], p1: [f32; 2]) -> Self {
        Self { p0, p1 }
    }
}

/// Which marker collection a `Markers` event replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSet {
    /// Server-detected markers.
    Detected,
    /// Operator-drawn markers.
    Custom,
}

impl MarkerSet {
    /// Any discriminant other than `1` selects the detected set.
    #[must_use]
    pub fn from_wire(value: u8) -> Self {
        if value == 1 { Self::Custom } else { Self::Detected }
    }

    #[must_use]
    pub fn as_wire(self) -> u8 {
        match self {
            Self::Detected => 0,
            Self::Custom => 1,
        }
    }
}

/// Minimap rectangle in integer map units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimapBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Terrain elevation grid. `samples` is row-major, `width * height` long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightmapGrid {
    pub width: u32,
    pub height: u32,
    /// Alignment offset of the grid inside the minimap viewport.
    pub offset: [i32; 2],
    /// Raw-to-real-world vertical scale.
    pub scale: f32,
    pub samples: Vec<u16>,
}

/// An inbound message. Each variant is the complete state delta for its tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A freshly rendered map image, `width * height` RGBA pixels.
    MapFrame { width: u32, height: u32, rgba: Vec<u8> },
    /// Wholesale replacement of one marker collection.
    Markers { set: MarkerSet, segments: Vec<Segment> },
    /// Flat map scale and minimap footprint; `None` when unknown.
    UpdateState { meters_per_pixel: Option<f64>, minimap: Option<MinimapBounds> },
    /// A new elevation grid, or `None` to clear the current one.
    Heightmap(Option<HeightmapGrid>),
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MapFrame { .. } => EventKind::MapFrame,
            Self::Markers { .. } => EventKind::Markers,
            Self::UpdateState { .. } => EventKind::UpdateState,
            Self::Heightmap(_) => EventKind::Heightmap,
        }
    }
}

/// An outbound operator interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    AddCustomMarker(Segment),
    DeleteCustomMarker(u32),
}

impl Interaction {
    #[must_use]
    pub fn kind(&self) -> InteractionKind {
        match self {
            Self::AddCustomMarker(_) => InteractionKind::AddCustomMarker,
            Self::DeleteCustomMarker(_) => InteractionKind::DeleteCustomMarker,
        }
    }
}

// =============================================================
// Decoding
// =============================================================

type Reader<'a> = Cursor<&'a [u8]>;
type EventDecoder = fn(&mut Reader<'_>) -> Result<Event, CodecError>;

/// Dispatch table for inbound payloads, keyed by tag.
const EVENT_DECODERS: [(EventKind, EventDecoder); 4] = [
    (EventKind::MapFrame, decode_map_frame),
    (EventKind::Markers, decode_markers),
    (EventKind::UpdateState, decode_update_state),
    (EventKind::Heightmap, decode_heightmap),
];

/// Decode one inbound message.
///
/// # Errors
///
/// Returns [`CodecError::MissingTag`] for buffers shorter than a tag,
/// [`CodecError::UnknownEvent`] for unrecognized tags, and a framing error
/// when the payload is shorter than its declared fields.
pub fn decode_event(bytes: &[u8]) -> Result<Event, CodecError> {
    let (tag, payload) = split_tag(bytes)?;
    let decoder = EVENT_DECODERS
        .iter()
        .find(|(kind, _)| kind.tag() == tag)
        .map(|(_, decoder)| *decoder)
        .ok_or(CodecError::UnknownEvent(tag))?;
    decoder(&mut Cursor::new(payload))
}

/// Decode one outbound message (producer side).
///
/// # Errors
///
/// Returns [`CodecError::UnknownInteraction`] for unrecognized tags and
/// [`CodecError::PayloadLength`] when the payload is not exactly the fixed size.
pub fn decode_interaction(bytes: &[u8]) -> Result<Interaction, CodecError> {
    let (tag, payload) = split_tag(bytes)?;
    let mut cur = Cursor::new(payload);
    match tag {
        t if t == InteractionKind::AddCustomMarker.tag() => {
            exact_len(payload, SEGMENT_LEN)?;
            Ok(Interaction::AddCustomMarker(read_segment(&mut cur)?))
        }
        t if t == InteractionKind::DeleteCustomMarker.tag() => {
            exact_len(payload, 4)?;
            Ok(Interaction::DeleteCustomMarker(cur.read_u32::<LittleEndian>()?))
        }
        other => Err(CodecError::UnknownInteraction(other)),
    }
}

fn split_tag(bytes: &[u8]) -> Result<(u16, &[u8]), CodecError> {
    if bytes.len() < TAG_LEN {
        return Err(CodecError::MissingTag { len: bytes.len() });
    }
    let (mut tag, payload) = bytes.split_at(TAG_LEN);
    Ok((tag.read_u16::<LittleEndian>()?, payload))
}

fn exact_len(payload: &[u8], expected: usize) -> Result<(), CodecError> {
    if payload.len() == expected {
        Ok(())
    } else {
        Err(CodecError::PayloadLength { expected, actual: payload.len() })
    }
}

fn remaining(cur: &Reader<'_>) -> usize {
    let len = cur.get_ref().len();
    usize::try_from(cur.position()).map_or(0, |pos| len.saturating_sub(pos))
}

/// Fail unless at least `needed` bytes are left.
fn need(cur: &Reader<'_>, needed: usize) -> Result<(), CodecError> {
    let remaining = remaining(cur);
    if remaining < needed {
        return Err(CodecError::Truncated { needed, remaining });
    }
    Ok(())
}

fn read_segment(cur: &mut Reader<'_>) -> Result<Segment, CodecError> {
    Ok(Segment {
        p0: [cur.read_f32::<LittleEndian>()?, cur.read_f32::<LittleEndian>()?],
        p1: [cur.read_f32::<LittleEndian>()?, cur.read_f32::<LittleEndian>()?],
    })
}

fn area(width: u32, height: u32) -> Result<usize, CodecError> {
    usize::try_from(u64::from(width) * u64::from(height))
        .map_err(|_| CodecError::DimensionsOverflow { width, height })
}

fn decode_map_frame(cur: &mut Reader<'_>) -> Result<Event, CodecError> {
    need(cur, 8)?;
    let width = cur.read_u32::<LittleEndian>()?;
    let height = cur.read_u32::<LittleEndian>()?;
    let len = area(width, height)?
        .checked_mul(4)
        .ok_or(CodecError::DimensionsOverflow { width, height })?;
    need(cur, len)?;

    let mut rgba = vec![0; len];
    cur.read_exact(&mut rgba)?;
    Ok(Event::MapFrame { width, height, rgba })
}

fn decode_markers(cur: &mut Reader<'_>) -> Result<Event, CodecError> {
    need(cur, 1 + 4)?;
    let set = MarkerSet::from_wire(cur.read_u8()?);
    let count = cur.read_u32::<LittleEndian>()?;

    // Checked before allocating.
    let needed = usize::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(SEGMENT_LEN))
        .unwrap_or(usize::MAX);
    need(cur, needed)?;

    let segments = (0..count)
        .map(|_| read_segment(cur))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Event::Markers { set, segments })
}

#[allow(clippy::float_cmp)]
fn decode_update_state(cur: &mut Reader<'_>) -> Result<Event, CodecError> {
    need(cur, 8 + 1)?;
    let ratio = cur.read_f64::<LittleEndian>()?;
    let meters_per_pixel = (ratio != 0.0).then_some(ratio);

    let minimap = if cur.read_u8()? == 1 {
        need(cur, 4 * 4)?;
        // Wire order is left, right, top, bottom.
        let left = cur.read_u32::<LittleEndian>()?;
        let right = cur.read_u32::<LittleEndian>()?;
        let top = cur.read_u32::<LittleEndian>()?;
        let bottom = cur.read_u32::<LittleEndian>()?;
        Some(MinimapBounds { left, top, right, bottom })
    } else {
        None
    };

    Ok(Event::UpdateState { meters_per_pixel, minimap })
}

fn decode_heightmap(cur: &mut Reader<'_>) -> Result<Event, CodecError> {
    need(cur, 1)?;
    if cur.read_u8()? != 1 {
        return Ok(Event::Heightmap(None));
    }

    // pad, width, height, offset x/y, scale
    need(cur, 1 + 4 + 4 + 4 + 4 + 4)?;
    // The producer pads so the grid starts on a 2-byte boundary of the
    // full message, tag included. Samples are copied out, so the pad is skipped.
    cur.read_u8()?;
    let width = cur.read_u32::<LittleEndian>()?;
    let height = cur.read_u32::<LittleEndian>()?;
    let offset = [cur.read_i32::<LittleEndian>()?, cur.read_i32::<LittleEndian>()?];
    let scale = cur.read_f32::<LittleEndian>()?;

    let expected = area(width, height)?;
    let actual = remaining(cur) / 2;
    if actual < expected {
        return Err(CodecError::GridTooShort { expected, actual });
    }

    let mut samples = vec![0u16; expected];
    cur.read_u16_into::<LittleEndian>(&mut samples)?;
    Ok(Event::Heightmap(Some(HeightmapGrid { width, height, offset, scale, samples })))
}

// =============================================================
// Encoding
// =============================================================

/// Two-phase encoder: allocates exactly `TAG_LEN + size()` bytes, writes the
/// tag, then hands the buffer to `write` for the payload.
///
/// `write` must produce exactly `size()` bytes; this is checked in debug builds.
pub fn encode_with<S, W>(tag: u16, size: S, write: W) -> Vec<u8>
where
    S: FnOnce() -> usize,
    W: FnOnce(&mut Vec<u8>) -> io::Result<()>,
{
    let expected = TAG_LEN + size();
    let mut buf = Vec::with_capacity(expected);

    // Writing into a Vec<u8> cannot fail.
    let written = buf.write_u16::<LittleEndian>(tag).and_then(|()| write(&mut buf));
    debug_assert!(written.is_ok(), "in-memory write failed for tag {tag}");
    debug_assert_eq!(buf.len(), expected, "miscalculated buffer size for tag {tag}");

    buf
}

/// Encode an outbound interaction.
#[must_use]
pub fn encode_interaction(interaction: &Interaction) -> Vec<u8> {
    let tag = interaction.kind().tag();
    match *interaction {
        Interaction::AddCustomMarker(segment) => {
            encode_with(tag, || SEGMENT_LEN, |buf| write_segment(buf, &segment))
        }
        Interaction::DeleteCustomMarker(index) => {
            encode_with(tag, || 4, |buf| buf.write_u32::<LittleEndian>(index))
        }
    }
}

/// Encode an inbound event (producer side).
#[must_use]
pub fn encode_event(event: &Event) -> Vec<u8> {
    let tag = event.kind().tag();
    match event {
        Event::MapFrame { width, height, rgba } => encode_with(
            tag,
            || 8 + rgba.len(),
            |buf| {
                buf.write_u32::<LittleEndian>(*width)?;
                buf.write_u32::<LittleEndian>(*height)?;
                buf.extend_from_slice(rgba);
                Ok(())
            },
        ),
        Event::Markers { set, segments } => encode_with(
            tag,
            || 1 + 4 + segments.len() * SEGMENT_LEN,
            |buf| {
                buf.write_u8(set.as_wire())?;
                buf.write_u32::<LittleEndian>(wire_count(segments.len()))?;
                segments.iter().try_for_each(|segment| write_segment(buf, segment))
            },
        ),
        Event::UpdateState { meters_per_pixel, minimap } => encode_with(
            tag,
            || 8 + 1 + if minimap.is_some() { 4 * 4 } else { 0 },
            |buf| {
                buf.write_f64::<LittleEndian>(meters_per_pixel.unwrap_or(0.0))?;
                match minimap {
                    Some(bounds) => {
                        buf.write_u8(1)?;
                        buf.write_u32::<LittleEndian>(bounds.left)?;
                        buf.write_u32::<LittleEndian>(bounds.right)?;
                        buf.write_u32::<LittleEndian>(bounds.top)?;
                        buf.write_u32::<LittleEndian>(bounds.bottom)
                    }
                    None => buf.write_u8(0),
                }
            },
        ),
        Event::Heightmap(grid) => encode_with(
            tag,
            || grid.as_ref().map_or(1, |g| 1 + 1 + 4 + 4 + 4 + 4 + 4 + g.samples.len() * 2),
            |buf| {
                let Some(grid) = grid else {
                    return buf.write_u8(0);
                };
                buf.write_u8(1)?;
                buf.write_u8(0)?;
                buf.write_u32::<LittleEndian>(grid.width)?;
                buf.write_u32::<LittleEndian>(grid.height)?;
                buf.write_i32::<LittleEndian>(grid.offset[0])?;
                buf.write_i32::<LittleEndian>(grid.offset[1])?;
                buf.write_f32::<LittleEndian>(grid.scale)?;
                grid.samples
                    .iter()
                    .try_for_each(|sample| buf.write_u16::<LittleEndian>(*sample))
            },
        ),
    }
}

fn write_segment(buf: &mut Vec<u8>, segment: &Segment) -> io::Result<()> {
    buf.write_f32::<LittleEndian>(segment.p0[0])?;
    buf.write_f32::<LittleEndian>(segment.p0[1])?;
    buf.write_f32::<LittleEndian>(segment.p1[0])?;
    buf.write_f32::<LittleEndian>(segment.p1[1])
}

#[allow(clippy::cast_possible_truncation)]
fn wire_count(len: usize) -> u32 {
    len as u32
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
