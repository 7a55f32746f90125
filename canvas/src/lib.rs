//! Map overlay engine for the artillery range client.
//!
//! This crate holds every piece of client state and all of the geometry that
//! turns it into something worth drawing. It performs no I/O: the host feeds
//! it decoded wire events and raw pointer input, and reads back
//! [`engine::Action`]s plus per-marker [`render::Annotation`]s for an
//! external renderer to paint.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Session object owning all state; event and input handlers |
//! | [`camera`] | Zoom/pan viewport and the map-to-screen transform |
//! | [`doc`] | Detected and custom marker collections |
//! | [`heightmap`] | Terrain elevation grid sampling |
//! | [`ballistics`] | Firing elevation, bearings and label-side decision |
//! | [`hit`] | Pointer-over-marker hit testing |
//! | [`input`] | Buttons, keys and the drag/measure state |
//! | [`render`] | Structured annotation data and label text |
//! | [`consts`] | Shared numeric constants |

pub mod ballistics;
pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod heightmap;
pub mod hit;
pub mod input;
pub mod render;
