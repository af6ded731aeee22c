#![forbid(unsafe_code)]

//! Test harness for Cascade menus.
//!
//! - [`surface::RecordingSurface`]: an in-memory host that records every
//!   panel, position, attribute, focus move, and listener change.
//! - [`driver::Harness`]: a session over that surface driven by a
//!   [`cascade_core::VirtualClock`], with helpers for keys, hovers, clicks,
//!   and advancing time.
//!
//! The end-to-end scenarios live in this crate's `tests/` directory.

pub mod driver;
pub mod surface;

pub use driver::Harness;
pub use surface::{Focus, ITEM_HEIGHT, PANEL_WIDTH, PanelRecord, RecordingSurface, SurfaceCall};
