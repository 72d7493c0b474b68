//! Input events.
//!
//! The diagram page only scrolls and takes a few keyboard shortcuts, so the
//! event set is small. Platform events are translated in `platform`.

pub(crate) mod platform;
mod types;

pub use types::{InputEvent, Key, KeyState, LINE_SCROLL_PX, WheelDelta};
