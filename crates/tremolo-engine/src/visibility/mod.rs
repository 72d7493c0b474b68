//! Visibility helpers.
//!
//! Off-screen diagrams keep their scheduler registration but stop doing work:
//! their callbacks short-circuit to "no change" and their local clocks freeze
//! until they scroll back into view.

mod check;
mod gate;

pub use check::is_region_visible;
pub use gate::{gated, PausableClock, VisibilityChange, VisibilityGate, DEFAULT_SHOW_DELAY_MS};
