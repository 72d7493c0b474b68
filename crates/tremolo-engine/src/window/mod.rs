//! Window runtime.
//!
//! Owns the `winit` event loop and the single application window, wires them
//! to the GPU layer, and turns frame requests from a scheduler into paced
//! redraws.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
