//! Tremolo engine crate.
//!
//! Owns the frame scheduler, the shader uniform composer, visibility helpers and
//! the platform + GPU runtime used by the diagram layer.

pub mod coords;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod schedule;
pub mod shader;
pub mod time;
pub mod visibility;
pub mod window;
