//! Time subsystem.
//!
//! Stable, testable timing utilities without coupling to the runtime:
//! - `HostClock` produces the millisecond timestamps a host hands to the scheduler
//! - `FramePacer` caps how often those timestamps turn into processed ticks
//! - `progress` maps elapsed time onto animation progress curves

mod frame_clock;
mod pacer;
pub mod progress;

pub use frame_clock::{FrameTime, HostClock};
pub use pacer::FramePacer;
