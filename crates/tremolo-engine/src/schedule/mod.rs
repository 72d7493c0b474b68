//! Frame scheduling.
//!
//! A [`FrameScheduler`] drives one animation-frame loop for any number of
//! surfaces. Each processed tick invokes every registered render callback and
//! then draws each surface whose callbacks reported a change, exactly once.

mod error;
mod host;
mod scheduler;

pub use error::SchedulerError;
pub use host::{FrameHost, FrameSignal};
pub use scheduler::{
    FrameScheduler, Registration, SchedulerConfig, StopHandle, SurfaceRenderer, TickOutcome,
};
