//! GPU device and window surface.
//!
//! Creates the wgpu instance, adapter, device and queue, configures the window
//! surface, and hands out per-frame encoders. Diagram surfaces render into
//! their own offscreen targets; only the compositor draws to the window.

mod context;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use frame::GpuFrame;
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
