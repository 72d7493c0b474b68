//! Contract between the window runtime and the application layer.

mod app;
mod ctx;
mod error;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, MountCtx};
pub use error::ContextError;
