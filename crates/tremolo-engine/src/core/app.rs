use crate::coords::Viewport;
use crate::input::InputEvent;

use super::ctx::{FrameCtx, MountCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application hosted by the window runtime.
pub trait App {
    /// Called once the window and GPU exist, before the first frame.
    fn mount(&mut self, ctx: &mut MountCtx) -> anyhow::Result<()>;

    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// New window size in logical pixels.
    fn on_resize(&mut self, viewport: Viewport, scale_factor: f32) {
        let _ = (viewport, scale_factor);
    }

    /// Called for every redraw the runtime performs.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
