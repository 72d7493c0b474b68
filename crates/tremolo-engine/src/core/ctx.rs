use std::rc::Rc;

use winit::window::Window;

use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::render::{RenderCtx, RenderTarget};
use crate::schedule::{FrameHost, FrameSignal};
use crate::time::FrameTime;

use super::app::AppControl;

/// Passed to [`App::mount`](super::App::mount).
pub struct MountCtx {
    frame_signal: Rc<FrameSignal>,
    pub viewport: Viewport,
    pub scale_factor: f32,
}

impl MountCtx {
    pub fn new(frame_signal: Rc<FrameSignal>, viewport: Viewport, scale_factor: f32) -> Self {
        Self {
            frame_signal,
            viewport,
            scale_factor,
        }
    }

    /// Host for a frame scheduler: requests become window redraws.
    pub fn frame_host(&self) -> Rc<dyn FrameHost> {
        self.frame_signal.clone()
    }
}

/// Per-redraw context.
///
/// `'a` is the callback borrow; `'w` is the window borrow carried by `Gpu<'w>`.
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    pub fn scale_factor(&self) -> f32 {
        self.window.scale_factor() as f32
    }

    /// Window size in logical pixels.
    pub fn viewport(&self) -> Viewport {
        let logical = self
            .window
            .inner_size()
            .to_logical::<f64>(self.window.scale_factor());
        Viewport::new(logical.width as f32, logical.height as f32)
    }

    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.viewport(),
            self.scale_factor(),
        )
    }

    /// Acquires the window image, clears it, runs `draw`, and presents.
    ///
    /// `prelude` (offscreen surface draws) is submitted first. If the image
    /// cannot be acquired, `prelude` is still submitted so surface targets
    /// stay current.
    pub fn present<F>(
        &mut self,
        prelude: Option<wgpu::CommandBuffer>,
        clear: wgpu::Color,
        draw: F,
    ) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                if let Some(commands) = prelude {
                    self.gpu.submit_offscreen(commands);
                }
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    _ => AppControl::Continue,
                };
            }
        };

        {
            let _clear = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tremolo clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        {
            let ctx = self.render_ctx();
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&ctx, &mut target);
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame, prelude);

        AppControl::Continue
    }
}
