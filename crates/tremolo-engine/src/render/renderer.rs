use crate::schedule::SurfaceRenderer;

use super::{RenderCtx, SceneSurface};

/// Redraws dirty [`SceneSurface`]s into their offscreen targets.
///
/// All draws of one tick are recorded into a single encoder; [`finish`]
/// hands back the command buffer to submit ahead of compositing.
///
/// [`finish`]: SceneRenderer::finish
pub struct SceneRenderer<'a> {
    ctx: RenderCtx<'a>,
    encoder: Option<wgpu::CommandEncoder>,
    scratch: Vec<u8>,
}

impl<'a> SceneRenderer<'a> {
    pub fn new(ctx: RenderCtx<'a>) -> Self {
        Self {
            ctx,
            encoder: None,
            scratch: Vec::new(),
        }
    }

    /// Finished offscreen commands, or `None` if nothing was recorded.
    pub fn finish(self) -> Option<wgpu::CommandBuffer> {
        self.encoder.map(|encoder| encoder.finish())
    }
}

impl SurfaceRenderer<SceneSurface> for SceneRenderer<'_> {
    fn render(&mut self, surface: &SceneSurface) {
        let device = self.ctx.device;
        let encoder = self.encoder.get_or_insert_with(|| {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tremolo surfaces"),
            })
        });

        if surface.draw(&self.ctx, encoder, &mut self.scratch) {
            log::trace!("drew surface {}", surface.label());
        }
    }
}
