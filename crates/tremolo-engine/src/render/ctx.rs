use crate::coords::Viewport;

/// Device handles and window metrics for one frame.
#[derive(Clone, Copy)]
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Window size in logical pixels.
    pub viewport: Viewport,
    pub scale_factor: f32,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
        scale_factor: f32,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            viewport,
            scale_factor,
        }
    }

    /// Window size in physical pixels, at least 1x1.
    pub fn physical_size(&self) -> (u32, u32) {
        let w = (self.viewport.width * self.scale_factor).round().max(1.0) as u32;
        let h = (self.viewport.height * self.scale_factor).round().max(1.0) as u32;
        (w, h)
    }
}

/// Window colour target for the current frame.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}
