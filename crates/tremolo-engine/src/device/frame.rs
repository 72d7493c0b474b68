/// One acquired swapchain image plus the encoder recording into it.
///
/// Presented when dropped after submission; hold it only for the duration of
/// a frame.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
