use winit::dpi::PhysicalSize;

/// What the runtime should do after a failed frame acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface reconfigured; try again on the next frame.
    Reconfigured,
    /// Drop this frame.
    SkipFrame,
    /// Unrecoverable (out of memory); exit.
    Fatal,
}

/// The window's swapchain and the configuration it was last given.
///
/// `size` tracks the window even while it is minimized; the configuration
/// keeps the last non-empty size because wgpu rejects zero extents.
pub(crate) struct WindowSurface<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl<'w> WindowSurface<'w> {
    pub(crate) fn configure(
        surface: wgpu::Surface<'w>,
        device: &wgpu::Device,
        config: wgpu::SurfaceConfiguration,
    ) -> Self {
        surface.configure(device, &config);
        let size = PhysicalSize::new(config.width, config.height);
        Self {
            surface,
            config,
            size,
        }
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn drawable(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    pub(crate) fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.size = size;
        if self.drawable() {
            self.config.width = size.width;
            self.config.height = size.height;
            self.surface.configure(device, &self.config);
        }
    }

    pub(crate) fn acquire(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    pub(crate) fn recover(&self, device: &wgpu::Device, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        log::warn!("surface error: {err}");
        let action = error_action(&err);
        if action == SurfaceErrorAction::Reconfigured && self.drawable() {
            self.surface.configure(device, &self.config);
        }
        action
    }
}

fn error_action(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

/// Swapchain format matching the sRGB preference, else whatever comes first.
pub(crate) fn pick_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let matching = caps.formats.iter().find(|f| f.is_srgb() == prefer_srgb);
    matching.or(caps.formats.first()).copied()
}

/// The requested alpha mode if the surface supports it.
pub(crate) fn pick_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    match requested {
        Some(mode) if caps.alpha_modes.contains(&mode) => mode,
        _ => caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode, SurfaceCapabilities, TextureFormat};

    fn caps(formats: &[TextureFormat], alpha_modes: &[CompositeAlphaMode]) -> SurfaceCapabilities {
        SurfaceCapabilities {
            formats: formats.to_vec(),
            alpha_modes: alpha_modes.to_vec(),
            ..SurfaceCapabilities::default()
        }
    }

    #[test]
    fn format_follows_the_srgb_preference() {
        let caps = caps(
            &[TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm],
            &[],
        );
        assert_eq!(pick_format(&caps, false), Some(TextureFormat::Bgra8Unorm));
        assert_eq!(pick_format(&caps, true), Some(TextureFormat::Bgra8UnormSrgb));

        let only_srgb = self::caps(&[TextureFormat::Rgba8UnormSrgb], &[]);
        assert_eq!(pick_format(&only_srgb, false), Some(TextureFormat::Rgba8UnormSrgb));
        assert_eq!(pick_format(&self::caps(&[], &[]), false), None);
    }

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        let caps = caps(&[], &[CompositeAlphaMode::Opaque, CompositeAlphaMode::PreMultiplied]);
        assert_eq!(
            pick_alpha_mode(&caps, Some(CompositeAlphaMode::PreMultiplied)),
            CompositeAlphaMode::PreMultiplied
        );
        assert_eq!(
            pick_alpha_mode(&caps, Some(CompositeAlphaMode::PostMultiplied)),
            CompositeAlphaMode::Opaque
        );
        assert_eq!(pick_alpha_mode(&self::caps(&[], &[]), None), CompositeAlphaMode::Auto);
    }

    #[test]
    fn lost_surfaces_are_reconfigured_and_oom_is_fatal() {
        assert_eq!(error_action(&wgpu::SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(error_action(&wgpu::SurfaceError::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(error_action(&wgpu::SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(error_action(&wgpu::SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
    }
}
