use std::iter;

use anyhow::{Context, Result, ensure};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface::{self, WindowSurface};
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// Device, queue and swapchain for the studio window.
///
/// The swapchain borrows the window, so the window must outlive the `Gpu`.
pub struct Gpu<'w> {
    device: wgpu::Device,
    queue: wgpu::Queue,
    window: WindowSurface<'w>,
}

impl<'w> Gpu<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let target = instance
            .create_surface(window)
            .context("failed to create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&target),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to the window")?;
        let info = adapter.get_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tremolo device"),
                required_features: init.required_features,
                // The requested limits are a floor; take what the adapter offers above it.
                required_limits: init.required_limits.using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open the GPU device")?;

        let caps = target.get_capabilities(&adapter);
        let format = surface::pick_format(&caps, init.prefer_srgb)
            .context("the window surface offers no texture formats")?;
        log::debug!("swapchain format {format:?}, {}x{}", size.width, size.height);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode: surface::pick_alpha_mode(&caps, init.alpha_mode),
            view_formats: Vec::new(),
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        let window = WindowSurface::configure(target, &device, config);

        Ok(Self {
            device,
            queue,
            window,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.window.format()
    }

    /// Window size in physical pixels; zero while minimized.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.window.size()
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.window.resize(&self.device, size);
    }

    pub fn begin_frame(&self) -> Result<GpuFrame, wgpu::SurfaceError> {
        let surface_texture = self.window.acquire()?;
        let view = surface_texture.texture.create_view(&Default::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tremolo window pass"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits `prelude` (diagram targets) before the window pass, then presents.
    pub fn submit(&self, frame: GpuFrame, prelude: Option<wgpu::CommandBuffer>) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;

        self.queue.submit(prelude.into_iter().chain(iter::once(encoder.finish())));
        drop(view);
        surface_texture.present();
    }

    /// Submits diagram targets without presenting, e.g. when no swapchain
    /// image could be acquired.
    pub fn submit_offscreen(&self, commands: wgpu::CommandBuffer) {
        self.queue.submit(iter::once(commands));
    }

    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        self.window.recover(&self.device, err)
    }
}
