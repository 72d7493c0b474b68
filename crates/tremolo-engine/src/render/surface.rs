use std::cell::{Cell, RefCell};

use super::{BundlePipeline, RenderCtx, Scene};

/// Colour format of every surface's offscreen target.
pub const SURFACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub(super) struct SurfaceTarget {
    pub(super) size: (u32, u32),
    pub(super) view: wgpu::TextureView,
    /// Compositor binding for `view`; rebuilt with the target.
    pub(super) composite: Option<CompositeBinding>,
}

pub(super) struct CompositeBinding {
    /// Compositor pipeline generation the bind group was made for.
    pub(super) generation: u64,
    pub(super) placement: wgpu::Buffer,
    pub(super) bind_group: wgpu::BindGroup,
}

pub(super) struct SurfaceGpu {
    pipelines: Vec<BundlePipeline>,
    pub(super) target: Option<SurfaceTarget>,
}

/// A diagram's drawable: its scene plus an offscreen colour target.
///
/// Scheduler callbacks are registered against an `Rc<SceneSurface>`; the
/// surface's identity is that `Rc`. GPU resources are created on first draw.
pub struct SceneSurface {
    label: String,
    scene: Scene,
    pixel_size: Cell<(u32, u32)>,
    invalidated: Cell<bool>,
    pub(super) gpu: RefCell<Option<SurfaceGpu>>,
}

impl SceneSurface {
    /// New surfaces start invalidated so their first tick draws them.
    pub fn new(label: impl Into<String>, scene: Scene) -> Self {
        Self {
            label: label.into(),
            scene,
            pixel_size: Cell::new((0, 0)),
            invalidated: Cell::new(true),
            gpu: RefCell::new(None),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Target size in physical pixels. A change invalidates the surface.
    pub fn set_pixel_size(&self, width: u32, height: u32) {
        if self.pixel_size.replace((width, height)) != (width, height) {
            self.invalidate();
        }
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        self.pixel_size.get()
    }

    /// Requests a redraw on the next processed tick.
    pub fn invalidate(&self) {
        self.invalidated.set(true);
    }

    /// Consumes a pending invalidation.
    pub fn take_invalidated(&self) -> bool {
        self.invalidated.replace(false)
    }

    /// True once the surface has been drawn at least once. After a resize
    /// the previous drawing stays presentable until the next draw.
    pub fn is_presentable(&self) -> bool {
        self.gpu
            .borrow()
            .as_ref()
            .is_some_and(|gpu| gpu.target.is_some())
    }

    /// Records a redraw into `encoder`. Returns false when there is nothing
    /// to draw into (zero size).
    pub(crate) fn draw(
        &self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        scratch: &mut Vec<u8>,
    ) -> bool {
        let requested = self.pixel_size.get();
        if requested.0 == 0 || requested.1 == 0 {
            return false;
        }
        let (width, height) =
            fit_extent(requested, ctx.device.limits().max_texture_dimension_2d);

        let mut slot = self.gpu.borrow_mut();
        let gpu = slot.get_or_insert_with(|| SurfaceGpu {
            pipelines: self
                .scene
                .meshes()
                .iter()
                .map(|mesh| BundlePipeline::new(ctx.device, mesh.bundle.clone(), SURFACE_FORMAT))
                .collect(),
            target: None,
        });

        if gpu.target.as_ref().is_none_or(|t| t.size != (width, height)) {
            log::debug!("{}: allocating {width}x{height} target", self.label);
            gpu.target = Some(create_target(ctx.device, &self.label, width, height));
        }
        let Some(target) = gpu.target.as_ref() else {
            return false;
        };

        for pipeline in &gpu.pipelines {
            pipeline.upload(ctx.queue, scratch);
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&self.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.scene.clear()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for (mesh, pipeline) in self.scene.meshes().iter().zip(&gpu.pipelines) {
            let Some(region) = mesh.pixel_region(width, height) else {
                continue;
            };
            pass.set_viewport(
                region.origin.x,
                region.origin.y,
                region.size.x,
                region.size.y,
                0.0,
                1.0,
            );
            pipeline.draw(&mut pass);
        }

        true
    }
}

/// Shrinks `size` uniformly until neither side exceeds `max_side`. The
/// compositor stretches the smaller target over the full placement.
fn fit_extent((width, height): (u32, u32), max_side: u32) -> (u32, u32) {
    let largest = width.max(height);
    if largest <= max_side {
        return (width, height);
    }
    let scale = f64::from(max_side) / f64::from(largest);
    let fit = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, max_side);
    (fit(width), fit(height))
}

fn create_target(device: &wgpu::Device, label: &str, width: u32, height: u32) -> SurfaceTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SURFACE_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });

    SurfaceTarget {
        size: (width, height),
        view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        composite: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_surface_starts_invalidated() {
        let surface = SceneSurface::new("s", Scene::new());
        assert!(surface.take_invalidated());
        assert!(!surface.take_invalidated());
    }

    #[test]
    fn resizing_invalidates_once() {
        let surface = SceneSurface::new("s", Scene::new());
        surface.take_invalidated();

        surface.set_pixel_size(320, 200);
        assert!(surface.take_invalidated());

        surface.set_pixel_size(320, 200);
        assert!(!surface.take_invalidated());
        assert_eq!(surface.pixel_size(), (320, 200));
    }

    #[test]
    fn oversized_targets_shrink_to_the_device_limit() {
        assert_eq!(fit_extent((1504, 500), 8192), (1504, 500));
        assert_eq!(fit_extent((8192, 8192), 8192), (8192, 8192));
        assert_eq!(fit_extent((16_384, 500), 8192), (8192, 250));
        assert_eq!(fit_extent((300, 20_000), 2048), (31, 2048));
        assert_eq!(fit_extent((100_000, 1), 4096), (4096, 1));
    }

    #[test]
    fn undrawn_surface_is_not_presentable() {
        let surface = SceneSurface::new("s", Scene::new());
        surface.set_pixel_size(10, 10);
        assert!(!surface.is_presentable());
    }
}
