use std::num::NonZeroU64;

use crate::coords::{Rect, Viewport};

use super::surface::CompositeBinding;
use super::{RenderCtx, RenderTarget, SceneSurface, premul_alpha_blend};

const PLACEMENT_SIZE: u64 = 16;

/// A surface and where it sits in the window, in logical pixels.
#[derive(Clone, Copy)]
pub struct Placement<'s> {
    pub surface: &'s SceneSurface,
    pub rect: Rect,
}

/// Window viewport and texture window for one composited surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedQuad {
    /// Physical pixels, inside the window.
    pub viewport: Rect,
    /// `[u_min, v_min, u_max, v_max]` of the visible part of the target.
    pub uv: [f32; 4],
}

/// Clips `rect` (logical pixels) to the window and maps the visible part back
/// to texture coordinates. `None` if nothing is visible.
pub fn placement_for(rect: Rect, viewport: Viewport, scale_factor: f32) -> Option<PlacedQuad> {
    let rect = rect.normalized();
    if rect.is_empty() {
        return None;
    }
    let clip = rect.intersect(viewport.bounds())?;

    let to_uv = |x: f32, y: f32| {
        (
            (x - rect.origin.x) / rect.size.x,
            (y - rect.origin.y) / rect.size.y,
        )
    };
    let (u0, v0) = to_uv(clip.min().x, clip.min().y);
    let (u1, v1) = to_uv(clip.max().x, clip.max().y);

    let physical = viewport.bounds().scaled(scale_factor);
    let viewport = clip.scaled(scale_factor).intersect(physical)?;

    Some(PlacedQuad {
        viewport,
        uv: [u0, v0, u1, v1],
    })
}

/// Draws surface targets onto the window.
#[derive(Default)]
pub struct Compositor {
    format: Option<wgpu::TextureFormat>,
    generation: u64,
    pipeline: Option<wgpu::RenderPipeline>,
    layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composites `placements` in order over the target's current contents.
    /// Surfaces that have never been drawn are skipped.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        placements: &[Placement<'_>],
    ) {
        self.ensure_pipeline(ctx);
        let (Some(pipeline), Some(layout), Some(sampler)) =
            (self.pipeline.as_ref(), self.layout.as_ref(), self.sampler.as_ref())
        else {
            return;
        };

        let mut quads = Vec::with_capacity(placements.len());
        for placement in placements {
            let Some(quad) = placement_for(placement.rect, ctx.viewport, ctx.scale_factor) else {
                continue;
            };

            let mut slot = placement.surface.gpu.borrow_mut();
            let Some(surface_target) = slot.as_mut().and_then(|gpu| gpu.target.as_mut()) else {
                continue;
            };

            let stale = surface_target
                .composite
                .as_ref()
                .is_none_or(|b| b.generation != self.generation);
            if stale {
                surface_target.composite = Some(create_binding(
                    ctx.device,
                    layout,
                    sampler,
                    &surface_target.view,
                    self.generation,
                ));
            }
            let Some(binding) = surface_target.composite.as_ref() else {
                continue;
            };

            ctx.queue
                .write_buffer(&binding.placement, 0, bytemuck::cast_slice(&quad.uv));
            quads.push((quad.viewport, binding.bind_group.clone()));
        }

        if quads.is_empty() {
            return;
        }

        let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tremolo composite"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(pipeline);
        for (viewport, bind_group) in &quads {
            pass.set_viewport(
                viewport.origin.x,
                viewport.origin.y,
                viewport.size.x,
                viewport.size.y,
                0.0,
                1.0,
            );
            pass.set_bind_group(0, bind_group, &[]);
            pass.draw(0..4, 0..1);
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tremolo composite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/composite.wgsl").into()),
        });

        let layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("tremolo composite bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: NonZeroU64::new(PLACEMENT_SIZE),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("tremolo composite pipeline layout"),
                bind_group_layouts: &[&layout],
                immediate_size: 0,
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("tremolo composite pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: Some(premul_alpha_blend()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tremolo composite sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        self.format = Some(ctx.surface_format);
        self.generation += 1;
        self.pipeline = Some(pipeline);
        self.layout = Some(layout);
        self.sampler = Some(sampler);
    }
}

fn create_binding(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    view: &wgpu::TextureView,
    generation: u64,
) -> CompositeBinding {
    let placement = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("tremolo placement"),
        size: PLACEMENT_SIZE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("tremolo composite bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: placement.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    CompositeBinding {
        generation,
        placement,
        bind_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Viewport = Viewport::new(800.0, 600.0);

    #[test]
    fn fully_visible_rect_maps_whole_texture() {
        let quad = placement_for(Rect::new(100.0, 50.0, 400.0, 300.0), WINDOW, 2.0).unwrap();
        assert_eq!(quad.viewport, Rect::new(200.0, 100.0, 800.0, 600.0));
        assert_eq!(quad.uv, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn rect_above_window_is_clipped_at_top() {
        let quad = placement_for(Rect::new(0.0, -100.0, 800.0, 400.0), WINDOW, 1.0).unwrap();
        assert_eq!(quad.viewport, Rect::new(0.0, 0.0, 800.0, 300.0));
        assert_eq!(quad.uv, [0.0, 0.25, 1.0, 1.0]);
    }

    #[test]
    fn rect_below_window_is_clipped_at_bottom() {
        let quad = placement_for(Rect::new(0.0, 500.0, 800.0, 200.0), WINDOW, 1.0).unwrap();
        assert_eq!(quad.viewport, Rect::new(0.0, 500.0, 800.0, 100.0));
        assert_eq!(quad.uv, [0.0, 0.0, 1.0, 0.5]);
    }

    #[test]
    fn offscreen_or_empty_rect_is_skipped() {
        assert!(placement_for(Rect::new(0.0, 700.0, 800.0, 200.0), WINDOW, 1.0).is_none());
        assert!(placement_for(Rect::new(0.0, 0.0, 0.0, 200.0), WINDOW, 1.0).is_none());
    }
}
