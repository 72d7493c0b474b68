use std::num::NonZeroU64;

use crate::shader::{ShaderBundle, UNIFORM_BINDING};

use super::premul_alpha_blend;

struct UniformBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Render pipeline and uniform buffer built from one [`ShaderBundle`].
///
/// The bundle is kept so its shared uniform cells can be re-packed and
/// uploaded before every draw.
pub struct BundlePipeline {
    bundle: ShaderBundle,
    pipeline: wgpu::RenderPipeline,
    uniforms: Option<UniformBinding>,
}

impl BundlePipeline {
    pub fn new(device: &wgpu::Device, bundle: ShaderBundle, format: wgpu::TextureFormat) -> Self {
        let label = bundle.label().to_string();

        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} vertex")),
            source: wgpu::ShaderSource::Wgsl(bundle.vertex_source().into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} fragment")),
            source: wgpu::ShaderSource::Wgsl(bundle.fragment_source().into()),
        });

        // No uniforms: no block in the shader, so no bind group either.
        let uniform_size = NonZeroU64::new(bundle.layout().size() as u64);
        let bind_group_layout = uniform_size.map(|size| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label} uniforms bgl")),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: UNIFORM_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(size),
                    },
                    count: None,
                }],
            })
        });

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> =
            bind_group_layout.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} pipeline layout")),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{label} pipeline")),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let uniforms = match (uniform_size, bind_group_layout.as_ref()) {
            (Some(size), Some(layout)) => {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("{label} uniforms")),
                    size: size.get(),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("{label} uniforms bind group")),
                    layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: UNIFORM_BINDING,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                Some(UniformBinding { buffer, bind_group })
            }
            _ => None,
        };

        log::debug!(
            "built pipeline for {label} ({} uniform bytes)",
            bundle.layout().size()
        );

        Self {
            bundle,
            pipeline,
            uniforms,
        }
    }

    pub fn bundle(&self) -> &ShaderBundle {
        &self.bundle
    }

    /// Packs the bundle's current uniform values and queues the upload.
    pub fn upload(&self, queue: &wgpu::Queue, scratch: &mut Vec<u8>) {
        let Some(uniforms) = self.uniforms.as_ref() else {
            return;
        };
        self.bundle.write_uniforms(scratch);
        queue.write_buffer(&uniforms.buffer, 0, scratch);
    }

    /// Draws the quad with whatever viewport the pass has set.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        if let Some(uniforms) = self.uniforms.as_ref() {
            pass.set_bind_group(0, &uniforms.bind_group, &[]);
        }
        pass.draw(0..4, 0..1);
    }
}
