//! GPU rendering.
//!
//! Each [`SceneSurface`] owns an offscreen colour target. The scheduler drives
//! [`SceneRenderer`] to redraw dirty surfaces into their targets; the
//! [`Compositor`] then places every target onto the window.
//!
//! Conventions:
//! - window placement is in logical pixels, top-left origin, +Y down
//! - mesh regions are normalized to the surface, top-left origin, +Y down
//! - colours leave fragment stages premultiplied

mod compositor;
mod ctx;
mod pipeline;
mod renderer;
mod scene;
mod surface;

pub use compositor::{Compositor, PlacedQuad, Placement, placement_for};
pub use ctx::{RenderCtx, RenderTarget};
pub use pipeline::BundlePipeline;
pub use renderer::SceneRenderer;
pub use scene::{Mesh, Scene};
pub use surface::{SURFACE_FORMAT, SceneSurface};

pub(crate) fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}
