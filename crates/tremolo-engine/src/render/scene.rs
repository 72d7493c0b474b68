use crate::coords::{Rect, Vec2};
use crate::shader::ShaderBundle;

/// A bundle drawn as a quad inside a region of its surface.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub bundle: ShaderBundle,
    /// Normalized to the surface (0..1), top-left origin.
    pub region: Rect,
}

impl Mesh {
    pub fn new(bundle: ShaderBundle, region: Rect) -> Self {
        Self {
            bundle,
            region: region.normalized(),
        }
    }

    /// Covers the whole surface.
    pub fn fullscreen(bundle: ShaderBundle) -> Self {
        Self::new(bundle, Rect::new(0.0, 0.0, 1.0, 1.0))
    }

    /// Region in target pixels, clipped to the target.
    pub fn pixel_region(&self, width: u32, height: u32) -> Option<Rect> {
        let (w, h) = (width as f32, height as f32);
        let region = Rect::from_origin_size(
            Vec2::new(self.region.origin.x * w, self.region.origin.y * h),
            Vec2::new(self.region.size.x * w, self.region.size.y * h),
        );
        region.intersect(Rect::new(0.0, 0.0, w, h))
    }
}

/// Meshes of one surface in draw order, plus its clear colour.
#[derive(Debug, Clone)]
pub struct Scene {
    meshes: Vec<Mesh>,
    clear: wgpu::Color,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            meshes: Vec::new(),
            clear: wgpu::Color::TRANSPARENT,
        }
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.meshes.push(mesh);
        self
    }

    pub fn with_clear(mut self, clear: wgpu::Color) -> Self {
        self.clear = clear;
        self
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn clear(&self) -> wgpu::Color {
        self.clear
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{UniformComposer, UniformLayer};

    fn bundle() -> ShaderBundle {
        UniformComposer::default()
            .compose(&UniformLayer::new(), None, None, None)
            .unwrap()
    }

    #[test]
    fn fullscreen_covers_target() {
        let mesh = Mesh::fullscreen(bundle());
        assert_eq!(mesh.pixel_region(200, 100), Some(Rect::new(0.0, 0.0, 200.0, 100.0)));
    }

    #[test]
    fn region_is_scaled_and_clipped() {
        let mesh = Mesh::new(bundle(), Rect::new(0.75, 0.5, 0.5, 0.5));
        assert_eq!(mesh.pixel_region(200, 100), Some(Rect::new(150.0, 50.0, 50.0, 50.0)));

        let outside = Mesh::new(bundle(), Rect::new(1.5, 0.0, 0.5, 1.0));
        assert_eq!(outside.pixel_region(200, 100), None);
    }

    #[test]
    fn negative_regions_are_normalized() {
        let mesh = Mesh::new(bundle(), Rect::new(1.0, 1.0, -0.5, -0.5));
        assert_eq!(mesh.region, Rect::new(0.5, 0.5, 0.5, 0.5));
    }
}
