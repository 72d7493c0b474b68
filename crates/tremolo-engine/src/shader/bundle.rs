use std::collections::BTreeMap;

use super::{Uniform, UniformLayout};

/// Vertex stage, fragment stage and uniform set, ready for a pipeline.
///
/// Immutable once built; only values inside the shared cells change.
#[derive(Debug, Clone)]
pub struct ShaderBundle {
    label: String,
    vertex_source: String,
    fragment_source: String,
    uniforms: BTreeMap<String, Uniform>,
    layout: UniformLayout,
}

impl ShaderBundle {
    pub(crate) fn new(
        label: String,
        vertex_source: String,
        fragment_source: String,
        uniforms: BTreeMap<String, Uniform>,
        layout: UniformLayout,
    ) -> Self {
        Self {
            label,
            vertex_source,
            fragment_source,
            uniforms,
            layout,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    pub fn uniforms(&self) -> &BTreeMap<String, Uniform> {
        &self.uniforms
    }

    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Packs current uniform values for upload.
    pub fn write_uniforms(&self, out: &mut Vec<u8>) {
        self.layout.write(&self.uniforms, out);
    }
}
