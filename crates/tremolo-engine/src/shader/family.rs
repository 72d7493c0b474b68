use super::{ShaderBundle, ShaderError, ShaderTemplate, Uniform, UniformComposer, UniformLayer};

/// A composer together with the layers every bundle of a family shares.
///
/// `extend` stacks one more per-bundle layer on top (base → model →
/// overrides → extra), so related bundles can share cells such as `time`
/// while differing in a few values or in their fragment stage.
#[derive(Debug, Clone)]
pub struct ShaderFamily {
    composer: UniformComposer,
    base: UniformLayer,
    model: Option<UniformLayer>,
    overrides: Option<UniformLayer>,
}

impl ShaderFamily {
    pub fn new(template: ShaderTemplate, base: UniformLayer) -> Self {
        Self {
            composer: UniformComposer::new(template),
            base,
            model: None,
            overrides: None,
        }
    }

    pub fn with_model(mut self, model: UniformLayer) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_overrides(mut self, overrides: UniformLayer) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Bundle with the family's layers and default fragment stage.
    pub fn bundle(&self) -> Result<ShaderBundle, ShaderError> {
        self.extend(None, None)
    }

    pub fn extend(
        &self,
        extra: Option<&UniformLayer>,
        fragment: Option<&str>,
    ) -> Result<ShaderBundle, ShaderError> {
        let layers: Vec<&UniformLayer> = std::iter::once(&self.base)
            .chain(self.model.as_ref())
            .chain(self.overrides.as_ref())
            .chain(extra)
            .collect();
        self.composer.compose_layers(&layers, fragment)
    }

    /// Handle that `name` resolves to across the family's layers.
    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        [self.overrides.as_ref(), self.model.as_ref(), Some(&self.base)]
            .into_iter()
            .flatten()
            .find_map(|layer| layer.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{TimeCell, UniformKind, prelude::STOCK_VERTEX, validate_wgsl};

    const TEMPLATE: ShaderTemplate = ShaderTemplate {
        label: "ramp",
        vertex: STOCK_VERTEX,
        prelude: "fn ramp(x: f32) -> f32 { return clamp(x * u.gain, 0.0, 1.0); }\n",
        default_fragment: "@fragment\nfn fs_main(frag: VertexOut) -> @location(0) vec4<f32> {\n    return vec4<f32>(vec3<f32>(ramp(frag.uv.x)), 1.0);\n}\n",
        required: &[("gain", UniformKind::Float)],
    };

    #[test]
    fn extend_shares_family_cells() {
        let time = TimeCell::new(0.0);
        let family = ShaderFamily::new(TEMPLATE, UniformLayer::new().with_value("gain", 1.0f32))
            .with_overrides(UniformLayer::new().with("time", time.uniform()));

        let main = family.bundle().unwrap();
        let cap = family
            .extend(Some(&UniformLayer::new().with_value("gain", 0.5f32)), None)
            .unwrap();

        assert!(main.uniform("time").unwrap().ptr_eq(cap.uniform("time").unwrap()));
        assert!(!main.uniform("gain").unwrap().ptr_eq(cap.uniform("gain").unwrap()));
        assert_eq!(cap.uniform("gain").unwrap().float(), Some(0.5));
    }

    #[test]
    fn uniform_resolves_by_precedence() {
        let family = ShaderFamily::new(TEMPLATE, UniformLayer::new().with_value("gain", 1.0f32))
            .with_model(UniformLayer::new().with_value("gain", 2.0f32))
            .with_overrides(UniformLayer::new().skip("gain"));

        assert_eq!(family.uniform("gain").and_then(Uniform::float), Some(2.0));
        assert_eq!(
            family.bundle().unwrap().uniform("gain").and_then(Uniform::float),
            Some(2.0)
        );
    }

    #[test]
    fn family_bundles_validate() {
        let family = ShaderFamily::new(TEMPLATE, UniformLayer::new().with_value("gain", 1.0f32));
        let bundle = family.bundle().unwrap();
        validate_wgsl(bundle.fragment_source());
    }
}
