use std::collections::BTreeMap;
use std::iter;

use log::debug;

use super::prelude::{COMMON, STOCK_FRAGMENT, STOCK_VERTEX, VARYINGS};
use super::{ShaderBundle, ShaderError, Uniform, UniformKind, UniformLayer, UniformLayout};

/// Shader stages and helpers shared by a family of bundles.
#[derive(Debug, Clone, Copy)]
pub struct ShaderTemplate {
    pub label: &'static str,
    /// Vertex stage; may use `VertexOut` but not the uniform block.
    pub vertex: &'static str,
    /// Family helpers placed after the common prelude.
    pub prelude: &'static str,
    /// Fragment stage used when the caller supplies none.
    pub default_fragment: &'static str,
    /// Uniforms `prelude` reads, with their kinds.
    pub required: &'static [(&'static str, UniformKind)],
}

impl ShaderTemplate {
    /// Passthrough template: fullscreen quad, uv gradient fragment.
    pub const fn stock() -> Self {
        Self {
            label: "stock",
            vertex: STOCK_VERTEX,
            prelude: "",
            default_fragment: STOCK_FRAGMENT,
            required: &[],
        }
    }
}

impl Default for ShaderTemplate {
    fn default() -> Self {
        Self::stock()
    }
}

/// Builds shader bundles by layering uniform sets over a template.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformComposer {
    template: ShaderTemplate,
}

impl UniformComposer {
    pub fn new(template: ShaderTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &ShaderTemplate {
        &self.template
    }

    /// Merges `base`, then `model`, then `overrides`; later layers win.
    ///
    /// `fragment` replaces the template's default stage and is appended after
    /// the shared prelude.
    pub fn compose(
        &self,
        base: &UniformLayer,
        model: Option<&UniformLayer>,
        overrides: Option<&UniformLayer>,
        fragment: Option<&str>,
    ) -> Result<ShaderBundle, ShaderError> {
        let layers: Vec<&UniformLayer> = iter::once(base).chain(model).chain(overrides).collect();
        self.compose_layers(&layers, fragment)
    }

    /// Merges any number of layers in order. No layers yields a bundle with
    /// no uniforms, which only succeeds for templates that require none.
    pub fn compose_layers(
        &self,
        layers: &[&UniformLayer],
        fragment: Option<&str>,
    ) -> Result<ShaderBundle, ShaderError> {
        let uniforms = merge(layers)?;
        self.check_required(&uniforms)?;

        let layout = UniformLayout::from_uniforms(&uniforms);
        let fragment_source = [
            layout.wgsl_block().as_str(),
            VARYINGS,
            COMMON,
            self.template.prelude,
            fragment.unwrap_or(self.template.default_fragment),
        ]
        .join("\n");
        let vertex_source = [VARYINGS, self.template.vertex].join("\n");

        debug!(
            "composed {} bundle: {} uniform(s), {} bytes",
            self.template.label,
            uniforms.len(),
            layout.size()
        );

        Ok(ShaderBundle::new(
            self.template.label.to_string(),
            vertex_source,
            fragment_source,
            uniforms,
            layout,
        ))
    }

    fn check_required(&self, uniforms: &BTreeMap<String, Uniform>) -> Result<(), ShaderError> {
        for &(name, expected) in self.template.required {
            let Some(uniform) = uniforms.get(name) else {
                return Err(ShaderError::MissingUniform {
                    template: self.template.label.to_string(),
                    name: name.to_string(),
                });
            };
            let found = uniform.kind();
            if found != expected {
                return Err(ShaderError::WrongUniformKind {
                    template: self.template.label.to_string(),
                    name: name.to_string(),
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

fn merge(layers: &[&UniformLayer]) -> Result<BTreeMap<String, Uniform>, ShaderError> {
    let mut merged = BTreeMap::new();
    for layer in layers {
        for (name, slot) in layer.iter() {
            validate_uniform_name(name)?;
            if let Some(uniform) = slot {
                merged.insert(name.to_string(), uniform.clone());
            }
        }
    }
    Ok(merged)
}

/// Accepts WGSL identifiers that are usable as struct members.
pub fn validate_uniform_name(name: &str) -> Result<(), ShaderError> {
    let invalid = || ShaderError::InvalidUniformName(name.to_string());

    let mut chars = name.chars();
    let first = chars.next().ok_or_else(invalid)?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(invalid());
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid());
    }
    if name == "_" || name.starts_with("__") || RESERVED.contains(&name) {
        return Err(invalid());
    }
    Ok(())
}

// WGSL keywords and reserved words.
const RESERVED: &[&str] = &[
    "NULL", "Self", "abstract", "active", "alias", "alignas", "alignof", "as", "asm",
    "asm_fragment", "async", "attribute", "auto", "await", "become", "binding_array", "bitcast",
    "bool", "break", "case", "cast", "catch", "class", "co_await", "co_return", "co_yield",
    "coherent", "column_major", "common", "compile", "compile_fragment", "concept", "const",
    "const_assert", "const_cast", "consteval", "constexpr", "constinit", "continue", "continuing",
    "crate", "debugger", "decltype", "default", "delete", "demote", "demote_to_helper",
    "diagnostic", "discard", "do", "dynamic_cast", "else", "enable", "enum", "explicit", "export",
    "extends", "extern", "external", "f16", "f32", "fallthrough", "false", "filter", "final",
    "finally", "fn", "for", "friend", "from", "fxgroup", "get", "goto", "groupshared", "highp",
    "i32", "if", "impl", "implements", "import", "inline", "instanceof", "interface", "layout",
    "let", "loop", "lowp", "macro", "macro_rules", "match", "mat2x2", "mat3x3", "mat4x4",
    "mediump", "meta", "mod", "module", "move", "mut", "mutable", "namespace", "new", "nil",
    "noexcept", "noinline", "nointerpolation", "noperspective", "null", "nullptr", "of",
    "operator", "override", "package", "packoffset", "partition", "pass", "patch",
    "pixelfragment", "precise", "precision", "premerge", "priv", "protected", "pub", "public",
    "readonly", "ref", "regardless", "register", "reinterpret_cast", "require", "requires",
    "resource", "restrict", "return", "self", "set", "shared", "sizeof", "smooth", "snorm",
    "static", "static_assert", "static_cast", "std", "struct", "subroutine", "super", "switch",
    "target", "template", "this", "thread_local", "throw", "trait", "true", "try", "type",
    "typedef", "typeid", "typename", "typeof", "u32", "union", "unless", "unorm", "unsafe",
    "unsized", "use", "using", "var", "varying", "vec2", "vec3", "vec4", "virtual", "volatile",
    "wgsl", "where", "while", "with", "writeonly", "yield",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{TimeCell, UniformValue, validate_wgsl};

    const SCALED: ShaderTemplate = ShaderTemplate {
        label: "scaled",
        vertex: STOCK_VERTEX,
        prelude: "fn scaled(x: f32) -> f32 { return x * u.scale; }\n",
        default_fragment: "@fragment\nfn fs_main(frag: VertexOut) -> @location(0) vec4<f32> {\n    return vec4<f32>(vec3<f32>(scaled(frag.uv.x)), 1.0);\n}\n",
        required: &[("scale", UniformKind::Float)],
    };

    fn base() -> UniformLayer {
        UniformLayer::new()
            .with_value("scale", 1.0f32)
            .with_value("offset", 0.0f32)
            .with_value("tint", [1.0f32, 1.0, 1.0])
    }

    // ── precedence ────────────────────────────────────────────────────────

    #[test]
    fn later_layers_win_by_handle() {
        let base = base();
        let model_scale = Uniform::new(2.0f32);
        let override_scale = Uniform::new(3.0f32);
        let model = UniformLayer::new()
            .with("scale", model_scale.clone())
            .with_value("omega", 1.0f32);
        let overrides = UniformLayer::new().with("scale", override_scale.clone());

        let composer = UniformComposer::new(SCALED);
        let bundle = composer
            .compose(&base, Some(&model), Some(&overrides), None)
            .unwrap();

        assert!(bundle.uniform("scale").unwrap().ptr_eq(&override_scale));
        assert!(bundle
            .uniform("offset")
            .unwrap()
            .ptr_eq(base.get("offset").unwrap()));
        assert!(bundle
            .uniform("omega")
            .unwrap()
            .ptr_eq(model.get("omega").unwrap()));
    }

    #[test]
    fn skipped_override_keeps_earlier_value() {
        let base = base();
        let model = UniformLayer::new().with_value("scale", 2.0f32);
        let overrides = UniformLayer::new().skip("scale");

        let bundle = UniformComposer::new(SCALED)
            .compose(&base, Some(&model), Some(&overrides), None)
            .unwrap();

        assert!(bundle
            .uniform("scale")
            .unwrap()
            .ptr_eq(model.get("scale").unwrap()));
    }

    #[test]
    fn skip_alone_does_not_introduce_a_uniform() {
        let overrides = UniformLayer::new().skip("phase");
        let bundle = UniformComposer::new(SCALED)
            .compose(&base(), None, Some(&overrides), None)
            .unwrap();
        assert!(bundle.uniform("phase").is_none());
    }

    #[test]
    fn inputs_are_not_mutated() {
        let base = base();
        let overrides = UniformLayer::new().with_value("scale", 5.0f32);
        UniformComposer::new(SCALED)
            .compose(&base, None, Some(&overrides), None)
            .unwrap();

        assert_eq!(base.get("scale").unwrap().float(), Some(1.0));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn no_overrides_matches_defaults() {
        let base = base();
        let bundle = UniformComposer::new(SCALED)
            .compose(&base, None, None, None)
            .unwrap();

        assert_eq!(bundle.uniforms().len(), base.len());
        for (name, uniform) in base.iter() {
            assert!(bundle.uniform(name).unwrap().ptr_eq(uniform.unwrap()));
        }
    }

    // ── shared cells ──────────────────────────────────────────────────────

    #[test]
    fn shared_time_is_visible_in_every_bundle() {
        let time = TimeCell::new(0.0);
        let shared = UniformLayer::new().with("time", time.uniform());
        let composer = UniformComposer::new(SCALED);

        let a = composer.compose(&base(), None, Some(&shared), None).unwrap();
        let b = composer.compose(&base(), None, Some(&shared), None).unwrap();

        time.write(0.4);
        assert_eq!(a.uniform("time").unwrap().get(), UniformValue::Float(0.4));
        assert_eq!(b.uniform("time").unwrap().get(), UniformValue::Float(0.4));

        let mut bytes = Vec::new();
        b.write_uniforms(&mut bytes);
        let offset = b.layout().field("time").unwrap().offset;
        assert_eq!(&bytes[offset..offset + 4], &0.4f32.to_ne_bytes());
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn missing_required_uniform_is_reported() {
        let err = UniformComposer::new(SCALED)
            .compose(&UniformLayer::new(), None, None, None)
            .unwrap_err();
        assert_eq!(
            err,
            ShaderError::MissingUniform {
                template: "scaled".into(),
                name: "scale".into()
            }
        );
    }

    #[test]
    fn required_kind_is_checked() {
        let base = UniformLayer::new().with_value("scale", [1.0f32, 2.0]);
        let err = UniformComposer::new(SCALED)
            .compose(&base, None, None, None)
            .unwrap_err();
        assert!(matches!(err, ShaderError::WrongUniformKind { .. }));
    }

    #[test]
    fn invalid_names_are_rejected() {
        for name in ["", "1abc", "has space", "mod", "__x", "_", "caf\u{e9}"] {
            assert!(validate_uniform_name(name).is_err(), "{name:?}");
        }
        for name in ["time", "_private", "select_depth", "vec3_color"] {
            assert!(validate_uniform_name(name).is_ok(), "{name:?}");
        }

        let base = base().with_value("fn", 1.0f32);
        assert_eq!(
            UniformComposer::new(SCALED)
                .compose(&base, None, None, None)
                .unwrap_err(),
            ShaderError::InvalidUniformName("fn".into())
        );
    }

    #[test]
    fn zero_layers_on_stock_template() {
        let bundle = UniformComposer::default().compose_layers(&[], None).unwrap();
        assert!(bundle.uniforms().is_empty());
        assert_eq!(bundle.layout().size(), 0);
        validate_wgsl(bundle.fragment_source());
    }

    // ── sources ───────────────────────────────────────────────────────────

    #[test]
    fn custom_fragment_follows_prelude() {
        let fragment = "@fragment\nfn fs_main(frag: VertexOut) -> @location(0) vec4<f32> {\n    return vec4<f32>(hsv_lerp(u.tint, u.tint, scaled(u.offset)), 1.0);\n}\n";
        let bundle = UniformComposer::new(SCALED)
            .compose(&base(), None, None, Some(fragment))
            .unwrap();

        let src = bundle.fragment_source();
        let prelude_at = src.find("fn scaled").unwrap();
        let fragment_at = src.find("hsv_lerp(u.tint").unwrap();
        assert!(prelude_at < fragment_at);
        assert!(!src.contains("scaled(frag.uv.x)"));
        validate_wgsl(src);
    }

    #[test]
    fn composed_stages_are_valid_wgsl() {
        let bundle = UniformComposer::new(SCALED)
            .compose(&base(), None, None, None)
            .unwrap();
        validate_wgsl(bundle.vertex_source());
        validate_wgsl(bundle.fragment_source());
    }
}
