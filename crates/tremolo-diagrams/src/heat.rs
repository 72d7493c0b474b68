//! The heat shader family.
//!
//! Every heat bundle maps a position along a rod to a temperature by
//! evaluating the heat equation's Fourier series for a square initial
//! condition, then shades it between the cold and hot colours.

use tremolo_engine::shader::prelude::STOCK_VERTEX;
use tremolo_engine::shader::{
    ShaderBundle, ShaderError, ShaderFamily, ShaderTemplate, Uniform, UniformKind, UniformLayer,
};

use crate::palette;

/// Uniforms the heat prelude reads.
const HEAT_UNIFORMS: &[(&str, UniformKind)] = &[
    ("time", UniformKind::Float),
    ("hot", UniformKind::Vec3),
    ("cold", UniformKind::Vec3),
    ("omega", UniformKind::Float),
    ("scale", UniformKind::Float),
    ("offset", UniformKind::Float),
    ("select_depth", UniformKind::Float),
    ("phase_animation", UniformKind::Float),
    ("initial_square", UniformKind::Bool),
    ("conductivity", UniformKind::Float),
    ("harmonics", UniformKind::Float),
];

const HEAT_PRELUDE: &str = r#"
const KERNEL_PHASE: f32 = 0.5;
const MAX_HARMONICS: f32 = 63.0;

// Temperature in [-1, 1] at rod position `pos` after diffusing for `t`.
fn kernel(pos: f32, t: f32) -> f32 {
    var x = pos;
    if (u.omega > 0.0) {
        x = (pos - wrap(u.omega / 4.0, 1.0)) / (u.omega / 2.0);
    }

    let o_pi = PI * u.omega;
    let dx = -u.conductivity * (t / 15.0);
    let axis = x + KERNEL_PHASE;
    var amp = 1.0;
    if (u.harmonics > 1.0) {
        amp = 4.0 / PI;
    }

    var total = 0.0;
    for (var i = 1.0; i <= min(u.harmonics, MAX_HARMONICS); i = i + 2.0) {
        let w = o_pi * i;
        total = total + cos(w * axis - PI / 2.0) * exp(dx * w * w) / i * amp;
    }
    return clamp(total, -2.0, 2.0);
}

fn opacity() -> f32 {
    if (u.select_depth > u.time && u.phase_animation == 0.0) {
        return 0.0;
    }
    if (u.select_depth <= 0.0) {
        return 1.0;
    }
    return (0.75 + (sin(PI * 12.0 * u.select_depth - u.time * PI * 2.0) + 1.0) * 0.25)
        * (0.6 + (1.0 - u.select_depth) * 0.4);
}

fn brightness() -> f32 {
    if (u.select_depth > u.time && u.phase_animation == 0.0) {
        return 0.0;
    }
    if (u.select_depth <= 0.0) {
        return 0.0;
    }
    return (sin(PI * 7.0 * u.select_depth - u.time * PI * 2.0) + 1.0) * 0.1;
}

// rgb: colour for temperature `c` in [0, 1]; a: `c` padded into [0.1, 0.9].
fn shade(c: f32) -> vec4<f32> {
    let padding = 0.1;
    return vec4<f32>(
        hsv_lerp(u.cold, u.hot, c) + vec3<f32>(brightness()),
        c * (1.0 - padding * 2.0) + padding,
    );
}

// Temperature in [0, 1] at `x` along the rod, at depth `t`.
fn curve(x: f32, t: f32) -> f32 {
    var y = t;
    if (u.select_depth >= 0.0) {
        y = u.select_depth;
    }

    let base = x / u.scale * u.omega / 2.0 + u.offset;
    if (u.initial_square != 0u && y == 0.0) {
        return select(0.0, 1.0, wrap(base, 1.0) < 0.5);
    }
    return (kernel(wrap(base + u.phase_animation * t, 1.0), y) + 1.0) / 2.0;
}

fn heat(x: f32) -> vec4<f32> {
    return shade(curve(x, u.time));
}

// Coverage of a soft line at distance `d`: 1 on the line, fading out around
// `width` * 10.
fn stroke(d: f32, width: f32) -> f32 {
    let t = clamp(1.0 - width / max(d, 1e-6), 0.0, 1.0);
    return 1.0 - t * t * (3.0 - 2.0 * t);
}
"#;

/// Rod body: temperature along `uv.y`.
pub const MAIN_FRAGMENT: &str = r#"
@fragment
fn fs_main(frag: VertexOut) -> @location(0) vec4<f32> {
    let a = opacity();
    return vec4<f32>(heat(frag.uv.y).rgb * a, a);
}
"#;

pub const HOT_CAP_FRAGMENT: &str = r#"
@fragment
fn fs_main(frag: VertexOut) -> @location(0) vec4<f32> {
    return vec4<f32>(heat(1.0).rgb, 1.0);
}
"#;

pub const COLD_CAP_FRAGMENT: &str = r#"
@fragment
fn fs_main(frag: VertexOut) -> @location(0) vec4<f32> {
    return vec4<f32>(heat(0.0).rgb, 1.0);
}
"#;

/// Temperature plotted as a line over `uv.x`.
pub const GRAPH_FRAGMENT: &str = r#"
@fragment
fn fs_main(frag: VertexOut) -> @location(0) vec4<f32> {
    let c = heat(frag.uv.x);
    let d = clamp(abs(0.925 * (1.0 - c.a) + frag.uv.y - 0.45 - 0.5), 0.0, 1.0);
    return stroke(d, 0.01) * vec4<f32>(c.rgb, 1.0);
}
"#;

/// One half of a contact rod, drawn over `u.span` of the mesh height and
/// transparent elsewhere so the half can slide inside its mesh.
pub const HALF_ROD_FRAGMENT: &str = r#"
@fragment
fn fs_main(frag: VertexOut) -> @location(0) vec4<f32> {
    let along = (frag.uv.y - u.span.x) / (u.span.y - u.span.x);
    if (along < 0.0 || along > 1.0) {
        return vec4<f32>(0.0);
    }
    let a = opacity();
    return vec4<f32>(heat(along).rgb * a, a);
}
"#;

pub const HEAT_TEMPLATE: ShaderTemplate = ShaderTemplate {
    label: "heat",
    vertex: STOCK_VERTEX,
    prelude: HEAT_PRELUDE,
    default_fragment: MAIN_FRAGMENT,
    required: HEAT_UNIFORMS,
};

/// Initial and boundary conditions of the simulated rod.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum HeatModel {
    /// A single sine-like temperature wave.
    #[default]
    Standard,
    /// Two rods at different temperatures brought into contact: a square
    /// wave resolved with 31 harmonics.
    Contact,
}

impl HeatModel {
    /// Uniforms this model changes relative to the family defaults.
    pub fn layer(self) -> Option<UniformLayer> {
        match self {
            HeatModel::Standard => None,
            HeatModel::Contact => Some(
                UniformLayer::new()
                    .with_value("omega", 1.0f32)
                    .with_value("harmonics", 31.0f32)
                    .with_value("conductivity", 3.0f32)
                    .with_value("offset", 0.25f32)
                    .with_value("initial_square", true),
            ),
        }
    }
}

/// Library defaults of every heat bundle, sharing `time`.
pub fn base_layer(time: Uniform) -> UniformLayer {
    UniformLayer::new()
        .with("time", time)
        .with_value("hot", palette::hot())
        .with_value("cold", palette::cold())
        .with_value("omega", 2.0f32)
        .with_value("scale", 1.0f32)
        .with_value("offset", 0.0f32)
        .with_value("select_depth", -1.0f32)
        .with_value("phase_animation", 0.0f32)
        .with_value("initial_square", false)
        .with_value("conductivity", 1.0f32)
        .with_value("harmonics", 1.0f32)
}

/// The bundles of one heat diagram: body plus both end caps.
///
/// All three share the family's cells, so writing `time` once updates every
/// face.
#[derive(Debug, Clone)]
pub struct HeatShaders {
    family: ShaderFamily,
    pub main: ShaderBundle,
    pub hot_cap: ShaderBundle,
    pub cold_cap: ShaderBundle,
}

impl HeatShaders {
    /// `fragment` replaces the body's stage; caps always use their own.
    pub fn new(
        model: HeatModel,
        time: Uniform,
        overrides: Option<UniformLayer>,
        fragment: Option<&str>,
    ) -> Result<Self, ShaderError> {
        let mut family = ShaderFamily::new(HEAT_TEMPLATE, base_layer(time));
        if let Some(layer) = model.layer() {
            family = family.with_model(layer);
        }
        if let Some(layer) = overrides {
            family = family.with_overrides(layer);
        }

        let main = family.extend(None, fragment)?;
        let hot_cap = family.extend(None, Some(HOT_CAP_FRAGMENT))?;
        let cold_cap = family.extend(None, Some(COLD_CAP_FRAGMENT))?;

        Ok(Self {
            family,
            main,
            hot_cap,
            cold_cap,
        })
    }

    /// A further bundle over the same cells, e.g. a differently scaled face.
    pub fn extend(
        &self,
        extra: Option<&UniformLayer>,
        fragment: Option<&str>,
    ) -> Result<ShaderBundle, ShaderError> {
        self.family.extend(extra, fragment)
    }

    /// The cell `name` resolves to for this family.
    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.family.uniform(name)
    }
}
