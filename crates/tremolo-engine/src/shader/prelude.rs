//! WGSL shared by every composed bundle.

/// Interface between the vertex and fragment stages.
pub const VARYINGS: &str = r#"
struct VertexOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};
"#;

/// Fullscreen quad drawn as a 4-vertex triangle strip; `uv` is (0,0) at the
/// bottom-left corner.
pub const STOCK_VERTEX: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOut {
    let corner = vec2<f32>(f32(index & 1u), f32((index >> 1u) & 1u));
    var o: VertexOut;
    o.position = vec4<f32>(corner * 2.0 - vec2<f32>(1.0), 0.0, 1.0);
    o.uv = corner;
    return o;
}
"#;

pub const STOCK_FRAGMENT: &str = r#"
@fragment
fn fs_main(frag: VertexOut) -> @location(0) vec4<f32> {
    return vec4<f32>(frag.uv, 0.0, 1.0);
}
"#;

/// Helpers available to every fragment stage.
pub const COMMON: &str = r#"
const PI: f32 = 3.141592653589793;

// Floor-based modulo; result has the sign of `period`.
fn wrap(x: f32, period: f32) -> f32 {
    return x - period * floor(x / period);
}

fn wrap3(v: vec3<f32>, period: f32) -> vec3<f32> {
    return v - period * floor(v / period);
}

fn hsv_to_rgb(c: vec3<f32>) -> vec3<f32> {
    let k = vec3<f32>(1.0, 2.0 / 3.0, 1.0 / 3.0);
    let p = abs(fract(c.xxx + k) * 6.0 - vec3<f32>(3.0));
    return c.z * mix(vec3<f32>(1.0), clamp(p - vec3<f32>(1.0), vec3<f32>(0.0), vec3<f32>(1.0)), c.y);
}

// Interpolates two HSV colours along the shorter hue arc; returns RGB.
fn hsv_lerp(a: vec3<f32>, b: vec3<f32>, t: f32) -> vec3<f32> {
    var delta = b.x - a.x;
    if (delta > 0.5) {
        delta = delta - 1.0;
    }
    if (delta < -0.5) {
        delta = delta + 1.0;
    }
    let hsv = vec3<f32>(fract(a.x + delta * t), mix(a.yz, b.yz, vec2<f32>(t)));
    return hsv_to_rgb(hsv);
}

// Premultiplied `top` over `bottom`.
fn over(top: vec4<f32>, bottom: vec4<f32>) -> vec4<f32> {
    return top + bottom * (1.0 - top.a);
}
"#;
