//! Winding extension of the heat family: the signal wrapped around a circle
//! at a sweeping winding frequency, plus the centre of mass of the wrapped
//! curve.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use tremolo_engine::shader::{ShaderBundle, ShaderError, Uniform, UniformLayer};

use crate::heat::HeatShaders;

/// `winding(uv)`: premultiplied colour of the wrapped curve at `uv`.
const WINDING_FN: &str = r#"
fn winding(uv: vec2<f32>) -> vec4<f32> {
    let turns = u.winding_frequency + u.time * u.animate_winding;
    var draw = turns;
    if (u.animate_draw != 0u) {
        draw = turns * u.time;
    }
    let factor = u.input_frequency / max(turns, 1e-4);

    let point = uv * 2.0 - vec2<f32>(1.0);
    let radius = distance(uv, vec2<f32>(0.5)) * 2.0 * 1.5;
    var angle = atan2(point.y, point.x) / PI;
    if (angle < 0.0) {
        angle = 2.0 + angle;
    }
    let x = 1.0 - angle / 2.0;

    var color = vec4<f32>(0.0);
    for (var i = 0.0; i < 32.0; i = i + 1.0) {
        let t = x + i;
        if (t > draw) {
            break;
        }
        let c = curve(t * factor - 0.25, 0.0);
        let plot = stroke(abs(radius - c), 0.03);
        let ring = plot * vec4<f32>(shade(c).rgb, 0.9);
        color = (1.0 - ring.a) * color + ring.a * ring;
    }
    return vec4<f32>(color.rgb * color.a, color.a);
}
"#;

/// Default stage: the wrapped curve with a marker at `u.center`.
const WINDING_MAIN: &str = r#"
@fragment
fn fs_main(frag: VertexOut) -> @location(0) vec4<f32> {
    let point = frag.uv * 2.0 - vec2<f32>(1.0);
    let marker = 1.0 - smoothstep(0.045, 0.05, distance(point, u.center * 0.35));
    return over(vec4<f32>(marker, 0.0, 0.0, marker), winding(frag.uv));
}
"#;

/// Fragment stage with `winding()` available; `main` defaults to the marked
/// curve.
pub fn winding_fragment(main: Option<&str>) -> String {
    format!("{WINDING_FN}\n{}", main.unwrap_or(WINDING_MAIN))
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindingOptions {
    /// Draw the curve progressively with `time` instead of all at once.
    pub animate_draw: bool,
    /// Winding turns added per unit of `time`.
    pub animate_winding: f32,
}

impl Default for WindingOptions {
    fn default() -> Self {
        Self {
            animate_draw: false,
            animate_winding: 0.0,
        }
    }
}

/// Builds the winding bundle over `shaders`' cells.
///
/// `input_frequency` and `winding_frequency` are taken from the heat family
/// when its overrides provide them, so sliders shared with other diagrams
/// stay shared; otherwise they get defaults of 4 and 0.
pub fn winding_bundle(
    shaders: &HeatShaders,
    options: WindingOptions,
    center: Uniform,
    main: Option<&str>,
) -> Result<ShaderBundle, ShaderError> {
    let shared = |name: &str, default: f32| {
        shaders
            .uniform(name)
            .cloned()
            .unwrap_or_else(|| Uniform::new(default))
    };

    let extension = UniformLayer::new()
        .with_value("animate_draw", options.animate_draw)
        .with_value("animate_winding", options.animate_winding)
        .with("input_frequency", shared("input_frequency", 4.0))
        .with("winding_frequency", shared("winding_frequency", 0.0))
        .with("center", center);

    shaders.extend(Some(&extension), Some(&winding_fragment(main)))
}

/// Odd-harmonic Fourier series of a square wave, scaled like the heat
/// kernel: a plain sine for one harmonic.
pub fn square_series(x: f64, harmonics: f64) -> f64 {
    let mut total = 0.0;
    let mut i = 1.0;
    while i <= harmonics {
        total += (x * i).sin() / i;
        i += 2.0;
    }

    if harmonics > 1.0 {
        total * (4.0 / PI)
    } else {
        total
    }
}

/// Inputs of [`WindingCenter::new`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindingParams {
    /// Angular samples per turn.
    pub samples: usize,
    pub input_frequency: f64,
    pub animate_winding: f64,
    pub winding_frequency: f64,
}

impl Default for WindingParams {
    fn default() -> Self {
        Self {
            samples: 512,
            input_frequency: 10.0,
            animate_winding: 10.0,
            winding_frequency: 0.0,
        }
    }
}

const TIME_SAMPLES: usize = 128;
const TIME_BOUND: usize = TIME_SAMPLES - 1;

/// Centre of mass of a signal wound around the unit circle, tabulated over
/// one animation cycle.
#[derive(Debug, Clone)]
pub struct WindingCenter {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl WindingCenter {
    pub fn new(params: WindingParams, signal: impl Fn(f64) -> f64) -> Self {
        let step = TAU / TIME_BOUND as f64;
        let curve: Vec<f64> = (0..TIME_SAMPLES)
            .map(|i| signal(i as f64 * step + FRAC_PI_2))
            .collect();

        let samples = params.samples.max(1);
        let mut xs = Vec::with_capacity(TIME_SAMPLES);
        let mut ys = Vec::with_capacity(TIME_SAMPLES);

        for x in 0..TIME_SAMPLES {
            let winding = params.winding_frequency
                + ((x + 1) as f64 / TIME_BOUND as f64) * params.animate_winding;
            let factor = params.input_frequency / winding;
            let angles = winding.min(1.0);

            let (mut cx, mut cy, mut divider) = (0.0, 0.0, 0.0f64);
            for i in 1..=samples {
                let angle = (i as f64 / samples as f64) * angles;
                let (sin, cos) = (angle * TAU).sin_cos();

                let mut t = angle;
                while t <= winding {
                    let index = ((t * factor) % 1.0).abs() * TIME_BOUND as f64;
                    let value = curve[(index.ceil() as usize).min(TIME_BOUND)];
                    cx += value * cos;
                    cy += value * sin;
                    divider += 1.0;
                    t += 1.0;
                }
            }

            let divider = divider.max(1.0);
            xs.push(cx / divider);
            ys.push(-cy / divider);
        }

        Self { xs, ys }
    }

    /// Centre at animation progress `time`, interpolated between samples.
    pub fn get(&self, time: f64) -> [f32; 2] {
        let p = (time % 1.0).abs() * TIME_BOUND as f64;
        let i = (p.ceil() as usize).min(TIME_BOUND);

        if i >= TIME_BOUND - 1 {
            return [self.xs[i] as f32, self.ys[i] as f32];
        }

        let d = p % 1.0;
        [
            (self.xs[i] * (1.0 - d) + self.xs[i + 1] * d) as f32,
            (self.ys[i] * (1.0 - d) + self.ys[i + 1] * d) as f32,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heat::HeatModel;
    use crate::validate_wgsl;
    use tremolo_engine::shader::{TimeCell, UniformValue};

    // ── bundle ────────────────────────────────────────────────────────────

    #[test]
    fn winding_bundle_is_valid_wgsl() {
        let time = TimeCell::new(0.0);
        let shaders = HeatShaders::new(HeatModel::Standard, time.uniform(), None, None).unwrap();
        let bundle = winding_bundle(
            &shaders,
            WindingOptions {
                animate_draw: true,
                animate_winding: 2.0,
            },
            Uniform::new([0.0f32, 0.0]),
            None,
        )
        .unwrap();

        assert_eq!(
            bundle.uniform("animate_draw").unwrap().get(),
            UniformValue::Bool(true)
        );
        assert_eq!(bundle.uniform("input_frequency").unwrap().float(), Some(4.0));
        validate_wgsl(bundle.fragment_source());
    }

    #[test]
    fn shared_frequency_comes_from_the_family() {
        let time = TimeCell::new(0.0);
        let input = Uniform::new(7.0f32);
        let overrides = UniformLayer::new().with("input_frequency", input.clone());
        let shaders =
            HeatShaders::new(HeatModel::Standard, time.uniform(), Some(overrides), None).unwrap();
        let bundle = winding_bundle(
            &shaders,
            WindingOptions::default(),
            Uniform::new([0.0f32, 0.0]),
            None,
        )
        .unwrap();

        assert!(bundle.uniform("input_frequency").unwrap().ptr_eq(&input));
        assert!(bundle.uniform("time").unwrap().ptr_eq(shaders.main.uniform("time").unwrap()));
    }

    // ── series ────────────────────────────────────────────────────────────

    #[test]
    fn one_harmonic_is_a_sine() {
        for x in [0.0, 0.3, 1.7, -2.0] {
            assert!((square_series(x, 1.0) - f64::sin(x)).abs() < 1e-12);
        }
    }

    #[test]
    fn many_harmonics_approach_a_square_wave() {
        let high = square_series(FRAC_PI_2, 301.0);
        let low = square_series(-FRAC_PI_2, 301.0);
        assert!((high - 1.0).abs() < 0.01, "{high}");
        assert!((low + 1.0).abs() < 0.01, "{low}");
    }

    // ── centre ────────────────────────────────────────────────────────────

    #[test]
    fn constant_signal_over_whole_turns_balances_out() {
        let params = WindingParams {
            samples: 256,
            input_frequency: 3.0,
            animate_winding: 0.0,
            winding_frequency: 1.0,
        };
        let center = WindingCenter::new(params, |_| 1.0);
        let [x, y] = center.get(0.5);
        assert!(x.abs() < 0.02 && y.abs() < 0.02, "{x} {y}");
    }

    #[test]
    fn get_is_finite_across_the_cycle() {
        let center = WindingCenter::new(WindingParams::default(), f64::sin);
        for step in 0..=20 {
            let [x, y] = center.get(step as f64 / 20.0);
            assert!(x.is_finite() && y.is_finite());
            assert!(x.abs() <= 1.0 && y.abs() <= 1.0);
        }
    }
}
