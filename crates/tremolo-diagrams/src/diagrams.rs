//! The mountable diagrams.
//!
//! Mounting builds a diagram's shaders and scene, creates its surface and
//! registers two callbacks against it: the visibility-gated animation, and a
//! check of the surface's own invalidation flag (new or resized targets).

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use tremolo_engine::coords::Rect;
use tremolo_engine::render::{Mesh, Scene, SceneSurface};
use tremolo_engine::schedule::Registration;
use tremolo_engine::shader::{ShaderBundle, Uniform, UniformLayer, UniformValue, UniformWatch};
use tremolo_engine::time::progress::Rewind;
use tremolo_engine::visibility::{VisibilityChange, VisibilityGate, gated};

use crate::animation::{HeatAnimation, HeatAnimationConfig};
use crate::ctx::{DiagramCtx, DiagramError};
use crate::heat::{GRAPH_FRAGMENT, HALF_ROD_FRAGMENT, HeatModel, HeatShaders};
use crate::winding::{WindingCenter, WindingOptions, WindingParams, square_series, winding_bundle};

pub const DEFAULT_HEIGHT: f32 = 250.0;

/// Something the page can lay out and mount.
pub trait Diagram {
    fn label(&self) -> &str;

    /// Height in logical pixels.
    fn height(&self) -> f32 {
        DEFAULT_HEIGHT
    }

    /// Width over height, or `None` to span the page.
    fn aspect(&self) -> Option<f32> {
        None
    }

    fn mount(&self, ctx: &DiagramCtx) -> Result<DiagramHandle, DiagramError>;
}

/// A mounted diagram: its surface, visibility gate and registrations.
///
/// Dropping the handle drops the surface, which the scheduler then prunes.
pub struct DiagramHandle {
    surface: Rc<SceneSurface>,
    gate: Rc<RefCell<VisibilityGate>>,
    registrations: Vec<Registration>,
}

impl DiagramHandle {
    pub fn surface(&self) -> &Rc<SceneSurface> {
        &self.surface
    }

    pub fn label(&self) -> &str {
        self.surface.label()
    }

    pub fn is_visible(&self) -> bool {
        self.gate.borrow().is_visible()
    }

    /// Feeds this frame's visibility query to the gate.
    pub fn observe_visibility(&self, visible: bool, now_ms: f64) -> Option<VisibilityChange> {
        let change = self.gate.borrow_mut().observe(visible, now_ms);
        if let Some(change) = change {
            debug!("diagram {}: {change:?}", self.label());
        }
        change
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Unregisters every callback; the surface stays alive until dropped.
    pub fn unmount(&self) {
        for registration in &self.registrations {
            registration.unregister();
        }
    }
}

fn attach<F>(
    ctx: &DiagramCtx,
    label: &str,
    scene: Scene,
    animate: F,
) -> Result<DiagramHandle, DiagramError>
where
    F: FnMut(f64) -> bool + 'static,
{
    let scheduler = ctx.scheduler()?;
    let surface = Rc::new(SceneSurface::new(label, scene));
    let gate = Rc::new(RefCell::new(VisibilityGate::new(false, ctx.show_delay_ms())));

    let weak = Rc::downgrade(&surface);
    let registrations = vec![
        scheduler.register(&surface, gated(Rc::clone(&gate), animate)),
        scheduler.register(&surface, move |_| {
            weak.upgrade().is_some_and(|s| s.take_invalidated())
        }),
    ];

    debug!(
        "mounted diagram {label}: {} mesh(es)",
        surface.scene().meshes().len()
    );

    Ok(DiagramHandle {
        surface,
        gate,
        registrations,
    })
}

// ── HeatRod ──────────────────────────────────────────────────────────────

const ROD_HOT_CAP: Rect = Rect::new(0.46, 0.06, 0.08, 0.04);
const ROD_BODY: Rect = Rect::new(0.46, 0.1, 0.08, 0.8);
const ROD_COLD_CAP: Rect = Rect::new(0.46, 0.9, 0.08, 0.04);

/// A rod whose temperature runs along its length, capped by the
/// temperatures of its two ends.
#[derive(Debug, Clone)]
pub struct HeatRod {
    pub label: String,
    pub model: HeatModel,
    pub animation: HeatAnimationConfig,
    pub overrides: Option<UniformLayer>,
    pub height: f32,
}

impl HeatRod {
    pub fn new(label: impl Into<String>, model: HeatModel) -> Self {
        Self {
            label: label.into(),
            model,
            animation: HeatAnimationConfig::cooling(),
            overrides: None,
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn with_animation(mut self, animation: HeatAnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_overrides(mut self, overrides: UniformLayer) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

impl Diagram for HeatRod {
    fn label(&self) -> &str {
        &self.label
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn mount(&self, ctx: &DiagramCtx) -> Result<DiagramHandle, DiagramError> {
        ctx.scheduler()?;

        let mut animation = HeatAnimation::new(self.animation);
        let shaders = HeatShaders::new(self.model, animation.time(), self.overrides.clone(), None)?;
        animation.watch_bundle(&shaders.main);

        let scene = Scene::new()
            .with_mesh(Mesh::new(shaders.hot_cap, ROD_HOT_CAP))
            .with_mesh(Mesh::new(shaders.main, ROD_BODY))
            .with_mesh(Mesh::new(shaders.cold_cap, ROD_COLD_CAP));

        attach(ctx, &self.label, scene, move |now_ms| animation.advance(now_ms))
    }
}

// ── HeatGraph ────────────────────────────────────────────────────────────

const GRAPH_COLD_SWATCH: Rect = Rect::new(0.02, 0.4, 0.04, 0.2);
const GRAPH_PLOT: Rect = Rect::new(0.08, 0.0, 0.84, 1.0);
const GRAPH_HOT_SWATCH: Rect = Rect::new(0.94, 0.4, 0.04, 0.2);

/// Temperature along the rod plotted as a curve, with swatches of the end
/// temperatures either side.
#[derive(Debug, Clone)]
pub struct HeatGraph {
    pub label: String,
    pub model: HeatModel,
    pub animation: HeatAnimationConfig,
    pub overrides: Option<UniformLayer>,
    pub height: f32,
}

impl HeatGraph {
    pub fn new(label: impl Into<String>, model: HeatModel) -> Self {
        Self {
            label: label.into(),
            model,
            animation: HeatAnimationConfig::cooling(),
            overrides: None,
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn with_animation(mut self, animation: HeatAnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_overrides(mut self, overrides: UniformLayer) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

impl Diagram for HeatGraph {
    fn label(&self) -> &str {
        &self.label
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn mount(&self, ctx: &DiagramCtx) -> Result<DiagramHandle, DiagramError> {
        ctx.scheduler()?;

        let mut animation = HeatAnimation::new(self.animation);
        let shaders = HeatShaders::new(
            self.model,
            animation.time(),
            self.overrides.clone(),
            Some(GRAPH_FRAGMENT),
        )?;
        animation.watch_bundle(&shaders.main);

        let scene = Scene::new()
            .with_mesh(Mesh::new(shaders.cold_cap, GRAPH_COLD_SWATCH))
            .with_mesh(Mesh::new(shaders.main, GRAPH_PLOT))
            .with_mesh(Mesh::new(shaders.hot_cap, GRAPH_HOT_SWATCH));

        attach(ctx, &self.label, scene, move |now_ms| animation.advance(now_ms))
    }
}

// ── ContactRod ───────────────────────────────────────────────────────────

const CONTACT_TOP: Rect = Rect::new(0.46, 0.05, 0.08, 0.45);
const CONTACT_BOTTOM: Rect = Rect::new(0.46, 0.5, 0.08, 0.45);
/// Length of each half, in surface units.
const CONTACT_HALF: f32 = 0.4;
/// Distance of each half from the contact point while fully apart.
const CONTACT_TRAVEL: f32 = 0.05;

/// Separation of the halves: 1 at the start of a cycle, falling to 0 when
/// the unstretched progress reaches `delay` and cooling begins.
pub fn contact_gap(real: f32, delay: f32) -> f32 {
    if delay <= 0.0 {
        return 0.0;
    }
    (1.0 - real / delay).clamp(0.0, 1.0)
}

/// `[from, to]` in surface units, as uv along the height of `region`.
fn span_in(region: Rect, from: f32, to: f32) -> [f32; 2] {
    let (top, height) = (region.origin.y, region.size.y);
    [(from - top) / height, (to - top) / height]
}

/// Spans of the top and bottom halves at `gap`.
fn contact_spans(gap: f32) -> ([f32; 2], [f32; 2]) {
    let middle = CONTACT_BOTTOM.origin.y;
    let shift = gap * CONTACT_TRAVEL;
    (
        span_in(CONTACT_TOP, middle - shift - CONTACT_HALF, middle - shift),
        span_in(CONTACT_BOTTOM, middle + shift, middle + shift + CONTACT_HALF),
    )
}

/// Two half-length rods at different temperatures sliding into contact.
///
/// The halves close the gap during the animation's delay, then the heat
/// flows across the joint.
#[derive(Debug, Clone)]
pub struct ContactRod {
    pub label: String,
    pub model: HeatModel,
    pub animation: HeatAnimationConfig,
    pub height: f32,
}

impl ContactRod {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            model: HeatModel::Contact,
            animation: HeatAnimationConfig {
                delay: 0.1,
                ..HeatAnimationConfig::cooling()
            },
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn with_animation(mut self, animation: HeatAnimationConfig) -> Self {
        self.animation = animation;
        self
    }
}

impl Diagram for ContactRod {
    fn label(&self) -> &str {
        &self.label
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn mount(&self, ctx: &DiagramCtx) -> Result<DiagramHandle, DiagramError> {
        ctx.scheduler()?;

        let mut animation = HeatAnimation::new(self.animation);
        let shaders = HeatShaders::new(self.model, animation.time(), None, None)?;
        animation.watch_bundle(&shaders.main);

        let (top_span, bottom_span) = contact_spans(1.0);
        let top = Uniform::new(top_span);
        let bottom = Uniform::new(bottom_span);
        let half = |span: &Uniform, layer: UniformLayer| {
            let layer = layer.with_value("scale", 0.5f32).with("span", span.clone());
            shaders.extend(Some(&layer), Some(HALF_ROD_FRAGMENT))
        };

        let scene = Scene::new()
            .with_mesh(Mesh::new(half(&top, UniformLayer::new())?, CONTACT_TOP))
            .with_mesh(Mesh::new(
                half(&bottom, UniformLayer::new().with_value("offset", 1.0f32))?,
                CONTACT_BOTTOM,
            ));

        let delay = self.animation.delay;
        let label = self.label.clone();
        attach(ctx, &self.label, scene, move |now_ms| {
            let redraw = animation.advance(now_ms);
            let (top_span, bottom_span) = contact_spans(contact_gap(animation.real(), delay));

            let mut moved = false;
            for (uniform, span) in [(&top, top_span), (&bottom, bottom_span)] {
                if uniform.get() == UniformValue::Vec2(span) {
                    continue;
                }
                match uniform.set(span) {
                    Ok(()) => moved = true,
                    Err(err) => warn!("diagram {label}: cannot move half rod: {err}"),
                }
            }
            redraw || moved
        })
    }
}

// ── WindingGraph ─────────────────────────────────────────────────────────

const CENTER_SAMPLES: usize = 512;

/// The heat curve wound around a circle at a sweeping frequency, with its
/// centre of mass marked.
#[derive(Debug, Clone)]
pub struct WindingGraph {
    pub label: String,
    pub options: WindingOptions,
    pub animation: HeatAnimationConfig,
    /// Typically shares `harmonics` and `input_frequency` with the page.
    pub overrides: Option<UniformLayer>,
    pub height: f32,
}

impl WindingGraph {
    /// `speed`: winding turns per animation cycle.
    pub fn new(label: impl Into<String>, speed: f32) -> Self {
        Self {
            label: label.into(),
            options: WindingOptions {
                animate_draw: false,
                animate_winding: speed,
            },
            animation: HeatAnimationConfig {
                rewind: Rewind::Fraction(0.175),
                duration_ms: 10_000.0,
                ..HeatAnimationConfig::cooling()
            },
            overrides: None,
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn with_overrides(mut self, overrides: UniformLayer) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

fn center_table(bundle: &ShaderBundle, options: WindingOptions) -> WindingCenter {
    let value = |name: &str, default: f32| {
        f64::from(bundle.uniform(name).and_then(Uniform::float).unwrap_or(default))
    };
    let harmonics = value("harmonics", 1.0);

    WindingCenter::new(
        WindingParams {
            samples: CENTER_SAMPLES,
            input_frequency: value("input_frequency", 4.0),
            animate_winding: f64::from(options.animate_winding),
            winding_frequency: value("winding_frequency", 0.0),
        },
        move |x| square_series(x, harmonics),
    )
}

impl Diagram for WindingGraph {
    fn label(&self) -> &str {
        &self.label
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn aspect(&self) -> Option<f32> {
        Some(1.0)
    }

    fn mount(&self, ctx: &DiagramCtx) -> Result<DiagramHandle, DiagramError> {
        ctx.scheduler()?;

        let mut animation = HeatAnimation::new(self.animation);
        let shaders = HeatShaders::new(
            HeatModel::Standard,
            animation.time(),
            self.overrides.clone(),
            None,
        )?;
        let center = Uniform::new([0.0f32, 0.0]);
        let bundle = winding_bundle(&shaders, self.options, center.clone(), None)?;

        let mut params = UniformWatch::new();
        for name in ["harmonics", "input_frequency", "winding_frequency"] {
            if let Some(uniform) = bundle.uniform(name) {
                params.watch(uniform.clone());
            }
        }
        let options = self.options;
        let label = self.label.clone();
        let mut table = center_table(&bundle, options);
        let scene = Scene::new().with_mesh(Mesh::fullscreen(bundle.clone()));

        attach(ctx, &self.label, scene, move |now_ms| {
            let redraw = animation.advance(now_ms);
            if params.changed() {
                table = center_table(&bundle, options);
            }
            if let Err(err) = center.set(table.get(f64::from(animation.progress()))) {
                warn!("diagram {label}: cannot move winding centre: {err}");
            }
            redraw
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::DiagramScheduler;
    use tremolo_engine::core::ContextError;
    use tremolo_engine::schedule::{FrameSignal, SchedulerConfig, SurfaceRenderer};

    #[derive(Default)]
    struct Recorder {
        drawn: Vec<String>,
    }

    impl SurfaceRenderer<SceneSurface> for Recorder {
        fn render(&mut self, surface: &SceneSurface) {
            self.drawn.push(surface.label().to_string());
        }
    }

    fn scheduler() -> DiagramScheduler {
        let scheduler =
            DiagramScheduler::new(SchedulerConfig::default(), Rc::new(FrameSignal::new())).unwrap();
        scheduler.start().unwrap();
        scheduler
    }

    fn tick(scheduler: &DiagramScheduler, now_ms: f64) -> Vec<String> {
        let mut recorder = Recorder::default();
        scheduler.on_frame(now_ms, &mut recorder);
        recorder.drawn
    }

    // ── mounting ──────────────────────────────────────────────────────────

    #[test]
    fn mounting_without_a_scheduler_fails() {
        let ctx = DiagramCtx::detached();
        let diagrams: [Box<dyn Diagram>; 4] = [
            Box::new(HeatRod::new("rod", HeatModel::Standard)),
            Box::new(HeatGraph::new("graph", HeatModel::Contact)),
            Box::new(ContactRod::new("contact")),
            Box::new(WindingGraph::new("winding", 2.0)),
        ];

        for diagram in &diagrams {
            let err = diagram.mount(&ctx).err().unwrap();
            assert_eq!(
                err,
                DiagramError::Context(ContextError::Missing {
                    what: "frame scheduler"
                })
            );
        }
    }

    #[test]
    fn rod_registers_against_its_own_surface() {
        let scheduler = scheduler();
        let handle = HeatRod::new("rod", HeatModel::Contact)
            .mount(&DiagramCtx::new(scheduler.clone()))
            .unwrap();

        assert_eq!(scheduler.registration_count(), 2);
        assert_eq!(handle.surface().scene().meshes().len(), 3);
        assert_eq!(handle.label(), "rod");
        assert!(!handle.is_visible());
    }

    #[test]
    fn dropped_diagram_is_pruned() {
        let scheduler = scheduler();
        let handle = HeatGraph::new("graph", HeatModel::Standard)
            .mount(&DiagramCtx::new(scheduler.clone()))
            .unwrap();
        assert_eq!(scheduler.registration_count(), 2);

        drop(handle);
        assert_eq!(scheduler.registration_count(), 0);
        assert!(tick(&scheduler, 100.0).is_empty());
    }

    #[test]
    fn unmount_stops_callbacks() {
        let scheduler = scheduler();
        let handle = HeatRod::new("rod", HeatModel::Standard)
            .mount(&DiagramCtx::new(scheduler.clone()))
            .unwrap();

        handle.unmount();
        assert!(handle.registrations().iter().all(|r| !r.is_registered()));
        assert!(tick(&scheduler, 100.0).is_empty());
    }

    // ── ticking ───────────────────────────────────────────────────────────

    #[test]
    fn new_surface_draws_once_then_waits_for_visibility() {
        let scheduler = scheduler();
        let handle = HeatRod::new("rod", HeatModel::Standard)
            .mount(&DiagramCtx::new(scheduler.clone()))
            .unwrap();

        // Invalidated on creation; hidden, so the animation does not run.
        assert_eq!(tick(&scheduler, 100.0), vec!["rod".to_string()]);
        assert!(tick(&scheduler, 200.0).is_empty());

        // Shows after the debounce delay, then animates every tick.
        assert_eq!(handle.observe_visibility(true, 300.0), None);
        assert_eq!(
            handle.observe_visibility(true, 310.0),
            Some(VisibilityChange::Shown)
        );
        assert_eq!(tick(&scheduler, 400.0), vec!["rod".to_string()]);
        assert_eq!(tick(&scheduler, 500.0), vec!["rod".to_string()]);

        handle.observe_visibility(false, 550.0);
        assert!(tick(&scheduler, 600.0).is_empty());
    }

    #[test]
    fn static_rod_redraws_on_shared_parameter_change() {
        let scheduler = scheduler();
        let harmonics = Uniform::new(1.0f32);
        let handle = HeatRod::new("rod", HeatModel::Standard)
            .with_animation(HeatAnimationConfig::default())
            .with_overrides(UniformLayer::new().with("harmonics", harmonics.clone()))
            .mount(&DiagramCtx::new(scheduler.clone()).with_show_delay(0.0))
            .unwrap();

        handle.observe_visibility(true, 50.0);
        // Initial draw plus the forced redraw after showing.
        assert_eq!(tick(&scheduler, 100.0).len(), 1);
        assert!(tick(&scheduler, 200.0).is_empty());

        harmonics.set(3.0f32).unwrap();
        assert_eq!(tick(&scheduler, 300.0), vec!["rod".to_string()]);
        assert!(tick(&scheduler, 400.0).is_empty());
    }

    #[test]
    fn resize_invalidates_even_when_hidden() {
        let scheduler = scheduler();
        let handle = HeatGraph::new("graph", HeatModel::Standard)
            .mount(&DiagramCtx::new(scheduler.clone()))
            .unwrap();
        tick(&scheduler, 100.0);

        handle.surface().set_pixel_size(640, 250);
        assert_eq!(tick(&scheduler, 200.0), vec!["graph".to_string()]);
    }

    // ── contact rod ───────────────────────────────────────────────────────

    #[test]
    fn gap_closes_over_the_delay() {
        assert_eq!(contact_gap(0.0, 0.1), 1.0);
        assert!((contact_gap(0.05, 0.1) - 0.5).abs() < 1e-6);
        assert_eq!(contact_gap(0.1, 0.1), 0.0);
        assert_eq!(contact_gap(0.7, 0.1), 0.0);
        assert_eq!(contact_gap(0.0, 0.0), 0.0);
    }

    #[test]
    fn contact_halves_meet_once_the_delay_has_passed() {
        let scheduler = scheduler();
        let handle = ContactRod::new("contact")
            .mount(&DiagramCtx::new(scheduler.clone()).with_show_delay(0.0))
            .unwrap();
        handle.observe_visibility(true, 0.0);

        let meshes = handle.surface().scene().meshes();
        assert_eq!(meshes.len(), 2);
        let span = |i: usize| match meshes[i].bundle.uniform("span").map(Uniform::get) {
            Some(UniformValue::Vec2(span)) => span,
            other => panic!("no span on mesh {i}: {other:?}"),
        };
        assert_eq!(meshes[0].bundle.uniform("scale").and_then(Uniform::float), Some(0.5));
        assert_eq!(meshes[1].bundle.uniform("offset").and_then(Uniform::float), Some(1.0));

        // Progress about 0.02: still sliding together.
        assert_eq!(tick(&scheduler, 100.0), vec!["contact".to_string()]);
        let (top, bottom) = (span(0), span(1));
        assert!(top[1] < 1.0, "top = {top:?}");
        assert!(bottom[0] > 0.0, "bottom = {bottom:?}");

        // Progress about 0.22, past the delay: both halves touch the middle.
        assert_eq!(tick(&scheduler, 1_000.0), vec!["contact".to_string()]);
        assert!((span(0)[1] - 1.0).abs() < 1e-5);
        assert!(span(1)[0].abs() < 1e-5);
    }

    #[test]
    fn static_contact_rod_stays_apart_and_idle() {
        let scheduler = scheduler();
        let handle = ContactRod::new("contact")
            .with_animation(HeatAnimationConfig {
                delay: 0.1,
                ..HeatAnimationConfig::default()
            })
            .mount(&DiagramCtx::new(scheduler.clone()).with_show_delay(0.0))
            .unwrap();
        handle.observe_visibility(true, 0.0);

        // Without cooling the progress never advances, so the halves stay
        // apart and nothing changes after the first draw.
        assert_eq!(tick(&scheduler, 100.0).len(), 1);
        assert!(tick(&scheduler, 200.0).is_empty());
    }

    #[test]
    fn winding_centre_follows_the_animation() {
        let scheduler = scheduler();
        let graph = WindingGraph::new("winding", 2.0);
        assert_eq!(graph.aspect(), Some(1.0));
        let handle = graph
            .mount(&DiagramCtx::new(scheduler.clone()).with_show_delay(0.0))
            .unwrap();
        handle.observe_visibility(true, 0.0);

        tick(&scheduler, 2_500.0);
        let mesh = &handle.surface().scene().meshes()[0];
        let center = mesh.bundle.uniform("center").unwrap().get();
        assert_ne!(center, UniformValue::Vec2([0.0, 0.0]));
    }
}
