//! A scrolling page of diagrams hosted by the engine runtime.

use std::rc::Rc;

use anyhow::{Context, Result};
use log::{info, trace, warn};

use tremolo_engine::coords::{Rect, Vec2, Viewport};
use tremolo_engine::core::{App, AppControl, FrameCtx, MountCtx};
use tremolo_engine::input::{InputEvent, Key, KeyState};
use tremolo_engine::render::{Compositor, Placement, SceneRenderer};
use tremolo_engine::schedule::{FrameHost, SchedulerConfig};
use tremolo_engine::shader::{Uniform, UniformLayer};
use tremolo_engine::time::progress::Rewind;
use tremolo_engine::visibility::{DEFAULT_SHOW_DELAY_MS, is_region_visible};

use crate::animation::HeatAnimationConfig;
use crate::ctx::{DiagramCtx, DiagramScheduler};
use crate::diagrams::{ContactRod, Diagram, DiagramHandle, HeatGraph, HeatRod, WindingGraph};
use crate::heat::HeatModel;

#[derive(Debug, Clone)]
pub struct PageConfig {
    pub scheduler: SchedulerConfig,
    /// Space around the diagram column, logical pixels.
    pub margin: f32,
    /// Vertical space between diagrams, logical pixels.
    pub gap: f32,
    pub clear: wgpu::Color,
    pub show_delay_ms: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            margin: 24.0,
            gap: 32.0,
            clear: wgpu::Color {
                r: 0.02,
                g: 0.02,
                b: 0.03,
                a: 1.0,
            },
            show_delay_ms: DEFAULT_SHOW_DELAY_MS,
        }
    }
}

const MAX_HARMONICS: f32 = 31.0;
const INPUT_FREQUENCY_RANGE: (f32, f32) = (1.0, 12.0);
const INPUT_FREQUENCY_STEP: f32 = 0.25;

/// Parameter cells shared by several diagrams.
///
/// Diagrams take these handles as overrides, so a change made here reaches
/// every bundle holding them without recomposition.
#[derive(Debug, Clone)]
pub struct PageParams {
    pub harmonics: Uniform,
    pub input_frequency: Uniform,
    pub conductivity: Uniform,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            harmonics: Uniform::new(1.0f32),
            input_frequency: Uniform::new(4.0f32),
            conductivity: Uniform::new(1.0f32),
        }
    }
}

impl PageParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides for diagrams that follow the page's diffusion rate.
    pub fn diffusion_layer(&self) -> UniformLayer {
        UniformLayer::new().with("conductivity", self.conductivity.clone())
    }

    /// Overrides for diagrams that follow the page's harmonics.
    pub fn series_layer(&self) -> UniformLayer {
        UniformLayer::new().with("harmonics", self.harmonics.clone())
    }

    /// Overrides for winding diagrams.
    pub fn winding_layer(&self) -> UniformLayer {
        self.series_layer()
            .with("input_frequency", self.input_frequency.clone())
    }

    /// Applies a key binding. Returns true if a value changed.
    ///
    /// Up/Down step the odd harmonic count, Left/Right the winding input
    /// frequency, digits 1 to 9 set the conductivity.
    pub fn adjust(&self, key: Key) -> bool {
        let (uniform, name, next) = match key {
            Key::ArrowUp | Key::ArrowDown => {
                let delta = if key == Key::ArrowUp { 2.0 } else { -2.0 };
                let next = step(&self.harmonics, delta, 1.0, MAX_HARMONICS);
                (&self.harmonics, "harmonics", next)
            }
            Key::ArrowRight | Key::ArrowLeft => {
                let delta = if key == Key::ArrowRight {
                    INPUT_FREQUENCY_STEP
                } else {
                    -INPUT_FREQUENCY_STEP
                };
                let (lo, hi) = INPUT_FREQUENCY_RANGE;
                let next = step(&self.input_frequency, delta, lo, hi);
                (&self.input_frequency, "input frequency", next)
            }
            Key::Digit(d @ 1..=9) => (&self.conductivity, "conductivity", f32::from(d)),
            _ => return false,
        };

        if uniform.float() == Some(next) {
            return false;
        }
        match uniform.set(next) {
            Ok(()) => {
                info!("{name} = {next}");
                true
            }
            Err(err) => {
                warn!("cannot set {name}: {err}");
                false
            }
        }
    }
}

fn step(uniform: &Uniform, delta: f32, lo: f32, hi: f32) -> f32 {
    (uniform.float().unwrap_or(lo) + delta).clamp(lo, hi)
}

/// Diagrams stacked vertically in a scrolling column.
pub struct Page {
    config: PageConfig,
    params: PageParams,
    diagrams: Vec<Box<dyn Diagram>>,
    mounted: Vec<DiagramHandle>,
    scheduler: Option<DiagramScheduler>,
    host: Option<Rc<dyn FrameHost>>,
    compositor: Compositor,

    viewport: Viewport,
    scale_factor: f32,
    scroll: f32,
    /// Page coordinates, parallel to `diagrams`.
    layout: Vec<Rect>,
    content_height: f32,
    layout_dirty: bool,
}

impl Page {
    pub fn new(config: PageConfig) -> Self {
        Self {
            config,
            params: PageParams::new(),
            diagrams: Vec::new(),
            mounted: Vec::new(),
            scheduler: None,
            host: None,
            compositor: Compositor::new(),
            viewport: Viewport::new(0.0, 0.0),
            scale_factor: 1.0,
            scroll: 0.0,
            layout: Vec::new(),
            content_height: 0.0,
            layout_dirty: true,
        }
    }

    /// The heat and winding diagrams, wired to one set of shared parameters.
    pub fn every_sin(config: PageConfig) -> Self {
        let page = Self::new(config);
        let params = page.params.clone();

        page.with_diagram(
            HeatRod::new("cooling rod", HeatModel::Standard).with_overrides(params.diffusion_layer()),
        )
        .with_diagram(
            HeatGraph::new("cooling curve", HeatModel::Standard)
                .with_overrides(params.diffusion_layer()),
        )
        .with_diagram(ContactRod::new("contact rod"))
        .with_diagram(HeatGraph::new("contact curve", HeatModel::Contact).with_animation(
            HeatAnimationConfig {
                delay: 0.1,
                rewind: Rewind::Off,
                ..HeatAnimationConfig::cooling()
            },
        ))
        .with_diagram(
            HeatGraph::new("square series", HeatModel::Standard)
                .with_animation(HeatAnimationConfig::default())
                .with_overrides(params.series_layer()),
        )
        .with_diagram(WindingGraph::new("winding", 2.0).with_overrides(params.winding_layer()))
    }

    /// Adds a diagram below the existing ones. Only effective before mount.
    pub fn with_diagram(mut self, diagram: impl Diagram + 'static) -> Self {
        self.diagrams.push(Box::new(diagram));
        self
    }

    pub fn params(&self) -> &PageParams {
        &self.params
    }

    pub fn scheduler(&self) -> Option<&DiagramScheduler> {
        self.scheduler.as_ref()
    }

    pub fn mounted(&self) -> &[DiagramHandle] {
        &self.mounted
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    fn max_scroll(&self) -> f32 {
        (self.content_height - self.viewport.height).max(0.0)
    }

    /// Where diagram `index` currently sits in the window, logical pixels.
    pub fn diagram_rect(&self, index: usize) -> Option<Rect> {
        self.layout
            .get(index)
            .map(|rect| rect.translated(Vec2::new(0.0, -self.scroll)))
    }

    fn relayout(&mut self) {
        let margin = self.config.margin;
        let width = (self.viewport.width - 2.0 * margin).max(1.0);
        let mut y = margin;

        self.layout = self
            .diagrams
            .iter()
            .map(|diagram| {
                let height = diagram.height();
                let w = diagram.aspect().map_or(width, |a| (height * a).min(width));
                let rect = Rect::new(margin + (width - w) / 2.0, y, w, height);
                y += height + self.config.gap;
                rect
            })
            .collect();

        self.content_height = if self.layout.is_empty() {
            2.0 * margin
        } else {
            y - self.config.gap + margin
        };
        self.scroll = self.scroll.clamp(0.0, self.max_scroll());

        for (handle, rect) in self.mounted.iter().zip(&self.layout) {
            let w = (rect.size.x * self.scale_factor).round().max(1.0) as u32;
            let h = (rect.size.y * self.scale_factor).round().max(1.0) as u32;
            handle.surface().set_pixel_size(w, h);
        }

        self.layout_dirty = true;
    }

    /// Returns true if the scroll position moved.
    fn scroll_to(&mut self, scroll: f32) -> bool {
        let scroll = scroll.clamp(0.0, self.max_scroll());
        if scroll == self.scroll {
            return false;
        }
        self.scroll = scroll;
        self.layout_dirty = true;
        true
    }

    fn scroll_by(&mut self, delta: f32) -> bool {
        self.scroll_to(self.scroll + delta)
    }

    /// Feeds every diagram's gate with its current on-screen state.
    pub fn update_visibility(&self, now_ms: f64) {
        for (index, handle) in self.mounted.iter().enumerate() {
            let visible = self
                .diagram_rect(index)
                .is_some_and(|rect| is_region_visible(rect, self.viewport));
            handle.observe_visibility(visible, now_ms);
        }
    }

    fn toggle_running(&self) {
        let Some(scheduler) = self.scheduler.as_ref() else {
            return;
        };

        if scheduler.is_running() {
            scheduler.stop();
            info!("animation paused");
            return;
        }
        match scheduler.start() {
            Ok(_) => info!("animation resumed"),
            Err(err) => warn!("cannot resume animation: {err}"),
        }
    }

    fn request_frame(&self) {
        if let Some(host) = self.host.as_ref() {
            host.request_frame();
        }
    }
}

impl App for Page {
    fn mount(&mut self, ctx: &mut MountCtx) -> Result<()> {
        let host = ctx.frame_host();
        let scheduler = DiagramScheduler::new(self.config.scheduler.clone(), Rc::clone(&host))
            .context("invalid scheduler configuration")?;
        let diagram_ctx =
            DiagramCtx::new(scheduler.clone()).with_show_delay(self.config.show_delay_ms);

        self.mounted = self
            .diagrams
            .iter()
            .map(|diagram| {
                diagram
                    .mount(&diagram_ctx)
                    .with_context(|| format!("failed to mount diagram {:?}", diagram.label()))
            })
            .collect::<Result<_>>()?;

        self.viewport = ctx.viewport;
        self.scale_factor = ctx.scale_factor;
        self.relayout();

        scheduler.start().context("failed to start frame scheduler")?;
        info!(
            "page mounted: {} diagram(s), {:.0}px of content",
            self.mounted.len(),
            self.content_height
        );

        self.scheduler = Some(scheduler);
        self.host = Some(host);
        Ok(())
    }

    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        let redraw = match *event {
            InputEvent::Wheel(delta) => self.scroll_by(delta.scroll_px()),
            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                repeat,
            } => match key {
                Key::Escape => return AppControl::Exit,
                Key::Space if !repeat => {
                    self.toggle_running();
                    true
                }
                Key::PageDown => self.scroll_by(self.viewport.height * 0.9),
                Key::PageUp => self.scroll_by(-self.viewport.height * 0.9),
                Key::Home => self.scroll_to(0.0),
                Key::End => self.scroll_to(self.max_scroll()),
                key => self.params.adjust(key),
            },
            InputEvent::Key { .. } => false,
        };

        if redraw {
            self.request_frame();
        }
        AppControl::Continue
    }

    fn on_resize(&mut self, viewport: Viewport, scale_factor: f32) {
        // Minimized windows report a zero size; keep the last layout.
        if !viewport.is_valid() {
            return;
        }
        self.viewport = viewport;
        self.scale_factor = scale_factor;
        self.relayout();
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let now_ms = ctx.time.now_ms;
        self.update_visibility(now_ms);

        let Some(scheduler) = self.scheduler.as_ref() else {
            return AppControl::Continue;
        };

        let commands = {
            let mut renderer = SceneRenderer::new(ctx.render_ctx());
            let outcome = scheduler.on_frame(now_ms, &mut renderer);
            trace!("frame {}: {outcome:?}", ctx.time.frame_index);
            renderer.finish()
        };

        if commands.is_none() && !self.layout_dirty {
            return AppControl::Continue;
        }

        let placements: Vec<Placement<'_>> = self
            .mounted
            .iter()
            .enumerate()
            .filter_map(|(index, handle)| {
                Some(Placement {
                    surface: handle.surface(),
                    rect: self.diagram_rect(index)?,
                })
            })
            .collect();

        let compositor = &mut self.compositor;
        let control = ctx.present(commands, self.config.clear, |render, target| {
            compositor.draw(render, target, &placements)
        });
        self.layout_dirty = false;
        control
    }
}
