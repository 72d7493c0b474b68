use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::core::{App, AppControl, FrameCtx, MountCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::translate_window_event;
use crate::schedule::FrameSignal;
use crate::time::HostClock;

/// Window and frame pacing configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Minimum spacing between scheduler-driven redraws (the host's
    /// animation-frame cadence).
    pub refresh_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "tremolo".to_string(),
            initial_size: LogicalSize::new(960.0, 720.0),
            refresh_interval: Duration::from_micros(16_667),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `app` in a new window until it exits or the window closes.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    signal: Rc<FrameSignal>,
    clock: HostClock,
    next_frame_at: Option<Instant>,

    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<A: App> AppState<A> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            window: None,
            signal: Rc::new(FrameSignal::new()),
            clock: HostClock::new(),
            next_frame_at: None,
            exit_requested: false,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.exit(event_loop);
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let (viewport, scale_factor) = entry.with_window(|w| window_metrics(w));
        let mut mount = MountCtx::new(Rc::clone(&self.signal), viewport, scale_factor);
        self.app.mount(&mut mount).context("failed to mount application")?;

        log::info!(
            "window ready: {}x{} logical at {scale_factor}x",
            viewport.width,
            viewport.height
        );

        entry.with_window(|w| w.request_redraw());
        self.window = Some(entry);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.window.as_mut() else {
            return;
        };

        self.signal.take();
        self.next_frame_at = Some(Instant::now() + self.config.refresh_interval);

        let time = self.clock.tick();
        let app = &mut self.app;
        let control = entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: fields.window,
                gpu: fields.gpu,
                time,
            };
            app.on_frame(&mut ctx)
        });

        if control == AppControl::Exit {
            self.exit(event_loop);
        }
    }
}

impl<A: App> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if !self.signal.is_pending() {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }

        let now = Instant::now();
        match self.next_frame_at {
            Some(at) if at > now => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            _ => {
                event_loop.set_control_flow(ControlFlow::Wait);
                if let Some(entry) = self.window.as_ref() {
                    entry.with_window(|w| w.request_redraw());
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let translated = self
            .window
            .as_ref()
            .and_then(|entry| entry.with_window(|w| translate_window_event(w, &event)));
        if let Some(input) = translated {
            if self.app.on_input(&input) == AppControl::Exit {
                self.exit(event_loop);
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                self.window = None;
                self.exit(event_loop);
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                let Some(entry) = self.window.as_mut() else {
                    return;
                };
                let size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(size));

                let (viewport, scale_factor) = entry.with_window(|w| window_metrics(w));
                self.app.on_resize(viewport, scale_factor);
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

fn window_metrics(window: &Window) -> (Viewport, f32) {
    let scale = window.scale_factor();
    let logical = window.inner_size().to_logical::<f64>(scale);
    (
        Viewport::new(logical.width as f32, logical.height as f32),
        scale as f32,
    )
}
