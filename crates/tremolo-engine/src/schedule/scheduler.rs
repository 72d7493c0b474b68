use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::rc::{Rc, Weak};

use log::{debug, error, trace};

use crate::time::FramePacer;

use super::{FrameHost, SchedulerError};

/// Draws a surface whose callbacks reported a change.
pub trait SurfaceRenderer<S: ?Sized> {
    fn render(&mut self, surface: &S);
}

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Maximum processed ticks per second.
    pub target_fps: f64,
}

impl SchedulerConfig {
    pub const DEFAULT_FPS: f64 = 30.0;

    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.target_fps.is_finite() && self.target_fps > 0.0 {
            Ok(())
        } else {
            Err(SchedulerError::InvalidTickRate(self.target_fps))
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: Self::DEFAULT_FPS,
        }
    }
}

/// Result of one `on_frame` call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TickOutcome {
    /// The scheduler is not running; no frame was requested.
    Stopped,
    /// The frame fell inside the rate-cap interval.
    Skipped,
    /// Callbacks ran and dirty surfaces were drawn.
    Processed {
        invoked: usize,
        drawn: usize,
        faulted: usize,
    },
}

impl TickOutcome {
    /// Number of surfaces drawn this tick.
    pub fn drawn(&self) -> usize {
        match *self {
            TickOutcome::Processed { drawn, .. } => drawn,
            _ => 0,
        }
    }
}

/// Handle for one registered callback.
///
/// Dropping the handle does not unregister; call [`Registration::unregister`].
#[derive(Debug, Clone)]
pub struct Registration {
    live: Rc<Cell<bool>>,
}

impl Registration {
    /// Stops further invocations, including later in the current tick.
    /// Idempotent.
    pub fn unregister(&self) {
        self.live.set(false);
    }

    #[inline]
    pub fn is_registered(&self) -> bool {
        self.live.get()
    }
}

#[derive(Debug, Default)]
struct RunState {
    running: Cell<bool>,
    generation: Cell<u64>,
}

/// Stops the run that produced it.
///
/// A handle from an earlier run has no effect on a later one.
#[derive(Debug, Clone)]
pub struct StopHandle {
    run: Rc<RunState>,
    generation: u64,
}

impl StopHandle {
    /// Idempotent.
    pub fn stop(&self) {
        if self.run.running.get() && self.run.generation.get() == self.generation {
            self.run.running.set(false);
            debug!("frame scheduler stopped (run {})", self.generation);
        }
    }
}

struct Entry<S: ?Sized> {
    surface: Weak<S>,
    live: Rc<Cell<bool>>,
    callback: RefCell<Box<dyn FnMut(f64) -> bool>>,
}

impl<S: ?Sized> Entry<S> {
    fn is_alive(&self) -> bool {
        self.live.get() && self.surface.strong_count() > 0
    }
}

struct Inner<S: ?Sized> {
    host: Rc<dyn FrameHost>,
    run: Rc<RunState>,
    pacer: RefCell<FramePacer>,
    entries: RefCell<Vec<Rc<Entry<S>>>>,
}

impl<S: ?Sized> Inner<S> {
    /// Drops unregistered entries and entries whose surface is gone.
    fn prune(&self) {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| e.is_alive());
        let pruned = before - entries.len();
        if pruned > 0 {
            debug!("pruned {pruned} dead registration(s)");
        }
    }
}

/// Single-threaded animation-frame coordinator.
///
/// Cloning yields another handle to the same scheduler. Surfaces are held
/// weakly; a dropped surface is skipped and its registrations are pruned.
pub struct FrameScheduler<S: ?Sized> {
    inner: Rc<Inner<S>>,
}

impl<S: ?Sized> Clone for FrameScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: ?Sized + 'static> FrameScheduler<S> {
    pub fn new(config: SchedulerConfig, host: Rc<dyn FrameHost>) -> Result<Self, SchedulerError> {
        config.validate()?;

        Ok(Self {
            inner: Rc::new(Inner {
                host,
                run: Rc::new(RunState::default()),
                pacer: RefCell::new(FramePacer::new(config.target_fps)),
                entries: RefCell::new(Vec::new()),
            }),
        })
    }

    /// Registers `callback` against `surface`.
    ///
    /// The callback receives the host timestamp in milliseconds and returns
    /// true when `surface` must be redrawn. A registration made while a tick
    /// is in progress is first invoked on the next tick.
    pub fn register<F>(&self, surface: &Rc<S>, callback: F) -> Registration
    where
        F: FnMut(f64) -> bool + 'static,
    {
        // Stopped or skipped schedulers never reach the per-tick pruning.
        self.inner.prune();

        let live = Rc::new(Cell::new(true));
        self.inner.entries.borrow_mut().push(Rc::new(Entry {
            surface: Rc::downgrade(surface),
            live: Rc::clone(&live),
            callback: RefCell::new(Box::new(callback)),
        }));

        Registration { live }
    }

    /// Begins the loop and requests the first frame.
    pub fn start(&self) -> Result<StopHandle, SchedulerError> {
        let run = &self.inner.run;
        if run.running.get() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let generation = run.generation.get() + 1;
        run.generation.set(generation);
        run.running.set(true);
        debug!("frame scheduler started (run {generation})");

        self.inner.host.request_frame();

        Ok(StopHandle {
            run: Rc::clone(run),
            generation,
        })
    }

    /// Halts the loop. Registrations survive.
    pub fn stop(&self) {
        let run = &self.inner.run;
        if run.running.replace(false) {
            debug!("frame scheduler stopped (run {})", run.generation.get());
        }
        self.inner.prune();
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.inner.run.running.get()
    }

    /// Number of live registrations whose surface is still alive.
    pub fn registration_count(&self) -> usize {
        self.inner
            .entries
            .borrow()
            .iter()
            .filter(|e| e.is_alive())
            .count()
    }

    /// Host frame signal.
    pub fn on_frame(&self, now_ms: f64, renderer: &mut dyn SurfaceRenderer<S>) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Stopped;
        }

        self.inner.host.request_frame();

        if !self.inner.pacer.borrow_mut().poll(now_ms) {
            return TickOutcome::Skipped;
        }

        self.inner.prune();
        let snapshot: Vec<Rc<Entry<S>>> = self.inner.entries.borrow().clone();

        let mut invoked = 0;
        let mut faulted = 0;
        let mut dirty: Vec<Rc<S>> = Vec::new();

        for entry in &snapshot {
            // Unregistered earlier in this tick.
            if !entry.live.get() {
                continue;
            }
            let Some(surface) = entry.surface.upgrade() else {
                continue;
            };

            invoked += 1;
            let result = {
                let mut callback = entry.callback.borrow_mut();
                let callback = &mut *callback;
                panic::catch_unwind(AssertUnwindSafe(|| callback(now_ms)))
            };

            match result {
                Ok(true) => {
                    let seen = dirty
                        .iter()
                        .any(|s| ptr::addr_eq(Rc::as_ptr(s), Rc::as_ptr(&surface)));
                    if !seen {
                        dirty.push(surface);
                    }
                }
                Ok(false) => {}
                Err(payload) => {
                    error!(
                        "render callback panicked, unregistering it: {}",
                        panic_message(payload.as_ref())
                    );
                    entry.live.set(false);
                    faulted += 1;
                }
            }
        }

        for surface in &dirty {
            renderer.render(surface);
        }

        trace!(
            "tick at {now_ms:.1} ms: {invoked} invoked, {} drawn, {faulted} faulted",
            dirty.len()
        );

        TickOutcome::Processed {
            invoked,
            drawn: dirty.len(),
            faulted,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
