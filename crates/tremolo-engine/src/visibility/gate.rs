use std::cell::RefCell;
use std::rc::Rc;

/// Debounce applied before a hidden region is treated as visible again.
pub const DEFAULT_SHOW_DELAY_MS: f64 = 5.0;

/// Clock that can be frozen and resumed without jumping.
///
/// Local time is host time minus the total time spent paused, so an animation
/// resumes exactly where it stopped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PausableClock {
    paused_total_ms: f64,
    paused_at: Option<f64>,
}

impl PausableClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freezes local time at `now_ms`. No-op while already paused.
    pub fn pause(&mut self, now_ms: f64) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now_ms);
        }
    }

    /// Unfreezes local time. No-op while running.
    pub fn resume(&mut self, now_ms: f64) {
        if let Some(at) = self.paused_at.take() {
            self.paused_total_ms += (now_ms - at).max(0.0);
        }
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Local time corresponding to host time `now_ms`.
    pub fn local_ms(&self, now_ms: f64) -> f64 {
        let end = match self.paused_at {
            Some(at) => at.min(now_ms),
            None => now_ms,
        };
        end - self.paused_total_ms
    }
}

/// Transition reported by [`VisibilityGate::observe`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VisibilityChange {
    Hidden,
    Shown,
}

/// Per-diagram visibility state.
///
/// Hiding is immediate; showing is debounced by `show_delay_ms` so rapid
/// scroll flips do not thrash the animation. While hidden the gate's clock is
/// frozen. After becoming visible the gate asks for exactly one forced redraw
/// so the surface catches up with state that changed while it was off-screen.
#[derive(Debug, Clone)]
pub struct VisibilityGate {
    visible: bool,
    show_pending_since: Option<f64>,
    show_delay_ms: f64,
    clock: PausableClock,
    redraw_pending: bool,
}

impl VisibilityGate {
    pub fn new(initially_visible: bool, show_delay_ms: f64) -> Self {
        let mut clock = PausableClock::new();
        if !initially_visible {
            clock.pause(0.0);
        }

        Self {
            visible: initially_visible,
            show_pending_since: None,
            show_delay_ms: show_delay_ms.max(0.0),
            clock,
            redraw_pending: false,
        }
    }

    /// Feeds the latest visibility query result.
    pub fn observe(&mut self, visible_now: bool, now_ms: f64) -> Option<VisibilityChange> {
        if !visible_now {
            self.show_pending_since = None;
            if !self.visible {
                return None;
            }
            self.visible = false;
            self.clock.pause(now_ms);
            return Some(VisibilityChange::Hidden);
        }

        if self.visible {
            self.show_pending_since = None;
            return None;
        }

        let since = *self.show_pending_since.get_or_insert(now_ms);
        if now_ms - since < self.show_delay_ms {
            return None;
        }

        self.visible = true;
        self.show_pending_since = None;
        self.clock.resume(now_ms);
        self.redraw_pending = true;
        Some(VisibilityChange::Shown)
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Local (freeze-aware) time for host time `now_ms`.
    #[inline]
    pub fn local_ms(&self, now_ms: f64) -> f64 {
        self.clock.local_ms(now_ms)
    }

    /// Returns true once after each hidden → visible transition.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_pending)
    }
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(true, DEFAULT_SHOW_DELAY_MS)
    }
}

/// Wraps a render callback so it only runs while `gate` reports visible.
///
/// The wrapped callback receives the gate's local time instead of host time.
/// While hidden the wrapper returns `false` without calling it. The first tick
/// after the gate shows again always reports a change.
pub fn gated<F>(gate: Rc<RefCell<VisibilityGate>>, mut callback: F) -> impl FnMut(f64) -> bool
where
    F: FnMut(f64) -> bool,
{
    move |now_ms| {
        let (local_ms, forced) = {
            let mut gate = gate.borrow_mut();
            if !gate.is_visible() {
                return false;
            }
            (gate.local_ms(now_ms), gate.take_redraw())
        };

        // Non-short-circuiting: the callback advances its state either way.
        callback(local_ms) | forced
    }
}
