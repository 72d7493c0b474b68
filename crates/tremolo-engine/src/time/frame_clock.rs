use std::time::Instant;

/// Frame timing snapshot delivered by the host for each animation frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Milliseconds since the clock was created. Monotonically non-decreasing.
    pub now_ms: f64,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Host clock producing millisecond timestamps, the native counterpart of the
/// timestamps a browser passes to animation-frame callbacks.
///
/// One clock per window (or per loop) so multi-window hosts do not share
/// frame counters.
#[derive(Debug, Clone)]
pub struct HostClock {
    origin: Instant,
    last_ms: f64,
    frame_index: u64,
}

impl HostClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock whose zero is `origin`.
    pub fn starting_at(origin: Instant) -> Self {
        Self {
            origin,
            last_ms: 0.0,
            frame_index: 0,
        }
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock as if the frame arrived at `at`.
    ///
    /// Timestamps never go backwards, even if `at` precedes the previous tick.
    pub fn tick_at(&mut self, at: Instant) -> FrameTime {
        let now_ms = self.ms_at(at).max(self.last_ms);
        self.last_ms = now_ms;

        let ft = FrameTime {
            now_ms,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }

    fn ms_at(&self, at: Instant) -> f64 {
        at.saturating_duration_since(self.origin).as_secs_f64() * 1000.0
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}
