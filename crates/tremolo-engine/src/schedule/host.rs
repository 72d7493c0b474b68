use std::cell::Cell;

/// Host side of the frame loop.
///
/// The scheduler calls `request_frame` once per tick while running; the host
/// answers by calling `FrameScheduler::on_frame` on its next frame signal.
pub trait FrameHost {
    fn request_frame(&self);
}

/// Latching frame request flag.
///
/// The window runtime polls it with [`FrameSignal::take`] between events, and
/// tests use it as a deterministic fake host.
#[derive(Debug, Default)]
pub struct FrameSignal {
    pending: Cell<bool>,
    requests: Cell<u64>,
}

impl FrameSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes a pending request. Multiple requests before a `take` collapse
    /// into one.
    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Total number of requests received.
    #[inline]
    pub fn requests(&self) -> u64 {
        self.requests.get()
    }
}

impl FrameHost for FrameSignal {
    fn request_frame(&self) {
        self.pending.set(true);
        self.requests.set(self.requests.get() + 1);
    }
}
