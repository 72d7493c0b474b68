/// Rate cap for processed ticks.
///
/// The host delivers frames at its own cadence (typically the display refresh
/// rate). The pacer lets a frame through only when at least one interval has
/// elapsed since the last processed tick. The unconsumed remainder is carried
/// forward (`last = now - elapsed % interval`), so the processed cadence stays
/// anchored to a fixed grid and does not drift with frame jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePacer {
    interval_ms: f64,
    last_ms: f64,
}

impl FramePacer {
    /// Creates a pacer for `target_fps` processed ticks per second.
    ///
    /// Callers validate the rate; a non-positive rate yields an interval of
    /// zero and every frame passes.
    pub fn new(target_fps: f64) -> Self {
        let interval_ms = if target_fps > 0.0 && target_fps.is_finite() {
            1000.0 / target_fps
        } else {
            0.0
        };

        Self {
            interval_ms,
            last_ms: 0.0,
        }
    }

    /// Minimum spacing between processed ticks, in milliseconds.
    #[inline]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Timestamp of the grid point the last processed tick was anchored to.
    #[inline]
    pub fn last_ms(&self) -> f64 {
        self.last_ms
    }

    /// Returns true if the frame at `now_ms` should be processed.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        let elapsed = now_ms - self.last_ms;

        if elapsed < self.interval_ms {
            return false;
        }

        self.last_ms = if self.interval_ms > 0.0 {
            now_ms - (elapsed % self.interval_ms)
        } else {
            now_ms
        };

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── interval ──────────────────────────────────────────────────────────

    #[test]
    fn interval_from_rate() {
        assert!((FramePacer::new(30.0).interval_ms() - 33.333_333).abs() < 1e-3);
        assert!((FramePacer::new(60.0).interval_ms() - 16.666_666).abs() < 1e-3);
    }

    #[test]
    fn degenerate_rate_lets_everything_through() {
        let mut pacer = FramePacer::new(0.0);
        assert!(pacer.poll(0.0));
        assert!(pacer.poll(0.0));
        assert!(pacer.poll(1.0));
    }

    // ── poll ──────────────────────────────────────────────────────────────

    #[test]
    fn frames_inside_interval_are_skipped() {
        let mut pacer = FramePacer::new(10.0); // 100 ms
        assert!(pacer.poll(100.0));
        assert!(!pacer.poll(150.0));
        assert!(!pacer.poll(199.0));
        assert!(pacer.poll(200.0));
    }

    #[test]
    fn remainder_is_carried_forward() {
        let mut pacer = FramePacer::new(10.0); // 100 ms
        assert!(pacer.poll(130.0));
        // Anchored to the 100 ms grid point, not to the late frame.
        assert_eq!(pacer.last_ms(), 100.0);
        assert!(pacer.poll(200.0));
    }

    #[test]
    fn long_stall_does_not_burst() {
        let mut pacer = FramePacer::new(10.0);
        assert!(pacer.poll(1_050.0));
        assert_eq!(pacer.last_ms(), 1_000.0);
        assert!(!pacer.poll(1_060.0));
    }

    #[test]
    fn dense_frames_are_capped_without_drift() {
        let mut pacer = FramePacer::new(30.0);
        let frame_ms = 1000.0 / 144.0;
        let total_ms = 10_000.0;

        let mut frames = 0u32;
        let mut ticks = 0u32;
        let mut now = 0.0;
        while now <= total_ms {
            frames += 1;
            if pacer.poll(now) {
                ticks += 1;
            }
            now += frame_ms;
        }

        assert!(ticks < frames, "rate cap must drop frames: {ticks} of {frames}");
        let expected = total_ms / pacer.interval_ms();
        assert!(
            (f64::from(ticks) - expected).abs() <= 1.0,
            "expected about {expected} ticks, got {ticks}"
        );
    }
}
