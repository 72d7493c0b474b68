//! Animation progress curves.
//!
//! Diagrams animate a normalized progress value in `[0, 1]` that is written to a
//! shared `time` uniform once per tick.

/// Fraction of a cycle spent rewinding when [`Rewind::Default`] is selected.
pub const DEFAULT_REWIND: f32 = 0.075;

/// How a looping animation returns to its start.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Rewind {
    /// Jump back to zero at the end of each cycle.
    Off,
    /// Play backwards during the last [`DEFAULT_REWIND`] of each cycle.
    Default,
    /// Play backwards during the given fraction of each cycle.
    Fraction(f32),
}

impl Rewind {
    /// Fraction of the cycle spent rewinding, or `None` when rewinding is off.
    pub fn fraction(self) -> Option<f32> {
        match self {
            Rewind::Off => None,
            Rewind::Default => Some(DEFAULT_REWIND),
            Rewind::Fraction(f) => Some(f.clamp(0.0, 1.0)),
        }
    }
}

/// Maps cycle position `t` in `[0, 1)` to animation progress.
///
/// With rewinding, progress rises linearly to 1 over the first `1 - rewind`
/// of the cycle, then falls back to 0 over the remainder.
pub fn animate(t: f32, rewind: Rewind) -> f32 {
    let Some(rewind) = rewind.fraction() else {
        return t;
    };

    let offset = 1.0 - rewind;

    if offset <= 0.0 {
        return 1.0 - t;
    }

    if t < offset {
        t / offset
    } else {
        1.0 - (t - offset) / (1.0 - offset)
    }
}

/// Holds progress at zero for the first `delay` of the range, then stretches
/// the rest back over `[0, 1]`.
pub fn delayed(value: f32, delay: f32) -> f32 {
    if delay >= 1.0 {
        return 0.0;
    }
    ((value - delay) / (1.0 - delay)).max(0.0)
}

/// Position within a cycle of `duration_ms`, in `[0, 1)`.
pub fn cycle_position(now_ms: f64, duration_ms: f64) -> f32 {
    if duration_ms <= 0.0 {
        return 0.0;
    }
    (now_ms.rem_euclid(duration_ms) / duration_ms) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    // ── animate ───────────────────────────────────────────────────────────

    #[test]
    fn without_rewind_progress_is_identity() {
        assert_eq!(animate(0.3, Rewind::Off), 0.3);
    }

    #[test]
    fn default_rewind_peaks_before_cycle_end() {
        let peak = 1.0 - DEFAULT_REWIND;
        assert!(close(animate(0.0, Rewind::Default), 0.0));
        assert!(close(animate(peak / 2.0, Rewind::Default), 0.5));
        assert!(close(animate(peak, Rewind::Default), 1.0));
        assert!(close(animate(peak + DEFAULT_REWIND / 2.0, Rewind::Default), 0.5));
        assert!(animate(0.9999, Rewind::Default) < 0.01);
    }

    #[test]
    fn fraction_rewind_is_symmetric_at_half() {
        assert!(close(animate(0.25, Rewind::Fraction(0.5)), 0.5));
        assert!(close(animate(0.5, Rewind::Fraction(0.5)), 1.0));
        assert!(close(animate(0.75, Rewind::Fraction(0.5)), 0.5));
    }

    // ── delayed ───────────────────────────────────────────────────────────

    #[test]
    fn delay_holds_at_zero_then_stretches() {
        assert_eq!(delayed(0.1, 0.2), 0.0);
        assert!(close(delayed(0.6, 0.2), 0.5));
        assert!(close(delayed(1.0, 0.2), 1.0));
    }

    #[test]
    fn full_delay_never_starts() {
        assert_eq!(delayed(1.0, 1.0), 0.0);
    }

    // ── cycle_position ────────────────────────────────────────────────────

    #[test]
    fn cycle_position_wraps() {
        assert!(close(cycle_position(1_250.0, 5_000.0), 0.25));
        assert!(close(cycle_position(6_250.0, 5_000.0), 0.25));
        assert_eq!(cycle_position(10.0, 0.0), 0.0);
    }
}
