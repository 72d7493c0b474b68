use tremolo_engine::shader::{ShaderBundle, TimeCell, Uniform, UniformWatch};
use tremolo_engine::time::progress::{Rewind, animate, cycle_position, delayed};

/// Cycle length of animations that do not rewind.
pub const LOOP_MS: f64 = 2_500.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HeatAnimationConfig {
    /// Animate the temperature over time; otherwise `time` stays put and the
    /// diagram only redraws when a watched parameter changes.
    pub cool: bool,
    /// Fraction of each cycle held at zero before cooling starts.
    pub delay: f32,
    pub duration_ms: f64,
    pub rewind: Rewind,
}

impl Default for HeatAnimationConfig {
    fn default() -> Self {
        Self {
            cool: false,
            delay: 0.0,
            duration_ms: 5_000.0,
            rewind: Rewind::Default,
        }
    }
}

impl HeatAnimationConfig {
    pub fn cooling() -> Self {
        Self {
            cool: true,
            ..Self::default()
        }
    }
}

/// Per-diagram animation state: the unique writer of a heat family's `time`.
#[derive(Debug)]
pub struct HeatAnimation {
    config: HeatAnimationConfig,
    time: TimeCell,
    /// Progress before the delay is applied.
    real: f32,
    watch: UniformWatch,
}

impl HeatAnimation {
    pub fn new(config: HeatAnimationConfig) -> Self {
        Self {
            config,
            time: TimeCell::new(0.0),
            real: 0.0,
            watch: UniformWatch::new(),
        }
    }

    pub fn config(&self) -> &HeatAnimationConfig {
        &self.config
    }

    /// Read handle for the family's `time` uniform.
    pub fn time(&self) -> Uniform {
        self.time.uniform()
    }

    pub fn progress(&self) -> f32 {
        self.time.read()
    }

    pub fn real(&self) -> f32 {
        self.real
    }

    /// Redraws when `uniform` changes.
    pub fn watch(&mut self, uniform: Uniform) {
        self.watch.watch(uniform);
    }

    /// Watches every parameter of `bundle` except `time`.
    pub fn watch_bundle(&mut self, bundle: &ShaderBundle) {
        self.watch.watch_bundle(bundle, &["time"]);
    }

    /// Advances to `now_ms`; returns true if the diagram must be redrawn.
    pub fn advance(&mut self, now_ms: f64) -> bool {
        let params_changed = self.watch.changed();
        if !self.config.cool {
            return params_changed;
        }

        if self.config.rewind == Rewind::Off {
            self.real = cycle_position(now_ms, LOOP_MS);
            self.time.write(self.real);
            return true;
        }

        self.real = animate(cycle_position(now_ms, self.config.duration_ms), self.config.rewind);
        self.time.write(delayed(self.real, self.config.delay));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn cooling_follows_the_rewind_curve() {
        let mut anim = HeatAnimation::new(HeatAnimationConfig::cooling());
        let time = anim.time();

        assert!(anim.advance(0.0));
        assert_eq!(time.float(), Some(0.0));

        // Halfway through the forward part of the cycle.
        assert!(anim.advance(5_000.0 * 0.925 / 2.0));
        assert!(close(anim.progress(), 0.5));

        assert!(anim.advance(5_000.0 * 0.925));
        assert!(close(anim.progress(), 1.0));

        // Next cycle wraps around.
        anim.advance(5_000.0 + 5_000.0 * 0.925 / 4.0);
        assert!(close(anim.progress(), 0.25));
    }

    #[test]
    fn delay_holds_time_at_zero() {
        let mut anim = HeatAnimation::new(HeatAnimationConfig {
            delay: 0.1,
            ..HeatAnimationConfig::cooling()
        });

        anim.advance(5_000.0 * 0.925 * 0.05);
        assert!(close(anim.real(), 0.05));
        assert_eq!(anim.progress(), 0.0);

        anim.advance(5_000.0 * 0.925 * 0.55);
        assert!(close(anim.progress(), 0.5));
    }

    #[test]
    fn without_rewind_it_loops_every_loop_period() {
        let mut anim = HeatAnimation::new(HeatAnimationConfig {
            rewind: Rewind::Off,
            ..HeatAnimationConfig::cooling()
        });

        assert!(anim.advance(LOOP_MS * 0.5));
        assert!(close(anim.progress(), 0.5));
        assert!(anim.advance(LOOP_MS * 2.0 + 250.0));
        assert!(close(anim.progress(), 0.1));
    }

    #[test]
    fn static_diagram_redraws_only_on_parameter_change() {
        let mut anim = HeatAnimation::new(HeatAnimationConfig::default());
        let harmonics = Uniform::new(1.0f32);
        anim.watch(harmonics.clone());

        assert!(!anim.advance(0.0));
        assert!(!anim.advance(100.0));
        assert_eq!(anim.progress(), 0.0);

        harmonics.set(3.0f32).unwrap();
        assert!(anim.advance(200.0));
        assert!(!anim.advance(300.0));
    }

    #[test]
    fn time_handle_is_read_only() {
        let anim = HeatAnimation::new(HeatAnimationConfig::default());
        assert!(anim.time().set(0.5f32).is_err());
    }
}
