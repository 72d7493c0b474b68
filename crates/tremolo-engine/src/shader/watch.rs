use super::{ShaderBundle, Uniform, UniformValue};

/// Detects changes in a set of uniform values between ticks.
///
/// Static diagrams use it to redraw only when a shared parameter moved.
#[derive(Debug, Default)]
pub struct UniformWatch {
    watched: Vec<(Uniform, UniformValue)>,
}

impl UniformWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watches every uniform of `bundle` except the names in `exclude`.
    pub fn watch_bundle(&mut self, bundle: &ShaderBundle, exclude: &[&str]) {
        for (name, uniform) in bundle.uniforms() {
            if !exclude.contains(&name.as_str()) {
                self.watch(uniform.clone());
            }
        }
    }

    /// Adds `uniform`, snapshotting its current value. Handles already
    /// watched are ignored.
    pub fn watch(&mut self, uniform: Uniform) {
        if self.watched.iter().any(|(u, _)| u.ptr_eq(&uniform)) {
            return;
        }
        let value = uniform.get();
        self.watched.push((uniform, value));
    }

    /// True if any watched value differs from the last snapshot. Refreshes
    /// the snapshot.
    pub fn changed(&mut self) -> bool {
        let mut changed = false;
        for (uniform, last) in &mut self.watched {
            let now = uniform.get();
            if now != *last {
                *last = now;
                changed = true;
            }
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{TimeCell, UniformComposer, UniformLayer};

    #[test]
    fn reports_each_change_once() {
        let scale = Uniform::new(1.0f32);
        let mut watch = UniformWatch::new();
        watch.watch(scale.clone());
        watch.watch(scale.clone());
        assert_eq!(watch.len(), 1);

        assert!(!watch.changed());
        scale.set(2.0f32).unwrap();
        assert!(watch.changed());
        assert!(!watch.changed());

        // Setting the same value is not a change.
        scale.set(2.0f32).unwrap();
        assert!(!watch.changed());
    }

    #[test]
    fn bundle_watch_skips_excluded_names() {
        let time = TimeCell::new(0.0);
        let layer = UniformLayer::new()
            .with("time", time.uniform())
            .with_value("scale", 1.0f32);
        let bundle = UniformComposer::default()
            .compose(&layer, None, None, None)
            .unwrap();

        let mut watch = UniformWatch::new();
        watch.watch_bundle(&bundle, &["time"]);
        watch.watch_bundle(&bundle, &["time"]);
        assert_eq!(watch.len(), 1);

        time.write(0.5);
        assert!(!watch.changed());

        bundle.uniform("scale").unwrap().set(3.0f32).unwrap();
        assert!(watch.changed());
    }
}
