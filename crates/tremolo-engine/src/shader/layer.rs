use std::collections::BTreeMap;

use super::{Uniform, UniformValue};

/// One layer of uniform definitions.
///
/// Each name maps to a handle or to an explicit skip. A skipped name never
/// overwrites a value from an earlier layer; an absent name leaves it alone too.
#[derive(Debug, Clone, Default)]
pub struct UniformLayer {
    entries: BTreeMap<String, Option<Uniform>>,
}

impl UniformLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an existing handle (shared, not copied).
    pub fn with(mut self, name: impl Into<String>, uniform: Uniform) -> Self {
        self.insert(name, uniform);
        self
    }

    /// Adds a fresh cell holding `value`.
    pub fn with_value(self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.with(name, Uniform::new(value))
    }

    /// Marks `name` as present but undefined.
    pub fn skip(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), None);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, uniform: Uniform) {
        self.entries.insert(name.into(), Some(uniform));
    }

    pub fn get(&self, name: &str) -> Option<&Uniform> {
        self.entries.get(name).and_then(Option::as_ref)
    }

    pub fn is_skipped(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(None))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Uniform>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_is_distinct_from_absent() {
        let layer = UniformLayer::new().skip("scale").with_value("omega", 2.0f32);
        assert!(layer.is_skipped("scale"));
        assert!(layer.get("scale").is_none());
        assert!(!layer.is_skipped("offset"));
        assert_eq!(layer.get("omega").and_then(Uniform::float), Some(2.0));
        assert_eq!(layer.len(), 2);
    }

    #[test]
    fn with_shares_the_handle() {
        let shared = Uniform::new(1.0f32);
        let layer = UniformLayer::new().with("time", shared.clone());
        assert!(layer.get("time").is_some_and(|u| u.ptr_eq(&shared)));
    }
}
