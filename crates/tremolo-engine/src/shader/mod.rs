//! Shader bundles and shared uniforms.
//!
//! A [`UniformComposer`] layers uniform sets (library defaults, model defaults,
//! caller overrides) into an immutable [`ShaderBundle`]. Uniform values live in
//! shared cells, so every bundle holding the same [`Uniform`] sees the same
//! value without recomposition.

mod bundle;
mod composer;
mod error;
mod family;
mod layer;
mod layout;
pub mod prelude;
mod uniform;
mod value;
mod watch;

pub use bundle::ShaderBundle;
pub use composer::{ShaderTemplate, UniformComposer, validate_uniform_name};
pub use error::ShaderError;
pub use family::ShaderFamily;
pub use layer::UniformLayer;
pub use layout::{UNIFORM_BINDING, UNIFORM_GROUP, UniformField, UniformLayout};
pub use uniform::{TimeCell, Uniform};
pub use value::{UniformKind, UniformValue};
pub use watch::UniformWatch;

#[cfg(test)]
pub(crate) fn validate_wgsl(source: &str) {
    let module = match naga::front::wgsl::parse_str(source) {
        Ok(module) => module,
        Err(e) => panic!("WGSL parse error: {}\n{source}", e.emit_to_string(source)),
    };

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    if let Err(e) = validator.validate(&module) {
        panic!("WGSL validation error: {e:?}\n{source}");
    }
}
