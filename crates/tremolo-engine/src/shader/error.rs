use thiserror::Error;

use super::UniformKind;

/// Errors raised while building or mutating shader uniforms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShaderError {
    #[error("uniform kind mismatch: cell holds {expected:?}, got {found:?}")]
    KindMismatch {
        expected: UniformKind,
        found: UniformKind,
    },

    #[error("uniform handle is read-only")]
    ReadOnly,

    #[error("invalid uniform name {0:?}")]
    InvalidUniformName(String),

    #[error("template {template} requires uniform `{name}`")]
    MissingUniform { template: String, name: String },

    #[error("template {template} requires `{name}` as {expected:?}, got {found:?}")]
    WrongUniformKind {
        template: String,
        name: String,
        expected: UniformKind,
        found: UniformKind,
    },
}
