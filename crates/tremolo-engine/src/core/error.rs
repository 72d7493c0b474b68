use thiserror::Error;

/// A component was set up without something it needs from its host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("missing {what} in mount context")]
    Missing { what: &'static str },
}
