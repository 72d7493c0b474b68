use thiserror::Error;

use tremolo_engine::core::ContextError;
use tremolo_engine::render::SceneSurface;
use tremolo_engine::schedule::FrameScheduler;
use tremolo_engine::shader::ShaderError;
use tremolo_engine::visibility::DEFAULT_SHOW_DELAY_MS;

pub type DiagramScheduler = FrameScheduler<SceneSurface>;

/// Why a diagram could not be mounted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("failed to build shaders: {0}")]
    Shader(#[from] ShaderError),
}

/// What a diagram needs from the page it is mounted on.
#[derive(Clone)]
pub struct DiagramCtx {
    scheduler: Option<DiagramScheduler>,
    show_delay_ms: f64,
}

impl DiagramCtx {
    pub fn new(scheduler: DiagramScheduler) -> Self {
        Self {
            scheduler: Some(scheduler),
            show_delay_ms: DEFAULT_SHOW_DELAY_MS,
        }
    }

    /// A context with no scheduler; mounting against it fails.
    pub fn detached() -> Self {
        Self {
            scheduler: None,
            show_delay_ms: DEFAULT_SHOW_DELAY_MS,
        }
    }

    pub fn with_show_delay(mut self, show_delay_ms: f64) -> Self {
        self.show_delay_ms = show_delay_ms;
        self
    }

    pub fn scheduler(&self) -> Result<&DiagramScheduler, ContextError> {
        self.scheduler.as_ref().ok_or(ContextError::Missing {
            what: "frame scheduler",
        })
    }

    pub fn show_delay_ms(&self) -> f64 {
        self.show_delay_ms
    }
}
