use thiserror::Error;

/// Misuse of the frame scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error("frame scheduler is already running")]
    AlreadyRunning,

    #[error("invalid tick rate {0} (expected a finite rate above zero)")]
    InvalidTickRate(f64),
}
