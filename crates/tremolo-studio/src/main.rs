use anyhow::Result;
use winit::dpi::LogicalSize;

use tremolo_diagrams::{Page, PageConfig};
use tremolo_engine::device::GpuInit;
use tremolo_engine::logging::{LoggingConfig, init_logging};
use tremolo_engine::schedule::SchedulerConfig;
use tremolo_engine::window::{Runtime, RuntimeConfig};

/// Environment variable overriding the animation tick rate.
const FPS_VAR: &str = "TREMOLO_FPS";

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let page = Page::every_sin(PageConfig {
        scheduler: scheduler_config(std::env::var(FPS_VAR).ok().as_deref()),
        ..PageConfig::default()
    });

    let config = RuntimeConfig {
        title: "tremolo: every sin".to_string(),
        initial_size: LogicalSize::new(900.0, 760.0),
        ..RuntimeConfig::default()
    };

    log::info!("starting tremolo studio");
    Runtime::run(config, GpuInit::default(), page)
}

/// Parses a tick rate, falling back to the default on anything invalid.
fn scheduler_config(fps: Option<&str>) -> SchedulerConfig {
    let Some(raw) = fps else {
        return SchedulerConfig::default();
    };

    let config = raw.trim().parse::<f64>().ok().map(|target_fps| SchedulerConfig { target_fps });
    match config {
        Some(config) if config.validate().is_ok() => config,
        _ => {
            log::warn!(
                "{FPS_VAR}={raw:?} is not a positive tick rate; using {}",
                SchedulerConfig::DEFAULT_FPS
            );
            SchedulerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_rate_from_env_value() {
        assert_eq!(scheduler_config(None), SchedulerConfig::default());
        assert_eq!(scheduler_config(Some(" 60 ")).target_fps, 60.0);
        assert_eq!(scheduler_config(Some("fast")), SchedulerConfig::default());
        assert_eq!(scheduler_config(Some("-5")), SchedulerConfig::default());
        assert_eq!(scheduler_config(Some("inf")), SchedulerConfig::default());
    }
}
