//! Heat-equation and winding diagrams on top of `tremolo-engine`.
//!
//! Each diagram owns a [`SceneSurface`](tremolo_engine::render::SceneSurface)
//! and registers its animation callbacks with the page's frame scheduler. The
//! [`Page`](page::Page) lays diagrams out vertically and implements the engine
//! `App` contract.

pub mod animation;
pub mod ctx;
pub mod diagrams;
pub mod heat;
pub mod page;
pub mod palette;
pub mod winding;

pub use animation::{HeatAnimation, HeatAnimationConfig};
pub use ctx::{DiagramCtx, DiagramError, DiagramScheduler};
pub use diagrams::{ContactRod, Diagram, DiagramHandle, HeatGraph, HeatRod, WindingGraph};
pub use heat::{HEAT_TEMPLATE, HeatModel, HeatShaders};
pub use page::{Page, PageConfig, PageParams};

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
