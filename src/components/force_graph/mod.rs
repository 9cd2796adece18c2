//! Interactive force-directed entity graph: loader, layout engine, viewport,
//! pointer state machine and canvas renderer.

mod component;
/// Tunable settings.
pub mod config;
/// Errors at the view boundary.
pub mod error;
pub mod interaction;
/// Snapshot to simulation state.
pub mod loader;
/// Category colors.
pub mod palette;
mod quadtree;
/// Frame drawing.
pub mod render;
pub mod scale;
pub mod simulation;
/// Owned per-canvas state.
pub mod state;
mod types;
/// Pan and zoom.
pub mod viewport;

pub use component::ForceGraphCanvas;
pub use config::{ForceParams, GraphConfig, LayoutMode};
pub use error::GraphError;
pub use state::{ForceGraphState, NodeDetails};
pub use types::{GraphData, GraphLink, GraphNode, Vec2};
