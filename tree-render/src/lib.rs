//! Interactive decomposition tree renderer.
//!
//! This crate turns an aggregate tree from `decomp-engine` into a
//! drawable scene and drives its interaction: expand/collapse drilling,
//! node selection, tooltips, and the narrative insight panel. It never
//! touches a real drawing surface; hosts consume the scene graph and map
//! it onto SVG, canvas, or whatever they render with.
//!
//! Layers:
//! - `config`: Layout geometry (what the tree LOOKS like)
//! - `layout`: Render tree and coordinate assignment (WHERE things go)
//! - `scene`: Typed drawing primitives (WHAT gets painted)
//! - `format`: Metric value formatting
//! - `controller`: Pointer events and interaction state
//! - `insight`: Narrative generation seam

pub mod config;
pub mod controller;
pub mod format;
pub mod insight;
pub mod layout;
pub mod scene;

pub use config::{LayoutConfig, Margin};
pub use controller::{InteractionState, NodeSelection, Tooltip, TreeController};
pub use format::ValueFormat;
pub use insight::{InsightPanel, InsightState, NarrativeError, NarrativeProvider};
pub use layout::{compute_layout, Layout, NodeId, Position, RenderNode, RenderTree, ROOT};
pub use scene::{build_scene, RectKind, Scene, ScenePrimitive, TextKind};
