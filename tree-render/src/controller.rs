//! Interaction controller.
//!
//! Owns the render tree, layout config, and interaction state, and maps
//! pointer events onto them. Hosts feed it events with node ids they
//! resolved through hit testing, then ask for a fresh scene.
//!
//! Event model:
//! - click toggles expansion (no-op on leaves)
//! - double click selects the node for analysis and reports its facts
//! - hover shows a tooltip that tracks the pointer

use decomp_engine::AggregateNode;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::format::ValueFormat;
use crate::layout::{compute_layout, Layout, NodeId, RenderTree};
use crate::scene::{build_scene, Scene};

/// Tooltip offsets from the pointer, in canvas units.
const TOOLTIP_DX: f64 = 15.0;
const TOOLTIP_DY: f64 = -10.0;

// ============================================================================
// INTERACTION STATE
// ============================================================================

/// The facts of a double-clicked node, reported to the host for analysis.
/// Field names follow the host message convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSelection {
    pub name: String,
    pub dimension: String,
    pub value: f64,
    pub count: usize,
    pub has_children: bool,
    pub child_count: usize,
}

/// A visible tooltip: position plus pre-formatted content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub dimension: String,
    pub value: String,
    pub count: usize,

    /// Present for branch nodes only.
    pub child_count: Option<usize>,
}

/// Mutable interaction state, kept apart from the tree structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionState {
    /// The sole analysis selection, if any.
    pub selected: Option<NodeId>,

    /// The tooltip currently shown, if any.
    pub tooltip: Option<Tooltip>,
}

// ============================================================================
// CONTROLLER
// ============================================================================

/// Drives one decomposition tree view.
#[derive(Debug, Clone)]
pub struct TreeController {
    tree: RenderTree,
    config: LayoutConfig,
    format: ValueFormat,
    state: InteractionState,
}

impl TreeController {
    pub fn new(root: &AggregateNode, format: ValueFormat) -> Self {
        TreeController {
            tree: RenderTree::from_root(root),
            config: LayoutConfig::default(),
            format,
            state: InteractionState::default(),
        }
    }

    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Replaces the underlying tree (after a metric or drill-path change),
    /// resetting expansion and interaction state.
    pub fn reset(&mut self, root: &AggregateNode, format: ValueFormat) {
        self.tree = RenderTree::from_root(root);
        self.format = format;
        self.state = InteractionState::default();
    }

    /// A single click toggles the node's subtree. Leaves ignore it.
    /// Returns the node's expanded state after the click.
    pub fn click(&mut self, id: NodeId) -> bool {
        let expanded = self.tree.toggle(id);
        debug!("click on node {}: expanded={}", id, expanded);
        expanded
    }

    /// A double click makes the node the sole selection and reports its
    /// facts for downstream analysis.
    pub fn double_click(&mut self, id: NodeId) -> NodeSelection {
        self.state.selected = Some(id);
        let node = self.tree.node(id);
        NodeSelection {
            name: node.name.clone(),
            dimension: node.dimension.clone(),
            value: node.value,
            count: node.count,
            has_children: node.has_children(),
            child_count: node.children.len(),
        }
    }

    /// Pointer entered a node: show its tooltip near the pointer.
    pub fn pointer_enter(&mut self, id: NodeId, pointer_x: f64, pointer_y: f64) {
        let node = self.tree.node(id);
        self.state.tooltip = Some(Tooltip {
            x: pointer_x + TOOLTIP_DX,
            y: pointer_y + TOOLTIP_DY,
            name: node.name.clone(),
            dimension: node.dimension.clone(),
            value: self.format.format_value(node.value),
            count: node.count,
            child_count: if node.has_children() {
                Some(node.children.len())
            } else {
                None
            },
        });
    }

    /// Pointer moved within a node: the tooltip follows.
    pub fn pointer_move(&mut self, pointer_x: f64, pointer_y: f64) {
        if let Some(tooltip) = self.state.tooltip.as_mut() {
            tooltip.x = pointer_x + TOOLTIP_DX;
            tooltip.y = pointer_y + TOOLTIP_DY;
        }
    }

    /// Pointer left the node: hide the tooltip.
    pub fn pointer_leave(&mut self) {
        self.state.tooltip = None;
    }

    pub fn layout(&self) -> Layout {
        compute_layout(&self.tree, &self.config)
    }

    /// Produces the scene for the current state.
    pub fn render(&self) -> Scene {
        let layout = self.layout();
        build_scene(
            &self.tree,
            &layout,
            &self.config,
            self.format,
            self.state.selected,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ROOT;
    use crate::scene::{RectKind, ScenePrimitive, NODE_FILL_SELECTED};
    use decomp_engine::ColorBand;

    fn leaf(name: &str, value: f64, count: usize) -> AggregateNode {
        AggregateNode {
            name: name.to_string(),
            dimension: "Division".to_string(),
            value,
            color: ColorBand::MediumHigh,
            count,
            children: Vec::new(),
        }
    }

    fn sample_root() -> AggregateNode {
        AggregateNode {
            name: "Total".to_string(),
            dimension: "All Data".to_string(),
            value: 300.0,
            color: ColorBand::High,
            count: 3,
            children: vec![leaf("Brooklyn", 200.0, 2), leaf("Bronx", 100.0, 1)],
        }
    }

    #[test]
    fn test_click_collapses_and_expands() {
        let mut ctl = TreeController::new(&sample_root(), ValueFormat::Currency);
        assert_eq!(ctl.layout().visible.len(), 3);

        assert!(!ctl.click(ROOT));
        assert_eq!(ctl.layout().visible.len(), 1);

        assert!(ctl.click(ROOT));
        assert_eq!(ctl.layout().visible.len(), 3);
    }

    #[test]
    fn test_click_on_leaf_changes_nothing() {
        let mut ctl = TreeController::new(&sample_root(), ValueFormat::Currency);
        ctl.click(1);
        assert_eq!(ctl.layout().visible.len(), 3);
    }

    #[test]
    fn test_double_click_selects_and_reports() {
        let mut ctl = TreeController::new(&sample_root(), ValueFormat::Currency);
        let selection = ctl.double_click(1);

        assert_eq!(
            selection,
            NodeSelection {
                name: "Brooklyn".to_string(),
                dimension: "Division".to_string(),
                value: 200.0,
                count: 2,
                has_children: false,
                child_count: 0,
            }
        );
        assert_eq!(ctl.state().selected, Some(1));

        // A later double click moves the sole selection.
        ctl.double_click(2);
        assert_eq!(ctl.state().selected, Some(2));
    }

    #[test]
    fn test_selection_field_names() {
        let mut ctl = TreeController::new(&sample_root(), ValueFormat::Currency);
        let json = serde_json::to_string(&ctl.double_click(ROOT)).unwrap();
        assert!(json.contains("\"hasChildren\":true"));
        assert!(json.contains("\"childCount\":2"));
    }

    #[test]
    fn test_selected_node_highlighted_in_scene() {
        let mut ctl = TreeController::new(&sample_root(), ValueFormat::Currency);
        ctl.double_click(1);

        let scene = ctl.render();
        let highlighted = scene.items.iter().any(|i| matches!(
            i,
            ScenePrimitive::Rect { node: 1, kind: RectKind::NodeBody, fill, .. }
            if fill == NODE_FILL_SELECTED
        ));
        assert!(highlighted);
    }

    #[test]
    fn test_tooltip_lifecycle() {
        let mut ctl = TreeController::new(&sample_root(), ValueFormat::Currency);
        assert!(ctl.state().tooltip.is_none());

        ctl.pointer_enter(1, 400.0, 120.0);
        let tooltip = ctl.state().tooltip.clone().unwrap();
        assert_eq!(tooltip.x, 415.0);
        assert_eq!(tooltip.y, 110.0);
        assert_eq!(tooltip.name, "Brooklyn");
        assert_eq!(tooltip.value, "$200");
        assert_eq!(tooltip.count, 2);
        assert_eq!(tooltip.child_count, None);

        ctl.pointer_enter(ROOT, 400.0, 120.0);
        assert_eq!(ctl.state().tooltip.as_ref().unwrap().child_count, Some(2));
        ctl.pointer_enter(1, 400.0, 120.0);

        ctl.pointer_move(500.0, 200.0);
        let moved = ctl.state().tooltip.clone().unwrap();
        assert_eq!(moved.x, 515.0);
        assert_eq!(moved.y, 190.0);
        assert_eq!(moved.name, "Brooklyn");

        ctl.pointer_leave();
        assert!(ctl.state().tooltip.is_none());
    }

    #[test]
    fn test_move_without_tooltip_is_noop() {
        let mut ctl = TreeController::new(&sample_root(), ValueFormat::Currency);
        ctl.pointer_move(500.0, 200.0);
        assert!(ctl.state().tooltip.is_none());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut ctl = TreeController::new(&sample_root(), ValueFormat::Currency);
        ctl.click(ROOT);
        ctl.double_click(ROOT);
        ctl.pointer_enter(ROOT, 0.0, 0.0);

        ctl.reset(&sample_root(), ValueFormat::Percent);
        assert_eq!(ctl.state().selected, None);
        assert!(ctl.state().tooltip.is_none());
        assert_eq!(ctl.layout().visible.len(), 3);
    }
}
