//! Render tree and layout.
//!
//! `RenderTree` is an arena copy of the aggregate tree that owns the
//! per-node expand state; `compute_layout` turns it into absolute canvas
//! coordinates. The layout pass walks the visible tree once:
//! leaves and collapsed branches take the next slot of a vertical cursor,
//! expanded branches center on the midpoint of their first and last child.

use decomp_engine::{AggregateNode, ColorBand};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;

/// Index into the render tree's node arena.
pub type NodeId = usize;

/// The root is always node 0.
pub const ROOT: NodeId = 0;

// ============================================================================
// RENDER TREE
// ============================================================================

/// A node of the render tree: aggregate facts plus interactive state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderNode {
    pub name: String,
    pub dimension: String,
    pub value: f64,
    pub color: ColorBand,
    pub count: usize,
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,

    /// Whether this node's children are currently shown.
    pub expanded: bool,
}

impl RenderNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Arena-backed copy of an aggregate tree with expand/collapse state.
/// Initially only the root is expanded, so the first paint shows the root
/// and its direct children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderTree {
    nodes: Vec<RenderNode>,
}

impl RenderTree {
    pub fn from_root(root: &AggregateNode) -> Self {
        let mut tree = RenderTree { nodes: Vec::new() };
        tree.add_node(root, 0, None);
        tree
    }

    fn add_node(&mut self, node: &AggregateNode, depth: usize, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(RenderNode {
            name: node.name.clone(),
            dimension: node.dimension.clone(),
            value: node.value,
            color: node.color,
            count: node.count,
            depth,
            parent,
            children: Vec::new(),
            expanded: depth == 0,
        });

        for child in &node.children {
            let child_id = self.add_node(child, depth + 1, Some(id));
            self.nodes[id].children.push(child_id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> &RenderNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Toggles a node's expansion. Leaves have nothing to expand, so the
    /// toggle is a no-op for them. Returns the new expanded state.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.nodes[id].has_children() {
            self.nodes[id].expanded = !self.nodes[id].expanded;
        }
        self.nodes[id].expanded
    }

    /// Visible nodes in paint order (DFS, parents before children).
    /// Children of a collapsed node are not visible.
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_visible(ROOT, &mut out);
        out
    }

    fn collect_visible(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        if self.nodes[id].expanded {
            for &child in &self.nodes[id].children {
                self.collect_visible(child, out);
            }
        }
    }

    /// Visible parent-child links, in the same order as `visible_nodes`.
    pub fn visible_links(&self) -> Vec<(NodeId, NodeId)> {
        let mut out = Vec::new();
        self.collect_links(ROOT, &mut out);
        out
    }

    fn collect_links(&self, id: NodeId, out: &mut Vec<(NodeId, NodeId)>) {
        if self.nodes[id].expanded {
            for &child in &self.nodes[id].children {
                out.push((id, child));
                self.collect_links(child, out);
            }
        }
    }

    /// The absolute-value range of a node's sibling set (the node itself
    /// for the root). Used to scale the in-card value bars.
    pub fn sibling_abs_range(&self, id: NodeId) -> (f64, f64) {
        let siblings: &[NodeId] = match self.nodes[id].parent {
            Some(parent) => &self.nodes[parent].children,
            None => std::slice::from_ref(&id),
        };

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &s in siblings {
            let v = self.nodes[s].value.abs();
            min = min.min(v);
            max = max.max(v);
        }
        (min, max)
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Absolute canvas position of a node card's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// The computed layout for the current expansion state. Positions are
/// indexed by NodeId; hidden nodes have no position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    pub positions: Vec<Option<Position>>,
    pub visible: Vec<NodeId>,
    pub links: Vec<(NodeId, NodeId)>,

    /// Height of the laid-out content, before margins.
    pub content_height: f64,

    /// Canvas size including margins. Width tracks the deepest visible
    /// depth, so collapsing the tree shrinks the canvas.
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Layout {
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.positions.get(id).copied().flatten()
    }
}

/// Lays out the visible tree.
///
/// x is a pure function of depth. y comes from a vertical cursor: a leaf
/// or collapsed node takes the cursor and advances it by one row pitch;
/// an expanded branch is centered between its first and last child, so a
/// parent always points at the middle of its subtree.
pub fn compute_layout(tree: &RenderTree, config: &LayoutConfig) -> Layout {
    let mut positions: Vec<Option<Position>> = vec![None; tree.len()];
    let mut cursor = 0.0;
    layout_node(tree, ROOT, config.margin.left, config, &mut cursor, &mut positions);

    let visible = tree.visible_nodes();
    let links = tree.visible_links();

    let deepest = visible
        .iter()
        .map(|&id| tree.node(id).depth)
        .max()
        .unwrap_or(0) as f64;
    let canvas_width =
        config.margin.left + deepest * config.level_gap + config.node_width + config.margin.right;
    let canvas_height = cursor + config.margin.top + config.margin.bottom;

    debug!(
        "layout: {} visible nodes, canvas {}x{}",
        visible.len(),
        canvas_width,
        canvas_height
    );

    Layout {
        positions,
        visible,
        links,
        content_height: cursor,
        canvas_width,
        canvas_height,
    }
}

fn layout_node(
    tree: &RenderTree,
    id: NodeId,
    x: f64,
    config: &LayoutConfig,
    cursor: &mut f64,
    positions: &mut [Option<Position>],
) {
    let node = tree.node(id);
    let y = if node.expanded && node.has_children() {
        for &child in &node.children {
            layout_node(tree, child, x + config.level_gap, config, cursor, positions);
        }
        let first = positions[node.children[0]].map(|p| p.y).unwrap_or(0.0);
        let last = positions[*node.children.last().unwrap_or(&node.children[0])]
            .map(|p| p.y)
            .unwrap_or(0.0);
        (first + last) / 2.0
    } else {
        let y = *cursor;
        *cursor += config.row_pitch();
        y
    };
    positions[id] = Some(Position { x, y });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, value: f64) -> AggregateNode {
        AggregateNode {
            name: name.to_string(),
            dimension: "Division".to_string(),
            value,
            color: ColorBand::MediumHigh,
            count: 1,
            children: Vec::new(),
        }
    }

    fn three_child_tree() -> AggregateNode {
        AggregateNode {
            name: "Total".to_string(),
            dimension: "All Data".to_string(),
            value: 600.0,
            color: ColorBand::High,
            count: 3,
            children: vec![
                leaf("Manhattan", 300.0),
                leaf("Brooklyn", 200.0),
                leaf("Bronx", 100.0),
            ],
        }
    }

    #[test]
    fn test_initial_expansion_shows_root_and_children() {
        let tree = RenderTree::from_root(&three_child_tree());
        assert_eq!(tree.visible_nodes(), vec![0, 1, 2, 3]);
        assert_eq!(tree.visible_links(), vec![(0, 1), (0, 2), (0, 3)]);
    }

    #[test]
    fn test_collapsed_root_hides_children() {
        let mut tree = RenderTree::from_root(&three_child_tree());
        assert!(!tree.toggle(ROOT));
        assert_eq!(tree.visible_nodes(), vec![0]);
        assert!(tree.visible_links().is_empty());
    }

    #[test]
    fn test_toggle_leaf_is_noop() {
        let mut tree = RenderTree::from_root(&three_child_tree());
        assert!(!tree.toggle(1));
        assert!(!tree.node(1).expanded);
        assert_eq!(tree.visible_nodes().len(), 4);
    }

    #[test]
    fn test_vertical_cursor_stacks_children() {
        let tree = RenderTree::from_root(&three_child_tree());
        let layout = compute_layout(&tree, &LayoutConfig::default());

        // Children stack at one row pitch (88 + 16) apart.
        assert_eq!(layout.position(1).unwrap().y, 0.0);
        assert_eq!(layout.position(2).unwrap().y, 104.0);
        assert_eq!(layout.position(3).unwrap().y, 208.0);
        assert_eq!(layout.content_height, 312.0);
    }

    #[test]
    fn test_parent_centered_on_children() {
        let tree = RenderTree::from_root(&three_child_tree());
        let layout = compute_layout(&tree, &LayoutConfig::default());

        // Midpoint of first (0) and last (208) child.
        assert_eq!(layout.position(ROOT).unwrap().y, 104.0);
    }

    #[test]
    fn test_x_is_a_function_of_depth() {
        let tree = RenderTree::from_root(&three_child_tree());
        let layout = compute_layout(&tree, &LayoutConfig::default());

        assert_eq!(layout.position(ROOT).unwrap().x, 80.0);
        for id in 1..=3 {
            assert_eq!(layout.position(id).unwrap().x, 360.0);
        }
    }

    #[test]
    fn test_canvas_tracks_deepest_visible_depth() {
        let mut tree = RenderTree::from_root(&three_child_tree());
        let expanded = compute_layout(&tree, &LayoutConfig::default());
        // left 80 + 1 * 280 + 220 + right 200
        assert_eq!(expanded.canvas_width, 780.0);

        tree.toggle(ROOT);
        let collapsed = compute_layout(&tree, &LayoutConfig::default());
        assert_eq!(collapsed.canvas_width, 500.0);
        assert_eq!(collapsed.content_height, 104.0);
        assert_eq!(collapsed.canvas_height, 204.0);
        assert_eq!(collapsed.position(1), None);
    }

    #[test]
    fn test_single_node_tree() {
        let tree = RenderTree::from_root(&leaf("Total", 100.0));
        let layout = compute_layout(&tree, &LayoutConfig::default());
        assert_eq!(layout.visible, vec![0]);
        assert_eq!(layout.position(ROOT).unwrap().y, 0.0);
        assert_eq!(layout.content_height, 104.0);
    }

    #[test]
    fn test_sibling_abs_range() {
        let tree = RenderTree::from_root(&three_child_tree());
        assert_eq!(tree.sibling_abs_range(1), (100.0, 300.0));
        // Root's sibling set is itself.
        assert_eq!(tree.sibling_abs_range(ROOT), (600.0, 600.0));
    }

    #[test]
    fn test_deep_chain_centers_recursively() {
        let mut root = three_child_tree();
        root.children[0].children.push(leaf("M1", 150.0));
        root.children[0].children.push(leaf("M2", 150.0));

        let mut tree = RenderTree::from_root(&root);
        // Expand Manhattan (id 1; its children are 2 and 3 in arena order).
        tree.toggle(1);
        let layout = compute_layout(&tree, &LayoutConfig::default());

        let m1 = layout.position(2).unwrap();
        let m2 = layout.position(3).unwrap();
        let manhattan = layout.position(1).unwrap();
        assert_eq!(manhattan.y, (m1.y + m2.y) / 2.0);
        assert_eq!(m1.x, manhattan.x + 280.0);
    }
}
