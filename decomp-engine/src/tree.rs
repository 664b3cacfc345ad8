//! Aggregate tree - the renderable output of the hierarchy engine.
//!
//! The tree is immutable once built; renderers copy what they need and
//! keep their own expand/selection state. Children are always present (an
//! empty vector at leaf levels) so consumers never branch on an optional
//! children field.

use serde::{Deserialize, Serialize};

// ============================================================================
// COLOR BANDING
// ============================================================================

/// Severity band derived from a node's value relative to its sibling set.
/// Bands are ordered high to low and map to a fixed palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorBand {
    High,
    MediumHigh,
    MediumLow,
    Low,
}

impl ColorBand {
    /// The fixed display palette for each band.
    pub fn hex(&self) -> &'static str {
        match self {
            ColorBand::High => "#1B5E3F",
            ColorBand::MediumHigh => "#2D8B5E",
            ColorBand::MediumLow => "#F59E0B",
            ColorBand::Low => "#DC2626",
        }
    }
}

// ============================================================================
// AGGREGATE NODE
// ============================================================================

/// A node in the aggregate tree: the aggregation of the row subset matching
/// this node's dimension-value filter path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateNode {
    /// The dimension value this node represents (or the root sentinel).
    pub name: String,

    /// The dimension this node was grouped by (or the root sentinel).
    pub dimension: String,

    /// The metric computed over exactly this node's matched rows. Never
    /// inherited or estimated from children.
    pub value: f64,

    /// Severity band within this node's sibling set.
    pub color: ColorBand,

    /// Number of underlying rows matched.
    pub count: usize,

    /// Child nodes, sorted by value descending. Empty at leaf levels.
    pub children: Vec<AggregateNode>,
}

impl AggregateNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Tree depth below this node: 0 for a leaf.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Resolves a path of child indices from this node.
    pub fn descendant(&self, index_path: &[usize]) -> Option<&AggregateNode> {
        let mut node = self;
        for &i in index_path {
            node = node.children.get(i)?;
        }
        Some(node)
    }
}

// ============================================================================
// FLATTENING
// ============================================================================

/// A flattened tree entry for selector dropdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatTreeItem {
    /// "Dimension: Name" display label.
    pub label: String,

    /// Breadcrumb path from the root, e.g. "Total > Brooklyn > B1".
    pub path: String,

    /// Depth in the tree (0 = root).
    pub depth: usize,

    /// Child-index path from the root; resolves via
    /// [`AggregateNode::descendant`].
    pub index_path: Vec<usize>,
}

/// Flattens the tree into an ordered list (DFS, parents before children).
pub fn flatten_tree(root: &AggregateNode) -> Vec<FlatTreeItem> {
    let mut items = Vec::new();
    flatten_node(root, "", 0, &mut Vec::new(), &mut items);
    items
}

fn flatten_node(
    node: &AggregateNode,
    parent_path: &str,
    depth: usize,
    index_path: &mut Vec<usize>,
    items: &mut Vec<FlatTreeItem>,
) {
    let path = if parent_path.is_empty() {
        node.name.clone()
    } else {
        format!("{} > {}", parent_path, node.name)
    };

    items.push(FlatTreeItem {
        label: format!("{}: {}", node.dimension, node.name),
        path: path.clone(),
        depth,
        index_path: index_path.clone(),
    });

    for (i, child) in node.children.iter().enumerate() {
        index_path.push(i);
        flatten_node(child, &path, depth + 1, index_path, items);
        index_path.pop();
    }
}

// ============================================================================
// NODE SUMMARY
// ============================================================================

/// Structured input for narrative prompt construction. The core supplies
/// the facts; prompt text assembly belongs to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub name: String,
    pub dimension: String,
    pub value: f64,
    pub count: usize,
    pub has_children: bool,
    pub child_count: usize,

    /// Up to five (name, value) pairs of the largest children, in tree
    /// order (children are already sorted by value descending).
    pub top_children: Vec<(String, f64)>,

    /// Period-over-period growth for the node's subset, when the host has
    /// one to report.
    pub yoy_growth: Option<f64>,
}

impl NodeSummary {
    pub fn from_node(node: &AggregateNode) -> Self {
        NodeSummary {
            name: node.name.clone(),
            dimension: node.dimension.clone(),
            value: node.value,
            count: node.count,
            has_children: !node.children.is_empty(),
            child_count: node.children.len(),
            top_children: node
                .children
                .iter()
                .take(5)
                .map(|c| (c.name.clone(), c.value))
                .collect(),
            yoy_growth: None,
        }
    }

    pub fn with_yoy(mut self, growth: f64) -> Self {
        self.yoy_growth = Some(growth);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn sample_tree() -> AggregateNode {
        AggregateNode {
            name: "Total".to_string(),
            dimension: "All Data".to_string(),
            value: 500.0,
            color: ColorBand::High,
            count: 5,
            children: vec![
                leaf("Manhattan", 200.0, 2),
                leaf("Brooklyn", 200.0, 2),
                leaf("Bronx", 100.0, 1),
            ],
        }
    }

    #[test]
    fn test_flatten_order_and_labels() {
        let items = flatten_tree(&sample_tree());
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].label, "All Data: Total");
        assert_eq!(items[0].path, "Total");
        assert_eq!(items[0].depth, 0);
        assert_eq!(items[1].label, "Division: Manhattan");
        assert_eq!(items[1].path, "Total > Manhattan");
        assert_eq!(items[1].depth, 1);
    }

    #[test]
    fn test_flatten_index_paths_resolve() {
        let tree = sample_tree();
        let items = flatten_tree(&tree);
        for item in &items {
            let node = tree.descendant(&item.index_path).unwrap();
            assert!(item.label.ends_with(&node.name));
        }
    }

    #[test]
    fn test_summary_truncates_to_five_children() {
        let mut root = sample_tree();
        root.children = (0..8).map(|i| leaf(&format!("D{}", i), i as f64, 1)).collect();

        let summary = NodeSummary::from_node(&root);
        assert_eq!(summary.child_count, 8);
        assert_eq!(summary.top_children.len(), 5);
        assert!(summary.has_children);
        assert_eq!(summary.yoy_growth, None);

        let with_yoy = summary.with_yoy(12.5);
        assert_eq!(with_yoy.yoy_growth, Some(12.5));
    }

    #[test]
    fn test_color_band_serialization() {
        assert_eq!(
            serde_json::to_string(&ColorBand::MediumHigh).unwrap(),
            "\"medium-high\""
        );
        assert_eq!(ColorBand::High.hex(), "#1B5E3F");
        assert_eq!(ColorBand::Low.hex(), "#DC2626");
    }

    #[test]
    fn test_tree_serde_round_trip() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let back: AggregateNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_depth() {
        let mut tree = sample_tree();
        assert_eq!(tree.depth(), 1);
        tree.children[0].children.push(leaf("B1", 50.0, 1));
        assert_eq!(tree.depth(), 2);
    }
}
