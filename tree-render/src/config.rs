//! Layout configuration - geometry knobs for the tree renderer.

use serde::{Deserialize, Serialize};

/// Whitespace around the tree content, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Margin {
            top: 50.0,
            right: 200.0,
            bottom: 50.0,
            left: 80.0,
        }
    }
}

/// Geometry of the rendered tree. All values are in canvas units; the
/// defaults match the large-node card style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Width of a node card.
    pub node_width: f64,

    /// Height of a node card.
    pub node_height: f64,

    /// Horizontal distance between the left edges of adjacent depths.
    pub level_gap: f64,

    /// Vertical gap between stacked nodes.
    pub sibling_gap: f64,

    /// Width of the in-card value bar track.
    pub bar_width: f64,

    /// Height of the in-card value bar.
    pub bar_height: f64,

    /// Smallest rendered bar fill, so the minimum sibling stays visible.
    pub min_bar_width: f64,

    pub margin: Margin,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            node_width: 220.0,
            node_height: 88.0,
            level_gap: 280.0,
            sibling_gap: 16.0,
            bar_width: 120.0,
            bar_height: 8.0,
            min_bar_width: 6.0,
            margin: Margin::default(),
        }
    }
}

impl LayoutConfig {
    /// Vertical space one stacked node occupies (card plus gap).
    pub fn row_pitch(&self) -> f64 {
        self.node_height + self.sibling_gap
    }
}
