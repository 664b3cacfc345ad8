//! Scene graph - the renderable output of the tree renderer.
//!
//! The scene is a flat, ordered list of typed primitives in absolute
//! canvas coordinates. Hosts map it 1:1 onto their drawing surface (SVG,
//! canvas, a test assertion) without re-deriving any geometry; paint order
//! is list order, links before cards.

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::format::ValueFormat;
use crate::layout::{Layout, NodeId, RenderTree};

// ============================================================================
// PALETTE
// ============================================================================

pub const NODE_FILL: &str = "#FFFFFF";
pub const NODE_FILL_SELECTED: &str = "#F0FDF4";
pub const TEXT_PRIMARY: &str = "#1F2937";
pub const TEXT_MUTED: &str = "#9CA3AF";
pub const TEXT_VALUE: &str = "#1B5E3F";
pub const BAR_TRACK: &str = "#F3F4F6";
pub const LINK_STROKE: &str = "#D1D5DB";
pub const GLYPH_BG_COLLAPSED: &str = "#1B5E3F";
pub const GLYPH_BG_EXPANDED: &str = "#F3F4F6";
pub const GLYPH_TEXT_COLLAPSED: &str = "#FFFFFF";
pub const GLYPH_TEXT_EXPANDED: &str = "#6B7280";

/// Names over this length are shortened to a prefix plus an ellipsis.
const NAME_LIMIT: usize = 20;
const NAME_PREFIX: usize = 18;

// ============================================================================
// PRIMITIVES
// ============================================================================

/// What a rectangle primitive represents, for hosts that style by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RectKind {
    /// The node card background.
    NodeBody,
    /// The colored strip on the card's left edge.
    AccentBar,
    /// The value bar track.
    BarTrack,
    /// The value bar fill, scaled against the sibling set.
    BarFill,
    /// The expand/collapse button background.
    GlyphBackground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextKind {
    /// The grouping dimension caption.
    Dimension,
    /// The node name.
    Name,
    /// The formatted metric value.
    Value,
    /// The expand/collapse glyph symbol.
    GlyphSymbol,
}

/// One drawable item. Coordinates are absolute canvas units; fills are
/// CSS hex colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ScenePrimitive {
    Rect {
        node: NodeId,
        kind: RectKind,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: String,
    },
    Text {
        node: NodeId,
        kind: TextKind,
        x: f64,
        y: f64,
        content: String,
        fill: String,
    },
    /// A cubic bezier from a parent card's right edge to a child card's
    /// left edge. Both control points sit at the horizontal midpoint, which
    /// gives the link a horizontal tangent at each end.
    Link {
        source: NodeId,
        target: NodeId,
        x1: f64,
        y1: f64,
        c1x: f64,
        c1y: f64,
        c2x: f64,
        c2y: f64,
        x2: f64,
        y2: f64,
    },
}

/// A complete frame: canvas size plus primitives in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub items: Vec<ScenePrimitive>,
}

// ============================================================================
// SCENE CONSTRUCTION
// ============================================================================

/// Builds the scene for the current layout. Links are emitted first so
/// cards paint over them; within a card, primitives go back to front.
pub fn build_scene(
    tree: &RenderTree,
    layout: &Layout,
    config: &LayoutConfig,
    format: ValueFormat,
    selected: Option<NodeId>,
) -> Scene {
    let mut items = Vec::new();
    let top = config.margin.top;

    for &(source, target) in &layout.links {
        let (s, t) = match (layout.position(source), layout.position(target)) {
            (Some(s), Some(t)) => (s, t),
            _ => continue,
        };
        let x1 = s.x + config.node_width;
        let y1 = top + s.y + config.node_height / 2.0;
        let x2 = t.x;
        let y2 = top + t.y + config.node_height / 2.0;
        let mid = (x1 + x2) / 2.0;
        items.push(ScenePrimitive::Link {
            source,
            target,
            x1,
            y1,
            c1x: mid,
            c1y: y1,
            c2x: mid,
            c2y: y2,
            x2,
            y2,
        });
    }

    for &id in &layout.visible {
        let pos = match layout.position(id) {
            Some(p) => p,
            None => continue,
        };
        let node = tree.node(id);
        let x = pos.x;
        let y = top + pos.y;

        let body_fill = if selected == Some(id) {
            NODE_FILL_SELECTED
        } else {
            NODE_FILL
        };
        items.push(ScenePrimitive::Rect {
            node: id,
            kind: RectKind::NodeBody,
            x,
            y,
            width: config.node_width,
            height: config.node_height,
            fill: body_fill.to_string(),
        });
        items.push(ScenePrimitive::Rect {
            node: id,
            kind: RectKind::AccentBar,
            x,
            y,
            width: 5.0,
            height: config.node_height,
            fill: node.color.hex().to_string(),
        });

        items.push(ScenePrimitive::Text {
            node: id,
            kind: TextKind::Dimension,
            x: x + 16.0,
            y: y + 22.0,
            content: node.dimension.clone(),
            fill: TEXT_MUTED.to_string(),
        });
        items.push(ScenePrimitive::Text {
            node: id,
            kind: TextKind::Name,
            x: x + 16.0,
            y: y + 44.0,
            content: truncate_name(&node.name),
            fill: TEXT_PRIMARY.to_string(),
        });
        items.push(ScenePrimitive::Text {
            node: id,
            kind: TextKind::Value,
            x: x + 16.0,
            y: y + 64.0,
            content: format.format_value(node.value),
            fill: TEXT_VALUE.to_string(),
        });

        items.push(ScenePrimitive::Rect {
            node: id,
            kind: RectKind::BarTrack,
            x: x + 16.0,
            y: y + 74.0,
            width: config.bar_width,
            height: config.bar_height,
            fill: BAR_TRACK.to_string(),
        });
        items.push(ScenePrimitive::Rect {
            node: id,
            kind: RectKind::BarFill,
            x: x + 16.0,
            y: y + 74.0,
            width: bar_fill_width(tree, id, config),
            height: config.bar_height,
            fill: node.color.hex().to_string(),
        });

        if node.has_children() {
            let gx = x + config.node_width - 32.0;
            let gy = y + config.node_height / 2.0 - 12.0;
            let (bg, fg, symbol) = if node.expanded {
                (GLYPH_BG_EXPANDED, GLYPH_TEXT_EXPANDED, "\u{2212}")
            } else {
                (GLYPH_BG_COLLAPSED, GLYPH_TEXT_COLLAPSED, "+")
            };
            items.push(ScenePrimitive::Rect {
                node: id,
                kind: RectKind::GlyphBackground,
                x: gx,
                y: gy,
                width: 24.0,
                height: 24.0,
                fill: bg.to_string(),
            });
            items.push(ScenePrimitive::Text {
                node: id,
                kind: TextKind::GlyphSymbol,
                x: gx + 12.0,
                y: gy + 17.0,
                content: symbol.to_string(),
                fill: fg.to_string(),
            });
        }
    }

    Scene {
        width: layout.canvas_width,
        height: layout.canvas_height,
        items,
    }
}

/// Scales a node's bar fill against its sibling set's absolute-value
/// range. The smallest sibling still gets a sliver; a degenerate range
/// (all siblings equal) falls back to a range of 1 so the math stays
/// finite.
fn bar_fill_width(tree: &RenderTree, id: NodeId, config: &LayoutConfig) -> f64 {
    let (min_abs, max_abs) = tree.sibling_abs_range(id);
    let range = if max_abs - min_abs == 0.0 {
        1.0
    } else {
        max_abs - min_abs
    };
    let scaled = (tree.node(id).value.abs() - min_abs) / range * config.bar_width;
    scaled.max(config.min_bar_width)
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() > NAME_LIMIT {
        let prefix: String = name.chars().take(NAME_PREFIX).collect();
        format!("{}...", prefix)
    } else {
        name.to_string()
    }
}
