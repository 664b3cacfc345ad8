//! Hierarchy definition - the serializable configuration.
//!
//! These structures DESCRIBE a decomposition hierarchy: which dimensions
//! to drill through, in what order, and which metric to aggregate at each
//! node. They are immutable snapshots of user intent; the engine consumes
//! them without modifying them.

use serde::{Deserialize, Serialize};

// ============================================================================
// METRICS
// ============================================================================

/// The closed set of aggregation kinds computed per tree node.
///
/// Every variant is total: zero rows, zero weight sums, and zero
/// denominators all resolve to the metric's zero element rather than
/// NaN/Inf or an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricKind {
    /// Total of a numeric column over the matched rows.
    Sum { column: String },

    /// Arithmetic mean of a column over the matched rows; 0 rows -> 0.
    Mean { column: String },

    /// sum(value * weight) / sum(weight); zero weight sum -> 0.
    WeightedAverage { value: String, weight: String },

    /// Period-over-period growth: (sum(current) - sum(prior)) / sum(prior)
    /// * 100; zero prior sum -> 0.
    Growth { current: String, prior: String },
}

impl MetricKind {
    /// The defined result over an empty row subset.
    pub fn zero(&self) -> f64 {
        0.0
    }

    /// Ratio-like metrics (percentage changes) use absolute color
    /// thresholds instead of sibling-normalized scoring, because sign and
    /// a fixed business threshold carry meaning regardless of what other
    /// siblings did.
    pub fn is_ratio_like(&self) -> bool {
        matches!(self, MetricKind::Growth { .. })
    }

    /// Columns this metric reads. Used for fail-fast shape validation.
    pub fn required_columns(&self) -> Vec<&str> {
        match self {
            MetricKind::Sum { column } | MetricKind::Mean { column } => vec![column],
            MetricKind::WeightedAverage { value, weight } => vec![value, weight],
            MetricKind::Growth { current, prior } => vec![current, prior],
        }
    }
}

// ============================================================================
// MAIN DEFINITION STRUCT
// ============================================================================

/// The complete, serializable definition of a decomposition hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyDefinition {
    /// Ordered drill path: the tree has one level per dimension, outer to
    /// inner. May be empty (root only).
    pub dimensions: Vec<String>,

    /// The metric aggregated at every node.
    pub metric: MetricKind,

    /// Display name of the root node.
    #[serde(default = "default_root_name")]
    pub root_name: String,

    /// Sentinel dimension label for the root node.
    #[serde(default = "default_root_dimension")]
    pub root_dimension: String,
}

fn default_root_name() -> String {
    "Total".to_string()
}

fn default_root_dimension() -> String {
    "All Data".to_string()
}

impl HierarchyDefinition {
    pub fn new<S: Into<String>>(dimensions: Vec<S>, metric: MetricKind) -> Self {
        HierarchyDefinition {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            metric,
            root_name: default_root_name(),
            root_dimension: default_root_dimension(),
        }
    }

    /// Overrides the root node's display labels.
    pub fn with_root_label(
        mut self,
        name: impl Into<String>,
        dimension: impl Into<String>,
    ) -> Self {
        self.root_name = name.into();
        self.root_dimension = dimension.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_columns() {
        let m = MetricKind::WeightedAverage {
            value: "OTP".to_string(),
            weight: "Trips".to_string(),
        };
        assert_eq!(m.required_columns(), vec!["OTP", "Trips"]);

        let g = MetricKind::Growth {
            current: "NCC".to_string(),
            prior: "NCC_PY".to_string(),
        };
        assert!(g.is_ratio_like());
        assert!(!m.is_ratio_like());
    }

    #[test]
    fn test_definition_serde_round_trip() {
        let def = HierarchyDefinition::new(
            vec!["Region", "System"],
            MetricKind::Sum {
                column: "NCC".to_string(),
            },
        );
        let json = serde_json::to_string(&def).unwrap();
        let back: HierarchyDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
        assert_eq!(back.root_name, "Total");
        assert_eq!(back.root_dimension, "All Data");
    }
}
