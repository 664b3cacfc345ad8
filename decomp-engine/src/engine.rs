//! Hierarchy engine - recursive groupby aggregation.
//!
//! `build_hierarchy` takes a dataset and a hierarchy definition and
//! produces the aggregate tree:
//! 1. Resolve metric and dimension columns (fail fast on missing columns)
//! 2. Recursively partition the row subset by the next dimension
//! 3. Compute the metric over exactly each group's rows
//! 4. Band colors against the sibling set's value range
//! 5. Sort each child list by value descending (a pure postcondition)
//!
//! The function is total over well-shaped input: empty datasets, empty
//! dimension lists, zero weights, and zero denominators all produce
//! defined values, never errors.

use log::debug;
use rustc_hash::FxHashMap;

use crate::dataset::{Dataset, ValueId};
use crate::definition::{HierarchyDefinition, MetricKind};
use crate::error::DataShapeError;
use crate::tree::{AggregateNode, ColorBand};

// ============================================================================
// RESOLVED METRIC
// ============================================================================

/// A metric with its column names resolved to indices. Resolution happens
/// once up front so the recursion never touches column names.
#[derive(Debug, Clone, Copy)]
enum ResolvedMetric {
    Sum(usize),
    Mean(usize),
    WeightedAverage { value: usize, weight: usize },
    Growth { current: usize, prior: usize },
}

impl ResolvedMetric {
    fn resolve(dataset: &Dataset, metric: &MetricKind) -> Result<Self, DataShapeError> {
        Ok(match metric {
            MetricKind::Sum { column } => ResolvedMetric::Sum(dataset.column_index(column)?),
            MetricKind::Mean { column } => ResolvedMetric::Mean(dataset.column_index(column)?),
            MetricKind::WeightedAverage { value, weight } => ResolvedMetric::WeightedAverage {
                value: dataset.column_index(value)?,
                weight: dataset.column_index(weight)?,
            },
            MetricKind::Growth { current, prior } => ResolvedMetric::Growth {
                current: dataset.column_index(current)?,
                prior: dataset.column_index(prior)?,
            },
        })
    }

    fn is_ratio_like(&self) -> bool {
        matches!(self, ResolvedMetric::Growth { .. })
    }

    /// Computes the metric over a row subset. Non-numeric and missing
    /// cells are skipped, matching column-sum semantics.
    fn compute(&self, dataset: &Dataset, rows: &[usize]) -> f64 {
        if rows.is_empty() {
            return 0.0;
        }

        match *self {
            ResolvedMetric::Sum(column) => {
                let total: f64 = rows.iter().filter_map(|&r| dataset.numeric(r, column)).sum();
                round2(total)
            }
            ResolvedMetric::Mean(column) => {
                let mut sum = 0.0;
                let mut count = 0usize;
                for &r in rows {
                    if let Some(v) = dataset.numeric(r, column) {
                        sum += v;
                        count += 1;
                    }
                }
                if count == 0 {
                    0.0
                } else {
                    round2(sum / count as f64)
                }
            }
            ResolvedMetric::WeightedAverage { value, weight } => {
                let mut weighted_sum = 0.0;
                let mut weight_sum = 0.0;
                for &r in rows {
                    let w = dataset.numeric(r, weight);
                    if let Some(w) = w {
                        weight_sum += w;
                    }
                    if let (Some(v), Some(w)) = (dataset.numeric(r, value), w) {
                        weighted_sum += v * w;
                    }
                }
                if weight_sum == 0.0 {
                    0.0
                } else {
                    round2(weighted_sum / weight_sum)
                }
            }
            ResolvedMetric::Growth { current, prior } => {
                let a: f64 = rows.iter().filter_map(|&r| dataset.numeric(r, current)).sum();
                let b: f64 = rows.iter().filter_map(|&r| dataset.numeric(r, prior)).sum();
                if b == 0.0 {
                    0.0
                } else {
                    round1((a - b) / b * 100.0)
                }
            }
        }
    }
}

// ============================================================================
// COLOR SCALE
// ============================================================================

/// Assigns a severity band from a value's position within its sibling
/// set's [min, max] range.
///
/// Magnitude metrics normalize to [0,1] (max == min -> 0.5) and band at
/// 0.7 / 0.5 / 0.3, boundaries inclusive. Ratio-like metrics band on the
/// raw value at the fixed business thresholds 10 / 0 / -10 instead, since
/// a percentage change carries meaning independent of its siblings.
pub fn color_band(value: f64, min: f64, max: f64, ratio_like: bool) -> ColorBand {
    if ratio_like {
        return if value >= 10.0 {
            ColorBand::High
        } else if value >= 0.0 {
            ColorBand::MediumHigh
        } else if value >= -10.0 {
            ColorBand::MediumLow
        } else {
            ColorBand::Low
        };
    }

    let normalized = if max == min {
        0.5
    } else {
        (value - min) / (max - min)
    };

    if normalized >= 0.7 {
        ColorBand::High
    } else if normalized >= 0.5 {
        ColorBand::MediumHigh
    } else if normalized >= 0.3 {
        ColorBand::MediumLow
    } else {
        ColorBand::Low
    }
}

// ============================================================================
// HIERARCHY CONSTRUCTION
// ============================================================================

/// Builds the aggregate tree for a dataset and definition.
///
/// Fails fast if the metric or a dimension references a column the
/// dataset does not have; every other input shape (zero rows, empty
/// dimension list) produces a valid tree. Rows masked out by upstream
/// filters are excluded everywhere, including the root count.
pub fn build_hierarchy(
    dataset: &Dataset,
    definition: &HierarchyDefinition,
) -> Result<AggregateNode, DataShapeError> {
    let metric = ResolvedMetric::resolve(dataset, &definition.metric)?;
    let dimensions: Vec<usize> = definition
        .dimensions
        .iter()
        .map(|d| dataset.column_index(d))
        .collect::<Result<_, _>>()?;

    let rows: Vec<usize> = dataset.filtered_rows().collect();
    debug!(
        "building hierarchy: {} rows, {} dimensions",
        rows.len(),
        dimensions.len()
    );

    let value = metric.compute(dataset, &rows);
    Ok(AggregateNode {
        name: definition.root_name.clone(),
        dimension: definition.root_dimension.clone(),
        value,
        color: ColorBand::High,
        count: rows.len(),
        children: build_level(dataset, metric, &rows, &dimensions),
    })
}

/// Recursively builds one level: partition `rows` by the next dimension,
/// aggregate each group, recurse into the remaining dimensions, and sort
/// the result by value descending.
fn build_level(
    dataset: &Dataset,
    metric: ResolvedMetric,
    rows: &[usize],
    dims_remaining: &[usize],
) -> Vec<AggregateNode> {
    if dims_remaining.is_empty() || rows.is_empty() {
        return Vec::new();
    }

    let dimension = dims_remaining[0];
    let next_dims = &dims_remaining[1..];

    // Partition by interned value, first-appearance order. Missing values
    // (VALUE_ID_EMPTY) form their own group so no row is dropped.
    let mut order: Vec<ValueId> = Vec::new();
    let mut groups: FxHashMap<ValueId, Vec<usize>> = FxHashMap::default();
    for &row in rows {
        let id = dataset.value_id(row, dimension);
        groups
            .entry(id)
            .or_insert_with(|| {
                order.push(id);
                Vec::new()
            })
            .push(row);
    }

    let values: Vec<f64> = order
        .iter()
        .map(|id| metric.compute(dataset, &groups[id]))
        .collect();
    let min_val = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max_val = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let dimension_name = dataset.column_name(dimension).to_string();
    let mut children: Vec<AggregateNode> = order
        .iter()
        .zip(values)
        .map(|(&id, value)| {
            let group_rows = &groups[&id];
            AggregateNode {
                name: dataset.column(dimension).label(id),
                dimension: dimension_name.clone(),
                value,
                color: color_band(value, min_val, max_val, metric.is_ratio_like()),
                count: group_rows.len(),
                children: build_level(dataset, metric, group_rows, next_dims),
            }
        })
        .collect();

    // Stable sort: ties keep first-appearance order, which keeps the
    // output deterministic for equal values.
    children.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    children
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
