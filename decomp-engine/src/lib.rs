//! Decomposition hierarchy engine.
//!
//! This crate builds the aggregate tree behind a decomposition-tree
//! dashboard: it takes a tabular dataset, an ordered list of grouping
//! dimensions, and a metric, and produces a rooted tree of aggregate
//! nodes ready for rendering. It performs no I/O and has no UI concerns.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the hierarchy IS)
//! - `dataset`: Interned columnar storage (HOW we store)
//! - `engine`: Recursive groupby aggregation (HOW we calculate)
//! - `tree`: The aggregate tree handed to renderers (WHAT we display)
//! - `source`: The table-provider collaborator seam

pub mod dataset;
pub mod definition;
pub mod engine;
pub mod error;
pub mod source;
pub mod tree;

pub use dataset::{DataValue, Dataset, OrderedFloat, ValueId, VALUE_ID_EMPTY};
pub use definition::{HierarchyDefinition, MetricKind};
pub use engine::{build_hierarchy, color_band};
pub use error::{DataShapeError, SourceError};
pub use source::{MemorySource, TableSource};
pub use tree::{flatten_tree, AggregateNode, ColorBand, FlatTreeItem, NodeSummary};
