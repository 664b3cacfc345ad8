//! Tabular dataset - interned columnar storage.
//!
//! The dataset is designed for:
//! - Fast build from source rows (O(n) where n = rows)
//! - Cheap repeated grouping when the drill path changes (no re-scan)
//! - Memory-efficient storage via value interning
//!
//! Architecture:
//! - Each unique value is stored once per column and referenced by index
//! - Row data is stored as vectors of indices into the unique value stores
//! - Upstream filters (scenario/time selection) are a bitmap over rows

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::DataShapeError;

// ============================================================================
// VALUE INTERNING
// ============================================================================

/// A reference to an interned value within a column's unique value store.
/// Using u32 to save memory (supports up to 4B unique values per column).
pub type ValueId = u32;

/// Represents a null or missing value in the dataset.
pub const VALUE_ID_EMPTY: ValueId = u32::MAX;

/// Display label used for missing dimension values. Missing values form
/// their own aggregation group so the row-count partition invariant holds.
pub const UNSPECIFIED_LABEL: &str = "(unspecified)";

/// A normalized, hashable representation of a cell value.
/// Used as keys in the unique value store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataValue {
    Empty,
    Number(OrderedFloat),
    Text(String),
}

impl DataValue {
    pub fn number(value: f64) -> Self {
        DataValue::Number(OrderedFloat(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        DataValue::Text(value.into())
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Number(n) => Some(n.0),
            _ => None,
        }
    }
}

/// Wrapper around f64 that implements Eq and Hash for use as HashMap keys.
/// NaN values are treated as equal to each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            // All NaN values hash to the same thing
            u64::MAX.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

impl OrderedFloat {
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

// ============================================================================
// COLUMN CACHE
// ============================================================================

/// Storage for a single named column. Unique values are interned and
/// looked up by ValueId in O(1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnCache {
    /// Column name as it appears in the source table.
    pub name: String,

    /// Map from value to its unique ID (for deduplication during build).
    value_to_id: FxHashMap<DataValue, ValueId>,

    /// Ordered list of unique values (indexed by ValueId).
    id_to_value: Vec<DataValue>,
}

impl ColumnCache {
    pub fn new(name: String) -> Self {
        ColumnCache {
            name,
            value_to_id: FxHashMap::default(),
            id_to_value: Vec::new(),
        }
    }

    /// Interns a value and returns its ValueId.
    /// If the value already exists, returns the existing ID.
    pub fn intern(&mut self, value: DataValue) -> ValueId {
        if let DataValue::Empty = value {
            return VALUE_ID_EMPTY;
        }

        if let Some(&id) = self.value_to_id.get(&value) {
            return id;
        }

        let id = self.id_to_value.len() as ValueId;
        self.id_to_value.push(value.clone());
        self.value_to_id.insert(value, id);
        id
    }

    /// Gets the value for a given ID.
    pub fn get_value(&self, id: ValueId) -> Option<&DataValue> {
        if id == VALUE_ID_EMPTY {
            return Some(&DataValue::Empty);
        }
        self.id_to_value.get(id as usize)
    }

    /// Looks up the ValueId of an already-interned value, if present.
    pub fn find(&self, value: &DataValue) -> Option<ValueId> {
        if let DataValue::Empty = value {
            return Some(VALUE_ID_EMPTY);
        }
        self.value_to_id.get(value).copied()
    }

    /// Returns the number of unique values (excluding empty).
    pub fn unique_count(&self) -> usize {
        self.id_to_value.len()
    }

    /// Display label for a value.
    pub fn label(&self, id: ValueId) -> String {
        match self.get_value(id) {
            Some(DataValue::Empty) | None => UNSPECIFIED_LABEL.to_string(),
            Some(DataValue::Text(s)) => s.clone(),
            Some(DataValue::Number(n)) => format!("{}", n.as_f64()),
        }
    }
}

// ============================================================================
// ROW RECORD
// ============================================================================

/// A single row from the source data, stored as interned value IDs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowRecord {
    /// ValueIds for each column, in column order.
    pub values: SmallVec<[ValueId; 8]>,
}

// ============================================================================
// DATASET
// ============================================================================

/// A rectangular dataset: named columns, interned rows, and a filter
/// bitmap for upstream scenario/time-period selection. All rows share the
/// same column set by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<ColumnCache>,
    records: Vec<RowRecord>,

    /// Bitmap of which records pass the current filters.
    /// Length = records.len(), true = included.
    filter_mask: Vec<bool>,
}

impl Dataset {
    /// Creates an empty dataset with the given column names.
    pub fn new<S: AsRef<str>>(column_names: &[S]) -> Result<Self, DataShapeError> {
        if column_names.is_empty() {
            return Err(DataShapeError::NoColumns);
        }

        let mut seen: FxHashMap<&str, ()> = FxHashMap::default();
        for name in column_names {
            if seen.insert(name.as_ref(), ()).is_some() {
                return Err(DataShapeError::DuplicateColumn {
                    name: name.as_ref().to_string(),
                });
            }
        }

        Ok(Dataset {
            columns: column_names
                .iter()
                .map(|n| ColumnCache::new(n.as_ref().to_string()))
                .collect(),
            records: Vec::new(),
            filter_mask: Vec::new(),
        })
    }

    /// Reserves capacity for expected row count.
    pub fn reserve(&mut self, row_count: usize) {
        self.records.reserve(row_count);
        self.filter_mask.reserve(row_count);
    }

    /// Adds a row. Values are interned in column order; short rows are
    /// padded with empty values, extra values are ignored.
    pub fn push_row(&mut self, values: &[DataValue]) {
        let mut interned: SmallVec<[ValueId; 8]> = SmallVec::with_capacity(self.columns.len());

        for (i, value) in values.iter().enumerate() {
            if i < self.columns.len() {
                interned.push(self.columns[i].intern(value.clone()));
            }
        }
        while interned.len() < self.columns.len() {
            interned.push(VALUE_ID_EMPTY);
        }

        self.records.push(RowRecord { values: interned });
        self.filter_mask.push(true);
    }

    /// Resolves a column name to its index, failing fast on unknown names.
    pub fn column_index(&self, name: &str) -> Result<usize, DataShapeError> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| DataShapeError::MissingColumn {
                name: name.to_string(),
            })
    }

    pub fn column_name(&self, index: usize) -> &str {
        &self.columns[index].name
    }

    pub fn column(&self, index: usize) -> &ColumnCache {
        &self.columns[index]
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Total row count, ignoring filters.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row count after upstream filters.
    pub fn filtered_len(&self) -> usize {
        self.filter_mask.iter().filter(|&&m| m).count()
    }

    /// The interned value of a cell.
    pub fn value_id(&self, row: usize, column: usize) -> ValueId {
        self.records[row]
            .values
            .get(column)
            .copied()
            .unwrap_or(VALUE_ID_EMPTY)
    }

    /// Numeric view of a cell, if the stored value is a number.
    pub fn numeric(&self, row: usize, column: usize) -> Option<f64> {
        let id = self.value_id(row, column);
        self.columns[column]
            .get_value(id)
            .and_then(|v| v.as_f64())
    }

    /// Display label of a cell; missing values render as "(unspecified)".
    pub fn label(&self, row: usize, column: usize) -> String {
        self.columns[column].label(self.value_id(row, column))
    }

    /// Applies upstream filters: for each (column, allowed values) entry,
    /// rows whose value is not in the allowed list are masked out. Replaces
    /// any previously applied filters.
    pub fn apply_filters(&mut self, allowed: &[(usize, Vec<ValueId>)]) {
        for mask in self.filter_mask.iter_mut() {
            *mask = true;
        }

        for (column, allowed_ids) in allowed {
            if *column >= self.columns.len() {
                continue;
            }
            for (i, record) in self.records.iter().enumerate() {
                if !self.filter_mask[i] {
                    continue;
                }
                let id = record.values.get(*column).copied().unwrap_or(VALUE_ID_EMPTY);
                if !allowed_ids.contains(&id) {
                    self.filter_mask[i] = false;
                }
            }
        }
    }

    /// Clears all upstream filters.
    pub fn clear_filters(&mut self) {
        for mask in self.filter_mask.iter_mut() {
            *mask = true;
        }
    }

    /// Iterator over the indices of rows passing the current filters.
    pub fn filtered_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.filter_mask
            .iter()
            .enumerate()
            .filter_map(|(i, &included)| if included { Some(i) } else { None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_column_dataset() -> Dataset {
        let mut ds = Dataset::new(&["Region", "Sales"]).unwrap();
        ds.push_row(&[DataValue::text("North"), DataValue::number(100.0)]);
        ds.push_row(&[DataValue::text("North"), DataValue::number(150.0)]);
        ds.push_row(&[DataValue::text("South"), DataValue::number(200.0)]);
        ds
    }

    #[test]
    fn test_interning_deduplicates_values() {
        let ds = two_column_dataset();
        assert_eq!(ds.column(0).unique_count(), 2);
        assert_eq!(ds.value_id(0, 0), ds.value_id(1, 0));
        assert_ne!(ds.value_id(0, 0), ds.value_id(2, 0));
    }

    #[test]
    fn test_missing_column_fails_fast() {
        let ds = two_column_dataset();
        let err = ds.column_index("Profit").unwrap_err();
        assert_eq!(
            err,
            DataShapeError::MissingColumn {
                name: "Profit".to_string()
            }
        );
    }

    #[test]
    fn test_no_columns_rejected() {
        let names: [&str; 0] = [];
        assert_eq!(Dataset::new(&names).unwrap_err(), DataShapeError::NoColumns);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Dataset::new(&["A", "A"]).unwrap_err();
        assert_eq!(
            err,
            DataShapeError::DuplicateColumn {
                name: "A".to_string()
            }
        );
    }

    #[test]
    fn test_empty_value_labeled_unspecified() {
        let mut ds = Dataset::new(&["Region"]).unwrap();
        ds.push_row(&[DataValue::Empty]);
        assert_eq!(ds.value_id(0, 0), VALUE_ID_EMPTY);
        assert_eq!(ds.label(0, 0), UNSPECIFIED_LABEL);
    }

    #[test]
    fn test_short_rows_padded() {
        let mut ds = Dataset::new(&["A", "B"]).unwrap();
        ds.push_row(&[DataValue::text("x")]);
        assert_eq!(ds.value_id(0, 1), VALUE_ID_EMPTY);
    }

    #[test]
    fn test_numeric_lookup() {
        let ds = two_column_dataset();
        assert_eq!(ds.numeric(0, 1), Some(100.0));
        assert_eq!(ds.numeric(0, 0), None);
    }

    #[test]
    fn test_apply_and_clear_filters() {
        let mut ds = two_column_dataset();
        let north = ds.column(0).find(&DataValue::text("North")).unwrap();

        ds.apply_filters(&[(0, vec![north])]);
        assert_eq!(ds.filtered_len(), 2);
        assert_eq!(ds.filtered_rows().collect::<Vec<_>>(), vec![0, 1]);

        ds.clear_filters();
        assert_eq!(ds.filtered_len(), 3);
    }

    #[test]
    fn test_nan_values_intern_to_same_id() {
        let mut ds = Dataset::new(&["X"]).unwrap();
        ds.push_row(&[DataValue::number(f64::NAN)]);
        ds.push_row(&[DataValue::number(f64::NAN)]);
        assert_eq!(ds.column(0).unique_count(), 1);
    }
}
