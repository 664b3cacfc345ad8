//! Table provider seam.
//!
//! The engine never loads data itself; hosts hand it datasets through
//! this trait. `MemorySource` is the in-process implementation used by
//! tests and embedded hosts.

use log::debug;
use rustc_hash::FxHashMap;

use crate::dataset::Dataset;
use crate::error::SourceError;

/// Provides named tabular datasets to the engine.
///
/// Implementations own connection and caching policy; a failed load maps
/// to [`SourceError::LoadFailed`] with the underlying message.
pub trait TableSource {
    fn load_table(&self, table: &str) -> Result<Dataset, SourceError>;
}

/// A table source backed by pre-built in-memory datasets.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: FxHashMap<String, Dataset>,
}

impl MemorySource {
    pub fn new() -> Self {
        MemorySource::default()
    }

    /// Registers a dataset under a table name, replacing any previous one.
    pub fn insert(&mut self, table: impl Into<String>, dataset: Dataset) {
        self.tables.insert(table.into(), dataset);
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl TableSource for MemorySource {
    fn load_table(&self, table: &str) -> Result<Dataset, SourceError> {
        let dataset = self
            .tables
            .get(table)
            .cloned()
            .ok_or_else(|| SourceError::TableNotFound {
                table: table.to_string(),
            })?;
        debug!("loaded table '{}': {} rows", table, dataset.len());
        Ok(dataset)
    }
}
