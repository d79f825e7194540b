//! Result set - extracted records and their column order

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One extracted record: field name to scalar or nested value
///
/// Key insertion order is preserved.
pub type Record = serde_json::Map<String, Value>;

/// How display/export columns are derived from the records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Keys of the first record, in its key order
    #[default]
    FirstRecord,
    /// Keys of every record, in first-seen order
    Union,
}

/// Ordered collection of extracted records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    records: Vec<Record>,
    policy: ColumnPolicy,
}

impl ResultSet {
    /// Empty result set using [`ColumnPolicy::FirstRecord`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty result set with an explicit column policy
    pub fn with_policy(policy: ColumnPolicy) -> Self {
        Self {
            records: Vec::new(),
            policy,
        }
    }

    /// Atomically replace every record; results never merge across calls
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records in service order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when there is nothing to show or export
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Active column policy
    pub fn policy(&self) -> ColumnPolicy {
        self.policy
    }

    /// Column order for display and export; empty when there are no records
    pub fn columns(&self) -> Vec<String> {
        match self.policy {
            ColumnPolicy::FirstRecord => self
                .records
                .first()
                .map(|record| record.keys().cloned().collect())
                .unwrap_or_default(),
            ColumnPolicy::Union => {
                let mut columns: Vec<String> = Vec::new();
                for key in self.records.iter().flat_map(|record| record.keys()) {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
                columns
            }
        }
    }

    /// Records whose key set differs from the first record's
    ///
    /// Useful to warn before a first-record export silently drops data.
    pub fn heterogeneous_rows(&self) -> Vec<usize> {
        let Some(first) = self.records.first() else {
            return Vec::new();
        };
        self.records
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, record)| {
                record.len() != first.len() || record.keys().any(|k| !first.contains_key(k))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Each record projected onto [`ResultSet::columns`]; missing keys are `None`
    pub fn rows(&self) -> Vec<Vec<Option<&Value>>> {
        let columns = self.columns();
        self.records
            .iter()
            .map(|record| columns.iter().map(|c| record.get(c)).collect())
            .collect()
    }
}
