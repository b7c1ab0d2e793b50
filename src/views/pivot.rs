use std::{cmp::Ordering, collections::HashMap, hash::Hash, sync::Arc};

use chrono::{NaiveDate, Weekday};
use serde::{ser::SerializeStruct, Serialize, Serializer};

use crate::{
    storage::entities::LogEntry,
    utils::time::{format_date, weekday_name, YearMonth},
};

/// Anything entries can be grouped by when building a [PivotTable].
pub trait RowKey: Clone + Eq + Hash {
    fn key_name(&self) -> String;
}

impl RowKey for NaiveDate {
    fn key_name(&self) -> String {
        format_date(*self)
    }
}

impl RowKey for Weekday {
    fn key_name(&self) -> String {
        weekday_name(*self).to_string()
    }
}

impl RowKey for YearMonth {
    fn key_name(&self) -> String {
        self.to_string()
    }
}

/// Dense `row key × label` table of entry counts. Every label seen in the source entries has a
/// column, every row has a cell for every column, and absent combinations hold 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotTable<K> {
    rows: Vec<K>,
    columns: Vec<Arc<str>>,
    cells: Vec<Vec<u64>>,
}

impl<K: RowKey> PivotTable<K> {
    /// Groups entries by `key` and label. Rows come in the order keys were first seen, columns
    /// are sorted.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = &'a LogEntry>,
        key: impl Fn(&LogEntry) -> K,
    ) -> Self {
        let mut row_positions = HashMap::<K, usize>::new();
        let mut rows = Vec::new();
        let mut pairs = Vec::new();
        for entry in entries {
            let row_key = key(entry);
            let row = *row_positions.entry(row_key.clone()).or_insert_with(|| {
                rows.push(row_key);
                rows.len() - 1
            });
            pairs.push((row, entry.label.clone()));
        }

        let mut columns = pairs.iter().map(|v| v.1.clone()).collect::<Vec<_>>();
        columns.sort();
        columns.dedup();

        let mut cells = vec![vec![0u64; columns.len()]; rows.len()];
        for (row, label) in pairs {
            if let Ok(column) = columns.binary_search(&label) {
                cells[row][column] += 1;
            }
        }

        Self {
            rows,
            columns,
            cells,
        }
    }

    /// Reorders rows, keeping each row's cells attached to it.
    pub fn sorted_by(self, mut compare: impl FnMut(&K, &K) -> Ordering) -> Self {
        let mut rows = self.rows.into_iter().zip(self.cells).collect::<Vec<_>>();
        rows.sort_by(|a, b| compare(&a.0, &b.0));
        let (rows, cells) = rows.into_iter().unzip();
        Self {
            rows,
            columns: self.columns,
            cells,
        }
    }

    pub fn rows(&self) -> &[K] {
        &self.rows
    }

    pub fn columns(&self) -> &[Arc<str>] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[u64])> {
        self.rows.iter().zip(self.cells.iter().map(Vec::as_slice))
    }

    pub fn get(&self, row: &K, label: &str) -> Option<u64> {
        let row = self.rows.iter().position(|v| v == row)?;
        let column = self.columns.iter().position(|v| &**v == label)?;
        Some(self.cells[row][column])
    }

    pub fn max_cell(&self) -> u64 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }
}

impl<K: RowKey> Serialize for PivotTable<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Row<'a> {
            key: String,
            counts: &'a [u64],
        }

        let rows = self
            .iter()
            .map(|(key, counts)| Row {
                key: key.key_name(),
                counts,
            })
            .collect::<Vec<_>>();

        let mut state = serializer.serialize_struct("PivotTable", 2)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}
