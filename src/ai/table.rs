//! Lazily materialized per-state tables for tabular learning.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Maps a state to a fixed-width vector, creating an all-default row the
/// first time a state is touched.
#[derive(Debug, Clone)]
pub struct LazyTable<S, T> {
    width: usize,
    rows: HashMap<S, Vec<T>>,
}

/// Per-action value estimates.
pub type ValueTable<S> = LazyTable<S, f64>;
/// Per-action visit counts.
pub type VisitTable<S> = LazyTable<S, u64>;

/// One row of a table in a serializable form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry<S, T> {
    pub state: S,
    pub row: Vec<T>,
}

impl<S, T> LazyTable<S, T>
where
    S: Clone + Eq + Hash,
    T: Clone + Default,
{
    pub fn new(width: usize) -> Self {
        LazyTable {
            width,
            rows: HashMap::new(),
        }
    }

    /// Number of actions per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get-or-insert the row for `state`.
    pub fn row_mut(&mut self, state: &S) -> &mut Vec<T> {
        let width = self.width;
        self.rows
            .entry(state.clone())
            .or_insert_with(|| vec![T::default(); width])
    }

    /// Read access that materializes the row if needed.
    pub fn row(&mut self, state: &S) -> &[T] {
        self.row_mut(state)
    }

    /// Read access without materializing.
    pub fn peek(&self, state: &S) -> Option<&[T]> {
        self.rows.get(state).map(Vec::as_slice)
    }

    pub fn contains(&self, state: &S) -> bool {
        self.rows.contains_key(state)
    }

    /// Number of materialized states.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_entries(&self) -> Vec<TableEntry<S, T>> {
        self.rows
            .iter()
            .map(|(state, row)| TableEntry {
                state: state.clone(),
                row: row.clone(),
            })
            .collect()
    }

    /// Rebuild a table from entries. Rows of the wrong width are padded or
    /// truncated to `width`.
    pub fn from_entries(width: usize, entries: Vec<TableEntry<S, T>>) -> Self {
        let rows = entries
            .into_iter()
            .map(|TableEntry { state, mut row }| {
                row.resize(width, T::default());
                (state, row)
            })
            .collect();
        LazyTable { width, rows }
    }
}

impl<S> LazyTable<S, f64>
where
    S: Clone + Eq + Hash,
{
    /// Largest value in the row for `state`.
    pub fn max_value(&mut self, state: &S) -> f64 {
        self.row(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}
