//! [`IdMap`] — the old-id → new-id association produced by cloning a table.

use std::collections::HashMap;

use crate::{Error, Result, table::Table};

/// Maps row ids of one table in the source context to the ids of their
/// copies in the destination context.
///
/// Built incrementally as rows are inserted; lookups are by key only.
#[derive(Debug, Clone)]
pub struct IdMap {
  table:   Table,
  entries: HashMap<i64, i64>,
}

impl IdMap {
  pub fn new(table: Table) -> Self {
    Self { table, entries: HashMap::new() }
  }

  /// The table whose ids this map translates.
  pub fn table(&self) -> Table { self.table }

  pub fn insert(&mut self, old_id: i64, new_id: i64) {
    self.entries.insert(old_id, new_id);
  }

  pub fn get(&self, old_id: i64) -> Option<i64> {
    self.entries.get(&old_id).copied()
  }

  /// Translate a foreign key held in `column` of row `row_id` of `table`.
  ///
  /// Fails with [`Error::DanglingReference`] when `old_id` was not cloned.
  pub fn remap(
    &self,
    old_id: i64,
    table: Table,
    column: &'static str,
    row_id: i64,
  ) -> Result<i64> {
    self.get(old_id).ok_or(Error::DanglingReference {
      table,
      column,
      row_id,
      target: self.table,
      target_id: old_id,
    })
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Iterate over `(old_id, new_id)` pairs in no particular order.
  pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
    self.entries.iter().map(|(&old, &new)| (old, new))
  }
}
