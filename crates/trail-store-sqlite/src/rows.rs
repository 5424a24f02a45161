//! The row source: every row of one table under one context, untyped.
//!
//! Rows are read with `SELECT *` so a clone copies whatever columns the
//! table carries; the duplicators only interpret the key columns.

use std::collections::BTreeMap;

use rusqlite::{Connection, types::Value};
use trail_core::{RawRow, Table};

use crate::{Error, Result, encode::value_to_json};

/// One row of a context-scoped table: column name → stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
  table:  Table,
  fields: BTreeMap<String, Value>,
}

impl Row {
  pub fn table(&self) -> Table { self.table }

  /// The stored value of `column`, verbatim.
  pub fn value(&self, column: &str) -> Result<&Value> {
    self.fields.get(column).ok_or_else(|| Error::MissingColumn {
      table:  self.table,
      column: column.to_owned(),
    })
  }

  /// A non-null integer column: a row id or a required foreign key.
  pub fn id(&self, column: &str) -> Result<i64> {
    match self.value(column)? {
      Value::Integer(id) => Ok(*id),
      _ => Err(self.unexpected(column, "an integer")),
    }
  }

  /// A nullable integer column, i.e. an optional foreign key.
  pub fn opt_id(&self, column: &str) -> Result<Option<i64>> {
    match self.value(column)? {
      Value::Null => Ok(None),
      Value::Integer(id) => Ok(Some(*id)),
      _ => Err(self.unexpected(column, "an integer or NULL")),
    }
  }

  pub fn into_json(self) -> RawRow {
    self
      .fields
      .into_iter()
      .map(|(column, value)| (column, value_to_json(value)))
      .collect()
  }

  fn unexpected(&self, column: &str, expected: &'static str) -> Error {
    Error::UnexpectedType {
      table: self.table,
      column: column.to_owned(),
      expected,
    }
  }
}

/// Stream every row of `table` recorded under `context` into `visit`.
///
/// Rows arrive one at a time in no guaranteed order; none at all is fine.
/// The first error from `visit` stops the scan and is returned.
pub fn for_each_row<F>(
  conn: &Connection,
  table: Table,
  context: &str,
  mut visit: F,
) -> Result<()>
where
  F: FnMut(Row) -> Result<()>,
{
  // `table` comes from a closed enum, never from the caller.
  let sql = format!("SELECT * FROM {table} WHERE context = ?1");
  let mut stmt = conn.prepare(&sql)?;
  let columns: Vec<String> = stmt
    .column_names()
    .into_iter()
    .map(str::to_owned)
    .collect();

  let mut rows = stmt.query(rusqlite::params![context])?;
  while let Some(row) = rows.next()? {
    let mut fields = BTreeMap::new();
    for (idx, column) in columns.iter().enumerate() {
      fields.insert(column.clone(), row.get::<_, Value>(idx)?);
    }
    visit(Row { table, fields })?;
  }

  Ok(())
}

/// Collect every row of `table` under `context`, ordered by id.
pub fn collect_rows(
  conn: &Connection,
  table: Table,
  context: &str,
) -> Result<Vec<Row>> {
  let mut rows = Vec::new();
  for_each_row(conn, table, context, |row| {
    rows.push(row);
    Ok(())
  })?;
  rows.sort_by_key(|row| row.id("id").ok());
  Ok(rows)
}
