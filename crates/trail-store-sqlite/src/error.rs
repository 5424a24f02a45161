//! Error type for `trail-store-sqlite`.

use thiserror::Error;
use trail_core::Table;

#[derive(Debug, Error)]
pub enum Error {
  /// Includes consistency violations found while cloning
  /// ([`trail_core::Error::DanglingReference`]).
  #[error("core error: {0}")]
  Core(#[from] trail_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("{table} row has no column {column:?}")]
  MissingColumn { table: Table, column: String },

  #[error("{table}.{column} is not {expected}")]
  UnexpectedType {
    table:    Table,
    column:   String,
    expected: &'static str,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
