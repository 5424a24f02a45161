//! Error types for `trail-core`.

use thiserror::Error;

use crate::table::Table;

#[derive(Debug, Error)]
pub enum Error {
  /// A cloned row refers to a parent row that was not cloned alongside it.
  ///
  /// This means the source context references rows outside itself and is
  /// never skipped or defaulted.
  #[error(
    "{table}.{column} of row {row_id} refers to {target} {target_id}, which \
     is not part of the cloned context"
  )]
  DanglingReference {
    table:     Table,
    column:    &'static str,
    row_id:    i64,
    target:    Table,
    target_id: i64,
  },

  #[error("cannot clone context {0:?} onto itself")]
  SameContext(String),

  #[error("unknown table: {0:?}")]
  UnknownTable(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
