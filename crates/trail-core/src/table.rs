//! The audit tables and per-table row counts.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// One of the four context-scoped audit tables.
///
/// Variants are declared in dependency order: every table only references
/// tables declared before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
  Host,
  DataSource,
  Message,
  Audit,
}

impl Table {
  /// All tables, parents before children.
  pub const ALL: [Table; 4] =
    [Table::Host, Table::DataSource, Table::Message, Table::Audit];

  /// The SQL table name.
  pub fn as_str(self) -> &'static str {
    match self {
      Table::Host => "host",
      Table::DataSource => "data_source",
      Table::Message => "message",
      Table::Audit => "audit",
    }
  }
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Table {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Table::ALL
      .into_iter()
      .find(|t| t.as_str() == s)
      .ok_or_else(|| Error::UnknownTable(s.to_owned()))
  }
}

// ─── Counts ──────────────────────────────────────────────────────────────────

/// Row counts for one context, one field per table.
///
/// Returned both by counting queries and by a clone, where it holds the
/// number of rows inserted under the new context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
  pub hosts:        usize,
  pub data_sources: usize,
  pub messages:     usize,
  pub audits:       usize,
}

impl TableCounts {
  pub fn get(&self, table: Table) -> usize {
    match table {
      Table::Host => self.hosts,
      Table::DataSource => self.data_sources,
      Table::Message => self.messages,
      Table::Audit => self.audits,
    }
  }

  pub fn set(&mut self, table: Table, count: usize) {
    match table {
      Table::Host => self.hosts = count,
      Table::DataSource => self.data_sources = count,
      Table::Message => self.messages = count,
      Table::Audit => self.audits = count,
    }
  }

  pub fn total(&self) -> usize {
    self.hosts + self.data_sources + self.messages + self.audits
  }

  pub fn is_empty(&self) -> bool { self.total() == 0 }
}
