//! The `AuditStore` trait.
//!
//! Implemented by storage backends (e.g. `trail-store-sqlite`). The CLI
//! depends on this abstraction for everything except opening the store.

use std::{collections::BTreeMap, future::Future};

use crate::{
  record::{Audit, DataSource, Host, Message, NewAudit, NewMessage},
  table::{Table, TableCounts},
};

/// A raw row: column name → value, exactly as stored.
pub type RawRow = BTreeMap<String, serde_json::Value>;

/// Abstraction over an audit store backend.
///
/// Rows are only ever inserted. Cloning a context copies every row of the
/// four context-scoped tables into a new context in one transaction.
pub trait AuditStore: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Producers ─────────────────────────────────────────────────────────

  /// Return the host named `hostname` in `context`, creating it if needed.
  fn ensure_host<'a>(
    &'a self,
    context: &'a str,
    hostname: &'a str,
  ) -> impl Future<Output = Result<Host, Self::Error>> + Send + 'a;

  /// Return the data source for `(context, host_id, actor, phase)`,
  /// creating it if needed.
  fn ensure_data_source<'a>(
    &'a self,
    context: &'a str,
    host_id: i64,
    actor: &'a str,
    phase: &'a str,
  ) -> impl Future<Output = Result<DataSource, Self::Error>> + Send + 'a;

  /// Store a message and its payload. The stamp is set by the store.
  fn record_message(
    &self,
    input: NewMessage,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  /// Store an audit entry. The stamp is set by the store.
  fn record_audit(
    &self,
    input: NewAudit,
  ) -> impl Future<Output = Result<Audit, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn hosts<'a>(
    &'a self,
    context: &'a str,
  ) -> impl Future<Output = Result<Vec<Host>, Self::Error>> + Send + 'a;

  fn data_sources<'a>(
    &'a self,
    context: &'a str,
  ) -> impl Future<Output = Result<Vec<DataSource>, Self::Error>> + Send + 'a;

  fn messages<'a>(
    &'a self,
    context: &'a str,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + 'a;

  fn audits<'a>(
    &'a self,
    context: &'a str,
  ) -> impl Future<Output = Result<Vec<Audit>, Self::Error>> + Send + 'a;

  /// Look up a message payload by hash. Returns `None` if unknown.
  fn message_data<'a>(
    &'a self,
    hash: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Count the rows of each table recorded under `context`.
  fn counts<'a>(
    &'a self,
    context: &'a str,
  ) -> impl Future<Output = Result<TableCounts, Self::Error>> + Send + 'a;

  /// Every row of `table` under `context`, untyped.
  fn dump<'a>(
    &'a self,
    context: &'a str,
    table: Table,
  ) -> impl Future<Output = Result<Vec<RawRow>, Self::Error>> + Send + 'a;

  // ── Cloning ───────────────────────────────────────────────────────────

  /// Copy every row under `old_context` into `new_context`, remapping all
  /// foreign keys to the new rows. All-or-nothing.
  ///
  /// Neither the existence of `old_context` nor the emptiness of
  /// `new_context` is checked; an empty source clones to nothing.
  fn clone_context<'a>(
    &'a self,
    old_context: &'a str,
    new_context: &'a str,
  ) -> impl Future<Output = Result<TableCounts, Self::Error>> + Send + 'a;
}
