//! Forking a context: copy every row recorded under one context into a new
//! one, rewriting foreign keys to point at the copies.
//!
//! Tables are duplicated parents-first (host → data_source → message →
//! audit). Each stage returns the [`IdMap`] of the rows it inserted, which
//! the next stage uses to translate its foreign keys. A key with no entry in
//! its parent's map is a [`DanglingReference`](trail_core::Error::DanglingReference)
//! and aborts the whole clone.

use rusqlite::{Connection, params};
use trail_core::{IdMap, Table, TableCounts};

use crate::{Result, rows::for_each_row};

/// Clone every host, data source, message and audit row of `old_context`
/// into `new_context`, in one transaction on `conn`.
///
/// Either every row is copied and committed, or the transaction is rolled
/// back and the first error is returned. Returns the number of rows inserted
/// per table.
///
/// `old_context` is not required to exist and `new_context` is not required
/// to be empty; rows already under `new_context` are left alone, although
/// they may make an insert fail on a uniqueness constraint.
pub fn clone_context(
  conn: &mut Connection,
  old_context: &str,
  new_context: &str,
) -> Result<TableCounts> {
  if old_context == new_context {
    return Err(trail_core::Error::SameContext(old_context.to_owned()).into());
  }

  // Rolled back on drop unless committed below.
  let tx = conn.transaction()?;
  let counts =
    duplicate_all(&tx, old_context, new_context).inspect_err(|e| {
      tracing::warn!(old_context, new_context, error = %e, "clone failed; rolling back");
    })?;
  tx.commit()?;

  tracing::info!(
    old_context,
    new_context,
    hosts = counts.hosts,
    data_sources = counts.data_sources,
    messages = counts.messages,
    audits = counts.audits,
    "cloned context"
  );
  Ok(counts)
}

fn duplicate_all(
  conn: &Connection,
  old_context: &str,
  new_context: &str,
) -> Result<TableCounts> {
  let hosts = dup_host(conn, old_context, new_context)?;
  let data_sources = dup_data_source(conn, &hosts, old_context, new_context)?;
  let messages = dup_message(conn, &data_sources, old_context, new_context)?;
  let audits =
    dup_audit(conn, &data_sources, &messages, old_context, new_context)?;

  Ok(TableCounts {
    hosts: hosts.len(),
    data_sources: data_sources.len(),
    messages: messages.len(),
    audits,
  })
}

// ─── Stages ──────────────────────────────────────────────────────────────────

fn dup_host(
  conn: &Connection,
  old_context: &str,
  new_context: &str,
) -> Result<IdMap> {
  let mut lookup = IdMap::new(Table::Host);
  let mut insert =
    conn.prepare("INSERT INTO host (context, hostname) VALUES (?1, ?2)")?;

  for_each_row(conn, Table::Host, old_context, |row| {
    let new_id = insert.insert(params![new_context, row.value("hostname")?])?;
    lookup.insert(row.id("id")?, new_id);
    Ok(())
  })?;

  tracing::debug!(table = %Table::Host, rows = lookup.len(), "duplicated");
  Ok(lookup)
}

fn dup_data_source(
  conn: &Connection,
  hosts: &IdMap,
  old_context: &str,
  new_context: &str,
) -> Result<IdMap> {
  let mut lookup = IdMap::new(Table::DataSource);
  let mut insert = conn.prepare(
    "INSERT INTO data_source (context, host_id, actor, phase)
     VALUES (?1, ?2, ?3, ?4)",
  )?;

  for_each_row(conn, Table::DataSource, old_context, |row| {
    let row_id = row.id("id")?;
    let host_id =
      hosts.remap(row.id("host_id")?, Table::DataSource, "host_id", row_id)?;

    let new_id = insert.insert(params![
      new_context,
      host_id,
      row.value("actor")?,
      row.value("phase")?,
    ])?;
    lookup.insert(row_id, new_id);
    Ok(())
  })?;

  tracing::debug!(table = %Table::DataSource, rows = lookup.len(), "duplicated");
  Ok(lookup)
}

fn dup_message(
  conn: &Connection,
  data_sources: &IdMap,
  old_context: &str,
  new_context: &str,
) -> Result<IdMap> {
  let mut lookup = IdMap::new(Table::Message);
  let mut insert = conn.prepare(
    "INSERT INTO message (
       context, data_source_id, stamp, topic, type, message_data_hash
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
  )?;

  for_each_row(conn, Table::Message, old_context, |row| {
    let row_id = row.id("id")?;
    let data_source_id = data_sources.remap(
      row.id("data_source_id")?,
      Table::Message,
      "data_source_id",
      row_id,
    )?;

    let new_id = insert.insert(params![
      new_context,
      data_source_id,
      row.value("stamp")?,
      row.value("topic")?,
      row.value("type")?,
      row.value("message_data_hash")?,
    ])?;
    lookup.insert(row_id, new_id);
    Ok(())
  })?;

  tracing::debug!(table = %Table::Message, rows = lookup.len(), "duplicated");
  Ok(lookup)
}

/// Audit rows are leaves, so only their count is returned.
fn dup_audit(
  conn: &Connection,
  data_sources: &IdMap,
  messages: &IdMap,
  old_context: &str,
  new_context: &str,
) -> Result<usize> {
  let mut cloned = 0;
  let mut insert = conn.prepare(
    "INSERT INTO audit (
       context, event, stamp, data_source_id, message_id, data
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
  )?;

  for_each_row(conn, Table::Audit, old_context, |row| {
    let row_id = row.id("id")?;
    let data_source_id = data_sources.remap(
      row.id("data_source_id")?,
      Table::Audit,
      "data_source_id",
      row_id,
    )?;
    // NULL stays NULL.
    let message_id = row
      .opt_id("message_id")?
      .map(|id| messages.remap(id, Table::Audit, "message_id", row_id))
      .transpose()?;

    insert.execute(params![
      new_context,
      row.value("event")?,
      row.value("stamp")?,
      data_source_id,
      message_id,
      row.value("data")?,
    ])?;
    cloned += 1;
    Ok(())
  })?;

  tracing::debug!(table = %Table::Audit, rows = cloned, "duplicated");
  Ok(cloned)
}
