//! [`SqliteStore`] — the SQLite implementation of [`AuditStore`].

use std::path::Path;

use chrono::Utc;
use trail_core::{
  AuditStore, RawRow, Table, TableCounts,
  record::{Audit, DataSource, Host, Message, NewAudit, NewMessage},
};

use crate::{
  Result, clone,
  encode::{RawAudit, RawMessage, encode_dt, payload_hash},
  rows::{Row, collect_rows},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An audit store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── AuditStore impl ─────────────────────────────────────────────────────────

impl AuditStore for SqliteStore {
  type Error = crate::Error;

  // ── Producers ─────────────────────────────────────────────────────────────

  async fn ensure_host<'a>(
    &'a self,
    context: &'a str,
    hostname: &'a str,
  ) -> Result<Host> {
    let context = context.to_owned();
    let hostname = hostname.to_owned();

    let host = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO host (context, hostname) VALUES (?1, ?2)
           ON CONFLICT (context, hostname) DO NOTHING",
          rusqlite::params![context, hostname],
        )?;
        let id = conn.query_row(
          "SELECT id FROM host WHERE context = ?1 AND hostname = ?2",
          rusqlite::params![context, hostname],
          |r| r.get(0),
        )?;
        Ok(Host { id, context, hostname })
      })
      .await?;

    Ok(host)
  }

  async fn ensure_data_source<'a>(
    &'a self,
    context: &'a str,
    host_id: i64,
    actor: &'a str,
    phase: &'a str,
  ) -> Result<DataSource> {
    let context = context.to_owned();
    let actor = actor.to_owned();
    let phase = phase.to_owned();

    let data_source = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO data_source (context, host_id, actor, phase)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (context, host_id, actor, phase) DO NOTHING",
          rusqlite::params![context, host_id, actor, phase],
        )?;
        let id = conn.query_row(
          "SELECT id FROM data_source
           WHERE context = ?1 AND host_id = ?2 AND actor = ?3 AND phase = ?4",
          rusqlite::params![context, host_id, actor, phase],
          |r| r.get(0),
        )?;
        Ok(DataSource { id, context, host_id, actor, phase })
      })
      .await?;

    Ok(data_source)
  }

  async fn record_message(&self, input: NewMessage) -> Result<Message> {
    let mut message = Message {
      id:                0,
      context:           input.context,
      data_source_id:    input.data_source_id,
      stamp:             Utc::now(),
      topic:             input.topic,
      msg_type:          input.msg_type,
      message_data_hash: payload_hash(&input.data),
    };
    let row = message.clone();
    let stamp_str = encode_dt(row.stamp);
    let data = input.data;

    message.id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO message_data (hash, data) VALUES (?1, ?2)
           ON CONFLICT (hash) DO NOTHING",
          rusqlite::params![row.message_data_hash, data],
        )?;
        tx.execute(
          "INSERT INTO message (
             context, data_source_id, stamp, topic, type, message_data_hash
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            row.context,
            row.data_source_id,
            stamp_str,
            row.topic,
            row.msg_type,
            row.message_data_hash,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(message)
  }

  async fn record_audit(&self, input: NewAudit) -> Result<Audit> {
    let mut audit = Audit {
      id:             0,
      context:        input.context,
      event:          input.event,
      stamp:          Utc::now(),
      data_source_id: input.data_source_id,
      message_id:     input.message_id,
      data:           input.data,
    };
    let row = audit.clone();
    let stamp_str = encode_dt(row.stamp);

    audit.id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO audit (
             context, event, stamp, data_source_id, message_id, data
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            row.context,
            row.event,
            stamp_str,
            row.data_source_id,
            row.message_id,
            row.data,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(audit)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn hosts<'a>(&'a self, context: &'a str) -> Result<Vec<Host>> {
    let context = context.to_owned();

    let hosts = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, context, hostname FROM host WHERE context = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![context], |row| {
            Ok(Host {
              id:       row.get(0)?,
              context:  row.get(1)?,
              hostname: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(hosts)
  }

  async fn data_sources<'a>(
    &'a self,
    context: &'a str,
  ) -> Result<Vec<DataSource>> {
    let context = context.to_owned();

    let data_sources = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, context, host_id, actor, phase
           FROM data_source WHERE context = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![context], |row| {
            Ok(DataSource {
              id:      row.get(0)?,
              context: row.get(1)?,
              host_id: row.get(2)?,
              actor:   row.get(3)?,
              phase:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(data_sources)
  }

  async fn messages<'a>(&'a self, context: &'a str) -> Result<Vec<Message>> {
    let context = context.to_owned();

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, context, data_source_id, stamp, topic, type, message_data_hash
           FROM message WHERE context = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![context], |row| {
            Ok(RawMessage {
              id:                row.get(0)?,
              context:           row.get(1)?,
              data_source_id:    row.get(2)?,
              stamp:             row.get(3)?,
              topic:             row.get(4)?,
              msg_type:          row.get(5)?,
              message_data_hash: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }

  async fn audits<'a>(&'a self, context: &'a str) -> Result<Vec<Audit>> {
    let context = context.to_owned();

    let raws: Vec<RawAudit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, context, event, stamp, data_source_id, message_id, data
           FROM audit WHERE context = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![context], |row| {
            Ok(RawAudit {
              id:             row.get(0)?,
              context:        row.get(1)?,
              event:          row.get(2)?,
              stamp:          row.get(3)?,
              data_source_id: row.get(4)?,
              message_id:     row.get(5)?,
              data:           row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAudit::into_audit).collect()
  }

  async fn message_data<'a>(&'a self, hash: &'a str) -> Result<Option<String>> {
    use rusqlite::OptionalExtension as _;

    let hash = hash.to_owned();

    let data = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT data FROM message_data WHERE hash = ?1",
              rusqlite::params![hash],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(data)
  }

  async fn counts<'a>(&'a self, context: &'a str) -> Result<TableCounts> {
    let context = context.to_owned();

    let counts = self
      .conn
      .call(move |conn| {
        let mut counts = TableCounts::default();
        for table in Table::ALL {
          let n: usize = conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE context = ?1"),
            rusqlite::params![context],
            |r| r.get(0),
          )?;
          counts.set(table, n);
        }
        Ok(counts)
      })
      .await?;

    Ok(counts)
  }

  async fn dump<'a>(
    &'a self,
    context: &'a str,
    table: Table,
  ) -> Result<Vec<RawRow>> {
    let context = context.to_owned();

    // The row source reports its own errors; carry them out of the
    // connection thread untouched.
    let rows = self
      .conn
      .call(move |conn| Ok(collect_rows(conn, table, &context)))
      .await??;

    Ok(rows.into_iter().map(Row::into_json).collect())
  }

  // ── Cloning ───────────────────────────────────────────────────────────────

  async fn clone_context<'a>(
    &'a self,
    old_context: &'a str,
    new_context: &'a str,
  ) -> Result<TableCounts> {
    let old_context = old_context.to_owned();
    let new_context = new_context.to_owned();

    let counts = self
      .conn
      .call(move |conn| {
        Ok(clone::clone_context(conn, &old_context, &new_context))
      })
      .await??;

    Ok(counts)
  }
}
