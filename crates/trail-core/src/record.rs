//! Audit record types.
//!
//! Every row carries the `context` it was recorded under. Ids are assigned
//! by the store on insert and only mean something within their context;
//! cloning a context assigns fresh ids to every copied row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Host ────────────────────────────────────────────────────────────────────

/// A machine a run was recorded on. Unique per `(context, hostname)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
  pub id:       i64,
  pub context:  String,
  pub hostname: String,
}

// ─── DataSource ──────────────────────────────────────────────────────────────

/// A producer of messages on a host: one actor running in one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
  pub id:      i64,
  pub context: String,
  pub host_id: i64,
  pub actor:   String,
  pub phase:   String,
}

// ─── Message ─────────────────────────────────────────────────────────────────

/// A recorded message. The payload lives in the shared, content-addressed
/// `message_data` table under `message_data_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub id:                i64,
  pub context:           String,
  pub data_source_id:    i64,
  pub stamp:             DateTime<Utc>,
  pub topic:             String,
  #[serde(rename = "type")]
  pub msg_type:          String,
  pub message_data_hash: String,
}

/// Input to [`AuditStore::record_message`](crate::store::AuditStore::record_message).
#[derive(Debug, Clone)]
pub struct NewMessage {
  pub context:        String,
  pub data_source_id: i64,
  pub topic:          String,
  pub msg_type:       String,
  /// Serialised payload; hashed to derive `message_data_hash`.
  pub data:           String,
}

// ─── Audit ───────────────────────────────────────────────────────────────────

/// An audit log entry, optionally tied to one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
  pub id:             i64,
  pub context:        String,
  pub event:          String,
  pub stamp:          DateTime<Utc>,
  pub data_source_id: i64,
  pub message_id:     Option<i64>,
  pub data:           Option<String>,
}

/// Input to [`AuditStore::record_audit`](crate::store::AuditStore::record_audit).
#[derive(Debug, Clone)]
pub struct NewAudit {
  pub context:        String,
  pub event:          String,
  pub data_source_id: i64,
  pub message_id:     Option<i64>,
  pub data:           Option<String>,
}

impl NewAudit {
  /// An audit entry not tied to any message, with no extra data.
  pub fn new(
    context: impl Into<String>,
    event: impl Into<String>,
    data_source_id: i64,
  ) -> Self {
    Self {
      context: context.into(),
      event: event.into(),
      data_source_id,
      message_id: None,
      data: None,
    }
  }

  pub fn for_message(mut self, message_id: i64) -> Self {
    self.message_id = Some(message_id);
    self
  }

  /// Attach a JSON value as the entry's data.
  pub fn with_json(mut self, data: &serde_json::Value) -> crate::Result<Self> {
    self.data = Some(serde_json::to_string(data)?);
    Ok(self)
  }
}
