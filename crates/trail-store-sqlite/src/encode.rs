//! Encoding and decoding helpers between Rust domain types and the values
//! stored in SQLite columns.
//!
//! Stamps are stored as RFC 3339 strings. Message payloads are addressed by
//! the lowercase hex SHA-256 of their text.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use sha2::{Digest, Sha256};
use trail_core::record::{Audit, Message};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Payload hash ────────────────────────────────────────────────────────────

pub fn payload_hash(data: &str) -> String {
  hex::encode(Sha256::digest(data.as_bytes()))
}

// ─── Raw values ──────────────────────────────────────────────────────────────

/// Render a stored value as JSON. Blobs become hex strings; non-finite
/// reals become `null`.
pub fn value_to_json(value: Value) -> serde_json::Value {
  match value {
    Value::Null => serde_json::Value::Null,
    Value::Integer(i) => i.into(),
    Value::Real(f) => serde_json::Number::from_f64(f)
      .map_or(serde_json::Value::Null, serde_json::Value::Number),
    Value::Text(s) => s.into(),
    Value::Blob(b) => hex::encode(b).into(),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns read directly from a `message` row.
pub struct RawMessage {
  pub id:                i64,
  pub context:           String,
  pub data_source_id:    i64,
  pub stamp:             String,
  pub topic:             String,
  pub msg_type:          String,
  pub message_data_hash: String,
}

impl RawMessage {
  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      id:                self.id,
      context:           self.context,
      data_source_id:    self.data_source_id,
      stamp:             decode_dt(&self.stamp)?,
      topic:             self.topic,
      msg_type:          self.msg_type,
      message_data_hash: self.message_data_hash,
    })
  }
}

/// Columns read directly from an `audit` row.
pub struct RawAudit {
  pub id:             i64,
  pub context:        String,
  pub event:          String,
  pub stamp:          String,
  pub data_source_id: i64,
  pub message_id:     Option<i64>,
  pub data:           Option<String>,
}

impl RawAudit {
  pub fn into_audit(self) -> Result<Audit> {
    Ok(Audit {
      id:             self.id,
      context:        self.context,
      event:          self.event,
      stamp:          decode_dt(&self.stamp)?,
      data_source_id: self.data_source_id,
      message_id:     self.message_id,
      data:           self.data,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn payload_hash_is_sha256_hex() {
    assert_eq!(
      payload_hash(""),
      "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
  }

  #[test]
  fn stamps_survive_encoding() {
    let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
  }

  #[test]
  fn bad_stamp_is_a_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }

  #[test]
  fn blobs_render_as_hex() {
    assert_eq!(value_to_json(Value::Blob(vec![0xab, 0x01])), "ab01");
    assert_eq!(value_to_json(Value::Real(f64::NAN)), serde_json::Value::Null);
  }
}
