//! Integration tests for `SqliteStore` against an in-memory database.

use trail_core::{
  AuditStore, Table, TableCounts,
  record::{DataSource, Host, Message, NewAudit, NewMessage},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn facts_message(context: &str, data_source_id: i64, data: &str) -> NewMessage {
  NewMessage {
    context: context.into(),
    data_source_id,
    topic: "system_info".into(),
    msg_type: "InstalledPackages".into(),
    data: data.into(),
  }
}

/// Record a small run under `context`: one host, two data sources, two
/// messages and three audit entries (one without a message).
async fn record_run(
  s: &SqliteStore,
  context: &str,
) -> (Host, DataSource, DataSource, Message, Message) {
  let host = s.ensure_host(context, "node1.example.com").await.unwrap();
  let scanner = s
    .ensure_data_source(context, host.id, "scan_packages", "facts")
    .await
    .unwrap();
  let checker = s
    .ensure_data_source(context, host.id, "check_kernel", "checks")
    .await
    .unwrap();

  let m1 = s
    .record_message(facts_message(context, scanner.id, r#"{"items":[1]}"#))
    .await
    .unwrap();
  let m2 = s
    .record_message(facts_message(context, checker.id, r#"{"items":[2]}"#))
    .await
    .unwrap();

  s.record_audit(NewAudit::new(context, "new-message", scanner.id).for_message(m1.id))
    .await
    .unwrap();
  s.record_audit(NewAudit::new(context, "new-message", checker.id).for_message(m2.id))
    .await
    .unwrap();
  s.record_audit(
    NewAudit::new(context, "actor-exit", checker.id)
      .with_json(&serde_json::json!({ "exit_code": 0 }))
      .unwrap(),
  )
  .await
  .unwrap();

  (host, scanner, checker, m1, m2)
}

// ─── Producers ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_host_is_get_or_create() {
  let s = store().await;

  let first = s.ensure_host("A", "node1").await.unwrap();
  let again = s.ensure_host("A", "node1").await.unwrap();
  let other = s.ensure_host("B", "node1").await.unwrap();

  assert_eq!(first, again);
  assert_ne!(first.id, other.id);
  assert_eq!(s.hosts("A").await.unwrap(), vec![first]);
}

#[tokio::test]
async fn ensure_data_source_is_get_or_create() {
  let s = store().await;
  let host = s.ensure_host("A", "node1").await.unwrap();

  let first = s.ensure_data_source("A", host.id, "actor", "phase").await.unwrap();
  let again = s.ensure_data_source("A", host.id, "actor", "phase").await.unwrap();
  let other = s.ensure_data_source("A", host.id, "actor", "other").await.unwrap();

  assert_eq!(first, again);
  assert_ne!(first.id, other.id);
  assert_eq!(s.data_sources("A").await.unwrap().len(), 2);
}

#[tokio::test]
async fn data_source_requires_existing_host() {
  let s = store().await;
  let err = s.ensure_data_source("A", 42, "actor", "phase").await.unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));
}

#[tokio::test]
async fn message_payloads_are_content_addressed() {
  let s = store().await;
  let host = s.ensure_host("A", "node1").await.unwrap();
  let ds = s.ensure_data_source("A", host.id, "a", "p").await.unwrap();

  let m1 = s.record_message(facts_message("A", ds.id, "same")).await.unwrap();
  let m2 = s.record_message(facts_message("A", ds.id, "same")).await.unwrap();

  assert_ne!(m1.id, m2.id);
  assert_eq!(m1.message_data_hash, m2.message_data_hash);
  assert_eq!(
    s.message_data(&m1.message_data_hash).await.unwrap().as_deref(),
    Some("same")
  );
  assert!(s.message_data("unknown").await.unwrap().is_none());

  let listed = s.messages("A").await.unwrap();
  assert_eq!(listed, vec![m1, m2]);
}

#[tokio::test]
async fn audit_roundtrip() {
  let s = store().await;
  let (_, scanner, checker, m1, _) = record_run(&s, "A").await;

  let audits = s.audits("A").await.unwrap();
  assert_eq!(audits.len(), 3);
  assert_eq!(audits[0].data_source_id, scanner.id);
  assert_eq!(audits[0].message_id, Some(m1.id));
  assert_eq!(audits[2].data_source_id, checker.id);
  assert_eq!(audits[2].message_id, None);
  assert_eq!(audits[2].data.as_deref(), Some(r#"{"exit_code":0}"#));
}

// ─── Counts and dump ─────────────────────────────────────────────────────────

#[tokio::test]
async fn counts_per_context() {
  let s = store().await;
  record_run(&s, "A").await;

  assert_eq!(s.counts("A").await.unwrap(), TableCounts {
    hosts:        1,
    data_sources: 2,
    messages:     2,
    audits:       3,
  });
  assert!(s.counts("B").await.unwrap().is_empty());
}

#[tokio::test]
async fn dump_returns_raw_rows_in_id_order() {
  let s = store().await;
  let (_, scanner, checker, _, _) = record_run(&s, "A").await;

  let rows = s.dump("A", Table::DataSource).await.unwrap();

  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0]["id"], serde_json::json!(scanner.id));
  assert_eq!(rows[1]["id"], serde_json::json!(checker.id));
  assert_eq!(rows[0]["actor"], serde_json::json!("scan_packages"));
  assert_eq!(rows[1]["context"], serde_json::json!("A"));
  assert!(s.dump("B", Table::Audit).await.unwrap().is_empty());
}

// ─── Cloning ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn clone_copies_the_whole_run() {
  let s = store().await;
  let (host, scanner, _, m1, _) = record_run(&s, "A").await;

  let cloned = s.clone_context("A", "B").await.unwrap();
  assert_eq!(cloned, s.counts("A").await.unwrap());
  assert_eq!(s.counts("B").await.unwrap(), cloned);

  let hosts = s.hosts("B").await.unwrap();
  assert_eq!(hosts.len(), 1);
  assert_eq!(hosts[0].hostname, host.hostname);
  assert_ne!(hosts[0].id, host.id);

  let data_sources = s.data_sources("B").await.unwrap();
  assert!(data_sources.iter().all(|d| d.host_id == hosts[0].id));
  let new_scanner = data_sources
    .iter()
    .find(|d| d.actor == scanner.actor)
    .unwrap();
  assert_ne!(new_scanner.id, scanner.id);

  let messages = s.messages("B").await.unwrap();
  let new_m1 = messages
    .iter()
    .find(|m| m.message_data_hash == m1.message_data_hash)
    .unwrap();
  assert_eq!(new_m1.data_source_id, new_scanner.id);
  assert_eq!(new_m1.stamp, m1.stamp);
  assert_eq!(new_m1.topic, m1.topic);
  assert_eq!(new_m1.msg_type, m1.msg_type);

  let message_ids: Vec<i64> = messages.iter().map(|m| m.id).collect();
  let audits = s.audits("B").await.unwrap();
  assert_eq!(audits.iter().filter(|a| a.message_id.is_none()).count(), 1);
  assert!(
    audits
      .iter()
      .filter_map(|a| a.message_id)
      .all(|id| message_ids.contains(&id))
  );
  assert!(
    audits
      .iter()
      .any(|a| a.message_id == Some(new_m1.id) && a.data_source_id == new_scanner.id)
  );
}

#[tokio::test]
async fn clone_shares_message_payloads() {
  let s = store().await;
  let (_, _, _, m1, _) = record_run(&s, "A").await;

  s.clone_context("A", "B").await.unwrap();

  let copy = s
    .messages("B")
    .await
    .unwrap()
    .into_iter()
    .find(|m| m.message_data_hash == m1.message_data_hash)
    .unwrap();
  assert_eq!(
    s.message_data(&copy.message_data_hash).await.unwrap().as_deref(),
    Some(r#"{"items":[1]}"#)
  );
}

#[tokio::test]
async fn cloned_context_accepts_new_records() {
  let s = store().await;
  record_run(&s, "A").await;
  s.clone_context("A", "B").await.unwrap();

  // The fork carries on independently of its source.
  let host = s.ensure_host("B", "node1.example.com").await.unwrap();
  let ds = s
    .ensure_data_source("B", host.id, "scan_packages", "facts")
    .await
    .unwrap();
  s.record_audit(NewAudit::new("B", "actor-enter", ds.id))
    .await
    .unwrap();

  assert_eq!(s.counts("B").await.unwrap().audits, 4);
  assert_eq!(s.counts("A").await.unwrap().audits, 3);
  assert_eq!(s.hosts("B").await.unwrap().len(), 1);
}

#[tokio::test]
async fn clone_of_empty_context_succeeds() {
  let s = store().await;
  let cloned = s.clone_context("nothing", "B").await.unwrap();
  assert!(cloned.is_empty());
}

#[tokio::test]
async fn clone_onto_itself_errors() {
  let s = store().await;
  record_run(&s, "A").await;

  let err = s.clone_context("A", "A").await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(trail_core::Error::SameContext(_))
  ));
  assert_eq!(s.counts("A").await.unwrap().total(), 8);
}

#[tokio::test]
async fn failed_clone_leaves_destination_unchanged() {
  let s = store().await;
  record_run(&s, "A").await;
  // Already holds a host that the clone would duplicate.
  s.ensure_host("B", "node1.example.com").await.unwrap();

  let err = s.clone_context("A", "B").await.unwrap_err();

  assert!(matches!(err, crate::Error::Sqlite(_)));
  assert_eq!(s.counts("B").await.unwrap(), TableCounts {
    hosts: 1,
    ..Default::default()
  });
}
