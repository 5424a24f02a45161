//! Core types and trait definitions for the trail audit store.
//!
//! An audit trail is a set of rows in four tables (host, data source,
//! message, audit) grouped under an opaque *context* string identifying one
//! recorded run. This crate holds the domain types and the [`AuditStore`]
//! abstraction; it depends on no database.

pub mod error;
pub mod id_map;
pub mod record;
pub mod store;
pub mod table;

pub use error::{Error, Result};
pub use id_map::IdMap;
pub use store::{AuditStore, RawRow};
pub use table::{Table, TableCounts};
