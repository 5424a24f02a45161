//! SQLite backend for the trail audit store.
//!
//! [`clone_context`] forks every row of one context into another inside a
//! single transaction on a caller-supplied connection. [`SqliteStore`] wraps
//! [`tokio_rusqlite`] so the same operation, and the producer/read API, run
//! on a dedicated thread without blocking the async runtime.

mod clone;
mod encode;
mod rows;
mod schema;
mod store;

pub mod error;

pub use clone::clone_context;
pub use error::{Error, Result};
pub use rows::Row;
pub use schema::SCHEMA;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
