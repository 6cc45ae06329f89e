//! SQLite backend for the Approdo archive.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Searches are compiled to SQL and must
//! agree with the in-memory reference semantics in `approdo_core`.

mod encode;
mod schema;
mod search;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
