//! Core types, query semantics and trait definitions for the Approdo
//! migrant-record archive.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; the in-memory reference backend lives
//! here too.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod admin;
pub mod error;
pub mod filter;
pub mod memory;
pub mod person;
pub mod query;
pub mod sort;
pub mod stats;
pub mod store;
pub mod text;


pub use error::{Error, Result};
