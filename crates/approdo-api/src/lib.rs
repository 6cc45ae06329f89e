//! JSON HTTP API for the archive.
//!
//! [`router`] builds an axum application over any store implementing both
//! [`PersonStore`] and [`AdminStore`]. Record and photo reads are public;
//! every mutating route and the whole admin directory sit behind HTTP
//! Basic authentication checked against the directory itself.

pub mod admins;
pub mod auth;
pub mod error;
pub mod migrants;
pub mod photos;
pub mod stats;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use approdo_core::store::{AdminStore, PersonStore};

pub use self::error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` merged
/// with `APPRODO_`-prefixed environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// Path of the SQLite database file. A leading `~` is expanded.
  pub store_path: PathBuf,
  /// When both bootstrap fields are set and the e-mail is unknown, the
  /// server seeds a Super Admin entry with them at startup.
  pub bootstrap_admin_email:         Option<String>,
  pub bootstrap_admin_password_hash: Option<String>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the application router for `store`.
pub fn router<S>(store: Arc<S>) -> Router<()>
where
  S: PersonStore + AdminStore + 'static,
{
  Router::new()
    // Records
    .route(
      "/api/migrants",
      get(migrants::search::<S>).post(migrants::create::<S>),
    )
    .route(
      "/api/migrants/{id}",
      get(migrants::get_one::<S>)
        .put(migrants::update::<S>)
        .delete(migrants::delete_one::<S>),
    )
    // Photo references
    .route(
      "/api/migrants/{id}/photos",
      get(photos::list::<S>)
        .post(photos::add::<S>)
        .delete(photos::remove::<S>),
    )
    .route(
      "/api/migrants/{id}/photos/primary",
      post(photos::set_primary::<S>),
    )
    // Admin directory
    .route("/api/admins", get(admins::list::<S>).post(admins::create::<S>))
    .route(
      "/api/admins/{id}",
      get(admins::get_one::<S>)
        .put(admins::update::<S>)
        .delete(admins::delete_one::<S>),
    )
    // Dashboard
    .route("/api/dashboard/stats", get(stats::dashboard::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(store)
}
