use thiserror::Error;

/// Errors that can occur in the `approdo-store-sqlite` crate.
#[derive(Debug, Error)]
pub enum Error {
  /// An error from the `approdo-core` crate.
  #[error("core error: {0}")]
  Core(#[from] approdo_core::Error),
  /// An error from the database.
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),
  /// An error from serializing or deserializing JSON columns.
  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
  /// A stored column value that could not be decoded.
  #[error("column decode error: {0}")]
  Decode(String),
}

/// Domain errors pass through unchanged; anything infrastructural collapses
/// into [`approdo_core::Error::Unavailable`].
impl From<Error> for approdo_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(err) => err,
      other => approdo_core::Error::Unavailable(other.to_string()),
    }
  }
}

/// A handy `Result` type for the `approdo-store-sqlite` crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
