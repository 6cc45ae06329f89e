//! Error types for `approdo-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unrecognised sort parameter: {0:?}")]
  InvalidSort(String),

  #[error("record not found: {0}")]
  PersonNotFound(i64),

  #[error("admin not found: {0}")]
  AdminNotFound(i64),

  #[error("photo {photo:?} is not attached to record {person_id}")]
  PhotoNotFound { person_id: i64, photo: String },

  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("christian name and surname must both be non-empty")]
  MissingName,

  #[error("admin name and email must both be non-empty")]
  IncompleteAdmin,

  #[error("store unavailable: {0}")]
  Unavailable(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
