//! API error type and its [`IntoResponse`] mapping.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error surfaced by an API handler.
///
/// Every variant renders as a JSON body of the shape `{ "error": "…" }` with
/// the matching status code; [`ApiError::Unauthorized`] additionally carries
/// a `WWW-Authenticate` challenge so Basic-auth clients prompt again.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("invalid credentials")]
  Unauthorized,

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("unrecognised sort parameter: {0:?}")]
  InvalidSort(String),

  #[error("{0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<approdo_core::Error> for ApiError {
  fn from(err: approdo_core::Error) -> Self {
    use approdo_core::Error as E;
    match err {
      E::InvalidSort(token) => ApiError::InvalidSort(token),
      E::PersonNotFound(id) => {
        ApiError::NotFound(format!("record {id} not found"))
      },
      E::AdminNotFound(id) => {
        ApiError::NotFound(format!("admin {id} not found"))
      },
      E::PhotoNotFound { person_id, photo } => ApiError::NotFound(format!(
        "photo {photo:?} is not attached to record {person_id}"
      )),
      E::EmailTaken(email) => {
        ApiError::Conflict(format!("e-mail {email:?} is already registered"))
      },
      err @ (E::MissingName | E::IncompleteAdmin) => {
        ApiError::BadRequest(err.to_string())
      },
      err @ E::Unavailable(_) => ApiError::Store(Box::new(err)),
    }
  }
}

/// Collapse a backend error into the API error space via the shared taxonomy.
pub(crate) fn store_err<E: Into<approdo_core::Error>>(err: E) -> ApiError {
  ApiError::from(err.into())
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::InvalidSort(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
      tracing::error!("internal error: {self}");
    }

    let mut response =
      (status, Json(json!({ "error": self.to_string() }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"approdo\""),
      );
    }
    response
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn core_errors_map_to_the_right_statuses() {
    use approdo_core::Error as E;

    let cases = [
      (E::InvalidSort("height".into()), StatusCode::UNPROCESSABLE_ENTITY),
      (E::PersonNotFound(7), StatusCode::NOT_FOUND),
      (E::AdminNotFound(3), StatusCode::NOT_FOUND),
      (
        E::PhotoNotFound { person_id: 7, photo: "a.jpg".into() },
        StatusCode::NOT_FOUND,
      ),
      (E::EmailTaken("a@b.c".into()), StatusCode::CONFLICT),
      (E::MissingName, StatusCode::BAD_REQUEST),
      (E::IncompleteAdmin, StatusCode::BAD_REQUEST),
      (E::Unavailable("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, expected) in cases {
      let response = ApiError::from(err).into_response();
      assert_eq!(response.status(), expected);
    }
  }

  #[test]
  fn unauthorized_carries_a_basic_challenge() {
    let response = ApiError::Unauthorized.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
      response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
      "Basic realm=\"approdo\""
    );
  }
}
