//! HTTP Basic authentication against the admin directory.
//!
//! Handlers that mutate the archive take an [`AdminSession`] argument.
//! Extraction decodes the `Authorization` header, looks the admin up by
//! e-mail, checks the entry is active, verifies the password against the
//! stored argon2 hash and stamps `last_login`. Any failure along the way
//! collapses to a 401 with a Basic challenge.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand_core::OsRng;

use approdo_core::{
  admin::{Admin, AdminStatus},
  store::AdminStore,
};

use crate::error::{ApiError, store_err};

/// Proof that a request passed the admin gate.
#[derive(Debug)]
pub struct AdminSession(pub Admin);

/// Decode `Authorization: Basic …` into `(email, password)`.
fn parse_basic(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;
  let encoded = value.strip_prefix("Basic ").ok_or(ApiError::Unauthorized)?;
  let decoded = BASE64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let credentials =
    String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;
  let (email, password) =
    credentials.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((email.to_owned(), password.to_owned()))
}

/// Hash a password into an argon2 PHC string suitable for storage.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| {
      store_err(approdo_core::Error::Unavailable(format!(
        "password hashing failed: {e}"
      )))
    })?;
  Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<(), ApiError> {
  let parsed = PasswordHash::new(hash).map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| ApiError::Unauthorized)
}

impl<S> FromRequestParts<Arc<S>> for AdminSession
where
  S: AdminStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &Arc<S>,
  ) -> Result<Self, Self::Rejection> {
    let (email, password) = parse_basic(&parts.headers)?;

    let Some((admin, hash)) =
      state.find_admin_by_email(email).await.map_err(store_err)?
    else {
      return Err(ApiError::Unauthorized);
    };

    // An inactive entry keeps its credentials but cannot pass the gate.
    if admin.status != AdminStatus::Active {
      return Err(ApiError::Unauthorized);
    }
    verify_password(&password, &hash)?;

    // The admin may have been deleted between lookup and stamp; treat that
    // the same as a failed login rather than a 404.
    state.record_login(admin.admin_id).await.map_err(|e| match e.into() {
      approdo_core::Error::AdminNotFound(_) => ApiError::Unauthorized,
      other => ApiError::from(other),
    })?;

    Ok(AdminSession(admin))
  }
}

#[cfg(test)]
mod tests {
  use approdo_core::{
    admin::{AdminRole, NewAdmin},
    memory::MemoryStore,
  };
  use axum::http::Request;

  use super::*;

  async fn store_with(
    email: &str,
    password: &str,
    status: AdminStatus,
  ) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store
      .create_admin(NewAdmin {
        name:            "Rosa".into(),
        email:           email.into(),
        password_hash:   hash_password(password).unwrap(),
        role:            AdminRole::Editor,
        status,
        profile_picture: None,
      })
      .await
      .unwrap();
    Arc::new(store)
  }

  fn parts_with(header_value: Option<&str>) -> Parts {
    let mut builder = Request::builder().uri("/");
    if let Some(value) = header_value {
      builder = builder.header(header::AUTHORIZATION, value);
    }
    let (parts, ()) = builder.body(()).unwrap().into_parts();
    parts
  }

  fn basic(email: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{email}:{password}")))
  }

  #[test]
  fn hash_and_verify_roundtrip() {
    let hash = hash_password("il-mio-segreto").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("il-mio-segreto", &hash).is_ok());
    assert!(verify_password("wrong", &hash).is_err());
  }

  #[tokio::test]
  async fn valid_credentials_yield_a_session() {
    let store = store_with("rosa@example.org", "segreto", AdminStatus::Active).await;
    let mut parts = parts_with(Some(&basic("rosa@example.org", "segreto")));

    let session = AdminSession::from_request_parts(&mut parts, &store)
      .await
      .expect("extraction should succeed");
    assert_eq!(session.0.email, "rosa@example.org");
  }

  #[tokio::test]
  async fn the_email_lookup_is_case_insensitive() {
    let store = store_with("rosa@example.org", "segreto", AdminStatus::Active).await;
    let mut parts = parts_with(Some(&basic("Rosa@Example.ORG", "segreto")));

    assert!(
      AdminSession::from_request_parts(&mut parts, &store).await.is_ok()
    );
  }

  #[tokio::test]
  async fn wrong_password_is_rejected() {
    let store = store_with("rosa@example.org", "segreto", AdminStatus::Active).await;
    let mut parts = parts_with(Some(&basic("rosa@example.org", "sbagliato")));

    let err = AdminSession::from_request_parts(&mut parts, &store)
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
  }

  #[tokio::test]
  async fn inactive_admins_are_rejected() {
    let store =
      store_with("rosa@example.org", "segreto", AdminStatus::Inactive).await;
    let mut parts = parts_with(Some(&basic("rosa@example.org", "segreto")));

    let err = AdminSession::from_request_parts(&mut parts, &store)
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
  }

  #[tokio::test]
  async fn missing_and_malformed_headers_are_rejected() {
    let store = store_with("rosa@example.org", "segreto", AdminStatus::Active).await;

    for value in [None, Some("Bearer abc"), Some("Basic not-base64!")] {
      let mut parts = parts_with(value);
      let err = AdminSession::from_request_parts(&mut parts, &store)
        .await
        .unwrap_err();
      assert!(matches!(err, ApiError::Unauthorized));
    }
  }
}
