//! Handlers for the `/api/admins` directory endpoints.
//!
//! The whole directory sits behind the gate: every route here takes an
//! [`AdminSession`]. Responses use the [`Admin`] view type, which never
//! carries the password hash.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;

use approdo_core::{
  admin::{Admin, AdminRole, AdminStatus, AdminUpdate, NewAdmin},
  store::AdminStore,
};

use crate::{
  auth::{AdminSession, hash_password},
  error::{ApiError, store_err},
};

/// Create/update body. Credentials arrive either as a plaintext `password`
/// (hashed server-side) or as a pre-computed `password_hash` PHC string;
/// the hash wins when both are present.
#[derive(Debug, Deserialize)]
pub struct AdminBody {
  pub name:            String,
  pub email:           String,
  pub password:        Option<String>,
  pub password_hash:   Option<String>,
  #[serde(default)]
  pub role:            AdminRole,
  #[serde(default)]
  pub status:          AdminStatus,
  pub profile_picture: Option<String>,
}

fn resolve_hash(
  password_hash: Option<String>,
  password: Option<String>,
) -> Result<Option<String>, ApiError> {
  match (password_hash, password) {
    (Some(hash), _) => Ok(Some(hash)),
    (None, Some(password)) => Ok(Some(hash_password(&password)?)),
    (None, None) => Ok(None),
  }
}

/// `GET /api/admins`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  _session: AdminSession,
) -> Result<Json<Vec<Admin>>, ApiError>
where
  S: AdminStore + 'static,
{
  let admins = store.list_admins().await.map_err(store_err)?;
  Ok(Json(admins))
}

/// `POST /api/admins` — register an admin, returning it with a 201.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  _session: AdminSession,
  Json(body): Json<AdminBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AdminStore + 'static,
{
  let AdminBody {
    name,
    email,
    password,
    password_hash,
    role,
    status,
    profile_picture,
  } = body;
  let Some(password_hash) = resolve_hash(password_hash, password)? else {
    return Err(ApiError::BadRequest(
      "a password or password_hash is required".to_owned(),
    ));
  };

  let admin = store
    .create_admin(NewAdmin {
      name,
      email,
      password_hash,
      role,
      status,
      profile_picture,
    })
    .await
    .map_err(store_err)?;
  info!(admin_id = admin.admin_id, email = %admin.email, "admin created");
  Ok((StatusCode::CREATED, Json(admin)))
}

/// `GET /api/admins/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  _session: AdminSession,
  Path(admin_id): Path<i64>,
) -> Result<Json<Admin>, ApiError>
where
  S: AdminStore + 'static,
{
  let admin =
    store.get_admin(admin_id).await.map_err(store_err)?.ok_or_else(|| {
      ApiError::NotFound(format!("admin {admin_id} not found"))
    })?;
  Ok(Json(admin))
}

/// `PUT /api/admins/{id}` — whole-entry replacement. Omitting both
/// `password` and `password_hash` keeps the stored credentials.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  _session: AdminSession,
  Path(admin_id): Path<i64>,
  Json(body): Json<AdminBody>,
) -> Result<Json<Admin>, ApiError>
where
  S: AdminStore + 'static,
{
  let AdminBody {
    name,
    email,
    password,
    password_hash,
    role,
    status,
    profile_picture,
  } = body;
  let update = AdminUpdate {
    name,
    email,
    password_hash: resolve_hash(password_hash, password)?,
    role,
    status,
    profile_picture,
  };

  let admin = store
    .update_admin(admin_id, update)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("admin {admin_id} not found"))
    })?;
  info!(admin_id, "admin updated");
  Ok(Json(admin))
}

/// `DELETE /api/admins/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  _session: AdminSession,
  Path(admin_id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: AdminStore + 'static,
{
  if store.delete_admin(admin_id).await.map_err(store_err)? {
    info!(admin_id, "admin deleted");
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("admin {admin_id} not found")))
  }
}
