//! Handlers for the photo-reference endpoints under
//! `/api/migrants/{id}/photos`.
//!
//! Photos are stored elsewhere; these routes manage the ordered list of
//! file references on a record. The first reference is the record's
//! primary portrait.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;

use approdo_core::{
  person::Person,
  store::{AdminStore, PersonStore},
};

use crate::{
  auth::AdminSession,
  error::{ApiError, store_err},
};

#[derive(Debug, Deserialize)]
pub struct AddPhotosBody {
  pub photos: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoBody {
  pub photo: String,
}

/// `GET /api/migrants/{id}/photos`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(person_id): Path<i64>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: PersonStore + 'static,
{
  let person =
    store.get(person_id).await.map_err(store_err)?.ok_or_else(|| {
      ApiError::NotFound(format!("record {person_id} not found"))
    })?;
  Ok(Json(person.photos))
}

/// `POST /api/migrants/{id}/photos` — append references, returning the
/// updated record.
pub async fn add<S>(
  State(store): State<Arc<S>>,
  _session: AdminSession,
  Path(person_id): Path<i64>,
  Json(body): Json<AddPhotosBody>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore + AdminStore + 'static,
{
  let person =
    store.add_photos(person_id, body.photos).await.map_err(store_err)?;
  Ok(Json(person))
}

/// `POST /api/migrants/{id}/photos/primary` — move the named reference to
/// the front of the list.
pub async fn set_primary<S>(
  State(store): State<Arc<S>>,
  _session: AdminSession,
  Path(person_id): Path<i64>,
  Json(body): Json<PhotoBody>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore + AdminStore + 'static,
{
  let person = store
    .set_primary_photo(person_id, body.photo)
    .await
    .map_err(store_err)?;
  Ok(Json(person))
}

/// `DELETE /api/migrants/{id}/photos` — detach the reference named in the
/// body.
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  _session: AdminSession,
  Path(person_id): Path<i64>,
  Json(body): Json<PhotoBody>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore + AdminStore + 'static,
{
  let person =
    store.remove_photo(person_id, body.photo).await.map_err(store_err)?;
  Ok(Json(person))
}
