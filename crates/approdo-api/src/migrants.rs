//! Handlers for the `/api/migrants` record endpoints.
//!
//! Reads are public; mutations require an [`AdminSession`]. The search
//! endpoint accepts the filter aliases understood by
//! [`Filters::from_raw`] together with `sort_field`, `sort_direction`,
//! `page` and `limit`.

use std::{collections::HashMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use tracing::{debug, info};

use approdo_core::{
  filter::Filters,
  person::{NewPerson, Person},
  query::{DEFAULT_LIMIT, Page, SearchQuery},
  sort::SortSpec,
  store::{AdminStore, PersonStore},
};

use crate::{
  auth::AdminSession,
  error::{ApiError, store_err},
};

/// Pagination parameters are forgiving: a malformed number falls back to
/// its default rather than failing the whole request.
fn uint_param(params: &HashMap<String, String>, key: &str) -> Option<u32> {
  params.get(key).and_then(|v| v.trim().parse().ok())
}

fn str_param<'p>(
  params: &'p HashMap<String, String>,
  keys: &[&str],
) -> Option<&'p str> {
  keys.iter().find_map(|k| params.get(*k)).map(String::as_str)
}

/// `GET /api/migrants` — search with filters, sorting and pagination.
pub async fn search<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Page<Person>>, ApiError>
where
  S: PersonStore + 'static,
{
  // An unknown sort token is rejected before the store is consulted.
  let sort = SortSpec::resolve(
    str_param(&params, &["sort_field", "sortField"]),
    str_param(&params, &["sort_direction", "sortDirection"]),
  )?;
  let query = SearchQuery::new(
    Filters::from_raw(&params),
    sort,
    uint_param(&params, "page").unwrap_or(1),
    uint_param(&params, "limit").unwrap_or(DEFAULT_LIMIT),
  );

  let page = store.search(&query).await.map_err(store_err)?;
  debug!(
    filters = ?query.filters,
    page = page.page,
    total = page.total,
    "record search"
  );
  Ok(Json(page))
}

/// `GET /api/migrants/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(person_id): Path<i64>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore + 'static,
{
  let person =
    store.get(person_id).await.map_err(store_err)?.ok_or_else(|| {
      ApiError::NotFound(format!("record {person_id} not found"))
    })?;
  Ok(Json(person))
}

/// `POST /api/migrants` — store a new record, returning it with a 201.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  _session: AdminSession,
  Json(input): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore + AdminStore + 'static,
{
  let person = store.create(input).await.map_err(store_err)?;
  info!(person_id = person.person_id, "record created");
  Ok((StatusCode::CREATED, Json(person)))
}

/// `PUT /api/migrants/{id}` — whole-record replacement.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  _session: AdminSession,
  Path(person_id): Path<i64>,
  Json(input): Json<NewPerson>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore + AdminStore + 'static,
{
  let person =
    store.update(person_id, input).await.map_err(store_err)?.ok_or_else(
      || ApiError::NotFound(format!("record {person_id} not found")),
    )?;
  info!(person_id, "record updated");
  Ok(Json(person))
}

/// `DELETE /api/migrants/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  _session: AdminSession,
  Path(person_id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore + AdminStore + 'static,
{
  if store.delete(person_id).await.map_err(store_err)? {
    info!(person_id, "record deleted");
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("record {person_id} not found")))
  }
}
