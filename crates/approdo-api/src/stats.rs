//! Handler for `GET /api/dashboard/stats`.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use approdo_core::{
  stats::ArchiveStats,
  store::{AdminStore, PersonStore},
};

use crate::{
  auth::AdminSession,
  error::{ApiError, store_err},
};

/// Archive aggregates plus the admin headcount, shaped for the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
  #[serde(flatten)]
  pub archive:      ArchiveStats,
  pub total_admins: u64,
}

/// `GET /api/dashboard/stats`
pub async fn dashboard<S>(
  State(store): State<Arc<S>>,
  _session: AdminSession,
) -> Result<Json<DashboardStats>, ApiError>
where
  S: PersonStore + AdminStore + 'static,
{
  let archive = store.stats().await.map_err(store_err)?;
  let total_admins = store.count_admins().await.map_err(store_err)?;
  Ok(Json(DashboardStats { archive, total_admins }))
}
