//! Handler for the household dashboard snapshot.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/households/:id/stats` | Budget, trailing 7-day spend, pantry and plan counts |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use larder_core::{
  generate::PlanGenerator,
  stats::{self, HouseholdStats},
  store::HouseholdStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  identity::{UserId, require_member},
};

/// `GET /households/:id/stats`
///
/// Composed from live reads at request time; nothing here is cached or
/// denormalised, so the snapshot is always consistent with the stores it
/// summarises.
pub async fn handler<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
) -> Result<Json<HouseholdStats>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  let household = require_member(state.store.as_ref(), id, user).await?;

  let members = state
    .store
    .list_members(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let latest = state
    .store
    .latest_plan(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let planned_meals = latest.map(|view| view.meals.len()).unwrap_or(0);
  let inventory = state
    .store
    .list_inventory(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let expenses = state
    .store
    .list_expenses(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let stats = stats::compute_stats(
    &household,
    members.len(),
    planned_meals,
    &inventory,
    &expenses,
    Utc::now(),
  );
  Ok(Json(stats))
}
