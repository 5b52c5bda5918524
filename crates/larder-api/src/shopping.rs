//! Handlers for shopping-list endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/households/:id/shopping` | Items oldest-first + estimated total |
//! | `POST` | `/households/:id/shopping` | Body: [`AddItemBody`]; merges into an existing incomplete entry by name |
//! | `POST` | `/households/:id/shopping/derive` | Scan inventory; merge low-stock/expiring candidates |
//! | `POST` | `/shopping/:id/completed` | Body: [`CompletedBody`]; idempotent either way |
//! | `DELETE` | `/shopping/:id` | 204; completed or not |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use larder_core::{
  generate::PlanGenerator,
  shopping::{self, NewShoppingItem, ShoppingItem},
  store::HouseholdStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  identity::{UserId, require_member},
};

/// Current list plus the running total of estimated costs. The total
/// covers every entry that has a cost, completed or not.
#[derive(Debug, Serialize)]
pub struct ShoppingListResponse {
  pub items:           Vec<ShoppingItem>,
  pub estimated_total: f64,
}

/// `GET /households/:id/shopping`
pub async fn list<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
) -> Result<Json<ShoppingListResponse>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  require_member(state.store.as_ref(), id, user).await?;
  let items = state
    .store
    .list_shopping(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let estimated_total = shopping::estimated_total(&items);
  Ok(Json(ShoppingListResponse { items, estimated_total }))
}

/// JSON body accepted by `POST /households/:id/shopping`.
#[derive(Debug, Deserialize)]
pub struct AddItemBody {
  pub name:           String,
  /// Free-text reason, e.g. `"for saturday pancakes"`.
  pub reason:         Option<String>,
  pub estimated_cost: Option<f64>,
  pub store:          Option<String>,
}

/// `POST /households/:id/shopping` — 201 when a fresh entry is created,
/// 200 when the item merged into an existing incomplete entry (its reason
/// appended, missing cost or store backfilled).
pub async fn add_item<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
  Json(body): Json<AddItemBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  require_member(state.store.as_ref(), id, user).await?;

  let input = NewShoppingItem {
    name:           body.name,
    reasons:        body.reason.into_iter().collect(),
    estimated_cost: body.estimated_cost,
    store:          body.store,
  };
  input.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let (item, created) = state
    .store
    .merge_shopping_item(id, input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let status = if created { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(item)))
}

/// `POST /households/:id/shopping/derive`
///
/// Proposes one candidate per low-stock or expiring inventory item, merges
/// each into the list, and returns the refreshed list. Running it twice in
/// a row adds nothing new.
pub async fn derive<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
) -> Result<Json<ShoppingListResponse>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  require_member(state.store.as_ref(), id, user).await?;

  let inventory = state
    .store
    .list_inventory(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let today = Utc::now().date_naive();
  for candidate in shopping::derive_candidates(&inventory, today) {
    state
      .store
      .merge_shopping_item(id, NewShoppingItem::from(candidate))
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
  }

  let items = state
    .store
    .list_shopping(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let estimated_total = shopping::estimated_total(&items);
  Ok(Json(ShoppingListResponse { items, estimated_total }))
}

/// JSON body accepted by `POST /shopping/:id/completed`.
#[derive(Debug, Deserialize)]
pub struct CompletedBody {
  pub completed: bool,
}

/// `POST /shopping/:id/completed` — sets the flag in either direction.
///
/// Completion keeps the entry on the list (ticked off, not gone); only
/// DELETE removes it.
pub async fn set_completed<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(item_id): Path<Uuid>,
  Json(body): Json<CompletedBody>,
) -> Result<Json<ShoppingItem>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  let item = fetch_item(state.store.as_ref(), item_id).await?;
  require_member(state.store.as_ref(), item.household_id, user).await?;

  let updated = state
    .store
    .set_shopping_completed(item_id, body.completed)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("shopping item {item_id} not found"))
    })?;
  Ok(Json(updated))
}

/// `DELETE /shopping/:id` — 204 on success.
pub async fn delete_item<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(item_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  let item = fetch_item(state.store.as_ref(), item_id).await?;
  require_member(state.store.as_ref(), item.household_id, user).await?;

  let deleted = state
    .store
    .delete_shopping_item(item_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !deleted {
    return Err(ApiError::NotFound(format!(
      "shopping item {item_id} not found"
    )));
  }
  Ok(StatusCode::NO_CONTENT)
}

async fn fetch_item<S>(
  store: &S,
  item_id: Uuid,
) -> Result<ShoppingItem, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_shopping_item(item_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("shopping item {item_id} not found"))
    })
}
