//! Handlers for inventory and expense endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/households/:id/inventory` | Alphabetical snapshot |
//! | `POST` | `/households/:id/inventory` | Body: [`NewInventoryItem`]; upsert by normalised name |
//! | `GET`  | `/households/:id/expenses` | Newest first |
//! | `POST` | `/households/:id/expenses` | Body: [`NewExpense`]; append-only |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use larder_core::{
  generate::PlanGenerator,
  pantry::{Expense, InventoryItem, NewExpense, NewInventoryItem},
  store::HouseholdStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  identity::{UserId, require_member},
};

// ─── Inventory ────────────────────────────────────────────────────────────────

/// `GET /households/:id/inventory`
pub async fn list_inventory<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<InventoryItem>>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  require_member(state.store.as_ref(), id, user).await?;
  let items = state
    .store
    .list_inventory(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(items))
}

/// `POST /households/:id/inventory` — returns 201 + the stored item.
///
/// Re-posting a name the household already stocks (case-insensitively)
/// replaces that record rather than creating a duplicate.
pub async fn upsert_item<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
  Json(input): Json<NewInventoryItem>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  require_member(state.store.as_ref(), id, user).await?;
  input.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let item = state
    .store
    .upsert_inventory_item(id, input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(item)))
}

// ─── Expenses ─────────────────────────────────────────────────────────────────

/// `GET /households/:id/expenses`
pub async fn list_expenses<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Expense>>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  require_member(state.store.as_ref(), id, user).await?;
  let expenses = state
    .store
    .list_expenses(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(expenses))
}

/// `POST /households/:id/expenses` — returns 201 + the stored expense.
pub async fn add_expense<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
  Json(input): Json<NewExpense>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  require_member(state.store.as_ref(), id, user).await?;
  input.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let expense = state
    .store
    .add_expense(id, input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(expense)))
}
