//! Handlers for meal decision and feedback endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/meals/:id/decision` | Body: [`DecisionBody`]; one decision per member, re-posting overwrites |
//! | `GET`  | `/meals/:id/feedback` | Approval tallies plus every current decision |
//!
//! Meals carry no household id of their own, so both routes resolve
//! meal → plan → household before the membership check.

use axum::{
  Json,
  extract::{Path, State},
};
use larder_core::{
  feedback::{MealDecision, MealFeedback, NewDecision},
  generate::PlanGenerator,
  store::HouseholdStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  identity::{UserId, require_member},
};

/// JSON body accepted by `POST /meals/:id/decision`.
#[derive(Debug, Deserialize)]
pub struct DecisionBody {
  pub approved: bool,
  pub comment:  Option<String>,
}

/// `POST /meals/:id/decision` — records the caller's verdict on a meal.
///
/// A member re-deciding replaces their earlier decision outright; the meal
/// never carries two decisions from the same person.
pub async fn decide<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(meal_id): Path<Uuid>,
  Json(body): Json<DecisionBody>,
) -> Result<Json<MealDecision>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  let household_id = household_of_meal(state.store.as_ref(), meal_id).await?;
  require_member(state.store.as_ref(), household_id, user).await?;

  let input = NewDecision {
    approved: body.approved,
    comment:  body.comment,
  };
  let decision = state
    .store
    .record_decision(meal_id, user.0, input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(decision))
}

/// `GET /meals/:id/feedback`
pub async fn feedback<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(meal_id): Path<Uuid>,
) -> Result<Json<MealFeedback>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  let household_id = household_of_meal(state.store.as_ref(), meal_id).await?;
  require_member(state.store.as_ref(), household_id, user).await?;

  let feedback = state
    .store
    .meal_feedback(meal_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(feedback))
}

async fn household_of_meal<S>(
  store: &S,
  meal_id: Uuid,
) -> Result<Uuid, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let meal = store
    .get_meal(meal_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("meal {meal_id} not found")))?;
  let plan = store
    .get_plan(meal.plan_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("plan {} not found", meal.plan_id))
    })?;
  Ok(plan.household_id)
}
