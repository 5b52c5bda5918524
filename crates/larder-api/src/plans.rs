//! Handlers for plan and comment endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/households/:id/plan` | `?week_start` optional; any date normalises to its Monday |
//! | `POST` | `/households/:id/plan/generate` | Body: [`GenerateBody`]; all-or-nothing persist |
//! | `GET`  | `/plans/:id/comments` | Thread for the week, newest first |
//! | `POST` | `/plans/:id/comments` | Body: [`CommentBody`]; 201 |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use larder_core::{
  feedback::{NewComment, PlanComment},
  generate::{GenerationRequest, NutritionSummary, PlanGenerator},
  plan::{self, Meal, MealPlan, MealType, NewMeal, PlanView},
  store::HouseholdStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  identity::{UserId, require_member},
};

// ─── Fetch ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PlanParams {
  /// Any date inside the wanted week. Defaults to today (UTC).
  pub week_start: Option<NaiveDate>,
}

/// Response shape for plan reads and generation: the grid plus a
/// completeness flag so clients need not count slots themselves.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
  pub plan:     MealPlan,
  pub meals:    Vec<Meal>,
  pub complete: bool,
}

impl From<PlanView> for PlanResponse {
  fn from(view: PlanView) -> Self {
    let complete = view.is_complete();
    PlanResponse { plan: view.plan, meals: view.meals, complete }
  }
}

/// `GET /households/:id/plan[?week_start=YYYY-MM-DD]`
///
/// A week nobody has generated yet is a 404, never an empty grid.
pub async fn get_for_week<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
  Query(params): Query<PlanParams>,
) -> Result<Json<PlanResponse>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  require_member(state.store.as_ref(), id, user).await?;

  let week = plan::week_start_of(
    params.week_start.unwrap_or_else(|| Utc::now().date_naive()),
  );
  let view = state
    .store
    .plan_for_week(id, week)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no plan for the week of {week}"))
    })?;
  Ok(Json(PlanResponse::from(view)))
}

// ─── Generate ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /households/:id/plan/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
  /// Any date inside the target week. Defaults to today (UTC).
  pub week_start: Option<NaiveDate>,
}

/// Generation response: the stored grid plus the generator's plan-level
/// nutrition numbers, which are reported but not persisted.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
  pub plan:      MealPlan,
  pub meals:     Vec<Meal>,
  pub nutrition: NutritionSummary,
  pub complete:  bool,
}

/// `POST /households/:id/plan/generate`
///
/// Collects the household context (size, dietary profiles, pantry names),
/// calls the gateway, validates the returned batch, and only then persists
/// it — replacing the week's previous meals and their decisions while the
/// comment thread survives. A failed or malformed generation is a 502 and
/// leaves the stored week exactly as it was.
pub async fn generate<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
  Json(body): Json<GenerateBody>,
) -> Result<Json<GenerateResponse>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
  G::Error: std::error::Error + Send + Sync + 'static,
{
  require_member(state.store.as_ref(), id, user).await?;

  let week = plan::week_start_of(
    body.week_start.unwrap_or_else(|| Utc::now().date_naive()),
  );

  let members = state
    .store
    .list_members(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let profiles = state
    .store
    .list_profiles(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let pantry = state
    .store
    .list_inventory(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let available = pantry.into_iter().map(|item| item.name).collect();

  let request =
    GenerationRequest::new(id, week, members.len(), profiles, available)
      .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let generated = state
    .generator
    .generate(request)
    .await
    .map_err(|e| ApiError::GenerationFailed(Box::new(e)))?;

  // A structurally valid response can still be semantically bad (day out of
  // range, two meals in one slot). That is the generator's fault, not the
  // caller's, so it reports as a failed generation.
  let batch: Vec<NewMeal> =
    generated.meals.into_iter().map(NewMeal::from).collect();
  plan::validate_meal_batch(&batch)
    .map_err(|e| ApiError::GenerationFailed(Box::new(e)))?;

  let plan = state
    .store
    .get_or_create_plan(id, week)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let meals = state
    .store
    .replace_plan_meals(plan.plan_id, batch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let complete = meals.len() >= plan::FULL_WEEK_MEALS;
  Ok(Json(GenerateResponse {
    plan,
    meals,
    nutrition: generated.nutrition,
    complete,
  }))
}

// ─── Comments ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /plans/:id/comments`.
#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub text:        String,
  /// Slot tag: give both fields to pin the comment to one meal slot, or
  /// neither to address the week as a whole.
  pub day_of_week: Option<u8>,
  pub meal_type:   Option<MealType>,
}

/// `POST /plans/:id/comments` — returns 201 + the stored comment.
///
/// Comments are immutable and outlive plan regeneration.
pub async fn post_comment<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(plan_id): Path<Uuid>,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  let plan = fetch_plan(state.store.as_ref(), plan_id).await?;
  require_member(state.store.as_ref(), plan.household_id, user).await?;

  let input = NewComment {
    body:        body.text,
    day_of_week: body.day_of_week,
    meal_type:   body.meal_type,
  };
  input.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let comment = state
    .store
    .post_comment(plan_id, user.0, input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /plans/:id/comments` — newest first.
pub async fn list_comments<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(plan_id): Path<Uuid>,
) -> Result<Json<Vec<PlanComment>>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  let plan = fetch_plan(state.store.as_ref(), plan_id).await?;
  require_member(state.store.as_ref(), plan.household_id, user).await?;

  let comments = state
    .store
    .list_comments(plan_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(comments))
}

async fn fetch_plan<S>(store: &S, plan_id: Uuid) -> Result<MealPlan, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_plan(plan_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("plan {plan_id} not found")))
}
