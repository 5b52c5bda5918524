//! JSON REST API for Larder.
//!
//! Exposes an axum [`Router`] backed by any
//! [`larder_core::store::HouseholdStore`] plus a
//! [`larder_core::generate::PlanGenerator`] for the external meal-plan
//! service. Authentication proper, TLS, and transport concerns are the
//! caller's responsibility: the router trusts the `x-user-id` header it is
//! handed and enforces household membership on every scoped route.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", larder_api::api_router(state.clone()))
//! ```

pub mod error;
pub mod households;
pub mod identity;
pub mod meals;
pub mod pantry;
pub mod plans;
pub mod shopping;
pub mod stats;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use larder_core::{generate::PlanGenerator, store::HouseholdStore};

pub use error::ApiError;
pub use identity::{USER_ID_HEADER, UserId};

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState<S: HouseholdStore, G: PlanGenerator> {
  /// Backing household store.
  pub store:     Arc<S>,
  /// Gateway to the external plan generator.
  pub generator: Arc<G>,
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, G>(state: AppState<S, G>) -> Router<()>
where
  S: HouseholdStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator + Clone + Send + Sync + 'static,
  G::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Households, membership, profiles
    .route("/households", post(households::create::<S, G>))
    .route("/households/{id}", get(households::get_one::<S, G>))
    .route(
      "/households/{id}/members",
      get(households::list_members::<S, G>)
        .post(households::add_member::<S, G>),
    )
    .route(
      "/households/{id}/profiles",
      get(households::list_profiles::<S, G>),
    )
    .route("/households/{id}/profile", put(households::put_profile::<S, G>))
    // Plans and comments
    .route("/households/{id}/plan", get(plans::get_for_week::<S, G>))
    .route("/households/{id}/plan/generate", post(plans::generate::<S, G>))
    .route(
      "/plans/{id}/comments",
      get(plans::list_comments::<S, G>).post(plans::post_comment::<S, G>),
    )
    // Meal decisions
    .route("/meals/{id}/decision", post(meals::decide::<S, G>))
    .route("/meals/{id}/feedback", get(meals::feedback::<S, G>))
    // Pantry
    .route(
      "/households/{id}/inventory",
      get(pantry::list_inventory::<S, G>).post(pantry::upsert_item::<S, G>),
    )
    .route(
      "/households/{id}/expenses",
      get(pantry::list_expenses::<S, G>).post(pantry::add_expense::<S, G>),
    )
    // Shopping list
    .route(
      "/households/{id}/shopping",
      get(shopping::list::<S, G>).post(shopping::add_item::<S, G>),
    )
    .route(
      "/households/{id}/shopping/derive",
      post(shopping::derive::<S, G>),
    )
    .route("/shopping/{id}/completed", post(shopping::set_completed::<S, G>))
    .route("/shopping/{id}", delete(shopping::delete_item::<S, G>))
    // Stats
    .route("/households/{id}/stats", get(stats::handler::<S, G>))
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{Days, Utc};
  use larder_core::{
    generate::{
      GeneratedMeal, GeneratedPlan, GenerationRequest, NutritionSummary,
      PlanGenerator,
    },
    plan::MealType,
  };
  use larder_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  type TestState = AppState<SqliteStore, StubGenerator>;

  /// Scripted generator: hands back a fixed plan, or fails when scripted
  /// with `None`.
  #[derive(Clone)]
  struct StubGenerator {
    plan: Option<GeneratedPlan>,
  }

  #[derive(Debug, thiserror::Error)]
  #[error("generator offline")]
  struct StubError;

  impl PlanGenerator for StubGenerator {
    type Error = StubError;

    async fn generate(
      &self,
      _request: GenerationRequest,
    ) -> Result<GeneratedPlan, StubError> {
      self.plan.clone().ok_or(StubError)
    }
  }

  async fn make_state(plan: Option<GeneratedPlan>) -> TestState {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:     Arc::new(store),
      generator: Arc::new(StubGenerator { plan }),
    }
  }

  fn gen_meal(day: u8, meal_type: MealType, name: &str) -> GeneratedMeal {
    GeneratedMeal {
      day_of_week:  day,
      meal_type,
      name:         name.to_string(),
      description:  format!("{name} for everyone"),
      calories:     Some(540),
      ingredients:  vec!["eggs".into(), "flour".into()],
      instructions: None,
      image_url:    None,
    }
  }

  fn gen_plan(meals: Vec<GeneratedMeal>) -> GeneratedPlan {
    GeneratedPlan {
      meals,
      nutrition: NutritionSummary {
        protein: 130.0,
        carbs:   260.0,
        fat:     80.0,
        fiber:   35.0,
      },
    }
  }

  async fn send(
    state: &TestState,
    method: &str,
    uri: &str,
    user: Option<Uuid>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      builder = builder.header(USER_ID_HEADER, user.to_string());
    }
    let request = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let response = api_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  /// Create a household ("Harding house", budget 200) with `user` as "Ren".
  async fn create_household(state: &TestState, user: Uuid) -> Uuid {
    let (status, body) = send(
      state,
      "POST",
      "/households",
      Some(user),
      Some(json!({
        "name": "Harding house",
        "weekly_budget": 200.0,
        "display_name": "Ren"
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["household_id"].as_str().unwrap().parse().unwrap()
  }

  /// Generate a plan for the week of 2025-03-03 and return the response body.
  async fn generate_week(state: &TestState, household: Uuid, user: Uuid) -> Value {
    let (status, body) = send(
      state,
      "POST",
      &format!("/households/{household}/plan/generate"),
      Some(user),
      Some(json!({ "week_start": "2025-03-03" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
  }

  // ─── Identity and membership ────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_identity_is_rejected() {
    let state = make_state(None).await;
    let (status, body) = send(
      &state,
      "GET",
      &format!("/households/{}", Uuid::new_v4()),
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("x-user-id"));
  }

  #[tokio::test]
  async fn unknown_household_is_not_found() {
    let state = make_state(None).await;
    let (status, _) = send(
      &state,
      "GET",
      &format!("/households/{}", Uuid::new_v4()),
      Some(Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn outsiders_are_forbidden() {
    let state = make_state(None).await;
    let insider = Uuid::new_v4();
    let household = create_household(&state, insider).await;

    let (status, _) = send(
      &state,
      "GET",
      &format!("/households/{household}"),
      Some(Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  // ─── Households and members ─────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_fetch_household() {
    let state = make_state(None).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let (status, body) = send(
      &state,
      "GET",
      &format!("/households/{household}"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Harding house");
    assert_eq!(body["weekly_budget"], 200.0);

    let (status, members) = send(
      &state,
      "GET",
      &format!("/households/{household}/members"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members.as_array().unwrap().len(), 1);
    assert_eq!(members[0]["display_name"], "Ren");
  }

  #[tokio::test]
  async fn adding_a_member_twice_renames_them() {
    let state = make_state(None).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;
    let partner = Uuid::new_v4();

    let (status, _) = send(
      &state,
      "POST",
      &format!("/households/{household}/members"),
      Some(user),
      Some(json!({ "user_id": partner, "display_name": "Jo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(
      &state,
      "POST",
      &format!("/households/{household}/members"),
      Some(user),
      Some(json!({ "user_id": partner, "display_name": "Johanna" })),
    )
    .await;
    assert_eq!(body["display_name"], "Johanna");

    let (_, members) = send(
      &state,
      "GET",
      &format!("/households/{household}/members"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(members.as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn profile_upsert_is_whole_record() {
    let state = make_state(None).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let (status, body) = send(
      &state,
      "PUT",
      &format!("/households/{household}/profile"),
      Some(user),
      Some(json!({
        "daily_calorie_target": 2200,
        "diet": "pescatarian",
        "restrictions": ["Shellfish", "shellfish", "peanuts"]
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["restrictions"], json!(["Shellfish", "peanuts"]));

    // Re-submitting without the optional fields clears them.
    let (_, body) = send(
      &state,
      "PUT",
      &format!("/households/{household}/profile"),
      Some(user),
      Some(json!({ "restrictions": ["peanuts"] })),
    )
    .await;
    assert_eq!(body["daily_calorie_target"], Value::Null);
    assert_eq!(body["diet"], Value::Null);

    let (_, profiles) = send(
      &state,
      "GET",
      &format!("/households/{household}/profiles"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(profiles.as_array().unwrap().len(), 1);
  }

  // ─── Plans ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn plan_is_never_synthesised_on_read() {
    let state = make_state(None).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let (status, _) = send(
      &state,
      "GET",
      &format!("/households/{household}/plan?week_start=2025-03-05"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn generate_persists_the_returned_plan() {
    let plan = gen_plan(vec![
      gen_meal(0, MealType::Breakfast, "Congee"),
      gen_meal(0, MealType::Lunch, "Bibimbap"),
    ]);
    let state = make_state(Some(plan)).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    // A Wednesday; the stored plan lands on its Monday.
    let (status, body) = send(
      &state,
      "POST",
      &format!("/households/{household}/plan/generate"),
      Some(user),
      Some(json!({ "week_start": "2025-03-05" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"]["week_start"], "2025-03-03");
    assert_eq!(body["meals"].as_array().unwrap().len(), 2);
    assert_eq!(body["complete"], false);
    assert_eq!(body["nutrition"]["protein"], 130.0);

    // Any date in the same week reads it back.
    let (status, fetched) = send(
      &state,
      "GET",
      &format!("/households/{household}/plan?week_start=2025-03-07"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["meals"].as_array().unwrap().len(), 2);
    assert_eq!(fetched["complete"], false);
  }

  #[tokio::test]
  async fn failed_generation_leaves_no_plan() {
    let state = make_state(None).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let (status, _) = send(
      &state,
      "POST",
      &format!("/households/{household}/plan/generate"),
      Some(user),
      Some(json!({ "week_start": "2025-03-03" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = send(
      &state,
      "GET",
      &format!("/households/{household}/plan?week_start=2025-03-03"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn duplicate_slot_output_is_a_generation_failure() {
    let plan = gen_plan(vec![
      gen_meal(2, MealType::Dinner, "Laksa"),
      gen_meal(2, MealType::Dinner, "Ramen"),
    ]);
    let state = make_state(Some(plan)).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let (status, _) = send(
      &state,
      "POST",
      &format!("/households/{household}/plan/generate"),
      Some(user),
      Some(json!({ "week_start": "2025-03-03" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = send(
      &state,
      "GET",
      &format!("/households/{household}/plan?week_start=2025-03-03"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn regeneration_clears_decisions_and_keeps_comments() {
    let plan = gen_plan(vec![gen_meal(4, MealType::Dinner, "Tagine")]);
    let state = make_state(Some(plan)).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let body = generate_week(&state, household, user).await;
    let plan_id = body["plan"]["plan_id"].as_str().unwrap().to_string();
    let meal_id = body["meals"][0]["meal_id"].as_str().unwrap().to_string();

    let (status, _) = send(
      &state,
      "POST",
      &format!("/meals/{meal_id}/decision"),
      Some(user),
      Some(json!({ "approved": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
      &state,
      "POST",
      &format!("/plans/{plan_id}/comments"),
      Some(user),
      Some(json!({ "text": "more veg this week please" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Same week again: the plan row survives, the meals are new.
    let body = generate_week(&state, household, user).await;
    assert_eq!(body["plan"]["plan_id"].as_str().unwrap(), plan_id);
    let new_meal_id = body["meals"][0]["meal_id"].as_str().unwrap().to_string();
    assert_ne!(new_meal_id, meal_id);

    let (_, feedback) = send(
      &state,
      "GET",
      &format!("/meals/{new_meal_id}/feedback"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(feedback["approvals"], 0);
    assert_eq!(feedback["decisions"].as_array().unwrap().len(), 0);

    // The old meal is gone entirely.
    let (status, _) = send(
      &state,
      "GET",
      &format!("/meals/{meal_id}/feedback"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, comments) = send(
      &state,
      "GET",
      &format!("/plans/{plan_id}/comments"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["body"], "more veg this week please");
  }

  // ─── Decisions and comments ─────────────────────────────────────────────────

  #[tokio::test]
  async fn re_deciding_replaces_the_previous_verdict() {
    let plan = gen_plan(vec![gen_meal(1, MealType::Lunch, "Minestrone")]);
    let state = make_state(Some(plan)).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let body = generate_week(&state, household, user).await;
    let meal_id = body["meals"][0]["meal_id"].as_str().unwrap().to_string();

    let (status, _) = send(
      &state,
      "POST",
      &format!("/meals/{meal_id}/decision"),
      Some(user),
      Some(json!({ "approved": true, "comment": "love it" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, decision) = send(
      &state,
      "POST",
      &format!("/meals/{meal_id}/decision"),
      Some(user),
      Some(json!({ "approved": false, "comment": "actually no" })),
    )
    .await;
    assert_eq!(decision["approved"], false);

    let (_, feedback) = send(
      &state,
      "GET",
      &format!("/meals/{meal_id}/feedback"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(feedback["approvals"], 0);
    assert_eq!(feedback["rejections"], 1);
    assert_eq!(feedback["decisions"].as_array().unwrap().len(), 1);
    assert_eq!(feedback["decisions"][0]["comment"], "actually no");
  }

  #[tokio::test]
  async fn outsiders_cannot_touch_meals() {
    let plan = gen_plan(vec![gen_meal(3, MealType::Dinner, "Dal")]);
    let state = make_state(Some(plan)).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let body = generate_week(&state, household, user).await;
    let meal_id = body["meals"][0]["meal_id"].as_str().unwrap().to_string();

    let stranger = Uuid::new_v4();
    let (status, _) = send(
      &state,
      "POST",
      &format!("/meals/{meal_id}/decision"),
      Some(stranger),
      Some(json!({ "approved": true })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
      &state,
      "GET",
      &format!("/meals/{meal_id}/feedback"),
      Some(stranger),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn comment_slot_tag_is_all_or_nothing() {
    let plan = gen_plan(vec![gen_meal(2, MealType::Dinner, "Paella")]);
    let state = make_state(Some(plan)).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let body = generate_week(&state, household, user).await;
    let plan_id = body["plan"]["plan_id"].as_str().unwrap().to_string();

    let (status, _) = send(
      &state,
      "POST",
      &format!("/plans/{plan_id}/comments"),
      Some(user),
      Some(json!({ "text": "too spicy", "day_of_week": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, comment) = send(
      &state,
      "POST",
      &format!("/plans/{plan_id}/comments"),
      Some(user),
      Some(json!({
        "text": "swap this one",
        "day_of_week": 2,
        "meal_type": "dinner"
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["meal_type"], "dinner");
  }

  // ─── Pantry and stats ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn inventory_upsert_replaces_by_name() {
    let state = make_state(None).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let (status, _) = send(
      &state,
      "POST",
      &format!("/households/{household}/inventory"),
      Some(user),
      Some(json!({ "name": "Milk", "quantity": 2.0, "low_stock_threshold": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    send(
      &state,
      "POST",
      &format!("/households/{household}/inventory"),
      Some(user),
      Some(json!({
        "name": "  milk ",
        "quantity": 0.5,
        "unit": "l",
        "low_stock_threshold": 1
      })),
    )
    .await;

    let (_, items) = send(
      &state,
      "GET",
      &format!("/households/{household}/inventory"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["quantity"], 0.5);
    assert_eq!(items[0]["unit"], "l");
  }

  #[tokio::test]
  async fn stats_summarise_the_household() {
    let plan = gen_plan(vec![
      gen_meal(0, MealType::Breakfast, "Oats"),
      gen_meal(0, MealType::Lunch, "Soup"),
      gen_meal(0, MealType::Dinner, "Curry"),
    ]);
    let state = make_state(Some(plan)).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    for (amount, what) in [(45.0, "greengrocer"), (12.5, "market")] {
      let (status, _) = send(
        &state,
        "POST",
        &format!("/households/{household}/expenses"),
        Some(user),
        Some(json!({ "amount": amount, "description": what })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    send(
      &state,
      "POST",
      &format!("/households/{household}/inventory"),
      Some(user),
      Some(json!({ "name": "rice", "quantity": 0.2, "low_stock_threshold": 1 })),
    )
    .await;
    send(
      &state,
      "POST",
      &format!("/households/{household}/inventory"),
      Some(user),
      Some(json!({ "name": "beans", "quantity": 6.0, "low_stock_threshold": 1 })),
    )
    .await;

    generate_week(&state, household, user).await;

    let (status, stats) = send(
      &state,
      "GET",
      &format!("/households/{household}/stats"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["weekly_spent"], 57.5);
    assert_eq!(stats["weekly_budget"], 200.0);
    assert_eq!(stats["low_stock_count"], 1);
    assert_eq!(stats["planned_meals"], 3);
    assert_eq!(stats["family_members"], 1);
  }

  #[tokio::test]
  async fn stats_fall_back_to_the_default_budget() {
    let state = make_state(None).await;
    let user = Uuid::new_v4();
    let (status, body) = send(
      &state,
      "POST",
      "/households",
      Some(user),
      Some(json!({ "name": "No-budget house", "display_name": "Kit" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let household = body["household_id"].as_str().unwrap();

    let (_, stats) = send(
      &state,
      "GET",
      &format!("/households/{household}/stats"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(stats["weekly_budget"], 300.0);
    assert_eq!(stats["planned_meals"], 0);
  }

  // ─── Shopping list ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn manual_shopping_adds_merge_by_name() {
    let state = make_state(None).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let (status, _) = send(
      &state,
      "POST",
      &format!("/households/{household}/shopping"),
      Some(user),
      Some(json!({
        "name": "Butter",
        "reason": "baking saturday",
        "estimated_cost": 3.5
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, merged) = send(
      &state,
      "POST",
      &format!("/households/{household}/shopping"),
      Some(user),
      Some(json!({ "name": "  butter ", "reason": "toast" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(merged["reasons"], json!(["baking saturday", "toast"]));
    assert_eq!(merged["estimated_cost"], 3.5);

    let (_, list) = send(
      &state,
      "GET",
      &format!("/households/{household}/shopping"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(list["items"].as_array().unwrap().len(), 1);
    assert_eq!(list["estimated_total"], 3.5);
  }

  #[tokio::test]
  async fn derive_consolidates_pantry_into_the_list() {
    let state = make_state(None).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let tomorrow =
      (Utc::now().date_naive() + Days::new(1)).format("%Y-%m-%d").to_string();
    for body in [
      json!({ "name": "Milk", "quantity": 0.5, "cost": 1.2, "low_stock_threshold": 1 }),
      json!({ "name": "Yoghurt", "quantity": 4.0, "low_stock_threshold": 1, "expiry_date": tomorrow }),
      json!({ "name": "Pasta", "quantity": 8.0, "low_stock_threshold": 2 }),
    ] {
      let (status, _) = send(
        &state,
        "POST",
        &format!("/households/{household}/inventory"),
        Some(user),
        Some(body),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (status, list) = send(
      &state,
      "POST",
      &format!("/households/{household}/shopping/derive"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = list["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);

    let milk = items.iter().find(|i| i["name"] == "Milk").unwrap();
    assert_eq!(milk["reasons"], json!(["low stock"]));
    assert_eq!(milk["estimated_cost"], 1.2);
    let yoghurt = items.iter().find(|i| i["name"] == "Yoghurt").unwrap();
    assert_eq!(yoghurt["reasons"], json!(["expiring soon"]));

    // Running the consolidation again adds nothing.
    let (_, list) = send(
      &state,
      "POST",
      &format!("/households/{household}/shopping/derive"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(list["items"].as_array().unwrap().len(), 2);
    let milk = list["items"]
      .as_array()
      .unwrap()
      .iter()
      .find(|i| i["name"] == "Milk")
      .unwrap();
    assert_eq!(milk["reasons"], json!(["low stock"]));
  }

  #[tokio::test]
  async fn completion_keeps_the_entry_until_deleted() {
    let state = make_state(None).await;
    let user = Uuid::new_v4();
    let household = create_household(&state, user).await;

    let (_, item) = send(
      &state,
      "POST",
      &format!("/households/{household}/shopping"),
      Some(user),
      Some(json!({ "name": "Coffee" })),
    )
    .await;
    let item_id = item["item_id"].as_str().unwrap().to_string();

    let (status, ticked) = send(
      &state,
      "POST",
      &format!("/shopping/{item_id}/completed"),
      Some(user),
      Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ticked["completed"], true);

    let (_, list) = send(
      &state,
      "GET",
      &format!("/households/{household}/shopping"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(list["items"].as_array().unwrap().len(), 1);

    let (status, _) = send(
      &state,
      "DELETE",
      &format!("/shopping/{item_id}"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = send(
      &state,
      "GET",
      &format!("/households/{household}/shopping"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(list["items"].as_array().unwrap().len(), 0);

    let (status, _) = send(
      &state,
      "DELETE",
      &format!("/shopping/{item_id}"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
