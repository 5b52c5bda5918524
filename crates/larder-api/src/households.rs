//! Handlers for household, membership and profile endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/households` | Body: [`CreateHouseholdBody`]; creator auto-joins; 201 |
//! | `GET`  | `/households/:id` | Members only |
//! | `GET`  | `/households/:id/members` | Roster in join order |
//! | `POST` | `/households/:id/members` | Body: [`AddMemberBody`]; re-adding renames |
//! | `GET`  | `/households/:id/profiles` | Every stored dietary profile |
//! | `PUT`  | `/households/:id/profile` | Whole-record upsert of the caller's own profile |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use larder_core::{
  generate::PlanGenerator,
  household::{
    Household, Member, MemberProfile, NewHousehold, NewMember, ProfileInput,
  },
  store::HouseholdStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  identity::{UserId, require_member},
};

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /households`.
#[derive(Debug, Deserialize)]
pub struct CreateHouseholdBody {
  pub name:          String,
  pub weekly_budget: Option<f64>,
  /// Display name the creator enrolls under.
  pub display_name:  String,
}

/// `POST /households` — returns 201 + the stored [`Household`].
///
/// The caller becomes the first member, so there is no window in which a
/// household exists with nobody allowed to touch it.
pub async fn create<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Json(body): Json<CreateHouseholdBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  let input = NewHousehold {
    name:          body.name,
    weekly_budget: body.weekly_budget,
  };
  input.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let creator = NewMember {
    user_id:      user.0,
    display_name: body.display_name,
  };
  creator.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let household = state
    .store
    .create_household(input, creator)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(household)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /households/:id`
pub async fn get_one<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
) -> Result<Json<Household>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  let household = require_member(state.store.as_ref(), id, user).await?;
  Ok(Json(household))
}

// ─── Members ──────────────────────────────────────────────────────────────────

/// `GET /households/:id/members`
pub async fn list_members<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Member>>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  require_member(state.store.as_ref(), id, user).await?;
  let members = state
    .store
    .list_members(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(members))
}

/// JSON body accepted by `POST /households/:id/members`.
#[derive(Debug, Deserialize)]
pub struct AddMemberBody {
  pub user_id:      Uuid,
  pub display_name: String,
}

/// `POST /households/:id/members` — returns 201 + the stored [`Member`].
///
/// Adding a user who is already enrolled refreshes their display name
/// rather than failing.
pub async fn add_member<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
  Json(body): Json<AddMemberBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  require_member(state.store.as_ref(), id, user).await?;

  let input = NewMember {
    user_id:      body.user_id,
    display_name: body.display_name,
  };
  input.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let member = state
    .store
    .add_member(id, input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(member)))
}

// ─── Profiles ─────────────────────────────────────────────────────────────────

/// `GET /households/:id/profiles`
pub async fn list_profiles<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<MemberProfile>>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  require_member(state.store.as_ref(), id, user).await?;
  let profiles = state
    .store
    .list_profiles(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(profiles))
}

/// `PUT /households/:id/profile` — whole-record upsert of the *caller's*
/// dietary profile. Fields left out of the body clear the stored value.
pub async fn put_profile<S, G>(
  State(state): State<AppState<S, G>>,
  user: UserId,
  Path(id): Path<Uuid>,
  Json(input): Json<ProfileInput>,
) -> Result<Json<MemberProfile>, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: PlanGenerator,
{
  require_member(state.store.as_ref(), id, user).await?;
  let profile = state
    .store
    .upsert_profile(id, user.0, input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(profile))
}
