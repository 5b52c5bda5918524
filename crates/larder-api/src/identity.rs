//! Caller identity and the household membership guard.
//!
//! Authentication proper lives upstream (a reverse proxy or session layer);
//! this API trusts the `x-user-id` header it is handed and enforces only
//! *authorization*: every household-scoped route checks membership.

use axum::{extract::FromRequestParts, http::request::Parts};
use larder_core::{household::Household, store::HouseholdStore};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated caller's UUID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, extracted from [`USER_ID_HEADER`].
///
/// A missing or non-UUID header value rejects the request with 401 before
/// the handler body runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

impl<State> FromRequestParts<State> for UserId
where
  State: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &State,
  ) -> Result<Self, Self::Rejection> {
    let raw = parts
      .headers
      .get(USER_ID_HEADER)
      .and_then(|value| value.to_str().ok())
      .ok_or(ApiError::Unauthorized)?;
    let id = raw.parse::<Uuid>().map_err(|_| ApiError::Unauthorized)?;
    Ok(UserId(id))
  }
}

/// Look up `household_id` and confirm `user` belongs to it.
///
/// An unknown household is a 404; a known household the caller is outside
/// of is a 403. Returns the household so handlers that need the row (stats,
/// plan generation) avoid a second fetch.
pub async fn require_member<S>(
  store: &S,
  household_id: Uuid,
  user: UserId,
) -> Result<Household, ApiError>
where
  S: HouseholdStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let household = store
    .get_household(household_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("household {household_id} not found"))
    })?;

  let is_member = store
    .is_member(household_id, user.0)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !is_member {
    return Err(ApiError::Forbidden);
  }

  Ok(household)
}
