//! Error type for `larder-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] larder_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column could not be decoded back into its domain type.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("household not found: {0}")]
  HouseholdNotFound(uuid::Uuid),

  #[error("meal plan not found: {0}")]
  PlanNotFound(uuid::Uuid),

  #[error("meal not found: {0}")]
  MealNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
