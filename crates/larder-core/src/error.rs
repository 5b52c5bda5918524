//! Error types for `larder-core`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("household not found: {0}")]
  HouseholdNotFound(Uuid),

  #[error("meal plan not found: {0}")]
  PlanNotFound(Uuid),

  #[error("meal not found: {0}")]
  MealNotFound(Uuid),

  #[error("shopping item not found: {0}")]
  ShoppingItemNotFound(Uuid),

  /// Plans are keyed by the Monday their week starts on.
  #[error("week start {0} is not a Monday")]
  NotAWeekStart(NaiveDate),

  #[error("unknown meal type: {0:?}")]
  UnknownMealType(String),

  /// Malformed input rejected before any persistence.
  #[error("validation failed: {0}")]
  Validation(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
