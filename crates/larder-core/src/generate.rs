//! Plan generation: the request we assemble from household state and the
//! gateway trait an external generator implements.
//!
//! Generation is all-or-nothing. The caller persists the returned meal set
//! in one step or persists nothing; a failed generation never leaves a
//! partial week behind.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  household::{aggregate_restrictions, MemberProfile},
  plan::{MealType, NewMeal},
  Error, Result,
};

// ─── Request assembly ────────────────────────────────────────────────────────

/// Everything the external generator needs to know about a household.
/// `profiles` may be empty (no personalisation) but `household_size` must
/// be at least one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
  pub household_id:          Uuid,
  pub week_start:            NaiveDate,
  pub household_size:        usize,
  /// Union of every member's restrictions; hard constraints.
  pub dietary_restrictions:  Vec<String>,
  /// Per-member profiles for calorie targets and soft preferences.
  pub profiles:              Vec<MemberProfile>,
  /// Names of ingredients on hand, so the generator can favour them.
  pub available_ingredients: Vec<String>,
}

impl GenerationRequest {
  pub fn new(
    household_id: Uuid,
    week_start: NaiveDate,
    household_size: usize,
    profiles: Vec<MemberProfile>,
    available_ingredients: Vec<String>,
  ) -> Result<Self> {
    if household_size == 0 {
      return Err(Error::Validation(
        "cannot generate a plan for a household with no members".into(),
      ));
    }
    let dietary_restrictions = aggregate_restrictions(&profiles);
    Ok(Self {
      household_id,
      week_start,
      household_size,
      dietary_restrictions,
      profiles,
      available_ingredients,
    })
  }
}

// ─── Generator output ────────────────────────────────────────────────────────

/// One meal proposed by the generator, already mapped onto a grid slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedMeal {
  pub day_of_week:  u8,
  pub meal_type:    MealType,
  pub name:         String,
  pub description:  String,
  pub calories:     Option<u32>,
  pub ingredients:  Vec<String>,
  pub instructions: Option<String>,
  pub image_url:    Option<String>,
}

impl From<GeneratedMeal> for NewMeal {
  fn from(meal: GeneratedMeal) -> Self {
    NewMeal {
      day_of_week:  meal.day_of_week,
      meal_type:    meal.meal_type,
      name:         meal.name,
      description:  meal.description,
      calories:     meal.calories,
      ingredients:  meal.ingredients,
      instructions: meal.instructions,
      image_url:    meal.image_url,
    }
  }
}

/// Week-level nutrition estimate reported alongside the meals. Returned to
/// the caller verbatim; not persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NutritionSummary {
  pub protein: f64,
  pub carbs:   f64,
  pub fat:     f64,
  pub fiber:   f64,
}

/// A complete generation result. May cover fewer than the full 21 slots (a
/// partial week is a valid plan), but a missing or malformed nutrition
/// summary is a generation failure, never defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPlan {
  pub meals:     Vec<GeneratedMeal>,
  pub nutrition: NutritionSummary,
}

// ─── The gateway trait ───────────────────────────────────────────────────────

/// An external plan generator. Exactly one attempt per call; retries and
/// fallbacks are the caller's policy, not the gateway's.
pub trait PlanGenerator: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn generate(
    &self,
    request: GenerationRequest,
  ) -> impl Future<Output = Result<GeneratedPlan, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn profile(restrictions: &[&str]) -> MemberProfile {
    MemberProfile {
      household_id:         Uuid::new_v4(),
      user_id:              Uuid::new_v4(),
      daily_calorie_target: Some(2000),
      age:                  None,
      diet:                 None,
      restrictions:         restrictions.iter().map(|s| s.to_string()).collect(),
      preferences:          vec![],
      updated_at:           Utc::now(),
    }
  }

  #[test]
  fn request_unions_member_restrictions() {
    // Three profiles with distinct restrictions: nothing may go missing.
    let week = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    let request = GenerationRequest::new(
      Uuid::new_v4(),
      week,
      3,
      vec![
        profile(&["vegan"]),
        profile(&["nut allergy"]),
        profile(&["lactose intolerant", "Vegan"]),
      ],
      vec!["rice".into(), "tomatoes".into()],
    )
    .unwrap();
    assert_eq!(
      request.dietary_restrictions,
      vec!["vegan", "nut allergy", "lactose intolerant"]
    );
    assert_eq!(request.available_ingredients.len(), 2);
  }

  #[test]
  fn request_rejects_empty_household() {
    let week = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    let result =
      GenerationRequest::new(Uuid::new_v4(), week, 0, vec![], vec![]);
    assert!(matches!(result, Err(Error::Validation(_))));
  }
}
