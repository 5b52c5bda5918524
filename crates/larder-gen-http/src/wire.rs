//! Wire DTOs for the generator's camelCase JSON contract.
//!
//! Conversion into core types is strict: a missing or invalid required
//! field fails the whole response, it is never defaulted into a meal that
//! would then be persisted.

use chrono::NaiveDate;
use larder_core::{
  generate::{
    GeneratedMeal, GeneratedPlan, GenerationRequest, NutritionSummary,
  },
  household::MemberProfile,
  plan::{MealType, DAYS_PER_WEEK},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireRequest {
  pub profiles:              Vec<WireProfile>,
  pub household_size:        usize,
  pub week_start_date:       NaiveDate,
  pub dietary_restrictions:  Vec<String>,
  pub available_ingredients: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireProfile {
  pub daily_calorie_target: Option<u32>,
  pub age:                  Option<u32>,
  pub diet:                 Option<String>,
  pub restrictions:         Vec<String>,
  pub preferences:          Vec<String>,
}

impl From<&MemberProfile> for WireProfile {
  fn from(p: &MemberProfile) -> Self {
    Self {
      daily_calorie_target: p.daily_calorie_target,
      age:                  p.age,
      diet:                 p.diet.clone(),
      restrictions:         p.restrictions.clone(),
      preferences:          p.preferences.clone(),
    }
  }
}

impl From<&GenerationRequest> for WireRequest {
  fn from(r: &GenerationRequest) -> Self {
    Self {
      profiles:              r.profiles.iter().map(WireProfile::from).collect(),
      household_size:        r.household_size,
      week_start_date:       r.week_start,
      dietary_restrictions:  r.dietary_restrictions.clone(),
      available_ingredients: r.available_ingredients.clone(),
    }
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireGeneratedPlan {
  pub meals:             Vec<WireMeal>,
  pub nutrition_summary: WireNutrition,
}

/// `name`, `description`, `mealType` and `dayOfWeek` are required. The
/// fields that are nullable on a stored meal may be absent here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireMeal {
  pub name:         String,
  pub description:  String,
  pub meal_type:    String,
  pub day_of_week:  i64,
  #[serde(default)]
  pub calories:     Option<u32>,
  #[serde(default)]
  pub ingredients:  Vec<String>,
  #[serde(default)]
  pub instructions: Option<String>,
  #[serde(default)]
  pub image_url:    Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireNutrition {
  pub protein: f64,
  pub carbs:   f64,
  pub fat:     f64,
  pub fiber:   f64,
}

impl From<WireNutrition> for NutritionSummary {
  fn from(n: WireNutrition) -> Self {
    Self {
      protein: n.protein,
      carbs:   n.carbs,
      fat:     n.fat,
      fiber:   n.fiber,
    }
  }
}

impl WireMeal {
  fn into_meal(self) -> Result<GeneratedMeal> {
    let meal_type = MealType::from_discriminant(&self.meal_type)
      .map_err(|_| {
        Error::Malformed(format!("unknown meal type `{}`", self.meal_type))
      })?;
    let day_of_week = u8::try_from(self.day_of_week)
      .ok()
      .filter(|d| *d < DAYS_PER_WEEK)
      .ok_or_else(|| {
        Error::Malformed(format!(
          "day_of_week {} out of range 0..=6",
          self.day_of_week
        ))
      })?;
    if self.name.trim().is_empty() {
      return Err(Error::Malformed("meal name is empty".into()));
    }

    Ok(GeneratedMeal {
      day_of_week,
      meal_type,
      name:         self.name,
      description:  self.description,
      calories:     self.calories,
      ingredients:  self.ingredients,
      instructions: self.instructions,
      image_url:    self.image_url,
    })
  }
}

impl WireGeneratedPlan {
  pub(crate) fn into_plan(self) -> Result<GeneratedPlan> {
    let meals = self
      .meals
      .into_iter()
      .map(WireMeal::into_meal)
      .collect::<Result<Vec<_>>>()?;
    Ok(GeneratedPlan {
      meals,
      nutrition: self.nutrition_summary.into(),
    })
  }
}
