//! The weekly meal-plan grid.
//!
//! A plan owns one week of meals for one household, addressed by a
//! [`Slot`] — a (day-of-week, meal-type) coordinate. Day 0 is the Monday
//! the week starts on. At most one meal occupies a slot; the store enforces
//! this at write time rather than tolerating duplicates on read.

use chrono::{Datelike, DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Days in the plan grid.
pub const DAYS_PER_WEEK: u8 = 7;

/// A full week: seven days of breakfast, lunch and dinner.
pub const FULL_WEEK_MEALS: usize = DAYS_PER_WEEK as usize * MealType::ALL.len();

// ─── Week math ───────────────────────────────────────────────────────────────

/// The Monday on or before `date` — the canonical week-start for that week.
///
/// All callers must compute week boundaries in one consistent reference
/// timezone before converting to a date; mixing zones shifts the Monday
/// boundary near midnight.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
  date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// True when `date` is a valid week start (a Monday).
pub fn is_week_start(date: NaiveDate) -> bool { week_start_of(date) == date }

// ─── Slots ───────────────────────────────────────────────────────────────────

/// One of the three meals in a day. The derived `Ord` is the grid retrieval
/// priority: breakfast < lunch < dinner.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
  Breakfast,
  Lunch,
  Dinner,
}

impl MealType {
  pub const ALL: [MealType; 3] =
    [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

  /// The discriminant string stored in the `meal_type` column.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Breakfast => "breakfast",
      Self::Lunch => "lunch",
      Self::Dinner => "dinner",
    }
  }

  pub fn from_discriminant(s: &str) -> Result<Self> {
    match s {
      "breakfast" => Ok(Self::Breakfast),
      "lunch" => Ok(Self::Lunch),
      "dinner" => Ok(Self::Dinner),
      other => Err(Error::UnknownMealType(other.to_string())),
    }
  }
}

/// A (day-of-week, meal-type) coordinate in the weekly grid.
/// Day 0 is the week-start Monday, day 6 the following Sunday.
/// The derived `Ord` is the stable grid order: day ascending, then
/// breakfast < lunch < dinner.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Slot {
  pub day_of_week: u8,
  pub meal_type:   MealType,
}

impl Slot {
  pub fn new(day_of_week: u8, meal_type: MealType) -> Result<Self> {
    if day_of_week >= DAYS_PER_WEEK {
      return Err(Error::Validation(format!(
        "day_of_week {day_of_week} out of range 0..=6"
      )));
    }
    Ok(Self { day_of_week, meal_type })
  }
}

// ─── Plans and meals ─────────────────────────────────────────────────────────

/// One household's plan for one week. UNIQUE per (household, week_start);
/// `week_start` is always a Monday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlan {
  pub plan_id:      Uuid,
  pub household_id: Uuid,
  pub week_start:   NaiveDate,
  pub created_at:   DateTime<Utc>,
}

/// A meal occupying one grid slot of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
  pub meal_id:      Uuid,
  pub plan_id:      Uuid,
  pub day_of_week:  u8,
  pub meal_type:    MealType,
  pub name:         String,
  pub description:  String,
  pub calories:     Option<u32>,
  pub ingredients:  Vec<String>,
  pub instructions: Option<String>,
  pub image_url:    Option<String>,
}

impl Meal {
  pub fn slot(&self) -> Slot {
    Slot { day_of_week: self.day_of_week, meal_type: self.meal_type }
  }
}

/// Input to [`crate::store::HouseholdStore::replace_plan_meals`].
/// `meal_id` and `plan_id` are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMeal {
  pub day_of_week:  u8,
  pub meal_type:    MealType,
  pub name:         String,
  pub description:  String,
  pub calories:     Option<u32>,
  pub ingredients:  Vec<String>,
  pub instructions: Option<String>,
  pub image_url:    Option<String>,
}

impl NewMeal {
  pub fn slot(&self) -> Slot {
    Slot { day_of_week: self.day_of_week, meal_type: self.meal_type }
  }

  pub fn validate(&self) -> Result<()> {
    Slot::new(self.day_of_week, self.meal_type)?;
    if self.name.trim().is_empty() {
      return Err(Error::Validation("meal name must not be empty".into()));
    }
    Ok(())
  }
}

/// Reject a meal batch whose days are out of range or whose slots collide.
/// A batch targeting fewer than [`FULL_WEEK_MEALS`] slots is a *partial*
/// plan — valid, not an error.
pub fn validate_meal_batch(meals: &[NewMeal]) -> Result<()> {
  let mut seen: Vec<Slot> = Vec::with_capacity(meals.len());
  for meal in meals {
    meal.validate()?;
    let slot = meal.slot();
    if seen.contains(&slot) {
      return Err(Error::Validation(format!(
        "duplicate slot: day {} {}",
        slot.day_of_week,
        slot.meal_type.discriminant()
      )));
    }
    seen.push(slot);
  }
  Ok(())
}

// ─── Materialised view ───────────────────────────────────────────────────────

/// A plan with its full meal collection in stable grid order
/// (day ascending, then breakfast < lunch < dinner).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanView {
  pub plan:  MealPlan,
  pub meals: Vec<Meal>,
}

impl PlanView {
  /// Slot lookup: at most one match by the write-time uniqueness invariant.
  pub fn find_meal(&self, slot: Slot) -> Option<&Meal> {
    self.meals.iter().find(|m| m.slot() == slot)
  }

  /// True when every slot of the week is filled.
  pub fn is_complete(&self) -> bool { self.meals.len() >= FULL_WEEK_MEALS }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn week_start_is_identity_on_monday() {
    // 2025-01-06 is a Monday.
    assert_eq!(week_start_of(date(2025, 1, 6)), date(2025, 1, 6));
    assert!(is_week_start(date(2025, 1, 6)));
  }

  #[test]
  fn week_start_rolls_back_to_monday() {
    // Wednesday and Sunday of the same week.
    assert_eq!(week_start_of(date(2025, 1, 8)), date(2025, 1, 6));
    assert_eq!(week_start_of(date(2025, 1, 12)), date(2025, 1, 6));
    assert!(!is_week_start(date(2025, 1, 12)));
  }

  #[test]
  fn week_start_crosses_month_and_year_boundaries() {
    // 2025-01-01 is a Wednesday; its week began Monday 2024-12-30.
    assert_eq!(week_start_of(date(2025, 1, 1)), date(2024, 12, 30));
  }

  #[test]
  fn slot_order_is_day_then_meal_type() {
    let breakfast_d1 = Slot::new(1, MealType::Breakfast).unwrap();
    let dinner_d0 = Slot::new(0, MealType::Dinner).unwrap();
    let lunch_d0 = Slot::new(0, MealType::Lunch).unwrap();

    let mut slots = vec![breakfast_d1, dinner_d0, lunch_d0];
    slots.sort();
    assert_eq!(slots, vec![lunch_d0, dinner_d0, breakfast_d1]);
  }

  #[test]
  fn slot_rejects_out_of_range_day() {
    assert!(Slot::new(7, MealType::Lunch).is_err());
    assert!(Slot::new(6, MealType::Lunch).is_ok());
  }

  fn meal(day: u8, meal_type: MealType) -> NewMeal {
    NewMeal {
      day_of_week:  day,
      meal_type,
      name:         "Test meal".into(),
      description:  "".into(),
      calories:     None,
      ingredients:  vec![],
      instructions: None,
      image_url:    None,
    }
  }

  #[test]
  fn batch_rejects_duplicate_slots() {
    let batch = vec![meal(0, MealType::Lunch), meal(0, MealType::Lunch)];
    assert!(matches!(
      validate_meal_batch(&batch),
      Err(Error::Validation(_))
    ));
  }

  #[test]
  fn partial_batch_is_valid() {
    let batch = vec![meal(0, MealType::Breakfast), meal(0, MealType::Lunch)];
    assert!(validate_meal_batch(&batch).is_ok());
  }

  #[test]
  fn full_week_is_twenty_one_meals() {
    assert_eq!(FULL_WEEK_MEALS, 21);
  }
}
