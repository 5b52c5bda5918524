//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`. String lists (restrictions, preferences, ingredients,
//! reasons) are stored as compact JSON arrays. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use larder_core::{
  feedback::{MealDecision, PlanComment},
  household::{Household, Member, MemberProfile},
  pantry::{Expense, InventoryItem},
  plan::{Meal, MealPlan, MealType},
  shopping::ShoppingItem,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> and NaiveDate ─────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── MealType ────────────────────────────────────────────────────────────────

pub fn encode_meal_type(t: MealType) -> &'static str { t.discriminant() }

pub fn decode_meal_type(s: &str) -> Result<MealType> {
  Ok(MealType::from_discriminant(s)?)
}

// ─── String lists and JSON payloads ──────────────────────────────────────────

pub fn encode_string_list(list: &[String]) -> Result<String> {
  Ok(serde_json::to_string(list)?)
}

pub fn decode_string_list(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_json(value: &serde_json::Value) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_json(s: &str) -> Result<serde_json::Value> {
  Ok(serde_json::from_str(s)?)
}

// ─── Bounded integers ────────────────────────────────────────────────────────

pub fn decode_u8(v: i64, field: &str) -> Result<u8> {
  u8::try_from(v).map_err(|_| Error::Decode(format!("{field} out of range: {v}")))
}

pub fn decode_u32(v: i64, field: &str) -> Result<u32> {
  u32::try_from(v).map_err(|_| Error::Decode(format!("{field} out of range: {v}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns read directly from a `households` row.
pub struct RawHousehold {
  pub household_id:  String,
  pub name:          String,
  pub weekly_budget: Option<f64>,
  pub created_by:    String,
  pub created_at:    String,
}

impl RawHousehold {
  pub fn into_household(self) -> Result<Household> {
    Ok(Household {
      household_id:  decode_uuid(&self.household_id)?,
      name:          self.name,
      weekly_budget: self.weekly_budget,
      created_by:    decode_uuid(&self.created_by)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawMember {
  pub household_id: String,
  pub user_id:      String,
  pub display_name: String,
  pub joined_at:    String,
}

impl RawMember {
  pub fn into_member(self) -> Result<Member> {
    Ok(Member {
      household_id: decode_uuid(&self.household_id)?,
      user_id:      decode_uuid(&self.user_id)?,
      display_name: self.display_name,
      joined_at:    decode_dt(&self.joined_at)?,
    })
  }
}

pub struct RawProfile {
  pub household_id:         String,
  pub user_id:              String,
  pub daily_calorie_target: Option<i64>,
  pub age:                  Option<i64>,
  pub diet:                 Option<String>,
  pub restrictions:         String,
  pub preferences:          String,
  pub updated_at:           String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<MemberProfile> {
    Ok(MemberProfile {
      household_id:         decode_uuid(&self.household_id)?,
      user_id:              decode_uuid(&self.user_id)?,
      daily_calorie_target: self
        .daily_calorie_target
        .map(|v| decode_u32(v, "daily_calorie_target"))
        .transpose()?,
      age:                  self.age.map(|v| decode_u32(v, "age")).transpose()?,
      diet:                 self.diet,
      restrictions:         decode_string_list(&self.restrictions)?,
      preferences:          decode_string_list(&self.preferences)?,
      updated_at:           decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawPlan {
  pub plan_id:      String,
  pub household_id: String,
  pub week_start:   String,
  pub created_at:   String,
}

impl RawPlan {
  pub fn into_plan(self) -> Result<MealPlan> {
    Ok(MealPlan {
      plan_id:      decode_uuid(&self.plan_id)?,
      household_id: decode_uuid(&self.household_id)?,
      week_start:   decode_date(&self.week_start)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawMeal {
  pub meal_id:      String,
  pub plan_id:      String,
  pub day_of_week:  i64,
  pub meal_type:    String,
  pub name:         String,
  pub description:  String,
  pub calories:     Option<i64>,
  pub ingredients:  String,
  pub instructions: Option<String>,
  pub image_url:    Option<String>,
}

impl RawMeal {
  pub fn into_meal(self) -> Result<Meal> {
    Ok(Meal {
      meal_id:      decode_uuid(&self.meal_id)?,
      plan_id:      decode_uuid(&self.plan_id)?,
      day_of_week:  decode_u8(self.day_of_week, "day_of_week")?,
      meal_type:    decode_meal_type(&self.meal_type)?,
      name:         self.name,
      description:  self.description,
      calories:     self
        .calories
        .map(|v| decode_u32(v, "calories"))
        .transpose()?,
      ingredients:  decode_string_list(&self.ingredients)?,
      instructions: self.instructions,
      image_url:    self.image_url,
    })
  }
}

pub struct RawDecision {
  pub meal_id:    String,
  pub member_id:  String,
  pub approved:   bool,
  pub comment:    Option<String>,
  pub decided_at: String,
}

impl RawDecision {
  pub fn into_decision(self) -> Result<MealDecision> {
    Ok(MealDecision {
      meal_id:    decode_uuid(&self.meal_id)?,
      member_id:  decode_uuid(&self.member_id)?,
      approved:   self.approved,
      comment:    self.comment,
      decided_at: decode_dt(&self.decided_at)?,
    })
  }
}

pub struct RawComment {
  pub comment_id:  String,
  pub plan_id:     String,
  pub author_id:   String,
  pub body:        String,
  pub day_of_week: Option<i64>,
  pub meal_type:   Option<String>,
  pub posted_at:   String,
}

impl RawComment {
  pub fn into_comment(self) -> Result<PlanComment> {
    Ok(PlanComment {
      comment_id:  decode_uuid(&self.comment_id)?,
      plan_id:     decode_uuid(&self.plan_id)?,
      author_id:   decode_uuid(&self.author_id)?,
      body:        self.body,
      day_of_week: self
        .day_of_week
        .map(|v| decode_u8(v, "day_of_week"))
        .transpose()?,
      meal_type:   self
        .meal_type
        .as_deref()
        .map(decode_meal_type)
        .transpose()?,
      posted_at:   decode_dt(&self.posted_at)?,
    })
  }
}

pub struct RawInventoryItem {
  pub item_id:             String,
  pub household_id:        String,
  pub name:                String,
  pub category:            Option<String>,
  pub quantity:            f64,
  pub unit:                Option<String>,
  pub cost:                Option<f64>,
  pub expiry_date:         Option<String>,
  pub low_stock_threshold: i64,
  pub updated_at:          String,
}

impl RawInventoryItem {
  pub fn into_item(self) -> Result<InventoryItem> {
    Ok(InventoryItem {
      item_id:             decode_uuid(&self.item_id)?,
      household_id:        decode_uuid(&self.household_id)?,
      name:                self.name,
      category:            self.category,
      quantity:            self.quantity,
      unit:                self.unit,
      cost:                self.cost,
      expiry_date:         self
        .expiry_date
        .as_deref()
        .map(decode_date)
        .transpose()?,
      low_stock_threshold: decode_u32(
        self.low_stock_threshold,
        "low_stock_threshold",
      )?,
      updated_at:          decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawExpense {
  pub expense_id:   String,
  pub household_id: String,
  pub amount:       f64,
  pub description:  String,
  pub category:     Option<String>,
  pub receipt:      Option<String>,
  pub created_at:   String,
}

impl RawExpense {
  pub fn into_expense(self) -> Result<Expense> {
    Ok(Expense {
      expense_id:   decode_uuid(&self.expense_id)?,
      household_id: decode_uuid(&self.household_id)?,
      amount:       self.amount,
      description:  self.description,
      category:     self.category,
      receipt:      self.receipt.as_deref().map(decode_json).transpose()?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawShoppingItem {
  pub item_id:        String,
  pub household_id:   String,
  pub name:           String,
  pub reasons:        String,
  pub estimated_cost: Option<f64>,
  pub store:          Option<String>,
  pub completed:      bool,
  pub added_at:       String,
}

impl RawShoppingItem {
  pub fn into_item(self) -> Result<ShoppingItem> {
    Ok(ShoppingItem {
      item_id:        decode_uuid(&self.item_id)?,
      household_id:   decode_uuid(&self.household_id)?,
      name:           self.name,
      reasons:        decode_string_list(&self.reasons)?,
      estimated_cost: self.estimated_cost,
      store:          self.store,
      completed:      self.completed,
      added_at:       decode_dt(&self.added_at)?,
    })
  }
}
