//! Households, membership, and per-member dietary profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Households ──────────────────────────────────────────────────────────────

/// A group of users who plan and eat together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
  pub household_id:  Uuid,
  pub name:          String,
  /// Budget in currency units per week; `None` falls back to the
  /// household default when stats are computed.
  pub weekly_budget: Option<f64>,
  pub created_by:    Uuid,
  pub created_at:    DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHousehold {
  pub name:          String,
  pub weekly_budget: Option<f64>,
}

impl NewHousehold {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::Validation("household name must not be empty".into()));
    }
    if let Some(budget) = self.weekly_budget {
      validate_amount("weekly_budget", budget)?;
    }
    Ok(())
  }
}

// ─── Membership ──────────────────────────────────────────────────────────────

/// A user's membership in a household. One row per (household, user);
/// joining twice refreshes the display name rather than duplicating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
  pub household_id: Uuid,
  pub user_id:      Uuid,
  pub display_name: String,
  pub joined_at:    DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMember {
  pub user_id:      Uuid,
  pub display_name: String,
}

impl NewMember {
  pub fn validate(&self) -> Result<()> {
    if self.display_name.trim().is_empty() {
      return Err(Error::Validation("display name must not be empty".into()));
    }
    Ok(())
  }
}

// ─── Dietary profiles ────────────────────────────────────────────────────────

/// A member's dietary profile within one household. Restrictions are hard
/// constraints on generation; preferences are soft hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
  pub household_id:         Uuid,
  pub user_id:              Uuid,
  pub daily_calorie_target: Option<u32>,
  pub age:                  Option<u32>,
  pub diet:                 Option<String>,
  pub restrictions:         Vec<String>,
  pub preferences:          Vec<String>,
  pub updated_at:           DateTime<Utc>,
}

/// Profile fields as submitted by a member. Absent optional fields clear
/// the stored value; the profile write is whole-record replacement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInput {
  pub daily_calorie_target: Option<u32>,
  pub age:                  Option<u32>,
  pub diet:                 Option<String>,
  #[serde(default)]
  pub restrictions:         Vec<String>,
  #[serde(default)]
  pub preferences:          Vec<String>,
}

impl ProfileInput {
  /// Trim entries, drop empties, and dedup case-insensitively while
  /// preserving first-seen order and casing.
  pub fn normalized(mut self) -> Self {
    self.restrictions = dedup_preserving_order(self.restrictions);
    self.preferences = dedup_preserving_order(self.preferences);
    self
  }
}

/// Case-insensitive dedup that keeps the first occurrence's casing and the
/// original relative order. Entries are trimmed; empty entries dropped.
pub(crate) fn dedup_preserving_order(entries: Vec<String>) -> Vec<String> {
  let mut seen: Vec<String> = Vec::with_capacity(entries.len());
  let mut out = Vec::with_capacity(entries.len());
  for entry in entries {
    let trimmed = entry.trim();
    if trimmed.is_empty() {
      continue;
    }
    let key = trimmed.to_lowercase();
    if seen.contains(&key) {
      continue;
    }
    seen.push(key);
    out.push(trimmed.to_string());
  }
  out
}

/// The union of every member's restriction list, deduplicated
/// case-insensitively. One member's restriction constrains the whole
/// household's generated plan.
pub fn aggregate_restrictions(profiles: &[MemberProfile]) -> Vec<String> {
  dedup_preserving_order(
    profiles
      .iter()
      .flat_map(|p| p.restrictions.iter().cloned())
      .collect(),
  )
}

/// Shared money/quantity validation: finite and non-negative.
pub(crate) fn validate_amount(field: &str, value: f64) -> Result<()> {
  if !value.is_finite() || value < 0.0 {
    return Err(Error::Validation(format!(
      "{field} must be a non-negative number, got {value}"
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn profile(restrictions: &[&str]) -> MemberProfile {
    MemberProfile {
      household_id:         Uuid::new_v4(),
      user_id:              Uuid::new_v4(),
      daily_calorie_target: None,
      age:                  None,
      diet:                 None,
      restrictions:         restrictions.iter().map(|s| s.to_string()).collect(),
      preferences:          vec![],
      updated_at:           Utc::now(),
    }
  }

  #[test]
  fn restrictions_union_dedups_case_insensitively() {
    let profiles = vec![
      profile(&["gluten-free", "Peanut allergy"]),
      profile(&["peanut allergy", "vegetarian"]),
    ];
    assert_eq!(
      aggregate_restrictions(&profiles),
      vec!["gluten-free", "Peanut allergy", "vegetarian"]
    );
  }

  #[test]
  fn restrictions_union_of_empty_profiles_is_empty() {
    let profiles = vec![profile(&[]), profile(&[])];
    assert!(aggregate_restrictions(&profiles).is_empty());
  }

  #[test]
  fn profile_input_normalization_trims_and_drops_empties() {
    let input = ProfileInput {
      restrictions: vec!["  dairy ".into(), "".into(), "DAIRY".into()],
      preferences: vec!["spicy".into()],
      ..Default::default()
    };
    let normalized = input.normalized();
    assert_eq!(normalized.restrictions, vec!["dairy"]);
    assert_eq!(normalized.preferences, vec!["spicy"]);
  }

  #[test]
  fn household_rejects_negative_budget() {
    let input = NewHousehold {
      name:          "Flat 3".into(),
      weekly_budget: Some(-10.0),
    };
    assert!(input.validate().is_err());
  }

  #[test]
  fn household_rejects_blank_name() {
    let input = NewHousehold { name: "  ".into(), weekly_budget: None };
    assert!(input.validate().is_err());
  }
}
