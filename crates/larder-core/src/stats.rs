//! Household dashboard statistics.
//!
//! The snapshot is read-only and side-effect-free; missing sub-aggregates
//! contribute zeroes (no latest plan means zero planned meals) so the
//! dashboard stays usable on partial data.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  household::Household,
  pantry::{Expense, InventoryItem},
};

/// Weekly budget assumed when a household has not set one.
pub const DEFAULT_WEEKLY_BUDGET: f64 = 300.00;

/// The spend window is the trailing week ending now.
pub const SPEND_WINDOW_DAYS: i64 = 7;

/// The aggregate snapshot behind the household dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdStats {
  pub household_id:   Uuid,
  /// Sum of expenses recorded in the trailing seven days, bounds inclusive.
  pub weekly_spent:   f64,
  pub weekly_budget:  f64,
  /// Inventory items at or below their restock threshold.
  pub low_stock_count: usize,
  /// Meals on the most recent plan; zero when no plan exists yet.
  pub planned_meals:  usize,
  /// Household members, whether or not they have filled in a profile.
  pub family_members: usize,
}

/// Sum of expense amounts recorded within `[now - 7d, now]`, both
/// endpoints inclusive. Expenses outside the window never contribute.
pub fn spent_in_window(expenses: &[Expense], now: DateTime<Utc>) -> f64 {
  let window_start = now - Duration::days(SPEND_WINDOW_DAYS);
  expenses
    .iter()
    .filter(|e| e.created_at >= window_start && e.created_at <= now)
    .map(|e| e.amount)
    .sum()
}

pub fn compute_stats(
  household: &Household,
  family_members: usize,
  planned_meals: usize,
  inventory: &[InventoryItem],
  expenses: &[Expense],
  now: DateTime<Utc>,
) -> HouseholdStats {
  HouseholdStats {
    household_id:    household.household_id,
    weekly_spent:    spent_in_window(expenses, now),
    weekly_budget:   household.weekly_budget.unwrap_or(DEFAULT_WEEKLY_BUDGET),
    low_stock_count: inventory.iter().filter(|i| i.is_low_stock()).count(),
    planned_meals,
    family_members,
  }
}
