//! Household inventory and the expense ledger.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{household::validate_amount, Error, Result};

/// Items expiring within this many days (or already expired) count as
/// expiring for shopping-list derivation.
pub const EXPIRY_HORIZON_DAYS: u64 = 3;

// ─── Inventory ───────────────────────────────────────────────────────────────

/// One ingredient the household keeps on hand. One row per
/// (household, normalized name); restocking updates in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
  pub item_id:             Uuid,
  pub household_id:        Uuid,
  pub name:                String,
  pub category:            Option<String>,
  pub quantity:            f64,
  pub unit:                Option<String>,
  pub cost:                Option<f64>,
  pub expiry_date:         Option<NaiveDate>,
  /// Restock when quantity falls to or below this level.
  pub low_stock_threshold: u32,
  pub updated_at:          DateTime<Utc>,
}

impl InventoryItem {
  /// At or below the restock threshold. Zero quantity with a zero
  /// threshold still counts as low.
  pub fn is_low_stock(&self) -> bool {
    self.quantity <= f64::from(self.low_stock_threshold)
  }

  /// Expiry falls within [`EXPIRY_HORIZON_DAYS`] of `today`, inclusive.
  /// Already-expired items count; items with no expiry date never do.
  pub fn is_expiring(&self, today: NaiveDate) -> bool {
    match self.expiry_date {
      Some(expiry) => expiry <= today + chrono::Days::new(EXPIRY_HORIZON_DAYS),
      None => false,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInventoryItem {
  pub name:                String,
  pub category:            Option<String>,
  pub quantity:            f64,
  pub unit:                Option<String>,
  pub cost:                Option<f64>,
  pub expiry_date:         Option<NaiveDate>,
  #[serde(default)]
  pub low_stock_threshold: u32,
}

impl NewInventoryItem {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::Validation(
        "inventory item name must not be empty".into(),
      ));
    }
    validate_amount("quantity", self.quantity)?;
    if let Some(cost) = self.cost {
      validate_amount("cost", cost)?;
    }
    Ok(())
  }
}

// ─── Expenses ────────────────────────────────────────────────────────────────

/// One grocery purchase recorded against the household ledger. Input to
/// stats only; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
  pub expense_id:   Uuid,
  pub household_id: Uuid,
  pub amount:       f64,
  pub description:  String,
  pub category:     Option<String>,
  /// Structured receipt payload as supplied by the client, kept verbatim.
  pub receipt:      Option<serde_json::Value>,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
  pub amount:      f64,
  pub description: String,
  pub category:    Option<String>,
  pub receipt:     Option<serde_json::Value>,
}

impl NewExpense {
  pub fn validate(&self) -> Result<()> {
    validate_amount("amount", self.amount)?;
    if self.description.trim().is_empty() {
      return Err(Error::Validation(
        "expense description must not be empty".into(),
      ));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn item(quantity: f64, threshold: u32, expiry: Option<NaiveDate>) -> InventoryItem {
    InventoryItem {
      item_id:             Uuid::new_v4(),
      household_id:        Uuid::new_v4(),
      name:                "Milk".into(),
      category:            Some("dairy".into()),
      quantity,
      unit:                Some("l".into()),
      cost:                Some(1.50),
      expiry_date:         expiry,
      low_stock_threshold: threshold,
      updated_at:          Utc::now(),
    }
  }

  #[test]
  fn low_stock_is_at_or_below_threshold() {
    assert!(item(1.0, 3, None).is_low_stock());
    assert!(item(3.0, 3, None).is_low_stock());
    assert!(!item(5.0, 3, None).is_low_stock());
  }

  #[test]
  fn zero_quantity_zero_threshold_is_low() {
    assert!(item(0.0, 0, None).is_low_stock());
  }

  #[test]
  fn expiring_window_is_inclusive_of_horizon() {
    let today = date(2025, 3, 10);
    assert!(item(5.0, 1, Some(date(2025, 3, 12))).is_expiring(today));
    assert!(item(5.0, 1, Some(date(2025, 3, 13))).is_expiring(today));
    assert!(!item(5.0, 1, Some(date(2025, 3, 20))).is_expiring(today));
  }

  #[test]
  fn already_expired_counts_as_expiring() {
    let today = date(2025, 3, 10);
    assert!(item(5.0, 1, Some(date(2025, 3, 1))).is_expiring(today));
  }

  #[test]
  fn no_expiry_date_never_expires() {
    assert!(!item(5.0, 1, None).is_expiring(date(2025, 3, 10)));
  }

  #[test]
  fn inventory_rejects_negative_quantity() {
    let input = NewInventoryItem {
      name:                "Rice".into(),
      category:            None,
      quantity:            -2.0,
      unit:                Some("kg".into()),
      cost:                None,
      expiry_date:         None,
      low_stock_threshold: 1,
    };
    assert!(input.validate().is_err());
  }

  #[test]
  fn expense_rejects_non_finite_amount() {
    let input = NewExpense {
      amount:      f64::NAN,
      description: "groceries".into(),
      category:    None,
      receipt:     None,
    };
    assert!(input.validate().is_err());
  }
}
