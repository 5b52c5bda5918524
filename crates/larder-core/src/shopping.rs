//! The consolidated shopping list and its derivation from inventory.
//!
//! The list holds at most one *incomplete* entry per (household, normalized
//! name). Merging a candidate into an existing entry appends any new reasons;
//! completed entries are history and never merged into.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  household::validate_amount, pantry::InventoryItem, Error, Result,
};

/// Reason tag for items at or below their restock threshold.
pub const REASON_LOW_STOCK: &str = "low stock";
/// Reason tag for items inside the expiry horizon.
pub const REASON_EXPIRING: &str = "expiring soon";

// ─── Items ───────────────────────────────────────────────────────────────────

/// One entry on the household shopping list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingItem {
  pub item_id:         Uuid,
  pub household_id:    Uuid,
  pub name:            String,
  /// Why the item is on the list, in first-added order. Derivation and
  /// manual adds merge reasons rather than duplicating the entry.
  pub reasons:         Vec<String>,
  pub estimated_cost:  Option<f64>,
  pub store:           Option<String>,
  pub completed:       bool,
  pub added_at:        DateTime<Utc>,
}

/// A manual addition or a derived candidate to merge into the list.
/// Manual adds carry at most one reason; derivation carries one or two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShoppingItem {
  pub name:           String,
  pub reasons:        Vec<String>,
  pub estimated_cost: Option<f64>,
  pub store:          Option<String>,
}

impl NewShoppingItem {
  pub fn validate(&self) -> Result<()> {
    if normalize_name(&self.name).is_empty() {
      return Err(Error::Validation(
        "shopping item name must not be empty".into(),
      ));
    }
    if let Some(cost) = self.estimated_cost {
      validate_amount("estimated_cost", cost)?;
    }
    Ok(())
  }
}

/// The dedup key: trimmed, lowercased name. "Milk" and "  milk " are the
/// same list entry.
pub fn normalize_name(name: &str) -> String { name.trim().to_lowercase() }

/// Append `incoming` reasons not already present (case-insensitive),
/// keeping first-seen order and casing. Repeated merges are idempotent.
pub fn merge_reasons(existing: &[String], incoming: &[String]) -> Vec<String> {
  crate::household::dedup_preserving_order(
    existing.iter().chain(incoming).cloned().collect(),
  )
}

// ─── Derivation ──────────────────────────────────────────────────────────────

/// What the inventory scan proposes adding, before merging into the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
  pub name:           String,
  pub reasons:        Vec<String>,
  pub estimated_cost: Option<f64>,
}

impl From<CandidateItem> for NewShoppingItem {
  fn from(candidate: CandidateItem) -> Self {
    NewShoppingItem {
      name:           candidate.name,
      reasons:        candidate.reasons,
      estimated_cost: candidate.estimated_cost,
      store:          None,
    }
  }
}

/// Scan inventory for items that are low on stock or expiring and propose
/// one candidate per item, carrying every applicable reason. An item both
/// low and expiring yields a single candidate with both reasons.
pub fn derive_candidates(
  inventory: &[InventoryItem],
  today: NaiveDate,
) -> Vec<CandidateItem> {
  inventory
    .iter()
    .filter_map(|item| {
      let mut reasons = Vec::new();
      if item.is_low_stock() {
        reasons.push(REASON_LOW_STOCK.to_string());
      }
      if item.is_expiring(today) {
        reasons.push(REASON_EXPIRING.to_string());
      }
      if reasons.is_empty() {
        return None;
      }
      Some(CandidateItem {
        name: item.name.clone(),
        reasons,
        estimated_cost: item.cost,
      })
    })
    .collect()
}

/// Sum of estimated costs across the given items. Entries without a cost
/// contribute nothing; completion state is the caller's filter to apply.
pub fn estimated_total(items: &[ShoppingItem]) -> f64 {
  items.iter().filter_map(|i| i.estimated_cost).sum()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn inv(
    name: &str,
    quantity: f64,
    threshold: u32,
    expiry: Option<NaiveDate>,
    cost: Option<f64>,
  ) -> InventoryItem {
    InventoryItem {
      item_id:             Uuid::new_v4(),
      household_id:        Uuid::new_v4(),
      name:                name.into(),
      category:            None,
      quantity,
      unit:                Some("pc".into()),
      cost,
      expiry_date:         expiry,
      low_stock_threshold: threshold,
      updated_at:          Utc::now(),
    }
  }

  #[test]
  fn derivation_skips_healthy_items() {
    let today = date(2025, 3, 10);
    let inventory =
      vec![inv("Rice", 5.0, 1, Some(date(2025, 6, 1)), Some(2.0))];
    assert!(derive_candidates(&inventory, today).is_empty());
  }

  #[test]
  fn low_and_expiring_yield_one_candidate_with_both_reasons() {
    let today = date(2025, 3, 10);
    let inventory =
      vec![inv("Milk", 0.2, 1, Some(date(2025, 3, 11)), Some(1.5))];
    let candidates = derive_candidates(&inventory, today);
    assert_eq!(candidates.len(), 1);
    assert_eq!(
      candidates[0].reasons,
      vec![REASON_LOW_STOCK.to_string(), REASON_EXPIRING.to_string()]
    );
    assert_eq!(candidates[0].estimated_cost, Some(1.5));
  }

  #[test]
  fn derivation_tags_each_reason_separately() {
    let today = date(2025, 3, 10);
    let inventory = vec![
      inv("Flour", 0.1, 1, None, None),
      inv("Yoghurt", 4.0, 1, Some(date(2025, 3, 12)), Some(0.9)),
    ];
    let candidates = derive_candidates(&inventory, today);
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].reasons, vec![REASON_LOW_STOCK.to_string()]);
    assert_eq!(candidates[1].reasons, vec![REASON_EXPIRING.to_string()]);
  }

  #[test]
  fn names_normalize_for_dedup() {
    assert_eq!(normalize_name("  Milk "), "milk");
    assert_eq!(normalize_name("OLIVE Oil"), "olive oil");
  }

  #[test]
  fn reason_merge_is_idempotent() {
    let existing = vec![REASON_LOW_STOCK.to_string()];
    let incoming =
      vec![REASON_LOW_STOCK.to_string(), REASON_EXPIRING.to_string()];
    let merged = merge_reasons(&existing, &incoming);
    assert_eq!(
      merged,
      vec![REASON_LOW_STOCK.to_string(), REASON_EXPIRING.to_string()]
    );
    assert_eq!(merge_reasons(&merged, &incoming), merged);
  }

  #[test]
  fn estimated_total_ignores_costless_items() {
    let base = ShoppingItem {
      item_id:        Uuid::new_v4(),
      household_id:   Uuid::new_v4(),
      name:           "Milk".into(),
      reasons:        vec![],
      estimated_cost: Some(1.5),
      store:          None,
      completed:      false,
      added_at:       Utc::now(),
    };
    let mut no_cost = base.clone();
    no_cost.estimated_cost = None;
    let mut completed = base.clone();
    completed.estimated_cost = Some(2.0);
    completed.completed = true;

    let items = vec![base, no_cost, completed];
    assert_eq!(estimated_total(&items), 3.5);
  }

  #[test]
  fn blank_name_is_rejected() {
    let input = NewShoppingItem {
      name:           "   ".into(),
      reasons:        vec![],
      estimated_cost: None,
      store:          None,
    };
    assert!(input.validate().is_err());
  }
}
