//! The `HouseholdStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `larder-store-sqlite`).
//! Higher layers (`larder-api`, `larder-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  feedback::{MealDecision, MealFeedback, NewComment, NewDecision, PlanComment},
  household::{Household, Member, MemberProfile, NewHousehold, NewMember, ProfileInput},
  pantry::{Expense, InventoryItem, NewExpense, NewInventoryItem},
  plan::{Meal, MealPlan, NewMeal, PlanView},
  shopping::{NewShoppingItem, ShoppingItem},
};

/// Abstraction over a Larder storage backend.
///
/// Writes enforce the uniqueness invariants (one plan per household-week, one
/// meal per slot, one decision per member per meal, one incomplete shopping
/// entry per name) so reads never have to reconcile duplicates.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait HouseholdStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Households and membership ─────────────────────────────────────────

  /// Create a household and enrol `creator` as its first member.
  fn create_household(
    &self,
    input: NewHousehold,
    creator: NewMember,
  ) -> impl Future<Output = Result<Household, Self::Error>> + Send + '_;

  /// Retrieve a household by UUID. Returns `None` if not found.
  fn get_household(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Household>, Self::Error>> + Send + '_;

  /// Add a member, or refresh the display name if already enrolled.
  fn add_member(
    &self,
    household_id: Uuid,
    input: NewMember,
  ) -> impl Future<Output = Result<Member, Self::Error>> + Send + '_;

  /// List members in join order.
  fn list_members(
    &self,
    household_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  /// Membership check used by every scoped operation.
  fn is_member(
    &self,
    household_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Dietary profiles ──────────────────────────────────────────────────

  /// Write a member's profile, replacing any previous record whole.
  fn upsert_profile(
    &self,
    household_id: Uuid,
    user_id: Uuid,
    input: ProfileInput,
  ) -> impl Future<Output = Result<MemberProfile, Self::Error>> + Send + '_;

  fn list_profiles(
    &self,
    household_id: Uuid,
  ) -> impl Future<Output = Result<Vec<MemberProfile>, Self::Error>> + Send + '_;

  // ── Plans ─────────────────────────────────────────────────────────────

  /// Find the plan row for a household-week, creating it if absent.
  /// `week_start` must be a Monday; backends reject other dates.
  fn get_or_create_plan(
    &self,
    household_id: Uuid,
    week_start: NaiveDate,
  ) -> impl Future<Output = Result<MealPlan, Self::Error>> + Send + '_;

  /// Retrieve a bare plan row by UUID. Returns `None` if not found.
  fn get_plan(
    &self,
    plan_id: Uuid,
  ) -> impl Future<Output = Result<Option<MealPlan>, Self::Error>> + Send + '_;

  /// Materialise the plan for a household-week with its meals in grid
  /// order (day ascending, breakfast before lunch before dinner).
  fn plan_for_week(
    &self,
    household_id: Uuid,
    week_start: NaiveDate,
  ) -> impl Future<Output = Result<Option<PlanView>, Self::Error>> + Send + '_;

  /// The household's most recent plan by week start, if any.
  fn latest_plan(
    &self,
    household_id: Uuid,
  ) -> impl Future<Output = Result<Option<PlanView>, Self::Error>> + Send + '_;

  /// Atomically replace the plan's entire meal set.
  ///
  /// Old meals and their decisions are removed in the same transaction;
  /// the week's comment thread survives regeneration. Returns the new
  /// meals in grid order.
  fn replace_plan_meals(
    &self,
    plan_id: Uuid,
    meals: Vec<NewMeal>,
  ) -> impl Future<Output = Result<Vec<Meal>, Self::Error>> + Send + '_;

  /// Retrieve a meal by UUID. Returns `None` if not found.
  fn get_meal(
    &self,
    meal_id: Uuid,
  ) -> impl Future<Output = Result<Option<Meal>, Self::Error>> + Send + '_;

  // ── Decisions and comments ────────────────────────────────────────────

  /// Record a member's verdict on a meal, replacing any previous one.
  fn record_decision(
    &self,
    meal_id: Uuid,
    member_id: Uuid,
    input: NewDecision,
  ) -> impl Future<Output = Result<MealDecision, Self::Error>> + Send + '_;

  /// All decisions on a meal with tallies, newest decision first.
  fn meal_feedback(
    &self,
    meal_id: Uuid,
  ) -> impl Future<Output = Result<MealFeedback, Self::Error>> + Send + '_;

  /// Append to the plan's comment thread.
  fn post_comment(
    &self,
    plan_id: Uuid,
    author_id: Uuid,
    input: NewComment,
  ) -> impl Future<Output = Result<PlanComment, Self::Error>> + Send + '_;

  /// The plan's comment thread, newest first.
  fn list_comments(
    &self,
    plan_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PlanComment>, Self::Error>> + Send + '_;

  // ── Inventory and expenses ────────────────────────────────────────────

  /// Write an inventory item, replacing any existing record with the same
  /// normalized name.
  fn upsert_inventory_item(
    &self,
    household_id: Uuid,
    input: NewInventoryItem,
  ) -> impl Future<Output = Result<InventoryItem, Self::Error>> + Send + '_;

  /// List inventory alphabetically by name.
  fn list_inventory(
    &self,
    household_id: Uuid,
  ) -> impl Future<Output = Result<Vec<InventoryItem>, Self::Error>> + Send + '_;

  fn add_expense(
    &self,
    household_id: Uuid,
    input: NewExpense,
  ) -> impl Future<Output = Result<Expense, Self::Error>> + Send + '_;

  /// List expenses newest first.
  fn list_expenses(
    &self,
    household_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Expense>, Self::Error>> + Send + '_;

  // ── Shopping list ─────────────────────────────────────────────────────

  /// Merge an item into the list. If an incomplete entry with the same
  /// normalized name exists, new reasons are appended to it and the
  /// second element is `false`; otherwise a fresh entry is created and
  /// the second element is `true`.
  fn merge_shopping_item(
    &self,
    household_id: Uuid,
    input: NewShoppingItem,
  ) -> impl Future<Output = Result<(ShoppingItem, bool), Self::Error>> + Send + '_;

  /// List every current entry oldest first. Completed entries stay listed
  /// until explicitly deleted.
  fn list_shopping(
    &self,
    household_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ShoppingItem>, Self::Error>> + Send + '_;

  /// Fetch a single entry by id.
  fn get_shopping_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Option<ShoppingItem>, Self::Error>> + Send + '_;

  /// Set an entry's completion flag. Idempotent, never deletes; `None` if
  /// the entry is unknown.
  fn set_shopping_completed(
    &self,
    item_id: Uuid,
    completed: bool,
  ) -> impl Future<Output = Result<Option<ShoppingItem>, Self::Error>> + Send + '_;

  /// Remove an entry outright. Returns `false` if the entry is unknown.
  fn delete_shopping_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
