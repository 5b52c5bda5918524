//! Approval decisions on individual meals and week-scoped comment threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  plan::{MealType, Slot},
  Error, Result,
};

// ─── Meal decisions ──────────────────────────────────────────────────────────

/// One member's current verdict on one meal. One row per (meal, member);
/// re-deciding replaces the previous verdict and its comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealDecision {
  pub meal_id:    Uuid,
  pub member_id:  Uuid,
  pub approved:   bool,
  pub comment:    Option<String>,
  pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDecision {
  pub approved: bool,
  pub comment:  Option<String>,
}

/// Aggregated approval state for one meal: the tallies plus every
/// individual decision, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealFeedback {
  pub meal_id:    Uuid,
  pub approvals:  usize,
  pub rejections: usize,
  pub decisions:  Vec<MealDecision>,
}

impl MealFeedback {
  pub fn from_decisions(meal_id: Uuid, decisions: Vec<MealDecision>) -> Self {
    let approvals = decisions.iter().filter(|d| d.approved).count();
    let rejections = decisions.len() - approvals;
    Self { meal_id, approvals, rejections, decisions }
  }
}

// ─── Plan comments ───────────────────────────────────────────────────────────

/// A comment on a plan's week thread, optionally tagged with the grid slot
/// it addresses. The thread is append-only; comments are never edited or
/// deleted, and the tag is a coordinate rather than a meal reference so it
/// stays meaningful across plan regeneration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanComment {
  pub comment_id:  Uuid,
  pub plan_id:     Uuid,
  pub author_id:   Uuid,
  pub body:        String,
  /// Slot tag; both halves present or both absent.
  pub day_of_week: Option<u8>,
  pub meal_type:   Option<MealType>,
  pub posted_at:   DateTime<Utc>,
}

impl PlanComment {
  /// A comment with no slot tag addresses the week as a whole.
  pub fn is_week_scoped(&self) -> bool { self.day_of_week.is_none() }

  pub fn slot(&self) -> Option<Slot> {
    match (self.day_of_week, self.meal_type) {
      (Some(day), Some(meal_type)) => Some(Slot { day_of_week: day, meal_type }),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
  pub body:        String,
  pub day_of_week: Option<u8>,
  pub meal_type:   Option<MealType>,
}

impl NewComment {
  pub fn validate(&self) -> Result<()> {
    if self.body.trim().is_empty() {
      return Err(Error::Validation("comment body must not be empty".into()));
    }
    match (self.day_of_week, self.meal_type) {
      (None, None) => Ok(()),
      (Some(day), Some(meal_type)) => {
        Slot::new(day, meal_type)?;
        Ok(())
      }
      _ => Err(Error::Validation(
        "slot tag requires both day_of_week and meal_type".into(),
      )),
    }
  }
}
