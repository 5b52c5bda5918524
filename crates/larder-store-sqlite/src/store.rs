//! [`SqliteStore`] — the SQLite implementation of [`HouseholdStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use larder_core::{
  feedback::{MealDecision, MealFeedback, NewComment, NewDecision, PlanComment},
  household::{
    Household, Member, MemberProfile, NewHousehold, NewMember, ProfileInput,
  },
  pantry::{Expense, InventoryItem, NewExpense, NewInventoryItem},
  plan::{
    self, Meal, MealPlan, NewMeal, PlanView,
  },
  shopping::{merge_reasons, normalize_name, NewShoppingItem, ShoppingItem},
  store::HouseholdStore,
};

use crate::{
  encode::{
    encode_date, encode_dt, encode_json, encode_meal_type, encode_string_list,
    encode_uuid, RawComment, RawDecision, RawExpense, RawHousehold,
    RawInventoryItem, RawMeal, RawMember, RawPlan, RawProfile, RawShoppingItem,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Larder household store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Cheap liveness probe used by the health endpoint.
  pub async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn household_exists(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM households WHERE household_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  /// Load a plan's meals in grid order: day ascending, then breakfast,
  /// lunch, dinner.
  async fn load_meals(&self, plan_id: Uuid) -> Result<Vec<Meal>> {
    let plan_str = encode_uuid(plan_id);
    let raws: Vec<RawMeal> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT meal_id, plan_id, day_of_week, meal_type, name, description,
                  calories, ingredients, instructions, image_url
           FROM meals
           WHERE plan_id = ?1
           ORDER BY day_of_week,
                    CASE meal_type
                      WHEN 'breakfast' THEN 0
                      WHEN 'lunch'     THEN 1
                      ELSE 2
                    END",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![plan_str], |row| {
            Ok(RawMeal {
              meal_id:      row.get(0)?,
              plan_id:      row.get(1)?,
              day_of_week:  row.get(2)?,
              meal_type:    row.get(3)?,
              name:         row.get(4)?,
              description:  row.get(5)?,
              calories:     row.get(6)?,
              ingredients:  row.get(7)?,
              instructions: row.get(8)?,
              image_url:    row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMeal::into_meal).collect()
  }

  async fn plan_row(
    &self,
    household_id: Uuid,
    week_start: NaiveDate,
  ) -> Result<Option<MealPlan>> {
    let household_str = encode_uuid(household_id);
    let week_str = encode_date(week_start);

    let raw: Option<RawPlan> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT plan_id, household_id, week_start, created_at
               FROM plans
               WHERE household_id = ?1 AND week_start = ?2",
              rusqlite::params![household_str, week_str],
              |row| {
                Ok(RawPlan {
                  plan_id:      row.get(0)?,
                  household_id: row.get(1)?,
                  week_start:   row.get(2)?,
                  created_at:   row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPlan::into_plan).transpose()
  }

  async fn view_of(&self, plan: MealPlan) -> Result<PlanView> {
    let meals = self.load_meals(plan.plan_id).await?;
    Ok(PlanView { plan, meals })
  }
}

// ─── HouseholdStore impl ─────────────────────────────────────────────────────

impl HouseholdStore for SqliteStore {
  type Error = Error;

  // ── Households and membership ─────────────────────────────────────────────

  async fn create_household(
    &self,
    input: NewHousehold,
    creator: NewMember,
  ) -> Result<Household> {
    input.validate()?;
    creator.validate()?;

    let household = Household {
      household_id:  Uuid::new_v4(),
      name:          input.name,
      weekly_budget: input.weekly_budget,
      created_by:    creator.user_id,
      created_at:    Utc::now(),
    };

    let household_str = encode_uuid(household.household_id);
    let name          = household.name.clone();
    let budget        = household.weekly_budget;
    let creator_str   = encode_uuid(creator.user_id);
    let display_name  = creator.display_name;
    let at_str        = encode_dt(household.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO households (household_id, name, weekly_budget, created_by, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![household_str, name, budget, creator_str, at_str],
        )?;
        tx.execute(
          "INSERT INTO members (household_id, user_id, display_name, joined_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![household_str, creator_str, display_name, at_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(household)
  }

  async fn get_household(&self, id: Uuid) -> Result<Option<Household>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawHousehold> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT household_id, name, weekly_budget, created_by, created_at
               FROM households WHERE household_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawHousehold {
                  household_id:  row.get(0)?,
                  name:          row.get(1)?,
                  weekly_budget: row.get(2)?,
                  created_by:    row.get(3)?,
                  created_at:    row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawHousehold::into_household).transpose()
  }

  async fn add_member(
    &self,
    household_id: Uuid,
    input: NewMember,
  ) -> Result<Member> {
    input.validate()?;
    if !self.household_exists(household_id).await? {
      return Err(Error::HouseholdNotFound(household_id));
    }

    let household_str = encode_uuid(household_id);
    let user_str      = encode_uuid(input.user_id);
    let display_name  = input.display_name;
    let now_str       = encode_dt(Utc::now());

    let raw: RawMember = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO members (household_id, user_id, display_name, joined_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (household_id, user_id)
           DO UPDATE SET display_name = excluded.display_name",
          rusqlite::params![household_str, user_str, display_name, now_str],
        )?;
        conn.query_row(
          "SELECT household_id, user_id, display_name, joined_at
           FROM members WHERE household_id = ?1 AND user_id = ?2",
          rusqlite::params![household_str, user_str],
          |row| {
            Ok(RawMember {
              household_id: row.get(0)?,
              user_id:      row.get(1)?,
              display_name: row.get(2)?,
              joined_at:    row.get(3)?,
            })
          },
        )
        .map_err(Into::into)
      })
      .await?;

    raw.into_member()
  }

  async fn list_members(&self, household_id: Uuid) -> Result<Vec<Member>> {
    let household_str = encode_uuid(household_id);

    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT household_id, user_id, display_name, joined_at
           FROM members WHERE household_id = ?1
           ORDER BY joined_at, user_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![household_str], |row| {
            Ok(RawMember {
              household_id: row.get(0)?,
              user_id:      row.get(1)?,
              display_name: row.get(2)?,
              joined_at:    row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_member).collect()
  }

  async fn is_member(&self, household_id: Uuid, user_id: Uuid) -> Result<bool> {
    let household_str = encode_uuid(household_id);
    let user_str = encode_uuid(user_id);

    let found: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM members WHERE household_id = ?1 AND user_id = ?2",
              rusqlite::params![household_str, user_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  // ── Dietary profiles ──────────────────────────────────────────────────────

  async fn upsert_profile(
    &self,
    household_id: Uuid,
    user_id: Uuid,
    input: ProfileInput,
  ) -> Result<MemberProfile> {
    if !self.household_exists(household_id).await? {
      return Err(Error::HouseholdNotFound(household_id));
    }

    let input = input.normalized();
    let profile = MemberProfile {
      household_id,
      user_id,
      daily_calorie_target: input.daily_calorie_target,
      age:                  input.age,
      diet:                 input.diet,
      restrictions:         input.restrictions,
      preferences:          input.preferences,
      updated_at:           Utc::now(),
    };

    let household_str    = encode_uuid(household_id);
    let user_str         = encode_uuid(user_id);
    let calories         = profile.daily_calorie_target.map(i64::from);
    let age              = profile.age.map(i64::from);
    let diet             = profile.diet.clone();
    let restrictions_str = encode_string_list(&profile.restrictions)?;
    let preferences_str  = encode_string_list(&profile.preferences)?;
    let at_str           = encode_dt(profile.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles
             (household_id, user_id, daily_calorie_target, age, diet,
              restrictions, preferences, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT (household_id, user_id) DO UPDATE SET
             daily_calorie_target = excluded.daily_calorie_target,
             age                  = excluded.age,
             diet                 = excluded.diet,
             restrictions         = excluded.restrictions,
             preferences          = excluded.preferences,
             updated_at           = excluded.updated_at",
          rusqlite::params![
            household_str,
            user_str,
            calories,
            age,
            diet,
            restrictions_str,
            preferences_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(profile)
  }

  async fn list_profiles(&self, household_id: Uuid) -> Result<Vec<MemberProfile>> {
    let household_str = encode_uuid(household_id);

    let raws: Vec<RawProfile> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT household_id, user_id, daily_calorie_target, age, diet,
                  restrictions, preferences, updated_at
           FROM profiles WHERE household_id = ?1
           ORDER BY user_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![household_str], |row| {
            Ok(RawProfile {
              household_id:         row.get(0)?,
              user_id:              row.get(1)?,
              daily_calorie_target: row.get(2)?,
              age:                  row.get(3)?,
              diet:                 row.get(4)?,
              restrictions:         row.get(5)?,
              preferences:          row.get(6)?,
              updated_at:           row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  // ── Plans ─────────────────────────────────────────────────────────────────

  async fn get_or_create_plan(
    &self,
    household_id: Uuid,
    week_start: NaiveDate,
  ) -> Result<MealPlan> {
    if !plan::is_week_start(week_start) {
      return Err(larder_core::Error::NotAWeekStart(week_start).into());
    }
    if !self.household_exists(household_id).await? {
      return Err(Error::HouseholdNotFound(household_id));
    }

    let household_str = encode_uuid(household_id);
    let week_str      = encode_date(week_start);
    let fresh_id      = encode_uuid(Uuid::new_v4());
    let now_str       = encode_dt(Utc::now());

    let raw: RawPlan = self
      .conn
      .call(move |conn| {
        if let Some(existing) = conn
          .query_row(
            "SELECT plan_id, household_id, week_start, created_at
             FROM plans WHERE household_id = ?1 AND week_start = ?2",
            rusqlite::params![household_str, week_str],
            |row| {
              Ok(RawPlan {
                plan_id:      row.get(0)?,
                household_id: row.get(1)?,
                week_start:   row.get(2)?,
                created_at:   row.get(3)?,
              })
            },
          )
          .optional()?
        {
          return Ok(existing);
        }

        conn.execute(
          "INSERT INTO plans (plan_id, household_id, week_start, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![fresh_id, household_str, week_str, now_str],
        )?;

        Ok(RawPlan {
          plan_id:      fresh_id,
          household_id: household_str,
          week_start:   week_str,
          created_at:   now_str,
        })
      })
      .await?;

    raw.into_plan()
  }

  async fn get_plan(&self, plan_id: Uuid) -> Result<Option<MealPlan>> {
    let plan_str = encode_uuid(plan_id);

    let raw: Option<RawPlan> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT plan_id, household_id, week_start, created_at
               FROM plans WHERE plan_id = ?1",
              rusqlite::params![plan_str],
              |row| {
                Ok(RawPlan {
                  plan_id:      row.get(0)?,
                  household_id: row.get(1)?,
                  week_start:   row.get(2)?,
                  created_at:   row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPlan::into_plan).transpose()
  }

  async fn plan_for_week(
    &self,
    household_id: Uuid,
    week_start: NaiveDate,
  ) -> Result<Option<PlanView>> {
    match self.plan_row(household_id, week_start).await? {
      Some(plan) => Ok(Some(self.view_of(plan).await?)),
      None => Ok(None),
    }
  }

  async fn latest_plan(&self, household_id: Uuid) -> Result<Option<PlanView>> {
    let household_str = encode_uuid(household_id);

    let raw: Option<RawPlan> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT plan_id, household_id, week_start, created_at
               FROM plans WHERE household_id = ?1
               ORDER BY week_start DESC LIMIT 1",
              rusqlite::params![household_str],
              |row| {
                Ok(RawPlan {
                  plan_id:      row.get(0)?,
                  household_id: row.get(1)?,
                  week_start:   row.get(2)?,
                  created_at:   row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    match raw.map(RawPlan::into_plan).transpose()? {
      Some(plan) => Ok(Some(self.view_of(plan).await?)),
      None => Ok(None),
    }
  }

  async fn replace_plan_meals(
    &self,
    plan_id: Uuid,
    meals: Vec<NewMeal>,
  ) -> Result<Vec<Meal>> {
    if self.get_plan(plan_id).await?.is_none() {
      return Err(Error::PlanNotFound(plan_id));
    }
    plan::validate_meal_batch(&meals)?;

    let mut new_meals: Vec<Meal> = meals
      .into_iter()
      .map(|m| Meal {
        meal_id:      Uuid::new_v4(),
        plan_id,
        day_of_week:  m.day_of_week,
        meal_type:    m.meal_type,
        name:         m.name,
        description:  m.description,
        calories:     m.calories,
        ingredients:  m.ingredients,
        instructions: m.instructions,
        image_url:    m.image_url,
      })
      .collect();
    new_meals.sort_by_key(|m| m.slot());

    let rows: Vec<RawMeal> = new_meals
      .iter()
      .map(|m| {
        Ok(RawMeal {
          meal_id:      encode_uuid(m.meal_id),
          plan_id:      encode_uuid(m.plan_id),
          day_of_week:  i64::from(m.day_of_week),
          meal_type:    encode_meal_type(m.meal_type).to_owned(),
          name:         m.name.clone(),
          description:  m.description.clone(),
          calories:     m.calories.map(i64::from),
          ingredients:  encode_string_list(&m.ingredients)?,
          instructions: m.instructions.clone(),
          image_url:    m.image_url.clone(),
        })
      })
      .collect::<Result<_>>()?;

    let plan_str = encode_uuid(plan_id);

    // Old meals and (via FK cascade) their decisions go in the same
    // transaction as the new batch; a failure leaves the plan untouched.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM meals WHERE plan_id = ?1",
          rusqlite::params![plan_str],
        )?;
        for row in &rows {
          tx.execute(
            "INSERT INTO meals
               (meal_id, plan_id, day_of_week, meal_type, name, description,
                calories, ingredients, instructions, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
              row.meal_id,
              row.plan_id,
              row.day_of_week,
              row.meal_type,
              row.name,
              row.description,
              row.calories,
              row.ingredients,
              row.instructions,
              row.image_url,
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(new_meals)
  }

  async fn get_meal(&self, meal_id: Uuid) -> Result<Option<Meal>> {
    let meal_str = encode_uuid(meal_id);

    let raw: Option<RawMeal> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT meal_id, plan_id, day_of_week, meal_type, name,
                      description, calories, ingredients, instructions, image_url
               FROM meals WHERE meal_id = ?1",
              rusqlite::params![meal_str],
              |row| {
                Ok(RawMeal {
                  meal_id:      row.get(0)?,
                  plan_id:      row.get(1)?,
                  day_of_week:  row.get(2)?,
                  meal_type:    row.get(3)?,
                  name:         row.get(4)?,
                  description:  row.get(5)?,
                  calories:     row.get(6)?,
                  ingredients:  row.get(7)?,
                  instructions: row.get(8)?,
                  image_url:    row.get(9)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMeal::into_meal).transpose()
  }

  // ── Decisions and comments ────────────────────────────────────────────────

  async fn record_decision(
    &self,
    meal_id: Uuid,
    member_id: Uuid,
    input: NewDecision,
  ) -> Result<MealDecision> {
    if self.get_meal(meal_id).await?.is_none() {
      return Err(Error::MealNotFound(meal_id));
    }

    let decision = MealDecision {
      meal_id,
      member_id,
      approved:   input.approved,
      comment:    input.comment,
      decided_at: Utc::now(),
    };

    let meal_str   = encode_uuid(meal_id);
    let member_str = encode_uuid(member_id);
    let approved   = decision.approved;
    let comment    = decision.comment.clone();
    let at_str     = encode_dt(decision.decided_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO decisions (meal_id, member_id, approved, comment, decided_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (meal_id, member_id) DO UPDATE SET
             approved   = excluded.approved,
             comment    = excluded.comment,
             decided_at = excluded.decided_at",
          rusqlite::params![meal_str, member_str, approved, comment, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(decision)
  }

  async fn meal_feedback(&self, meal_id: Uuid) -> Result<MealFeedback> {
    let meal_str = encode_uuid(meal_id);

    let raws: Vec<RawDecision> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT meal_id, member_id, approved, comment, decided_at
           FROM decisions WHERE meal_id = ?1
           ORDER BY decided_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![meal_str], |row| {
            Ok(RawDecision {
              meal_id:    row.get(0)?,
              member_id:  row.get(1)?,
              approved:   row.get(2)?,
              comment:    row.get(3)?,
              decided_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let decisions = raws
      .into_iter()
      .map(RawDecision::into_decision)
      .collect::<Result<Vec<_>>>()?;

    Ok(MealFeedback::from_decisions(meal_id, decisions))
  }

  async fn post_comment(
    &self,
    plan_id: Uuid,
    author_id: Uuid,
    input: NewComment,
  ) -> Result<PlanComment> {
    input.validate()?;
    if self.get_plan(plan_id).await?.is_none() {
      return Err(Error::PlanNotFound(plan_id));
    }

    let comment = PlanComment {
      comment_id:  Uuid::new_v4(),
      plan_id,
      author_id,
      body:        input.body,
      day_of_week: input.day_of_week,
      meal_type:   input.meal_type,
      posted_at:   Utc::now(),
    };

    let comment_str = encode_uuid(comment.comment_id);
    let plan_str    = encode_uuid(plan_id);
    let author_str  = encode_uuid(author_id);
    let body        = comment.body.clone();
    let day         = comment.day_of_week.map(i64::from);
    let meal_type   = comment.meal_type.map(|t| encode_meal_type(t).to_owned());
    let at_str      = encode_dt(comment.posted_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments
             (comment_id, plan_id, author_id, body, day_of_week, meal_type, posted_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            comment_str,
            plan_str,
            author_str,
            body,
            day,
            meal_type,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn list_comments(&self, plan_id: Uuid) -> Result<Vec<PlanComment>> {
    let plan_str = encode_uuid(plan_id);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT comment_id, plan_id, author_id, body, day_of_week, meal_type,
                  posted_at
           FROM comments WHERE plan_id = ?1
           ORDER BY posted_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![plan_str], |row| {
            Ok(RawComment {
              comment_id:  row.get(0)?,
              plan_id:     row.get(1)?,
              author_id:   row.get(2)?,
              body:        row.get(3)?,
              day_of_week: row.get(4)?,
              meal_type:   row.get(5)?,
              posted_at:   row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  // ── Inventory and expenses ────────────────────────────────────────────────

  async fn upsert_inventory_item(
    &self,
    household_id: Uuid,
    input: NewInventoryItem,
  ) -> Result<InventoryItem> {
    input.validate()?;
    if !self.household_exists(household_id).await? {
      return Err(Error::HouseholdNotFound(household_id));
    }

    let household_str = encode_uuid(household_id);
    let normalized    = normalize_name(&input.name);
    let fresh_id      = encode_uuid(Uuid::new_v4());
    let name          = input.name.trim().to_string();
    let category      = input.category;
    let quantity      = input.quantity;
    let unit          = input.unit;
    let cost          = input.cost;
    let expiry_str    = input.expiry_date.map(encode_date);
    let threshold     = i64::from(input.low_stock_threshold);
    let now_str       = encode_dt(Utc::now());

    let raw: RawInventoryItem = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO inventory
             (item_id, household_id, name, normalized_name, category, quantity,
              unit, cost, expiry_date, low_stock_threshold, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
           ON CONFLICT (household_id, normalized_name) DO UPDATE SET
             name                = excluded.name,
             category            = excluded.category,
             quantity            = excluded.quantity,
             unit                = excluded.unit,
             cost                = excluded.cost,
             expiry_date         = excluded.expiry_date,
             low_stock_threshold = excluded.low_stock_threshold,
             updated_at          = excluded.updated_at",
          rusqlite::params![
            fresh_id,
            household_str,
            name,
            normalized,
            category,
            quantity,
            unit,
            cost,
            expiry_str,
            threshold,
            now_str,
          ],
        )?;
        // The conflict path keeps the original item_id; read the row back.
        conn
          .query_row(
            "SELECT item_id, household_id, name, category, quantity, unit, cost,
                    expiry_date, low_stock_threshold, updated_at
             FROM inventory
             WHERE household_id = ?1 AND normalized_name = ?2",
            rusqlite::params![household_str, normalized],
            |row| {
              Ok(RawInventoryItem {
                item_id:             row.get(0)?,
                household_id:        row.get(1)?,
                name:                row.get(2)?,
                category:            row.get(3)?,
                quantity:            row.get(4)?,
                unit:                row.get(5)?,
                cost:                row.get(6)?,
                expiry_date:         row.get(7)?,
                low_stock_threshold: row.get(8)?,
                updated_at:          row.get(9)?,
              })
            },
          )
          .map_err(Into::into)
      })
      .await?;

    raw.into_item()
  }

  async fn list_inventory(&self, household_id: Uuid) -> Result<Vec<InventoryItem>> {
    let household_str = encode_uuid(household_id);

    let raws: Vec<RawInventoryItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT item_id, household_id, name, category, quantity, unit, cost,
                  expiry_date, low_stock_threshold, updated_at
           FROM inventory WHERE household_id = ?1
           ORDER BY name COLLATE NOCASE",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![household_str], |row| {
            Ok(RawInventoryItem {
              item_id:             row.get(0)?,
              household_id:        row.get(1)?,
              name:                row.get(2)?,
              category:            row.get(3)?,
              quantity:            row.get(4)?,
              unit:                row.get(5)?,
              cost:                row.get(6)?,
              expiry_date:         row.get(7)?,
              low_stock_threshold: row.get(8)?,
              updated_at:          row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawInventoryItem::into_item).collect()
  }

  async fn add_expense(
    &self,
    household_id: Uuid,
    input: NewExpense,
  ) -> Result<Expense> {
    input.validate()?;
    if !self.household_exists(household_id).await? {
      return Err(Error::HouseholdNotFound(household_id));
    }

    let expense = Expense {
      expense_id:   Uuid::new_v4(),
      household_id,
      amount:       input.amount,
      description:  input.description,
      category:     input.category,
      receipt:      input.receipt,
      created_at:   Utc::now(),
    };

    let expense_str   = encode_uuid(expense.expense_id);
    let household_str = encode_uuid(household_id);
    let amount        = expense.amount;
    let description   = expense.description.clone();
    let category      = expense.category.clone();
    let receipt_str   = expense
      .receipt
      .as_ref()
      .map(encode_json)
      .transpose()?;
    let at_str        = encode_dt(expense.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO expenses
             (expense_id, household_id, amount, description, category, receipt, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            expense_str,
            household_str,
            amount,
            description,
            category,
            receipt_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(expense)
  }

  async fn list_expenses(&self, household_id: Uuid) -> Result<Vec<Expense>> {
    let household_str = encode_uuid(household_id);

    let raws: Vec<RawExpense> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT expense_id, household_id, amount, description, category,
                  receipt, created_at
           FROM expenses WHERE household_id = ?1
           ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![household_str], |row| {
            Ok(RawExpense {
              expense_id:   row.get(0)?,
              household_id: row.get(1)?,
              amount:       row.get(2)?,
              description:  row.get(3)?,
              category:     row.get(4)?,
              receipt:      row.get(5)?,
              created_at:   row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawExpense::into_expense).collect()
  }

  // ── Shopping list ─────────────────────────────────────────────────────────

  async fn merge_shopping_item(
    &self,
    household_id: Uuid,
    input: NewShoppingItem,
  ) -> Result<(ShoppingItem, bool)> {
    input.validate()?;
    if !self.household_exists(household_id).await? {
      return Err(Error::HouseholdNotFound(household_id));
    }

    let household_str    = encode_uuid(household_id);
    let normalized       = normalize_name(&input.name);
    let display_name     = input.name.trim().to_string();
    let incoming_reasons = input.reasons.clone();
    let insert_reasons   = encode_string_list(&merge_reasons(&[], &input.reasons))?;
    let estimated_cost   = input.estimated_cost;
    let store_hint       = input.store;
    let fresh_id         = encode_uuid(Uuid::new_v4());
    let now_str          = encode_dt(Utc::now());

    // Lookup and write happen in one connection call so concurrent merges
    // for the same name cannot interleave between them.
    let (raw, created): (RawShoppingItem, bool) = self
      .conn
      .call(move |conn| {
        let existing = conn
          .query_row(
            "SELECT item_id, household_id, name, reasons, estimated_cost,
                    store, completed, added_at
             FROM shopping_items
             WHERE household_id = ?1 AND normalized_name = ?2 AND completed = 0",
            rusqlite::params![household_str, normalized],
            |row| {
              Ok(RawShoppingItem {
                item_id:        row.get(0)?,
                household_id:   row.get(1)?,
                name:           row.get(2)?,
                reasons:        row.get(3)?,
                estimated_cost: row.get(4)?,
                store:          row.get(5)?,
                completed:      row.get(6)?,
                added_at:       row.get(7)?,
              })
            },
          )
          .optional()?;

        if let Some(mut raw) = existing {
          let known: Vec<String> = serde_json::from_str(&raw.reasons)
            .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
          let merged = merge_reasons(&known, &incoming_reasons);
          let merged_json = serde_json::to_string(&merged)
            .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

          conn.execute(
            "UPDATE shopping_items
             SET reasons        = ?2,
                 estimated_cost = COALESCE(estimated_cost, ?3),
                 store          = COALESCE(store, ?4)
             WHERE item_id = ?1",
            rusqlite::params![raw.item_id, merged_json, estimated_cost, store_hint],
          )?;

          raw.reasons = merged_json;
          raw.estimated_cost = raw.estimated_cost.or(estimated_cost);
          raw.store = raw.store.or(store_hint);
          return Ok((raw, false));
        }

        conn.execute(
          "INSERT INTO shopping_items
             (item_id, household_id, name, normalized_name, reasons,
              estimated_cost, store, completed, added_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)",
          rusqlite::params![
            fresh_id,
            household_str,
            display_name,
            normalized,
            insert_reasons,
            estimated_cost,
            store_hint,
            now_str,
          ],
        )?;

        Ok((
          RawShoppingItem {
            item_id:        fresh_id,
            household_id:   household_str,
            name:           display_name,
            reasons:        insert_reasons,
            estimated_cost,
            store:          store_hint,
            completed:      false,
            added_at:       now_str,
          },
          true,
        ))
      })
      .await?;

    Ok((raw.into_item()?, created))
  }

  async fn list_shopping(&self, household_id: Uuid) -> Result<Vec<ShoppingItem>> {
    let household_str = encode_uuid(household_id);

    let raws: Vec<RawShoppingItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT item_id, household_id, name, reasons, estimated_cost, store,
                  completed, added_at
           FROM shopping_items WHERE household_id = ?1
           ORDER BY added_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![household_str], |row| {
            Ok(RawShoppingItem {
              item_id:        row.get(0)?,
              household_id:   row.get(1)?,
              name:           row.get(2)?,
              reasons:        row.get(3)?,
              estimated_cost: row.get(4)?,
              store:          row.get(5)?,
              completed:      row.get(6)?,
              added_at:       row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawShoppingItem::into_item).collect()
  }

  async fn get_shopping_item(&self, item_id: Uuid) -> Result<Option<ShoppingItem>> {
    let item_str = encode_uuid(item_id);

    let raw: Option<RawShoppingItem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT item_id, household_id, name, reasons, estimated_cost,
                      store, completed, added_at
               FROM shopping_items WHERE item_id = ?1",
              rusqlite::params![item_str],
              |row| {
                Ok(RawShoppingItem {
                  item_id:        row.get(0)?,
                  household_id:   row.get(1)?,
                  name:           row.get(2)?,
                  reasons:        row.get(3)?,
                  estimated_cost: row.get(4)?,
                  store:          row.get(5)?,
                  completed:      row.get(6)?,
                  added_at:       row.get(7)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawShoppingItem::into_item).transpose()
  }

  async fn set_shopping_completed(
    &self,
    item_id: Uuid,
    completed: bool,
  ) -> Result<Option<ShoppingItem>> {
    let item_str = encode_uuid(item_id);

    let raw: Option<RawShoppingItem> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE shopping_items SET completed = ?2 WHERE item_id = ?1",
          rusqlite::params![item_str, completed],
        )?;
        Ok(
          conn
            .query_row(
              "SELECT item_id, household_id, name, reasons, estimated_cost,
                      store, completed, added_at
               FROM shopping_items WHERE item_id = ?1",
              rusqlite::params![item_str],
              |row| {
                Ok(RawShoppingItem {
                  item_id:        row.get(0)?,
                  household_id:   row.get(1)?,
                  name:           row.get(2)?,
                  reasons:        row.get(3)?,
                  estimated_cost: row.get(4)?,
                  store:          row.get(5)?,
                  completed:      row.get(6)?,
                  added_at:       row.get(7)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawShoppingItem::into_item).transpose()
  }

  async fn delete_shopping_item(&self, item_id: Uuid) -> Result<bool> {
    let item_str = encode_uuid(item_id);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM shopping_items WHERE item_id = ?1",
          rusqlite::params![item_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }
}
