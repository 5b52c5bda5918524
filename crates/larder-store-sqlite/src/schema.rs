//! SQL schema for the Larder SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS households (
    household_id  TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    weekly_budget REAL,              -- NULL = fall back to the default
    created_by    TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS members (
    household_id TEXT NOT NULL REFERENCES households(household_id),
    user_id      TEXT NOT NULL,
    display_name TEXT NOT NULL,
    joined_at    TEXT NOT NULL,
    PRIMARY KEY (household_id, user_id)
);

CREATE TABLE IF NOT EXISTS profiles (
    household_id         TEXT NOT NULL REFERENCES households(household_id),
    user_id              TEXT NOT NULL,
    daily_calorie_target INTEGER,
    age                  INTEGER,
    diet                 TEXT,
    restrictions         TEXT NOT NULL DEFAULT '[]',  -- JSON array
    preferences          TEXT NOT NULL DEFAULT '[]',  -- JSON array
    updated_at           TEXT NOT NULL,
    PRIMARY KEY (household_id, user_id)
);

-- One plan per household-week; week_start is always a Monday.
CREATE TABLE IF NOT EXISTS plans (
    plan_id      TEXT PRIMARY KEY,
    household_id TEXT NOT NULL REFERENCES households(household_id),
    week_start   TEXT NOT NULL,     -- ISO 8601 date
    created_at   TEXT NOT NULL,
    UNIQUE (household_id, week_start)
);

-- One meal per grid slot; regeneration deletes and reinserts the set.
CREATE TABLE IF NOT EXISTS meals (
    meal_id      TEXT PRIMARY KEY,
    plan_id      TEXT NOT NULL REFERENCES plans(plan_id) ON DELETE CASCADE,
    day_of_week  INTEGER NOT NULL,  -- 0 = Monday .. 6 = Sunday
    meal_type    TEXT NOT NULL,     -- 'breakfast' | 'lunch' | 'dinner'
    name         TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    calories     INTEGER,
    ingredients  TEXT NOT NULL DEFAULT '[]',  -- JSON array
    instructions TEXT,
    image_url    TEXT,
    UNIQUE (plan_id, day_of_week, meal_type)
);

-- One verdict per (meal, member); re-deciding overwrites the row.
CREATE TABLE IF NOT EXISTS decisions (
    meal_id    TEXT NOT NULL REFERENCES meals(meal_id) ON DELETE CASCADE,
    member_id  TEXT NOT NULL,
    approved   INTEGER NOT NULL,    -- 0 | 1
    comment    TEXT,
    decided_at TEXT NOT NULL,
    PRIMARY KEY (meal_id, member_id)
);

-- The week thread is strictly append-only.
-- The slot tag is a coordinate, not a meal reference, so the thread
-- survives plan regeneration intact.
CREATE TABLE IF NOT EXISTS comments (
    comment_id  TEXT PRIMARY KEY,
    plan_id     TEXT NOT NULL REFERENCES plans(plan_id),
    author_id   TEXT NOT NULL,
    body        TEXT NOT NULL,
    day_of_week INTEGER,            -- NULL = whole-week comment
    meal_type   TEXT,
    posted_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS inventory (
    item_id             TEXT PRIMARY KEY,
    household_id        TEXT NOT NULL REFERENCES households(household_id),
    name                TEXT NOT NULL,
    normalized_name     TEXT NOT NULL,
    category            TEXT,
    quantity            REAL NOT NULL,
    unit                TEXT,
    cost                REAL,
    expiry_date         TEXT,       -- ISO 8601 date
    low_stock_threshold INTEGER NOT NULL DEFAULT 0,
    updated_at          TEXT NOT NULL,
    UNIQUE (household_id, normalized_name)
);

-- Expenses are append-only stats input.
CREATE TABLE IF NOT EXISTS expenses (
    expense_id   TEXT PRIMARY KEY,
    household_id TEXT NOT NULL REFERENCES households(household_id),
    amount       REAL NOT NULL,
    description  TEXT NOT NULL,
    category     TEXT,
    receipt      TEXT,              -- JSON payload, kept verbatim
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS shopping_items (
    item_id         TEXT PRIMARY KEY,
    household_id    TEXT NOT NULL REFERENCES households(household_id),
    name            TEXT NOT NULL,
    normalized_name TEXT NOT NULL,
    reasons         TEXT NOT NULL DEFAULT '[]',  -- JSON array
    estimated_cost  REAL,
    store           TEXT,
    completed       INTEGER NOT NULL DEFAULT 0,
    added_at        TEXT NOT NULL
);

-- At most one live entry per ingredient; completed rows are history.
CREATE UNIQUE INDEX IF NOT EXISTS shopping_live_name_idx
    ON shopping_items(household_id, normalized_name) WHERE completed = 0;

CREATE INDEX IF NOT EXISTS plans_household_idx     ON plans(household_id);
CREATE INDEX IF NOT EXISTS meals_plan_idx          ON meals(plan_id);
CREATE INDEX IF NOT EXISTS decisions_meal_idx      ON decisions(meal_id);
CREATE INDEX IF NOT EXISTS comments_plan_idx       ON comments(plan_id);
CREATE INDEX IF NOT EXISTS inventory_household_idx ON inventory(household_id);
CREATE INDEX IF NOT EXISTS expenses_household_idx  ON expenses(household_id);
CREATE INDEX IF NOT EXISTS expenses_created_idx    ON expenses(created_at);
CREATE INDEX IF NOT EXISTS shopping_household_idx  ON shopping_items(household_id);

PRAGMA user_version = 1;
";
