use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::AppResult;
use turso::{Builder, Database, Value};

pub const MIGRATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS workouts (
    id TEXT PRIMARY KEY NOT NULL,
    date TEXT NOT NULL,
    workout_type TEXT NOT NULL,
    tag_seance TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'planned',
    notes TEXT,
    rpe INTEGER,
    planned_data TEXT NOT NULL,
    workout_data TEXT,
    assigned_to_user_id TEXT,
    assigned_to_group_id TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME
);

CREATE INDEX IF NOT EXISTS idx_workouts_user_date ON workouts(assigned_to_user_id, date);
CREATE INDEX IF NOT EXISTS idx_workouts_group_date ON workouts(assigned_to_group_id, date);
"#;

pub async fn init_database(path: &str) -> AppResult<Database> {
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;
    conn.execute_batch(MIGRATIONS).await?;
    Ok(db)
}

pub fn serialize_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Text parameter that binds as NULL when absent.
pub fn nullable_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| text.to_string().into())
}
