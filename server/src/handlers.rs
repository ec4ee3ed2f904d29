use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use tracing::{info, warn};
use turso::{Connection, Row, Value};

use crate::{
    AppState,
    db::{now_utc, nullable_text, serialize_timestamp},
    error::{AppError, AppResult},
};
use piste_core::{
    IdGenerator, UuidIds,
    diff::{BlockDeviation, deviations, modified_block_ids},
    validation::finalize,
    workout::{
        Assignee, CompleteWorkoutRequest, CompleteWorkoutResponse, PlanPayload, Workout,
        WorkoutQuery, WorkoutStatus, WorkoutType,
    },
};

const WORKOUT_COLUMNS: &str = "id, date, workout_type, tag_seance, status, notes, rpe, \
     planned_data, workout_data, assigned_to_user_id, assigned_to_group_id";

pub async fn health() -> &'static str {
    "ok"
}

pub async fn create_workout(
    State(state): State<AppState>,
    Json(payload): Json<PlanPayload>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let id = UuidIds.new_id();
    let planned_data = serde_json::to_string(&payload.planned_data)?;
    let (user_id, group_id) = match &payload.assignee {
        Assignee::AssignedToUserId(user) => (Some(user.as_str()), None),
        Assignee::AssignedToGroupId(group) => (None, Some(group.as_str())),
    };

    let conn = state.db.connect()?;
    let params: Vec<Value> = vec![
        id.clone().into(),
        payload.date.to_string().into(),
        payload.workout_type.as_str().to_string().into(),
        payload.tag_seance.trim().to_string().into(),
        WorkoutStatus::Planned.as_str().to_string().into(),
        nullable_text(payload.notes.as_deref()),
        planned_data.into(),
        nullable_text(user_id),
        nullable_text(group_id),
    ];
    conn.execute(
        "INSERT INTO workouts (id, date, workout_type, tag_seance, status, notes, \
         planned_data, assigned_to_user_id, assigned_to_group_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params,
    )
    .await?;
    info!(workout_id = %id, blocks = payload.planned_data.blocs.len(), "workout planned");

    let workout = fetch_workout(&conn, &id).await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

pub async fn list_workouts(
    State(state): State<AppState>,
    Query(query): Query<WorkoutQuery>,
) -> AppResult<Json<Vec<Workout>>> {
    let mut sql = format!("SELECT {WORKOUT_COLUMNS} FROM workouts");
    let mut parts: Vec<&str> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(user_id) = query.user_id {
        parts.push("assigned_to_user_id = ?");
        params.push(user_id.into());
    }
    if let Some(group_id) = query.group_id {
        parts.push("assigned_to_group_id = ?");
        params.push(group_id.into());
    }
    if let Some(status) = query.status {
        parts.push("status = ?");
        params.push(status.as_str().to_string().into());
    }
    if !parts.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&parts.join(" AND "));
    }
    sql.push_str(" ORDER BY date DESC, id");

    let conn = state.db.connect()?;
    let mut rows = conn.query(&sql, params).await?;
    let mut workouts = Vec::new();
    while let Some(row) = rows.next().await? {
        workouts.push(workout_from_row(&row)?);
    }

    Ok(Json(workouts))
}

pub async fn get_workout(
    State(state): State<AppState>,
    Path(workout_id): Path<String>,
) -> AppResult<Json<Workout>> {
    let conn = state.db.connect()?;
    Ok(Json(fetch_workout(&conn, &workout_id).await?))
}

pub async fn delete_workout(
    State(state): State<AppState>,
    Path(workout_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let conn = state.db.connect()?;
    let deleted = conn
        .execute("DELETE FROM workouts WHERE id = ?1", [workout_id.as_str()])
        .await?;
    if deleted == 0 {
        return Err(AppError::NotFound("workout not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Stores what the athlete actually did. The planned data is never written
/// here; a second completion simply replaces the first.
pub async fn complete_workout(
    State(state): State<AppState>,
    Path(workout_id): Path<String>,
    Json(request): Json<CompleteWorkoutRequest>,
) -> AppResult<Json<CompleteWorkoutResponse>> {
    let conn = state.db.connect()?;
    let workout = fetch_workout(&conn, &workout_id).await?;
    request.validate()?;

    let completion = finalize(
        &request.blocs,
        request.notes.as_deref().unwrap_or_default(),
        request.rpe,
        workout.workout_type,
    )?;
    let planned = workout
        .planned_blocks()
        .inspect_err(|err| {
            warn!(
                workout_id = %workout_id,
                error = %err,
                "stored plan unreadable, every block counts as modified"
            );
        })
        .unwrap_or_default();
    let modified_blocks = modified_block_ids(&completion.workout_data.blocs, &planned);

    let params: Vec<Value> = vec![
        serde_json::to_string(&completion.workout_data)?.into(),
        completion.status.as_str().to_string().into(),
        i64::from(completion.rpe).into(),
        nullable_text(completion.notes.as_deref()),
        serialize_timestamp(now_utc()).into(),
        workout_id.clone().into(),
    ];
    conn.execute(
        "UPDATE workouts SET workout_data = ?1, status = ?2, rpe = ?3, \
         notes = COALESCE(?4, notes), updated_at = ?5 WHERE id = ?6",
        params,
    )
    .await?;
    info!(
        workout_id = %workout_id,
        modified = modified_blocks.len(),
        "workout completed"
    );

    let workout = fetch_workout(&conn, &workout_id).await?;
    Ok(Json(CompleteWorkoutResponse {
        workout,
        modified_blocks,
    }))
}

pub async fn get_deviations(
    State(state): State<AppState>,
    Path(workout_id): Path<String>,
) -> AppResult<Json<Vec<BlockDeviation>>> {
    let conn = state.db.connect()?;
    let workout = fetch_workout(&conn, &workout_id).await?;
    if workout.status != WorkoutStatus::Completed {
        return Err(AppError::BadRequest(
            "workout has not been completed".to_string(),
        ));
    }

    let planned = workout.planned_blocks()?;
    let actual = workout.actual_blocks()?;
    Ok(Json(deviations(&actual, &planned)))
}

async fn fetch_workout(conn: &Connection, workout_id: &str) -> AppResult<Workout> {
    let mut rows = conn
        .query(
            &format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = ?1"),
            [workout_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => workout_from_row(&row),
        None => Err(AppError::NotFound("workout not found".to_string())),
    }
}

fn workout_from_row(row: &Row) -> AppResult<Workout> {
    let id: String = row.get(0)?;
    let date_raw: String = row.get(1)?;
    let type_raw: String = row.get(2)?;
    let tag_seance: String = row.get(3)?;
    let status_raw: String = row.get(4)?;
    let notes: Option<String> = row.get(5)?;
    let rpe: Option<i64> = row.get(6)?;
    let planned_raw: Option<String> = row.get(7)?;
    let workout_raw: Option<String> = row.get(8)?;
    let assigned_to_user_id: Option<String> = row.get(9)?;
    let assigned_to_group_id: Option<String> = row.get(10)?;

    let date = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d")
        .map_err(|err| AppError::Internal(format!("invalid stored date '{date_raw}': {err}")))?;
    let workout_type = WorkoutType::parse(&type_raw)
        .map_err(|err| AppError::Internal(format!("workout {id}: {err}")))?;
    let status = WorkoutStatus::parse(&status_raw)
        .map_err(|err| AppError::Internal(format!("workout {id}: {err}")))?;

    Ok(Workout {
        id,
        date,
        workout_type,
        tag_seance,
        status,
        notes,
        rpe: rpe.and_then(|value| u8::try_from(value).ok()),
        planned_data: planned_raw.map(stored_json),
        workout_data: workout_raw.map(stored_json),
        assigned_to_user_id,
        assigned_to_group_id,
    })
}

/// Unreadable JSON is surfaced as a plain string so callers see a missing
/// plan instead of a failed request.
fn stored_json(raw: String) -> JsonValue {
    serde_json::from_str(&raw).unwrap_or(JsonValue::String(raw))
}
