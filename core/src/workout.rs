use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{CoreError, CoreResult},
    models::{WorkoutBlock, collect_ids},
};

// ============================================================================
// Workouts
// ============================================================================

/// How the session was authored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum WorkoutType {
    #[default]
    #[serde(rename = "guidé")]
    Guide,
    /// Free-form session; completing it requires notes.
    #[serde(rename = "manuscrit")]
    Manuscrit,
    #[serde(rename = "modèle")]
    Modele,
}

impl WorkoutType {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutType::Guide => "guidé",
            WorkoutType::Manuscrit => "manuscrit",
            WorkoutType::Modele => "modèle",
        }
    }

    pub fn parse(raw: &str) -> CoreResult<Self> {
        match raw {
            "guidé" => Ok(WorkoutType::Guide),
            "manuscrit" => Ok(WorkoutType::Manuscrit),
            "modèle" => Ok(WorkoutType::Modele),
            other => Err(CoreError::Malformed(format!("unknown workout type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    #[default]
    Planned,
    Completed,
}

impl WorkoutStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutStatus::Planned => "planned",
            WorkoutStatus::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> CoreResult<Self> {
        match raw {
            "planned" => Ok(WorkoutStatus::Planned),
            "completed" => Ok(WorkoutStatus::Completed),
            other => Err(CoreError::Malformed(format!("unknown status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WorkoutData {
    pub blocs: Vec<WorkoutBlock>,
}

/// A workout as the persistence service returns it. `planned_data` and
/// `workout_data` stay raw until a validation session parses them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type", default)]
    pub workout_type: WorkoutType,
    #[serde(default)]
    pub tag_seance: String,
    #[serde(default)]
    pub status: WorkoutStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<u8>,
    #[serde(default)]
    pub planned_data: Option<Value>,
    #[serde(default)]
    pub workout_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_group_id: Option<String>,
}

impl Workout {
    pub fn planned_blocks(&self) -> CoreResult<Vec<WorkoutBlock>> {
        parse_blocks(self.planned_data.as_ref())
    }

    pub fn actual_blocks(&self) -> CoreResult<Vec<WorkoutBlock>> {
        parse_blocks(self.workout_data.as_ref())
    }
}

/// Reads a block list stored either as `{ "blocs": [...] }` or as a bare
/// array.
pub fn parse_blocks(raw: Option<&Value>) -> CoreResult<Vec<WorkoutBlock>> {
    let list = match raw {
        None | Some(Value::Null) => {
            return Err(CoreError::NoPlanFound("no block data".to_string()));
        }
        Some(list @ Value::Array(_)) => list,
        Some(Value::Object(map)) => match map.get("blocs") {
            Some(list @ Value::Array(_)) => list,
            _ => {
                return Err(CoreError::NoPlanFound(
                    "object without a blocs array".to_string(),
                ));
            }
        },
        Some(other) => {
            return Err(CoreError::NoPlanFound(format!(
                "unexpected block data: {other}"
            )));
        }
    };
    serde_json::from_value(list.clone())
        .map_err(|err| CoreError::NoPlanFound(format!("unreadable blocks: {err}")))
}

// ============================================================================
// Payloads handed to the persistence service
// ============================================================================

/// Who a planned workout is for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Assignee {
    AssignedToUserId(String),
    AssignedToGroupId(String),
}

/// Create-workout payload of the coach planning flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanPayload {
    pub planned_data: WorkoutData,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    pub tag_seance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub assignee: Assignee,
}

impl PlanPayload {
    pub fn validate(&self) -> CoreResult<()> {
        if self.tag_seance.trim().is_empty() {
            return Err(CoreError::Malformed("tag_seance is required".to_string()));
        }
        check_block_ids(&self.planned_data.blocs)
    }
}

/// Block ids must be non-empty and unique across the whole tree, since they
/// are the join key between planned and actual data.
pub fn check_block_ids(blocks: &[WorkoutBlock]) -> CoreResult<()> {
    let mut seen = HashSet::new();
    for id in collect_ids(blocks) {
        if id.is_empty() {
            return Err(CoreError::Malformed("block without an id".to_string()));
        }
        if !seen.insert(id) {
            return Err(CoreError::Malformed(format!("duplicate block id '{id}'")));
        }
    }
    Ok(())
}

/// Update-workout payload produced when an athlete validates a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionPayload {
    pub workout_data: WorkoutData,
    pub status: WorkoutStatus,
    pub rpe: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ============================================================================
// Service requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WorkoutQuery {
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub status: Option<WorkoutStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompleteWorkoutRequest {
    pub blocs: Vec<WorkoutBlock>,
    #[serde(default)]
    pub notes: Option<String>,
    pub rpe: u8,
}

impl CompleteWorkoutRequest {
    pub fn validate(&self) -> CoreResult<()> {
        check_block_ids(&self.blocs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompleteWorkoutResponse {
    pub workout: Workout,
    pub modified_blocks: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn course(id: &str) -> Value {
        json!({"id": id, "type": "course", "series": 1, "reps": 1, "distance": 100,
               "restBetweenReps": "0", "restBetweenSeries": "0"})
    }

    #[test]
    fn parses_both_stored_shapes() {
        let wrapped = json!({"blocs": [course("a")]});
        let bare = json!([course("a")]);
        assert_eq!(parse_blocks(Some(&wrapped)).unwrap()[0].id, "a");
        assert_eq!(parse_blocks(Some(&bare)).unwrap()[0].id, "a");
    }

    #[test]
    fn canvas_blocks_keep_their_own_keys() {
        let stored = json!({"blocs": [
            {"id": "r", "type": "repos", "duration": 180, "label": "Repos", "intensity_score": 1},
            {"id": "t", "type": "technique", "name": "Gammes", "duration": 600},
            {"id": "s", "type": "series", "seriesCount": 3, "restBetweenSeries": "2'",
             "label": "Circuit", "blocks": [{"id": "n", "type": "note", "content": "", "color": "blue"}]}
        ]});
        let blocks = parse_blocks(Some(&stored)).unwrap();
        let written = serde_json::to_value(WorkoutData { blocs: blocks }).unwrap();

        let rest = &written["blocs"][0];
        assert_eq!(rest["duration"], 180);
        assert_eq!(rest["label"], "Repos");
        assert_eq!(rest["intensity_score"], 1);
        assert_eq!(rest["type"], "repos");
        assert_eq!(written["blocs"][1]["name"], "Gammes");
        assert_eq!(written["blocs"][1]["duration"], 600);
        assert_eq!(written["blocs"][2]["label"], "Circuit");
        assert_eq!(written["blocs"][2]["blocks"][0]["color"], "blue");

        let again = parse_blocks(Some(&written)).unwrap();
        assert_eq!(again, parse_blocks(Some(&stored)).unwrap());
    }

    #[test]
    fn rejects_missing_and_malformed_plans() {
        for raw in [
            None,
            Some(json!(null)),
            Some(json!("blocs")),
            Some(json!({"blocks": []})),
            Some(json!({"blocs": {"id": "x"}})),
            Some(json!([{"id": "x", "type": "sprint"}])),
        ] {
            assert!(
                matches!(parse_blocks(raw.as_ref()), Err(CoreError::NoPlanFound(_))),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn workout_type_wire_names() {
        assert_eq!(serde_json::to_string(&WorkoutType::Guide).unwrap(), "\"guidé\"");
        assert_eq!(WorkoutType::parse("manuscrit").unwrap(), WorkoutType::Manuscrit);
        assert_eq!(WorkoutType::Modele.as_str(), "modèle");
        assert!(WorkoutType::parse("libre").is_err());
    }

    #[test]
    fn plan_payload_flattens_the_assignee() {
        let raw = json!({
            "planned_data": {"blocs": [course("a")]},
            "date": "2024-09-02",
            "type": "guidé",
            "tag_seance": "VMA",
            "assigned_to_group_id": "g-1"
        });
        let payload: PlanPayload = serde_json::from_value(raw).unwrap();
        assert_eq!(payload.assignee, Assignee::AssignedToGroupId("g-1".to_string()));
        assert!(payload.validate().is_ok());

        let written = serde_json::to_value(&payload).unwrap();
        assert_eq!(written["assigned_to_group_id"], "g-1");
        assert!(written.get("assigned_to_user_id").is_none());
        assert!(written.get("notes").is_none());
    }

    #[test]
    fn plan_payload_rejects_duplicate_ids() {
        let raw = json!({
            "planned_data": {"blocs": [
                course("a"),
                {"id": "s", "type": "series", "seriesCount": 2, "restBetweenSeries": "1'",
                 "blocks": [course("a")]}
            ]},
            "date": "2024-09-02",
            "type": "guidé",
            "tag_seance": "VMA",
            "assigned_to_user_id": "u-1"
        });
        let payload: PlanPayload = serde_json::from_value(raw).unwrap();
        assert_eq!(
            payload.validate(),
            Err(CoreError::Malformed("duplicate block id 'a'".to_string()))
        );
    }

    #[test]
    fn completion_request_needs_distinct_ids() {
        let request: CompleteWorkoutRequest = serde_json::from_value(json!({
            "blocs": [course("a"), course("b")],
            "rpe": 6
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let mut duplicated = request.clone();
        duplicated.blocs[1].id = "a".to_string();
        assert_eq!(
            duplicated.validate(),
            Err(CoreError::Malformed("duplicate block id 'a'".to_string()))
        );

        let mut blank = request;
        blank.blocs[0].id.clear();
        assert!(matches!(blank.validate(), Err(CoreError::Malformed(_))));
    }

    #[test]
    fn workout_query_from_url() {
        let query: WorkoutQuery =
            serde_urlencoded::from_str("group_id=g-1&status=completed").unwrap();
        assert_eq!(query.group_id.as_deref(), Some("g-1"));
        assert_eq!(query.user_id, None);
        assert_eq!(query.status, Some(WorkoutStatus::Completed));
    }

    #[test]
    fn workout_reads_with_sparse_fields() {
        let raw = json!({"id": "w1", "date": "2024-09-02", "planned_data": [course("a")]});
        let workout: Workout = serde_json::from_value(raw).unwrap();
        assert_eq!(workout.status, WorkoutStatus::Planned);
        assert_eq!(workout.planned_blocks().unwrap().len(), 1);
        assert!(workout.actual_blocks().is_err());
    }
}
