//! Planned versus actual comparison, for "this was changed" feedback.
//!
//! [`diff_blocks`] walks both trees field by field. A block is modified
//! exactly when that walk reports at least one change, which is also exactly
//! when the two blocks are structurally unequal. Arrays compare by position.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    BlockBody, CourseBlock, ExtraFields, MuscuBlock, NoteBlock, RestBlock, SeriesBlock,
    TechniqueBlock, UniversalBlock, WorkoutBlock, WorkoutRound,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldChange {
    /// Dotted path from the block, e.g. `rounds[0].target_time`.
    pub path: String,
    pub planned: Value,
    pub actual: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockDeviation {
    pub block_id: String,
    pub changes: Vec<FieldChange>,
}

/// Single-field check used by individually highlighted inputs.
pub fn field_is_modified<T: PartialEq + ?Sized>(actual: &T, planned: &T) -> bool {
    actual != planned
}

pub fn is_modified(actual: &WorkoutBlock, planned: &WorkoutBlock) -> bool {
    !diff_blocks(actual, planned).is_empty()
}

pub fn diff_blocks(actual: &WorkoutBlock, planned: &WorkoutBlock) -> Vec<FieldChange> {
    let mut differ = Differ::default();
    differ.block("", actual, planned);
    differ.changes
}

/// Ids of top-level actual blocks that differ from, or have no, planned
/// counterpart.
pub fn modified_block_ids(actual: &[WorkoutBlock], planned: &[WorkoutBlock]) -> Vec<String> {
    actual
        .iter()
        .filter(|block| match planned.iter().find(|p| p.id == block.id) {
            Some(planned_block) => is_modified(block, planned_block),
            None => true,
        })
        .map(|block| block.id.clone())
        .collect()
}

/// Every top-level block whose actual state differs from the plan, including
/// planned blocks that were dropped and blocks the athlete added.
pub fn deviations(actual: &[WorkoutBlock], planned: &[WorkoutBlock]) -> Vec<BlockDeviation> {
    let mut out = Vec::new();
    for block in actual {
        let changes = match planned.iter().find(|p| p.id == block.id) {
            Some(planned_block) => diff_blocks(block, planned_block),
            None => vec![FieldChange {
                path: String::new(),
                planned: Value::Null,
                actual: to_json(block),
            }],
        };
        if !changes.is_empty() {
            out.push(BlockDeviation {
                block_id: block.id.clone(),
                changes,
            });
        }
    }
    for planned_block in planned {
        if !actual.iter().any(|a| a.id == planned_block.id) {
            out.push(BlockDeviation {
                block_id: planned_block.id.clone(),
                changes: vec![FieldChange {
                    path: String::new(),
                    planned: to_json(planned_block),
                    actual: Value::Null,
                }],
            });
        }
    }
    out
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

#[derive(Default)]
struct Differ {
    changes: Vec<FieldChange>,
}

impl Differ {
    fn field<T: PartialEq + Serialize + ?Sized>(
        &mut self,
        prefix: &str,
        name: &str,
        actual: &T,
        planned: &T,
    ) {
        if field_is_modified(actual, planned) {
            self.changes.push(FieldChange {
                path: join(prefix, name),
                planned: to_json(planned),
                actual: to_json(actual),
            });
        }
    }

    /// Positional comparison; extra or missing entries are reported whole.
    fn list<T, F>(&mut self, prefix: &str, name: &str, actual: &[T], planned: &[T], mut item: F)
    where
        T: PartialEq + Serialize,
        F: FnMut(&mut Self, &str, &T, &T),
    {
        let len = actual.len().max(planned.len());
        for index in 0..len {
            let path = join(prefix, &format!("{name}[{index}]"));
            match (actual.get(index), planned.get(index)) {
                (Some(a), Some(p)) => item(self, &path, a, p),
                (a, p) => self.changes.push(FieldChange {
                    path,
                    planned: p.map(to_json).unwrap_or(Value::Null),
                    actual: a.map(to_json).unwrap_or(Value::Null),
                }),
            }
        }
    }

    /// Unmodelled keys compare one by one under their own names.
    fn extra(&mut self, prefix: &str, actual: &ExtraFields, planned: &ExtraFields) {
        let keys: BTreeSet<&String> = actual.keys().chain(planned.keys()).collect();
        for key in keys {
            self.field(prefix, key, &actual.get(key), &planned.get(key));
        }
    }

    fn block(&mut self, prefix: &str, actual: &WorkoutBlock, planned: &WorkoutBlock) {
        let WorkoutBlock {
            id,
            intensity_score,
            rounds,
            config,
            body,
        } = actual;
        self.field(prefix, "id", id, &planned.id);
        self.field(prefix, "intensity_score", intensity_score, &planned.intensity_score);
        self.field(prefix, "config", config, &planned.config);
        match (rounds, &planned.rounds) {
            (Some(a), Some(p)) => self.list(prefix, "rounds", a, p, |d, path, a, p| {
                d.round(path, a, p)
            }),
            (a, p) => self.field(prefix, "rounds", a, p),
        }
        self.body(prefix, body, &planned.body);
    }

    fn round(&mut self, prefix: &str, actual: &WorkoutRound, planned: &WorkoutRound) {
        let WorkoutRound {
            id,
            distance,
            intensity_value,
            intensity_type,
            recovery_time,
            target_time,
            start_type,
            notes,
            performance_value,
        } = actual;
        self.field(prefix, "id", id, &planned.id);
        self.field(prefix, "distance", distance, &planned.distance);
        self.field(prefix, "intensity_value", intensity_value, &planned.intensity_value);
        self.field(prefix, "intensity_type", intensity_type, &planned.intensity_type);
        self.field(prefix, "recovery_time", recovery_time, &planned.recovery_time);
        self.field(prefix, "target_time", target_time, &planned.target_time);
        self.field(prefix, "start_type", start_type, &planned.start_type);
        self.field(prefix, "notes", notes, &planned.notes);
        self.field(
            prefix,
            "performance_value",
            performance_value,
            &planned.performance_value,
        );
    }

    fn body(&mut self, prefix: &str, actual: &BlockBody, planned: &BlockBody) {
        match (actual, planned) {
            (BlockBody::Course(a), BlockBody::Course(p)) => {
                let CourseBlock {
                    series,
                    reps,
                    distance,
                    rest_between_reps,
                    rest_between_series,
                    chronos,
                    extra,
                } = a;
                self.field(prefix, "series", series, &p.series);
                self.field(prefix, "reps", reps, &p.reps);
                self.field(prefix, "distance", distance, &p.distance);
                self.field(prefix, "restBetweenReps", rest_between_reps, &p.rest_between_reps);
                self.field(
                    prefix,
                    "restBetweenSeries",
                    rest_between_series,
                    &p.rest_between_series,
                );
                self.field(prefix, "chronos", chronos, &p.chronos);
                self.extra(prefix, extra, &p.extra);
            }
            (BlockBody::Musculation(a), BlockBody::Musculation(p)) => {
                let MuscuBlock {
                    exercice_id,
                    exercice_nom,
                    series,
                    reps,
                    poids,
                    rest_time,
                    charges,
                    extra,
                } = a;
                self.field(prefix, "exerciceId", exercice_id, &p.exercice_id);
                self.field(prefix, "exerciceNom", exercice_nom, &p.exercice_nom);
                self.field(prefix, "series", series, &p.series);
                self.field(prefix, "reps", reps, &p.reps);
                self.field(prefix, "poids", poids, &p.poids);
                self.field(prefix, "restTime", rest_time, &p.rest_time);
                self.field(prefix, "charges", charges, &p.charges);
                self.extra(prefix, extra, &p.extra);
            }
            (BlockBody::Repos(a), BlockBody::Repos(p)) => {
                let RestBlock {
                    rest_duration_seconds,
                    activity_type,
                    extra,
                } = a;
                self.field(
                    prefix,
                    "rest_duration_seconds",
                    rest_duration_seconds,
                    &p.rest_duration_seconds,
                );
                self.field(prefix, "activity_type", activity_type, &p.activity_type);
                self.extra(prefix, extra, &p.extra);
            }
            (BlockBody::Technique(a), BlockBody::Technique(p)) => {
                let TechniqueBlock {
                    title,
                    duration_estimated_seconds,
                    description,
                    video_link,
                    extra,
                } = a;
                self.field(prefix, "title", title, &p.title);
                self.field(
                    prefix,
                    "duration_estimated_seconds",
                    duration_estimated_seconds,
                    &p.duration_estimated_seconds,
                );
                self.field(prefix, "description", description, &p.description);
                self.field(prefix, "video_link", video_link, &p.video_link);
                self.extra(prefix, extra, &p.extra);
            }
            (BlockBody::Series(a), BlockBody::Series(p)) => {
                let SeriesBlock {
                    series_count,
                    rest_between_series,
                    blocks,
                    extra,
                } = a;
                self.field(prefix, "seriesCount", series_count, &p.series_count);
                self.field(
                    prefix,
                    "restBetweenSeries",
                    rest_between_series,
                    &p.rest_between_series,
                );
                self.list(prefix, "blocks", blocks, &p.blocks, |d, path, a, p| {
                    d.block(path, a, p)
                });
                self.extra(prefix, extra, &p.extra);
            }
            (BlockBody::Note(a), BlockBody::Note(p)) => {
                let NoteBlock { content, extra } = a;
                self.field(prefix, "content", content, &p.content);
                self.extra(prefix, extra, &p.extra);
            }
            (BlockBody::Universal(a), BlockBody::Universal(p)) => {
                let UniversalBlock { metric_name, extra } = a;
                self.field(prefix, "metric_name", metric_name, &p.metric_name);
                self.extra(prefix, extra, &p.extra);
            }
            (a, p) => self.changes.push(FieldChange {
                path: join(prefix, "type"),
                planned: to_json(p),
                actual: to_json(a),
            }),
        }
    }
}
