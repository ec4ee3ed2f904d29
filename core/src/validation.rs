//! Athlete validation of a planned workout.
//!
//! The actual blocks start as an owned copy of the planned ones and are
//! edited block by block. The planned list is never written to; it stays the
//! reference for deviation badges and the record of what the coach asked for.

use tracing::warn;

use crate::{
    builder::{find_block_mut, replace_block},
    diff,
    error::{CoreError, CoreResult},
    models::{BlockBody, WorkoutBlock, find_block},
    workout::{CompletionPayload, Workout, WorkoutData, WorkoutStatus, WorkoutType},
};

pub const DEFAULT_RPE: u8 = 5;
pub const RPE_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Replaces a block of the actual list by id, at any depth.
pub fn update_block(
    actual: &[WorkoutBlock],
    updated: WorkoutBlock,
) -> CoreResult<Vec<WorkoutBlock>> {
    replace_block(actual, updated)
}

/// Replaces the direct child `updated.id` of the series `series_id`.
pub fn update_sub_block(
    actual: &[WorkoutBlock],
    series_id: &str,
    updated: WorkoutBlock,
) -> CoreResult<Vec<WorkoutBlock>> {
    let mut out = actual.to_vec();
    let parent = find_block_mut(&mut out, series_id)
        .ok_or_else(|| CoreError::BlockNotFound(series_id.to_string()))?;
    let BlockBody::Series(series) = &mut parent.body else {
        return Err(CoreError::NotASeries(series_id.to_string()));
    };
    let slot = series
        .blocks
        .iter_mut()
        .find(|child| child.id == updated.id)
        .ok_or_else(|| CoreError::BlockNotFound(updated.id.clone()))?;
    *slot = updated;
    Ok(out)
}

/// Checks the session-level inputs and bundles the completion payload.
pub fn finalize(
    actual: &[WorkoutBlock],
    notes: &str,
    rpe: u8,
    workout_type: WorkoutType,
) -> CoreResult<CompletionPayload> {
    if !RPE_RANGE.contains(&rpe) {
        return Err(CoreError::InvalidRpe(rpe));
    }
    let notes = notes.trim();
    if workout_type == WorkoutType::Manuscrit && notes.is_empty() {
        return Err(CoreError::MissingNotes);
    }

    Ok(CompletionPayload {
        workout_data: WorkoutData {
            blocs: actual.to_vec(),
        },
        status: WorkoutStatus::Completed,
        rpe,
        notes: (!notes.is_empty()).then(|| notes.to_string()),
    })
}

/// State of one athlete validating one workout.
#[derive(Debug, Clone)]
pub struct ValidationSession {
    workout_id: String,
    workout_type: WorkoutType,
    planned: Vec<WorkoutBlock>,
    actual: Vec<WorkoutBlock>,
    pub notes: String,
    pub rpe: u8,
    last_error: Option<CoreError>,
}

impl ValidationSession {
    /// Starts from the workout's planned blocks. A missing or unreadable plan
    /// opens an empty session and records the problem in
    /// [`last_error`](Self::last_error).
    pub fn open(workout: &Workout) -> Self {
        let (planned, last_error) = match workout.planned_blocks() {
            Ok(blocks) => (blocks, None),
            Err(err) => {
                warn!(workout_id = %workout.id, error = %err, "opening validation without a plan");
                (Vec::new(), Some(err))
            }
        };
        let rpe = workout
            .rpe
            .filter(|rpe| RPE_RANGE.contains(rpe))
            .unwrap_or(DEFAULT_RPE);

        Self {
            workout_id: workout.id.clone(),
            workout_type: workout.workout_type,
            actual: planned.clone(),
            planned,
            notes: workout.notes.clone().unwrap_or_default(),
            rpe,
            last_error,
        }
    }

    pub fn workout_id(&self) -> &str {
        &self.workout_id
    }

    pub fn planned(&self) -> &[WorkoutBlock] {
        &self.planned
    }

    pub fn actual(&self) -> &[WorkoutBlock] {
        &self.actual
    }

    /// Most recent non-fatal problem, cleared by the next successful edit.
    pub fn last_error(&self) -> Option<&CoreError> {
        self.last_error.as_ref()
    }

    pub fn update_block(&mut self, updated: WorkoutBlock) -> CoreResult<()> {
        let result = update_block(&self.actual, updated);
        self.commit(result)
    }

    pub fn update_sub_block(&mut self, series_id: &str, updated: WorkoutBlock) -> CoreResult<()> {
        let result = update_sub_block(&self.actual, series_id, updated);
        self.commit(result)
    }

    fn commit(&mut self, result: CoreResult<Vec<WorkoutBlock>>) -> CoreResult<()> {
        match result {
            Ok(blocks) => {
                self.actual = blocks;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                warn!(workout_id = %self.workout_id, error = %err, "block update ignored");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Whether the actual block `id` differs from its plan. Blocks with no
    /// planned counterpart count as modified.
    pub fn is_modified(&self, id: &str) -> bool {
        match (find_block(&self.actual, id), find_block(&self.planned, id)) {
            (Some(actual), Some(planned)) => diff::is_modified(actual, planned),
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn modified_block_ids(&self) -> Vec<String> {
        diff::modified_block_ids(&self.actual, &self.planned)
    }

    pub fn finalize(&self) -> CoreResult<CompletionPayload> {
        finalize(&self.actual, &self.notes, self.rpe, self.workout_type)
    }
}
