//! Construction of new blocks with their default payload, round and config.

use crate::{
    error::CoreResult,
    ids::IdGenerator,
    models::{BlockBody, BlockKind, WorkoutBlock, WorkoutBlockConfig, WorkoutRound},
};

/// Visibility toggles a new block of `kind` starts with.
pub fn default_config(kind: BlockKind) -> WorkoutBlockConfig {
    let base = WorkoutBlockConfig::default();
    match kind {
        BlockKind::Course => WorkoutBlockConfig {
            show_distance: true,
            show_recovery: true,
            show_intensity: true,
            ..base
        },
        BlockKind::Musculation => WorkoutBlockConfig {
            show_weight: true,
            show_reps_count: true,
            show_recovery: true,
            ..base
        },
        BlockKind::Technique => WorkoutBlockConfig {
            show_duration: true,
            show_notes: true,
            ..base
        },
        BlockKind::Universal => WorkoutBlockConfig {
            show_intensity: true,
            show_recovery: true,
            ..base
        },
        BlockKind::Repos | BlockKind::Series | BlockKind::Note => base,
    }
}

pub fn create_empty_round(ids: &impl IdGenerator) -> WorkoutRound {
    WorkoutRound::new(ids.new_id())
}

/// Builds a block of `kind` with a fresh id, one empty round and the kind's
/// default config.
pub fn create_empty_block(kind: BlockKind, ids: &impl IdGenerator) -> WorkoutBlock {
    let id = ids.new_id();
    WorkoutBlock {
        id,
        intensity_score: None,
        rounds: Some(vec![create_empty_round(ids)]),
        config: Some(default_config(kind)),
        body: BlockBody::default_for(kind),
    }
}

/// Same as [`create_empty_block`] for a raw `type` tag. Unknown tags are
/// rejected instead of silently becoming a course block.
pub fn create_block_from_tag(tag: &str, ids: &impl IdGenerator) -> CoreResult<WorkoutBlock> {
    let kind = tag.parse::<BlockKind>()?;
    Ok(create_empty_block(kind, ids))
}
