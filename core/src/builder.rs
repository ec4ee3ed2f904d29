//! List-level edits of a builder session: append, remove, reorder, replace.

use tracing::warn;

use crate::{
    error::{CoreError, CoreResult},
    factory::create_empty_block,
    ids::IdGenerator,
    models::{BlockBody, BlockKind, WorkoutBlock},
};

pub fn add_block(
    blocks: &[WorkoutBlock],
    kind: BlockKind,
    ids: &impl IdGenerator,
) -> Vec<WorkoutBlock> {
    let mut out = blocks.to_vec();
    out.push(create_empty_block(kind, ids));
    out
}

pub fn remove_block(blocks: &[WorkoutBlock], id: &str) -> Vec<WorkoutBlock> {
    let out: Vec<_> = blocks.iter().filter(|b| b.id != id).cloned().collect();
    if out.len() == blocks.len() {
        warn!(block_id = id, "block not found, nothing removed");
    }
    out
}

/// Moves the block at `from` to position `to`, shifting the ones between.
/// Out of range indexes leave the list unchanged.
pub fn move_block(blocks: &[WorkoutBlock], from: usize, to: usize) -> Vec<WorkoutBlock> {
    let mut out = blocks.to_vec();
    if from >= out.len() || to >= out.len() {
        warn!(from, to, len = out.len(), "move out of range ignored");
        return out;
    }
    let block = out.remove(from);
    out.insert(to, block);
    out
}

/// Replaces the block carrying `updated.id`, wherever it sits in the tree.
/// Parents of the replaced block are rebuilt; the input is not touched.
pub fn replace_block(
    blocks: &[WorkoutBlock],
    updated: WorkoutBlock,
) -> CoreResult<Vec<WorkoutBlock>> {
    let mut out = blocks.to_vec();
    let slot = find_block_mut(&mut out, &updated.id)
        .ok_or_else(|| CoreError::BlockNotFound(updated.id.clone()))?;
    *slot = updated;
    Ok(out)
}

/// Mutable lookup by id, descending into series.
pub fn find_block_mut<'a>(
    blocks: &'a mut [WorkoutBlock],
    id: &str,
) -> Option<&'a mut WorkoutBlock> {
    blocks.iter_mut().find_map(|block| {
        if block.id == id {
            Some(block)
        } else {
            match &mut block.body {
                BlockBody::Series(series) => find_block_mut(&mut series.blocks, id),
                _ => None,
            }
        }
    })
}
