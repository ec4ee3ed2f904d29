//! A-B-A-B detection over the tail of a builder session, and its collapse
//! into a two-pass series.

use tracing::debug;

use crate::{
    error::{CoreError, CoreResult},
    ids::IdGenerator,
    models::{BlockBody, SeriesBlock, WorkoutBlock},
};

pub const DEFAULT_REST_BETWEEN_SERIES: &str = "3'";

const WINDOW: usize = 4;

/// True when the last four blocks alternate by type between two different
/// types. Field values are not compared.
pub fn detect_alternating_pattern(blocks: &[WorkoutBlock]) -> bool {
    let Some(tail) = blocks.len().checked_sub(WINDOW).map(|start| &blocks[start..]) else {
        return false;
    };
    let kinds: Vec<_> = tail.iter().map(WorkoutBlock::kind).collect();
    kinds[0] == kinds[2] && kinds[1] == kinds[3] && kinds[0] != kinds[1]
}

/// Replaces the trailing A-B-A-B window with one series of two passes over
/// fresh copies of A and B. Everything before the window is kept in order.
pub fn collapse_to_series(
    blocks: &[WorkoutBlock],
    ids: &impl IdGenerator,
) -> CoreResult<Vec<WorkoutBlock>> {
    if !detect_alternating_pattern(blocks) {
        return Err(CoreError::NoAlternatingPattern);
    }
    let start = blocks.len() - WINDOW;
    let (kept, window) = blocks.split_at(start);

    let series = WorkoutBlock::new(
        ids.new_id(),
        BlockBody::Series(SeriesBlock {
            series_count: 2,
            rest_between_series: DEFAULT_REST_BETWEEN_SERIES.to_string(),
            blocks: vec![
                clone_with_fresh_ids(&window[0], ids),
                clone_with_fresh_ids(&window[1], ids),
            ],
            extra: Default::default(),
        }),
    );
    debug!(series_id = %series.id, kept = kept.len(), "collapsed alternating blocks into a series");

    let mut out = kept.to_vec();
    out.push(series);
    Ok(out)
}

/// Deep copy of `block` where it and every nested block get a new id.
/// Round ids are scoped to their block and kept.
pub fn clone_with_fresh_ids(block: &WorkoutBlock, ids: &impl IdGenerator) -> WorkoutBlock {
    let mut copy = block.clone();
    refresh_ids(&mut copy, ids);
    copy
}

fn refresh_ids(block: &mut WorkoutBlock, ids: &impl IdGenerator) {
    block.id = ids.new_id();
    if let BlockBody::Series(series) = &mut block.body {
        for child in series.blocks.iter_mut() {
            refresh_ids(child, ids);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        factory::create_empty_block,
        ids::SequentialIds,
        models::{BlockKind, CourseBlock, collect_ids},
    };
    use std::collections::HashSet;

    fn blocks(kinds: &[BlockKind], ids: &SequentialIds) -> Vec<WorkoutBlock> {
        kinds.iter().map(|kind| create_empty_block(*kind, ids)).collect()
    }

    fn without_id(block: &WorkoutBlock) -> WorkoutBlock {
        WorkoutBlock {
            id: String::new(),
            ..block.clone()
        }
    }

    #[test]
    fn detects_strict_alternation_only() {
        use BlockKind::{Course, Musculation};
        let ids = SequentialIds::new("id");

        assert!(detect_alternating_pattern(&blocks(
            &[Course, Musculation, Course, Musculation],
            &ids
        )));
        assert!(!detect_alternating_pattern(&blocks(
            &[Course, Musculation, Musculation, Course],
            &ids
        )));
        assert!(!detect_alternating_pattern(&blocks(
            &[Course, Course, Course, Course],
            &ids
        )));
        assert!(!detect_alternating_pattern(&blocks(
            &[Course, Musculation, Course],
            &ids
        )));
        assert!(!detect_alternating_pattern(&[]));
    }

    #[test]
    fn only_the_last_four_blocks_count() {
        use BlockKind::{Course, Musculation, Note, Repos};
        let ids = SequentialIds::new("id");
        assert!(detect_alternating_pattern(&blocks(
            &[Note, Note, Repos, Course, Repos, Course],
            &ids
        )));
        assert!(!detect_alternating_pattern(&blocks(
            &[Course, Musculation, Course, Musculation, Note],
            &ids
        )));
    }

    #[test]
    fn field_values_do_not_matter() {
        let ids = SequentialIds::new("id");
        let mut list = blocks(
            &[
                BlockKind::Course,
                BlockKind::Repos,
                BlockKind::Course,
                BlockKind::Repos,
            ],
            &ids,
        );
        list[2].body = BlockBody::Course(CourseBlock {
            distance: 400.0,
            ..CourseBlock::default()
        });
        assert!(detect_alternating_pattern(&list));
    }

    #[test]
    fn collapse_replaces_the_window_with_one_series() {
        use BlockKind::{Course, Musculation, Technique};
        let ids = SequentialIds::new("id");
        let mut list = blocks(&[Technique, Course, Musculation, Course, Musculation], &ids);
        list[1].body = BlockBody::Course(CourseBlock {
            distance: 200.0,
            ..CourseBlock::default()
        });
        let before: HashSet<String> = collect_ids(&list).into_iter().map(String::from).collect();

        let collapsed = collapse_to_series(&list, &ids).unwrap();

        assert_eq!(collapsed.len(), list.len() - 3);
        assert_eq!(collapsed[0], list[0]);
        let series = &collapsed[1];
        let BlockBody::Series(body) = &series.body else {
            panic!("expected a series");
        };
        assert_eq!(body.series_count, 2);
        assert_eq!(body.rest_between_series, DEFAULT_REST_BETWEEN_SERIES);
        assert_eq!(body.blocks.len(), 2);
        assert_eq!(without_id(&body.blocks[0]), without_id(&list[1]));
        assert_eq!(without_id(&body.blocks[1]), without_id(&list[2]));

        let fresh = [&series.id, &body.blocks[0].id, &body.blocks[1].id];
        for id in fresh {
            assert!(!before.contains(id), "{id} reused");
        }
        assert_ne!(body.blocks[0].id, body.blocks[1].id);
    }

    #[test]
    fn collapse_without_pattern_is_rejected() {
        let ids = SequentialIds::new("id");
        let list = blocks(&[BlockKind::Course, BlockKind::Course], &ids);
        assert_eq!(
            collapse_to_series(&list, &ids),
            Err(CoreError::NoAlternatingPattern)
        );
    }

    #[test]
    fn nested_ids_are_refreshed() {
        let ids = SequentialIds::new("id");
        let mut outer = create_empty_block(BlockKind::Series, &ids);
        if let BlockBody::Series(series) = &mut outer.body {
            series.blocks = blocks(&[BlockKind::Course, BlockKind::Note], &ids);
        }
        let copy = clone_with_fresh_ids(&outer, &ids);

        let old: HashSet<&str> = collect_ids(std::slice::from_ref(&outer)).into_iter().collect();
        let new = collect_ids(std::slice::from_ref(&copy));
        assert_eq!(new.len(), 3);
        assert!(new.iter().all(|id| !old.contains(id)));
        assert_eq!(copy.rounds(), outer.rounds());
    }
}
