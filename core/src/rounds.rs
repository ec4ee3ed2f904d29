//! Editing the round grid of a single block.
//!
//! Every operation takes the block by reference and returns an edited copy.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    factory::default_config,
    ids::IdGenerator,
    models::{ConfigToggle, IntensityType, StartType, WorkoutBlock, WorkoutRound},
};

/// A round column, for bulk edits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoundField {
    Distance,
    IntensityValue,
    IntensityType,
    RecoveryTime,
    TargetTime,
    StartType,
    Notes,
    PerformanceValue,
}

impl RoundField {
    fn copy(self, from: &WorkoutRound, to: &mut WorkoutRound) {
        match self {
            RoundField::Distance => to.distance = from.distance,
            RoundField::IntensityValue => to.intensity_value = from.intensity_value,
            RoundField::IntensityType => to.intensity_type = from.intensity_type,
            RoundField::RecoveryTime => to.recovery_time.clone_from(&from.recovery_time),
            RoundField::TargetTime => to.target_time.clone_from(&from.target_time),
            RoundField::StartType => to.start_type = from.start_type,
            RoundField::Notes => to.notes.clone_from(&from.notes),
            RoundField::PerformanceValue => {
                to.performance_value.clone_from(&from.performance_value)
            }
        }
    }
}

/// A new value for one round column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum RoundValue {
    Distance(Option<f64>),
    IntensityValue(Option<f64>),
    IntensityType(IntensityType),
    RecoveryTime(Option<String>),
    TargetTime(Option<String>),
    StartType(Option<StartType>),
    Notes(Option<String>),
    PerformanceValue(Option<String>),
}

impl RoundValue {
    pub fn field(&self) -> RoundField {
        match self {
            RoundValue::Distance(_) => RoundField::Distance,
            RoundValue::IntensityValue(_) => RoundField::IntensityValue,
            RoundValue::IntensityType(_) => RoundField::IntensityType,
            RoundValue::RecoveryTime(_) => RoundField::RecoveryTime,
            RoundValue::TargetTime(_) => RoundField::TargetTime,
            RoundValue::StartType(_) => RoundField::StartType,
            RoundValue::Notes(_) => RoundField::Notes,
            RoundValue::PerformanceValue(_) => RoundField::PerformanceValue,
        }
    }

    fn apply(self, round: &mut WorkoutRound) {
        match self {
            RoundValue::Distance(v) => round.distance = v,
            RoundValue::IntensityValue(v) => round.intensity_value = v,
            RoundValue::IntensityType(v) => round.intensity_type = v,
            RoundValue::RecoveryTime(v) => round.recovery_time = v,
            RoundValue::TargetTime(v) => round.target_time = v,
            RoundValue::StartType(v) => round.start_type = v,
            RoundValue::Notes(v) => round.notes = v,
            RoundValue::PerformanceValue(v) => round.performance_value = v,
        }
    }
}

/// Appends a round. When the block already has rounds, distance, intensity,
/// recovery, target time and start type are carried over from the last one.
pub fn add_round(block: &WorkoutBlock, ids: &impl IdGenerator) -> WorkoutBlock {
    let mut next = block.clone();
    let mut round = WorkoutRound::new(ids.new_id());
    if let Some(last) = block.rounds().last() {
        round.distance = last.distance;
        round.intensity_value = last.intensity_value;
        round.recovery_time.clone_from(&last.recovery_time);
        round.target_time.clone_from(&last.target_time);
        round.start_type = last.start_type;
    }
    round.intensity_type = IntensityType::Percent;
    round.notes = Some(String::new());

    next.rounds.get_or_insert_with(Vec::new).push(round);
    next
}

/// Sets one column of the round `round_id`. Unknown ids leave the block as is.
pub fn update_round(block: &WorkoutBlock, round_id: &str, value: RoundValue) -> WorkoutBlock {
    let mut next = block.clone();
    let target = next
        .rounds
        .as_mut()
        .and_then(|rounds| rounds.iter_mut().find(|round| round.id == round_id));

    match target {
        Some(round) => value.apply(round),
        None => warn!(block_id = %block.id, round_id, "round not found, update ignored"),
    }
    next
}

/// Drops the round `round_id`; the block may end up with no rounds.
pub fn remove_round(block: &WorkoutBlock, round_id: &str) -> WorkoutBlock {
    let mut next = block.clone();
    if let Some(rounds) = next.rounds.as_mut() {
        let before = rounds.len();
        rounds.retain(|round| round.id != round_id);
        if rounds.len() == before {
            warn!(block_id = %block.id, round_id, "round not found, nothing removed");
        }
    }
    next
}

/// Copies `field` from the first round onto every round, overwriting
/// whatever was there.
pub fn propagate_first_round(block: &WorkoutBlock, field: RoundField) -> WorkoutBlock {
    let mut next = block.clone();
    let Some(first) = block.rounds().first() else {
        return next;
    };
    if let Some(rounds) = next.rounds.as_mut() {
        for round in rounds.iter_mut() {
            field.copy(first, round);
        }
    }
    next
}

/// Flips one visibility switch. Blocks without a config get their kind's
/// default first.
pub fn toggle_config(block: &WorkoutBlock, toggle: ConfigToggle) -> WorkoutBlock {
    let mut next = block.clone();
    let config = next.config.unwrap_or_else(|| default_config(block.kind()));
    next.config = Some(config.toggled(toggle));
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{factory::create_empty_block, ids::SequentialIds, models::BlockKind};

    fn round(id: &str, distance: f64, target: &str) -> WorkoutRound {
        WorkoutRound {
            distance: Some(distance),
            intensity_value: Some(distance / 10.0),
            recovery_time: Some(format!("{}'", distance / 100.0)),
            target_time: Some(target.to_string()),
            start_type: Some(StartType::Block),
            notes: Some(format!("note {id}")),
            ..WorkoutRound::new(id)
        }
    }

    fn block_with(rounds: Vec<WorkoutRound>) -> WorkoutBlock {
        let ids = SequentialIds::new("setup");
        let mut block = create_empty_block(BlockKind::Course, &ids);
        block.rounds = Some(rounds);
        block
    }

    #[test]
    fn add_round_copies_the_last_round() {
        let mut last = round("r1", 300.0, "45.0");
        last.start_type = Some(StartType::Flying);
        last.intensity_type = IntensityType::Rpe;
        let block = block_with(vec![round("r0", 200.0, "28.0"), last.clone()]);
        let ids = SequentialIds::new("new");

        let next = add_round(&block, &ids);
        let added = &next.rounds()[2];

        assert_eq!(next.rounds().len(), 3);
        assert_eq!(added.id, "new-1");
        assert_eq!(added.distance, last.distance);
        assert_eq!(added.intensity_value, last.intensity_value);
        assert_eq!(added.recovery_time, last.recovery_time);
        assert_eq!(added.target_time, last.target_time);
        assert_eq!(added.start_type, Some(StartType::Flying));
        assert_eq!(added.notes.as_deref(), Some(""));
        assert_eq!(added.intensity_type, IntensityType::Percent);
        assert_eq!(block.rounds().len(), 2, "input block untouched");
    }

    #[test]
    fn add_round_on_empty_grid() {
        let mut block = block_with(Vec::new());
        block.rounds = None;
        let next = add_round(&block, &SequentialIds::new("new"));

        assert_eq!(next.rounds().len(), 1);
        assert_eq!(next.rounds()[0].distance, None);
        assert_eq!(next.rounds()[0].notes.as_deref(), Some(""));
    }

    #[test]
    fn update_round_sets_one_field() {
        let block = block_with(vec![round("r0", 200.0, "28.0"), round("r1", 300.0, "45.0")]);
        let next = update_round(&block, "r1", RoundValue::TargetTime(Some("44.2".into())));

        assert_eq!(next.rounds()[1].target_time.as_deref(), Some("44.2"));
        assert_eq!(next.rounds()[0], block.rounds()[0]);
        assert_eq!(block.rounds()[1].target_time.as_deref(), Some("45.0"));
    }

    #[test]
    fn update_unknown_round_is_a_no_op() {
        let block = block_with(vec![round("r0", 200.0, "28.0")]);
        let next = update_round(&block, "missing", RoundValue::Distance(Some(1.0)));
        assert_eq!(next, block);
    }

    #[test]
    fn removing_every_round_is_allowed() {
        let block = block_with(vec![round("r0", 200.0, "28.0")]);
        let next = remove_round(&block, "r0");
        assert!(next.rounds().is_empty());
        assert_eq!(next.rounds, Some(Vec::new()));
        assert_eq!(remove_round(&next, "r0"), next);
    }

    #[test]
    fn propagate_overwrites_every_round() {
        let block = block_with(vec![
            round("r0", 200.0, "28.0"),
            round("r1", 300.0, "45.0"),
            round("r2", 400.0, "62.0"),
        ]);
        let next = propagate_first_round(&block, RoundField::TargetTime);

        for r in next.rounds() {
            assert_eq!(r.target_time.as_deref(), Some("28.0"));
        }
        assert_eq!(next.rounds()[2].distance, Some(400.0));
        assert_eq!(propagate_first_round(&next, RoundField::TargetTime), next);
    }

    #[test]
    fn propagate_copies_missing_values_too() {
        let mut first = round("r0", 200.0, "28.0");
        first.notes = None;
        let block = block_with(vec![first, round("r1", 300.0, "45.0")]);
        let next = propagate_first_round(&block, RoundField::Notes);
        assert_eq!(next.rounds()[1].notes, None);
    }

    #[test]
    fn toggle_config_defaults_missing_config() {
        let mut block = block_with(Vec::new());
        block.config = None;
        let next = toggle_config(&block, ConfigToggle::ShowTargetTime);
        let config = next.config.unwrap();
        assert!(config.show_target_time);
        assert!(config.show_distance, "course default kept");
    }

    #[test]
    fn round_value_wire_shape() {
        let value: RoundValue =
            serde_json::from_str(r#"{"field":"target_time","value":"44.2"}"#).unwrap();
        assert_eq!(value, RoundValue::TargetTime(Some("44.2".into())));
        assert_eq!(value.field(), RoundField::TargetTime);
    }
}
