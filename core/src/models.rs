use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

// ============================================================================
// Block kinds
// ============================================================================

/// Discriminant of a [`WorkoutBlock`], as written in the `type` key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Course,
    Musculation,
    Repos,
    Technique,
    Series,
    Note,
    Universal,
}

impl BlockKind {
    pub const ALL: [BlockKind; 7] = [
        BlockKind::Course,
        BlockKind::Musculation,
        BlockKind::Repos,
        BlockKind::Technique,
        BlockKind::Series,
        BlockKind::Note,
        BlockKind::Universal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Course => "course",
            BlockKind::Musculation => "musculation",
            BlockKind::Repos => "repos",
            BlockKind::Technique => "technique",
            BlockKind::Series => "series",
            BlockKind::Note => "note",
            BlockKind::Universal => "universal",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| CoreError::UnsupportedBlockType(raw.to_string()))
    }
}

// ============================================================================
// Round grid
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntensityType {
    #[default]
    Percent,
    Rpe,
    Pace,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StartType {
    Standing,
    Block,
    Flying,
    Crouch,
}

/// One row of a block's editable grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutRound {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity_value: Option<f64>,
    #[serde(default)]
    pub intensity_type: IntensityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_type: Option<StartType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Free-text result, only used by universal blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_value: Option<String>,
}

impl WorkoutRound {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            distance: None,
            intensity_value: None,
            intensity_type: IntensityType::Percent,
            recovery_time: None,
            target_time: None,
            start_type: None,
            notes: None,
            performance_value: None,
        }
    }
}

/// Which round columns a block shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct WorkoutBlockConfig {
    pub show_distance: bool,
    pub show_duration: bool,
    pub show_reps_count: bool,
    pub show_intensity: bool,
    pub show_weight: bool,
    pub show_recovery: bool,
    pub show_target_time: bool,
    pub show_start_type: bool,
    pub show_notes: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfigToggle {
    ShowDistance,
    ShowDuration,
    ShowRepsCount,
    ShowIntensity,
    ShowWeight,
    ShowRecovery,
    ShowTargetTime,
    ShowStartType,
    ShowNotes,
}

impl WorkoutBlockConfig {
    fn slot(&mut self, toggle: ConfigToggle) -> &mut bool {
        match toggle {
            ConfigToggle::ShowDistance => &mut self.show_distance,
            ConfigToggle::ShowDuration => &mut self.show_duration,
            ConfigToggle::ShowRepsCount => &mut self.show_reps_count,
            ConfigToggle::ShowIntensity => &mut self.show_intensity,
            ConfigToggle::ShowWeight => &mut self.show_weight,
            ConfigToggle::ShowRecovery => &mut self.show_recovery,
            ConfigToggle::ShowTargetTime => &mut self.show_target_time,
            ConfigToggle::ShowStartType => &mut self.show_start_type,
            ConfigToggle::ShowNotes => &mut self.show_notes,
        }
    }

    pub fn is_enabled(mut self, toggle: ConfigToggle) -> bool {
        *self.slot(toggle)
    }

    pub fn set(&mut self, toggle: ConfigToggle, value: bool) {
        *self.slot(toggle) = value;
    }

    pub fn toggled(mut self, toggle: ConfigToggle) -> Self {
        let slot = self.slot(toggle);
        *slot = !*slot;
        self
    }
}

// ============================================================================
// Block payloads
// ============================================================================

/// Per-repetition chrono or load grid, indexed `[series][rep]`.
pub type ValueGrid = Vec<Vec<Option<f64>>>;

/// Block keys the payload does not model. They are written back untouched.
pub type ExtraFields = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CourseBlock {
    pub series: u32,
    pub reps: u32,
    pub distance: f64,
    pub rest_between_reps: String,
    pub rest_between_series: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chronos: Option<ValueGrid>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Default for CourseBlock {
    fn default() -> Self {
        Self {
            series: 1,
            reps: 1,
            distance: 0.0,
            rest_between_reps: "0".to_string(),
            rest_between_series: "0".to_string(),
            chronos: None,
            extra: ExtraFields::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MuscuBlock {
    #[serde(rename = "exerciceId")]
    pub exercice_id: String,
    #[serde(rename = "exerciceNom")]
    pub exercice_nom: String,
    pub series: u32,
    pub reps: u32,
    pub poids: Option<f64>,
    #[serde(rename = "restTime")]
    pub rest_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charges: Option<ValueGrid>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Default for MuscuBlock {
    fn default() -> Self {
        Self {
            exercice_id: String::new(),
            exercice_nom: "Nouvel exercice".to_string(),
            series: 1,
            reps: 1,
            poids: None,
            rest_time: "0".to_string(),
            charges: None,
            extra: ExtraFields::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RestActivity {
    #[default]
    Passif,
    Marche,
    Trot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RestBlock {
    pub rest_duration_seconds: u32,
    pub activity_type: RestActivity,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Default for RestBlock {
    fn default() -> Self {
        Self {
            rest_duration_seconds: 60,
            activity_type: RestActivity::Passif,
            extra: ExtraFields::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TechniqueBlock {
    pub title: String,
    pub duration_estimated_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_link: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Default for TechniqueBlock {
    fn default() -> Self {
        Self {
            title: "Bloc Technique".to_string(),
            duration_estimated_seconds: 0,
            description: None,
            video_link: None,
            extra: ExtraFields::new(),
        }
    }
}

/// A circuit of nested blocks, performed `series_count` times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesBlock {
    pub series_count: u32,
    pub rest_between_series: String,
    pub blocks: Vec<WorkoutBlock>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Default for SeriesBlock {
    fn default() -> Self {
        Self {
            series_count: 2,
            rest_between_series: "0".to_string(),
            blocks: Vec::new(),
            extra: ExtraFields::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct NoteBlock {
    pub content: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UniversalBlock {
    pub metric_name: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Default for UniversalBlock {
    fn default() -> Self {
        Self {
            metric_name: "Performance".to_string(),
            extra: ExtraFields::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockBody {
    Course(CourseBlock),
    Musculation(MuscuBlock),
    Repos(RestBlock),
    Technique(TechniqueBlock),
    Series(SeriesBlock),
    Note(NoteBlock),
    Universal(UniversalBlock),
}

impl BlockBody {
    /// Legacy payload a freshly created block of `kind` starts with.
    pub fn default_for(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Course => BlockBody::Course(CourseBlock::default()),
            BlockKind::Musculation => BlockBody::Musculation(MuscuBlock::default()),
            BlockKind::Repos => BlockBody::Repos(RestBlock::default()),
            BlockKind::Technique => BlockBody::Technique(TechniqueBlock::default()),
            BlockKind::Series => BlockBody::Series(SeriesBlock::default()),
            BlockKind::Note => BlockBody::Note(NoteBlock::default()),
            BlockKind::Universal => BlockBody::Universal(UniversalBlock::default()),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            BlockBody::Course(_) => BlockKind::Course,
            BlockBody::Musculation(_) => BlockKind::Musculation,
            BlockBody::Repos(_) => BlockKind::Repos,
            BlockBody::Technique(_) => BlockKind::Technique,
            BlockBody::Series(_) => BlockKind::Series,
            BlockBody::Note(_) => BlockKind::Note,
            BlockBody::Universal(_) => BlockKind::Universal,
        }
    }
}

// ============================================================================
// Blocks
// ============================================================================

/// One unit of a workout. The `id` survives the planned to actual copy and
/// is the join key between the two.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutBlock {
    pub id: String,
    /// Coach-estimated effort, 1-10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<Vec<WorkoutRound>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<WorkoutBlockConfig>,
    #[serde(flatten)]
    pub body: BlockBody,
}

impl WorkoutBlock {
    pub fn new(id: impl Into<String>, body: BlockBody) -> Self {
        Self {
            id: id.into(),
            intensity_score: None,
            rounds: None,
            config: None,
            body,
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.body.kind()
    }

    /// Rounds of the grid, empty for legacy-only blocks.
    pub fn rounds(&self) -> &[WorkoutRound] {
        self.rounds.as_deref().unwrap_or_default()
    }

    pub fn sub_blocks(&self) -> Option<&[WorkoutBlock]> {
        match &self.body {
            BlockBody::Series(series) => Some(&series.blocks),
            _ => None,
        }
    }

    /// Finds the block with `id`, looking inside series at any depth.
    pub fn find(&self, id: &str) -> Option<&WorkoutBlock> {
        if self.id == id {
            return Some(self);
        }
        self.sub_blocks()?
            .iter()
            .find_map(|block| block.find(id))
    }

    /// Ids of this block and every nested block, depth first.
    pub fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.id);
        if let Some(children) = self.sub_blocks() {
            for child in children {
                child.collect_ids(out);
            }
        }
    }
}

/// Finds a block by id anywhere in a block tree.
pub fn find_block<'a>(blocks: &'a [WorkoutBlock], id: &str) -> Option<&'a WorkoutBlock> {
    blocks.iter().find_map(|block| block.find(id))
}

pub fn collect_ids(blocks: &[WorkoutBlock]) -> Vec<&str> {
    let mut ids = Vec::new();
    for block in blocks {
        block.collect_ids(&mut ids);
    }
    ids
}
