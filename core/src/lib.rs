//! Workout block model and the pure transformations shared by the planning
//! and validation flows.

pub mod builder;
pub mod diff;
pub mod error;
pub mod factory;
pub mod ids;
pub mod legacy;
pub mod models;
pub mod rounds;
pub mod series;
pub mod validation;
pub mod workout;

pub use diff::{BlockDeviation, FieldChange, diff_blocks, is_modified};
pub use error::{CoreError, CoreResult};
pub use factory::{create_block_from_tag, create_empty_block, default_config};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use models::{
    BlockBody, BlockKind, ConfigToggle, WorkoutBlock, WorkoutBlockConfig, WorkoutRound,
};
pub use series::{collapse_to_series, detect_alternating_pattern};
pub use validation::{ValidationSession, finalize};
pub use workout::{
    Assignee, CompleteWorkoutRequest, CompleteWorkoutResponse, CompletionPayload, PlanPayload,
    Workout, WorkoutData, WorkoutQuery, WorkoutStatus, WorkoutType,
};
