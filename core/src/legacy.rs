//! Flattening of blocks into the row format older summary screens read.

use serde::{Deserialize, Serialize};

use crate::models::{BlockBody, WorkoutBlock};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyRun {
    pub distance: String,
    pub temps: f64,
    pub type_chrono: String,
    pub repos: String,
    pub chaussures: String,
    pub terrain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyMuscu {
    pub exercice_id: String,
    pub exercice_nom: String,
    pub series: u32,
    pub reps: u32,
    pub poids: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LegacyRows {
    pub courses: Vec<LegacyRun>,
    pub muscu: Vec<LegacyMuscu>,
}

/// One run row per repetition of each course block and one row per
/// musculation block. Only top-level blocks are expanded.
pub fn to_legacy(blocks: &[WorkoutBlock]) -> LegacyRows {
    let mut rows = LegacyRows::default();
    for block in blocks {
        match &block.body {
            BlockBody::Course(course) => {
                for series in 0..course.series {
                    for rep in 0..course.reps {
                        let last_series = series + 1 == course.series;
                        let last_rep = rep + 1 == course.reps;
                        let repos = if last_series && last_rep {
                            String::new()
                        } else if !last_rep {
                            course.rest_between_reps.clone()
                        } else {
                            course.rest_between_series.clone()
                        };
                        rows.courses.push(LegacyRun {
                            distance: format!("{}m", course.distance),
                            temps: 0.0,
                            type_chrono: "manuel".to_string(),
                            repos,
                            chaussures: "pointes".to_string(),
                            terrain: "piste".to_string(),
                        });
                    }
                }
            }
            BlockBody::Musculation(muscu) => rows.muscu.push(LegacyMuscu {
                exercice_id: muscu.exercice_id.clone(),
                exercice_nom: muscu.exercice_nom.clone(),
                series: muscu.series,
                reps: muscu.reps,
                poids: muscu.poids,
            }),
            BlockBody::Repos(_)
            | BlockBody::Technique(_)
            | BlockBody::Series(_)
            | BlockBody::Note(_)
            | BlockBody::Universal(_) => {}
        }
    }
    rows
}
