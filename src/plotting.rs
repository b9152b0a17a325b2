use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::{Exercise, ExerciseType, Set, WorkoutPlan};
use crate::session::StrongData;

/// One point of an exercise chart: everything done for an exercise on one day.
///
/// Volumes are truncated to whole numbers. The day's sets are kept so a chart
/// can show them in tooltips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseChartModel {
    pub name: String,
    pub date: NaiveDateTime,
    pub exercise_type: ExerciseType,
    pub total_volume: Option<i64>,
    /// Volume of the heaviest set.
    pub weight_max: Option<i64>,
    pub one_rep_max: Option<i64>,
    pub total_reps: Option<i64>,
    pub max_reps: Option<i64>,
    pub total_seconds: Option<i64>,
    pub max_seconds: Option<i64>,
    pub sets: Vec<Set>,
}

impl ExerciseChartModel {
    pub fn from_exercise(exercise: &Exercise) -> Result<Self, ModelError> {
        Ok(Self {
            name: exercise.name().to_string(),
            date: exercise.date(),
            exercise_type: exercise.exercise_type()?,
            total_volume: exercise.total_volume().map(|v| v.trunc() as i64),
            weight_max: exercise.max_volume().map(|v| v.trunc() as i64),
            one_rep_max: exercise.one_rep_max()?,
            total_reps: exercise.total_reps(),
            max_reps: exercise.max_reps(),
            total_seconds: exercise.total_seconds(),
            max_seconds: exercise.max_seconds(),
            sets: exercise.sets().to_vec(),
        })
    }

    /// Project every exercise, typically one per date of the same exercise.
    pub fn from_exercises<'a, I>(exercises: I) -> Result<Vec<Self>, ModelError>
    where
        I: IntoIterator<Item = &'a Exercise>,
    {
        exercises.into_iter().map(Self::from_exercise).collect()
    }
}

/// Chart data for one plan: its exercises grouped by name, one chart each.
///
/// Groups keep the order in which the exercise first appears in the plan.
pub fn charts_for_plan(
    plan: &WorkoutPlan,
) -> Result<Vec<(String, Vec<ExerciseChartModel>)>, ModelError> {
    let mut groups: Vec<(String, Vec<&Exercise>)> = Vec::new();
    for exercise in StrongData::exercises_of_plan(plan) {
        match groups.iter_mut().find(|(name, _)| name == exercise.name()) {
            Some((_, list)) => list.push(exercise),
            None => groups.push((exercise.name().to_string(), vec![exercise])),
        }
    }
    groups
        .into_iter()
        .map(|(name, list)| Ok((name, ExerciseChartModel::from_exercises(list)?)))
        .collect()
}

/// A single plotted value with the sets behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: NaiveDateTime,
    pub y: Option<i64>,
    pub sets: Vec<Set>,
}

/// A labelled line of an exercise chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub label: &'static str,
    pub y_axis_id: &'static str,
    pub data: Vec<ChartPoint>,
}

fn dataset(
    label: &'static str,
    y_axis_id: &'static str,
    models: &[ExerciseChartModel],
    value: impl Fn(&ExerciseChartModel) -> Option<i64>,
) -> ChartDataset {
    ChartDataset {
        label,
        y_axis_id,
        data: models
            .iter()
            .map(|m| ChartPoint {
                x: m.date,
                y: value(m),
                sets: m.sets.clone(),
            })
            .collect(),
    }
}

/// Lines to draw for an exercise, chosen by the type of its first point.
///
/// Weight lifting shows volume, one-rep max and best set; body weight shows
/// reps; duration exercises show time. No models means no lines.
pub fn chart_datasets(models: &[ExerciseChartModel]) -> Vec<ChartDataset> {
    let Some(first) = models.first() else {
        return Vec::new();
    };
    match first.exercise_type {
        ExerciseType::WeightLifting => vec![
            dataset("Total volume", "yl", models, |m| m.total_volume),
            dataset("Best set (1 RM)", "yr", models, |m| m.one_rep_max),
            dataset("Best set (max weight)", "ylh", models, |m| m.weight_max),
        ],
        ExerciseType::BodyWeight => vec![
            dataset("Total reps", "yl", models, |m| m.total_reps),
            dataset("Best set (reps)", "ylh", models, |m| m.max_reps),
        ],
        ExerciseType::Duration => vec![
            dataset("Total time", "yl", models, |m| m.total_seconds),
            dataset("Best set (time)", "ylh", models, |m| m.max_seconds),
        ],
    }
}

/// Element id for an exercise chart, e.g. `chart-bench-press-barbell`.
pub fn chart_id(exercise_name: &str) -> String {
    format!("chart-{}", exercise_name.to_lowercase())
        .replace(' ', "-")
        .replace(['(', ')'], "")
}
