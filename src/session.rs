//! Rebuilding the training history from flat export rows.

use std::collections::{BTreeSet, HashMap};

use chrono::{Months, NaiveDateTime};
use serde::Serialize;

use crate::config::Settings;
use crate::error::ModelError;
use crate::import::WorkoutRow;
use crate::model::{Exercise, Set, Workout, WorkoutPlan};

const DEFAULT_PLAN_GAP_MONTHS: u32 = 2;
/// The export only records weights in kg.
const WEIGHT_UNIT: &str = "kg";

/// All workout plans of one imported export.
///
/// The plan list is only ever replaced as a whole: a failed rebuild leaves
/// the previous plans untouched.
#[derive(Debug, Clone, Serialize)]
pub struct StrongData {
    workout_plans: Vec<WorkoutPlan>,
    #[serde(skip)]
    plan_gap_months: u32,
}

impl Default for StrongData {
    fn default() -> Self {
        Self {
            workout_plans: Vec::new(),
            plan_gap_months: DEFAULT_PLAN_GAP_MONTHS,
        }
    }
}

/// Build a fresh session from `rows`.
pub fn rebuild_session(rows: &[WorkoutRow]) -> Result<StrongData, ModelError> {
    let mut data = StrongData::default();
    data.add_all_workouts(rows)?;
    Ok(data)
}

impl StrongData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty session using the plan gap from `settings`.
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            workout_plans: Vec::new(),
            plan_gap_months: settings.plan_gap_months,
        }
    }

    pub fn workout_plans(&self) -> &[WorkoutPlan] {
        &self.workout_plans
    }

    /// Replace all plans with the ones reconstructed from `rows`.
    ///
    /// Rows sharing a timestamp form one workout. Each workout joins the most
    /// recent plan with the same name unless that plan ended more than the
    /// configured number of months before it, in which case a new plan starts.
    /// Rows whose set order is not a number (notes, rest timers) add no set.
    pub fn add_all_workouts(&mut self, rows: &[WorkoutRow]) -> Result<(), ModelError> {
        if rows.is_empty() {
            return Err(ModelError::NoRecords);
        }

        let mut plans: Vec<WorkoutPlan> = Vec::new();
        for group in group_by_date(rows) {
            let workout = self.perform_workout(&group)?;
            let plan = self.plan_for(&mut plans, &group[0].workout_name, workout.date());
            plan.add_workout(workout);
        }

        log::info!(
            "Rebuilt {} workout plans from {} rows",
            plans.len(),
            rows.len()
        );
        self.workout_plans = plans;
        Ok(())
    }

    fn perform_workout(&self, rows: &[&WorkoutRow]) -> Result<Workout, ModelError> {
        let first = rows[0];
        let mut workout = Workout::new(first.date, first.workout_duration);
        for row in rows {
            if row.workout_name != first.workout_name {
                log::warn!(
                    "Workout at {} has mixed names '{}' and '{}', using the first",
                    first.date,
                    first.workout_name,
                    row.workout_name
                );
            }
            let Ok(order) = row.set_order.parse::<i32>() else {
                log::debug!(
                    "Skipping '{}' row for {} at {}",
                    row.set_order,
                    row.exercise_name,
                    row.date
                );
                continue;
            };
            let set = Set::new(
                order,
                row.weight,
                WEIGHT_UNIT,
                row.reps,
                row.seconds.map(|s| s.trunc() as i32),
            );
            workout.add_set(&row.exercise_name, first.date, set)?;
        }
        Ok(workout)
    }

    fn plan_for<'p>(
        &self,
        plans: &'p mut Vec<WorkoutPlan>,
        name: &str,
        date: NaiveDateTime,
    ) -> &'p mut WorkoutPlan {
        let cutoff = date
            .checked_sub_months(Months::new(self.plan_gap_months))
            .unwrap_or(NaiveDateTime::MIN);
        let existing = plans
            .iter()
            .rposition(|p| p.name() == name)
            .filter(|&idx| plans[idx].to() >= cutoff);
        let idx = match existing {
            Some(idx) => idx,
            None => {
                log::debug!("Starting workout plan '{}' at {}", name, date);
                plans.push(WorkoutPlan::new(name, date, date));
                plans.len() - 1
            }
        };
        &mut plans[idx]
    }

    /// All exercises of `plan` in workout order.
    pub fn exercises_of_plan(plan: &WorkoutPlan) -> Vec<&Exercise> {
        plan.workouts()
            .iter()
            .flat_map(|w| w.exercises())
            .collect()
    }

    /// Every exercise called `name` across all plans, e.g. to follow
    /// "Bench Press (Barbell)" over the whole history.
    pub fn exercises_by_name(&self, name: &str) -> Vec<&Exercise> {
        self.workout_plans
            .iter()
            .flat_map(|p| p.workouts())
            .flat_map(|w| w.exercises())
            .filter(|e| e.name() == name)
            .collect()
    }

    /// Plan display names, most recently started first.
    pub fn plan_display_names(&self) -> Vec<String> {
        let mut plans: Vec<&WorkoutPlan> = self.workout_plans.iter().collect();
        plans.sort_by(|a, b| b.from().cmp(&a.from()));
        let mut names: Vec<String> = Vec::new();
        for p in plans {
            let name = p.display_name();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn plan_by_display_name(&self, display_name: &str) -> Option<&WorkoutPlan> {
        self.workout_plans
            .iter()
            .find(|p| p.display_name() == display_name)
    }

    /// Sorted distinct exercise names over the whole session.
    pub fn exercise_names(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .workout_plans
            .iter()
            .flat_map(|p| p.workouts())
            .flat_map(|w| w.exercises())
            .map(|e| e.name())
            .collect();
        set.into_iter().map(str::to_string).collect()
    }
}

/// Group rows by exact timestamp, keeping the order of first appearance.
fn group_by_date(rows: &[WorkoutRow]) -> Vec<Vec<&WorkoutRow>> {
    let mut index: HashMap<NaiveDateTime, usize> = HashMap::new();
    let mut groups: Vec<Vec<&WorkoutRow>> = Vec::new();
    for row in rows {
        let idx = *index.entry(row.date).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(row);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExerciseType;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn row(
        date: NaiveDateTime,
        workout: &str,
        exercise: &str,
        order: &str,
        weight: Option<f64>,
        reps: Option<i32>,
    ) -> WorkoutRow {
        WorkoutRow {
            date,
            workout_name: workout.into(),
            exercise_name: exercise.into(),
            set_order: order.into(),
            weight,
            seconds: None,
            reps,
            workout_duration: 3600,
        }
    }

    #[test]
    fn groups_workouts_by_date() {
        let rows = vec![
            row(at(2023, 1, 1), "Workout A", "Exercise 1", "1", Some(50.0), Some(10)),
            row(at(2023, 1, 1), "Workout A", "Exercise 2", "2", Some(60.0), Some(8)),
            row(at(2023, 1, 2), "Workout B", "Exercise 3", "1", Some(70.0), Some(6)),
        ];
        let data = rebuild_session(&rows).unwrap();
        let plans = data.workout_plans();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].name(), "Workout A");
        assert_eq!(plans[0].workouts().len(), 1);
        assert_eq!(plans[0].workouts()[0].exercises().len(), 2);
        assert_eq!(plans[1].name(), "Workout B");
        assert_eq!(plans[1].workouts().len(), 1);
    }

    #[test]
    fn same_day_different_times_are_separate_workouts() {
        let morning = at(2023, 1, 1);
        let evening = morning + chrono::Duration::hours(8);
        let rows = vec![
            row(morning, "Full", "Squat", "1", Some(100.0), Some(5)),
            row(evening, "Full", "Squat", "1", Some(100.0), Some(5)),
        ];
        let data = rebuild_session(&rows).unwrap();
        assert_eq!(data.workout_plans().len(), 1);
        assert_eq!(data.workout_plans()[0].workouts().len(), 2);
        assert_eq!(data.workout_plans()[0].to(), evening);
    }

    #[test]
    fn interleaved_timestamps_keep_first_appearance_order() {
        let rows = vec![
            row(at(2023, 1, 3), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 1, 1), "Push", "Bench", "1", Some(75.0), Some(8)),
            row(at(2023, 1, 3), "Push", "Bench", "2", Some(80.0), Some(7)),
        ];
        let data = rebuild_session(&rows).unwrap();
        let plan = &data.workout_plans()[0];
        assert_eq!(plan.workouts().len(), 2);
        assert_eq!(plan.workouts()[0].date(), at(2023, 1, 3));
        assert_eq!(plan.workouts()[0].exercises()[0].sets().len(), 2);
        assert_eq!(plan.workouts()[1].date(), at(2023, 1, 1));
        assert_eq!(plan.from(), at(2023, 1, 3));
        assert_eq!(plan.to(), at(2023, 1, 3));
    }

    #[test]
    fn plan_continues_within_two_months() {
        let rows = vec![
            row(at(2023, 1, 1), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 3, 1), "Push", "Bench", "1", Some(82.5), Some(8)),
        ];
        let data = rebuild_session(&rows).unwrap();
        assert_eq!(data.workout_plans().len(), 1);
        let plan = &data.workout_plans()[0];
        assert_eq!(plan.from(), at(2023, 1, 1));
        assert_eq!(plan.to(), at(2023, 3, 1));
    }

    #[test]
    fn plan_splits_after_two_months() {
        let rows = vec![
            row(at(2023, 1, 1), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 3, 2), "Push", "Bench", "1", Some(82.5), Some(8)),
        ];
        let data = rebuild_session(&rows).unwrap();
        let plans = data.workout_plans();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].to(), at(2023, 1, 1));
        assert_eq!(plans[1].from(), at(2023, 3, 2));
    }

    #[test]
    fn plan_gap_follows_settings() {
        let rows = vec![
            row(at(2023, 1, 1), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 3, 2), "Push", "Bench", "1", Some(82.5), Some(8)),
        ];
        let settings = Settings {
            plan_gap_months: 3,
            ..Settings::default()
        };
        let mut data = StrongData::with_settings(&settings);
        data.add_all_workouts(&rows).unwrap();
        assert_eq!(data.workout_plans().len(), 1);
    }

    #[test]
    fn stale_unit_setting_still_stamps_kg() {
        let settings: Settings =
            serde_json::from_str(r#"{"plan_gap_months": 2, "weight_unit": "lb"}"#).unwrap();
        let mut data = StrongData::with_settings(&settings);
        data.add_all_workouts(&[row(at(2023, 1, 1), "Push", "Bench", "1", Some(80.0), Some(8))])
            .unwrap();
        let set = &data.workout_plans()[0].workouts()[0].exercises()[0].sets()[0];
        assert_eq!(set.weight_unit, "kg");
    }

    #[test]
    fn month_end_gap_reuses_plan() {
        let rows = vec![
            row(at(2023, 1, 31), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 3, 31), "Push", "Bench", "1", Some(82.5), Some(8)),
        ];
        let data = rebuild_session(&rows).unwrap();
        assert_eq!(data.workout_plans().len(), 1);
        assert_eq!(data.workout_plans()[0].to(), at(2023, 3, 31));
    }

    #[test]
    fn month_end_gap_one_day_short_splits() {
        let rows = vec![
            row(at(2023, 1, 30), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 3, 31), "Push", "Bench", "1", Some(82.5), Some(8)),
        ];
        let data = rebuild_session(&rows).unwrap();
        assert_eq!(data.workout_plans().len(), 2);
    }

    #[test]
    fn month_subtraction_clamps_to_end_of_february() {
        // 2023-04-30 minus two months is 2023-02-28
        let rows = vec![
            row(at(2023, 2, 28), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 4, 30), "Push", "Bench", "1", Some(82.5), Some(8)),
        ];
        let data = rebuild_session(&rows).unwrap();
        assert_eq!(data.workout_plans().len(), 1);
        assert_eq!(data.workout_plans()[0].from(), at(2023, 2, 28));
    }

    #[test]
    fn returning_routine_joins_latest_plan() {
        let rows = vec![
            row(at(2023, 1, 1), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 6, 1), "Push", "Bench", "1", Some(85.0), Some(8)),
            row(at(2023, 6, 3), "Pull", "Row", "1", Some(60.0), Some(10)),
            row(at(2023, 6, 8), "Push", "Bench", "1", Some(85.0), Some(9)),
        ];
        let data = rebuild_session(&rows).unwrap();
        let plans = data.workout_plans();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].workouts().len(), 1);
        assert_eq!(plans[1].name(), "Push");
        assert_eq!(plans[1].workouts().len(), 2);
        assert_eq!(plans[1].to(), at(2023, 6, 8));
        assert_eq!(plans[2].name(), "Pull");
    }

    #[test]
    fn note_rows_add_no_sets() {
        let rows = vec![
            row(at(2023, 1, 1), "Push", "Bench", "Note", None, None),
            row(at(2023, 1, 1), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 1, 1), "Push", "Bench", "Rest Timer", None, None),
        ];
        let data = rebuild_session(&rows).unwrap();
        let workout = &data.workout_plans()[0].workouts()[0];
        assert_eq!(workout.exercises().len(), 1);
        assert_eq!(workout.exercises()[0].sets().len(), 1);
    }

    #[test]
    fn note_only_workout_is_kept_empty() {
        let rows = vec![row(at(2023, 1, 1), "Push", "Bench", "Note", None, None)];
        let data = rebuild_session(&rows).unwrap();
        assert_eq!(data.workout_plans().len(), 1);
        assert!(data.workout_plans()[0].workouts()[0].exercises().is_empty());
    }

    #[test]
    fn sets_carry_unit_and_truncated_seconds() {
        let mut plank = row(at(2023, 1, 1), "Core", "Plank", "1", None, None);
        plank.seconds = Some(59.9);
        let data = rebuild_session(&[plank]).unwrap();
        let set = &data.workout_plans()[0].workouts()[0].exercises()[0].sets()[0];
        assert_eq!(set.seconds, Some(59));
        assert_eq!(set.weight_unit, "kg");
        assert_eq!(set.exercise_type(), Ok(ExerciseType::Duration));
    }

    #[test]
    fn first_row_names_the_workout() {
        let rows = vec![
            row(at(2023, 1, 1), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 1, 1), "Pull", "Row", "1", Some(60.0), Some(10)),
        ];
        let data = rebuild_session(&rows).unwrap();
        assert_eq!(data.workout_plans().len(), 1);
        assert_eq!(data.workout_plans()[0].name(), "Push");
        assert_eq!(data.workout_plans()[0].workouts()[0].exercises().len(), 2);
    }

    #[test]
    fn empty_rows_fail_without_touching_state() {
        let rows = vec![row(at(2023, 1, 1), "Push", "Bench", "1", Some(80.0), Some(8))];
        let mut data = rebuild_session(&rows).unwrap();
        assert_eq!(data.add_all_workouts(&[]), Err(ModelError::NoRecords));
        assert_eq!(data.workout_plans().len(), 1);
    }

    #[test]
    fn rebuild_replaces_previous_plans() {
        let mut data = rebuild_session(&[row(at(2023, 1, 1), "Push", "Bench", "1", Some(80.0), Some(8))])
            .unwrap();
        data.add_all_workouts(&[row(at(2024, 1, 1), "Legs", "Squat", "1", Some(100.0), Some(5))])
            .unwrap();
        assert_eq!(data.workout_plans().len(), 1);
        assert_eq!(data.workout_plans()[0].name(), "Legs");
    }

    #[test]
    fn exercises_of_plan_in_workout_order() {
        let rows = vec![
            row(at(2023, 1, 1), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 1, 1), "Push", "Dips", "1", None, Some(12)),
            row(at(2023, 1, 8), "Push", "Bench", "1", Some(82.5), Some(8)),
        ];
        let data = rebuild_session(&rows).unwrap();
        let exercises = StrongData::exercises_of_plan(&data.workout_plans()[0]);
        let names: Vec<&str> = exercises.iter().map(|e| e.name()).collect();
        assert_eq!(names, ["Bench", "Dips", "Bench"]);
        assert_eq!(exercises[2].date(), at(2023, 1, 8));
    }

    #[test]
    fn exercises_by_name_across_plans() {
        let rows = vec![
            row(at(2023, 1, 1), "Plan A", "Bench Press", "1", Some(100.0), Some(10)),
            row(at(2023, 1, 1), "Plan A", "Squat", "2", Some(120.0), Some(8)),
            row(at(2023, 1, 20), "Plan B", "Bench Press", "1", Some(110.0), Some(12)),
            row(at(2023, 1, 21), "Plan B", "bench press", "1", Some(110.0), Some(12)),
        ];
        let data = rebuild_session(&rows).unwrap();
        let exercises = data.exercises_by_name("Bench Press");
        assert_eq!(exercises.len(), 2);
        assert!(exercises.iter().all(|e| e.name() == "Bench Press"));
        assert_eq!(exercises[0].date(), at(2023, 1, 1));
        assert!(data.exercises_by_name("Deadlift").is_empty());
    }

    #[test]
    fn plan_display_names_newest_first() {
        let rows = vec![
            row(at(2023, 1, 1), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 5, 1), "Pull", "Row", "1", Some(60.0), Some(10)),
        ];
        let data = rebuild_session(&rows).unwrap();
        assert_eq!(
            data.plan_display_names(),
            ["Pull (May 23-May 23)", "Push (Jan 23-Jan 23)"]
        );
        let plan = data.plan_by_display_name("Push (Jan 23-Jan 23)").unwrap();
        assert_eq!(plan.name(), "Push");
        assert!(data.plan_by_display_name("Legs (Jan 23-Jan 23)").is_none());
    }

    #[test]
    fn exercise_names_sorted_and_distinct() {
        let rows = vec![
            row(at(2023, 1, 1), "Push", "Squat", "1", Some(80.0), Some(8)),
            row(at(2023, 1, 1), "Push", "Bench", "1", Some(80.0), Some(8)),
            row(at(2023, 1, 8), "Push", "Bench", "1", Some(80.0), Some(8)),
        ];
        let data = rebuild_session(&rows).unwrap();
        assert_eq!(data.exercise_names(), ["Bench", "Squat"]);
    }
}
