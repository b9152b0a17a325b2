//! Workout plans, workouts, exercises and sets reconstructed from an export.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Kind of exercise, derived from which values a set carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseType {
    /// Weight and reps, e.g. "Bench Press (Barbell)".
    WeightLifting,
    /// Reps without weight, e.g. "Pull Up".
    BodyWeight,
    /// Only a duration, e.g. "Plank".
    Duration,
}

/// A single set of an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
    pub order: i32,
    pub weight: Option<f64>,
    pub weight_unit: String,
    pub reps: Option<i32>,
    pub seconds: Option<i32>,
}

impl Set {
    pub fn new(
        order: i32,
        weight: Option<f64>,
        weight_unit: impl Into<String>,
        reps: Option<i32>,
        seconds: Option<i32>,
    ) -> Self {
        Self {
            order,
            weight,
            weight_unit: weight_unit.into(),
            reps,
            seconds,
        }
    }

    /// Weight and reps when this is a loaded set.
    fn loaded(&self) -> Option<(f64, i32)> {
        match (self.weight, self.reps) {
            (Some(w), Some(r)) if w > 0.0 => Some((w, r)),
            _ => None,
        }
    }

    /// `weight * reps`, absent unless the set has a positive weight and reps.
    pub fn volume(&self) -> Option<f64> {
        self.loaded().map(|(w, r)| settle(w * r as f64))
    }

    /// Estimated one-rep max using the Brzycki formula.
    ///
    /// Absent when the set has no positive weight and reps. Unlike the raw
    /// formula, which divides by zero at 37 reps and turns negative above it,
    /// 37 or more reps also give no estimate.
    pub fn one_rep_max(&self) -> Result<Option<i64>, ModelError> {
        match self.loaded() {
            Some((w, r)) => brzycki(w, r),
            None => Ok(None),
        }
    }

    pub fn exercise_type(&self) -> Result<ExerciseType, ModelError> {
        if self.loaded().is_some() {
            Ok(ExerciseType::WeightLifting)
        } else if self.reps.is_some() {
            Ok(ExerciseType::BodyWeight)
        } else if self.seconds.is_some() {
            Ok(ExerciseType::Duration)
        } else {
            Err(ModelError::UnknownExerciseType { order: self.order })
        }
    }
}

/// Weights carry at most a few decimals, so products are snapped back to
/// that precision before any truncation or rounding: `8.2 * 15` is 123, not
/// 122.99999999999999.
fn settle(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// `round(weight * 36 / (37 - reps))`, halves rounded away from zero.
fn brzycki(weight: f64, reps: i32) -> Result<Option<i64>, ModelError> {
    if reps <= 0 {
        return Err(ModelError::InvalidReps(reps));
    }
    if reps >= 37 {
        return Ok(None);
    }
    Ok(Some(settle(weight * 36.0 / (37 - reps) as f64).round() as i64))
}

fn sum_present<T: std::iter::Sum<T>>(values: impl Iterator<Item = Option<T>>) -> Option<T> {
    let mut present = values.flatten().peekable();
    present.peek()?;
    Some(present.sum())
}

fn max_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().reduce(f64::max)
}

/// One exercise performed in a workout, holding its sets in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    name: String,
    date: NaiveDateTime,
    sets: Vec<Set>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, date: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            date,
            sets: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn sets(&self) -> &[Set] {
        &self.sets
    }

    pub fn add_set(&mut self, set: Set) {
        self.sets.push(set);
    }

    /// Type of the first set; exercises are assumed not to mix types.
    pub fn exercise_type(&self) -> Result<ExerciseType, ModelError> {
        self.sets
            .first()
            .ok_or_else(|| ModelError::EmptyExercise(self.name.clone()))?
            .exercise_type()
    }

    pub fn total_volume(&self) -> Option<f64> {
        sum_present(self.sets.iter().map(Set::volume)).map(settle)
    }

    /// Volume of the heaviest set.
    pub fn max_volume(&self) -> Option<f64> {
        max_present(self.sets.iter().map(Set::volume))
    }

    /// Best one-rep max over all sets.
    pub fn one_rep_max(&self) -> Result<Option<i64>, ModelError> {
        let mut best = None;
        for set in &self.sets {
            if let Some(orm) = set.one_rep_max()? {
                best = best.max(Some(orm));
            }
        }
        Ok(best)
    }

    pub fn total_reps(&self) -> Option<i64> {
        sum_present(self.sets.iter().map(|s| s.reps.map(i64::from)))
    }

    pub fn max_reps(&self) -> Option<i64> {
        self.sets.iter().filter_map(|s| s.reps).max().map(i64::from)
    }

    pub fn total_seconds(&self) -> Option<i64> {
        sum_present(self.sets.iter().map(|s| s.seconds.map(i64::from)))
    }

    pub fn max_seconds(&self) -> Option<i64> {
        self.sets.iter().filter_map(|s| s.seconds).max().map(i64::from)
    }
}

/// A single training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    date: NaiveDateTime,
    duration_secs: i64,
    exercises: Vec<Exercise>,
}

impl Workout {
    pub fn new(date: NaiveDateTime, duration_secs: i64) -> Self {
        Self {
            date,
            duration_secs,
            exercises: Vec::new(),
        }
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.duration_secs)
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    /// Add a set under `exercise_name`, creating the exercise for
    /// (`exercise_name`, `date`) on first use.
    pub fn add_set(
        &mut self,
        exercise_name: &str,
        date: NaiveDateTime,
        set: Set,
    ) -> Result<(), ModelError> {
        if exercise_name.is_empty() {
            return Err(ModelError::EmptyExerciseName);
        }
        let idx = match self
            .exercises
            .iter()
            .position(|e| e.name == exercise_name && e.date == date)
        {
            Some(idx) => idx,
            None => {
                self.exercises.push(Exercise::new(exercise_name, date));
                self.exercises.len() - 1
            }
        };
        self.exercises[idx].add_set(set);
        Ok(())
    }
}

/// Workouts of one routine (e.g. "Push" or "Fullbody A") over a period of time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    name: String,
    from: NaiveDateTime,
    to: NaiveDateTime,
    workouts: Vec<Workout>,
}

impl WorkoutPlan {
    pub fn new(name: impl Into<String>, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            from,
            to,
            workouts: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from(&self) -> NaiveDateTime {
        self.from
    }

    /// Date of the latest workout, never earlier than the initial end date.
    pub fn to(&self) -> NaiveDateTime {
        self.to
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    /// Name and date range, e.g. `Push (Oct 23-Dec 23)`.
    pub fn display_name(&self) -> String {
        format!(
            "{} ({}-{})",
            self.name,
            self.from.format("%b %y"),
            self.to.format("%b %y")
        )
    }

    pub fn add_workout(&mut self, workout: Workout) {
        if workout.date > self.to {
            self.to = workout.date;
        }
        self.workouts.push(workout);
    }
}
