//! Rebuild a training history from a Strong workout export and project it for charts.
//!
//! Data flows one way: export text → [`import::WorkoutRow`]s → [`session::StrongData`]
//! (plans, workouts, exercises, sets) → [`plotting::ExerciseChartModel`]s.

pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod model;
pub mod plotting;
pub mod session;

pub use config::Settings;
pub use error::{ImportError, ModelError};
pub use import::{WorkoutRow, import_file, parse_rows};
pub use model::{Exercise, ExerciseType, Set, Workout, WorkoutPlan};
pub use plotting::{ExerciseChartModel, chart_datasets, charts_for_plan};
pub use session::{StrongData, rebuild_session};
