use crate::{plotting::ExerciseChartModel, session::StrongData};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Pretty-printed JSON at `path`, creating missing parent directories.
pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(
    value: &T,
    path: P,
) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

/// Header line from the field names of `T`, then one line per record.
pub fn write_csv<T: Serialize>(writer: impl Write, records: &[T]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in records {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(Into::into)
}

/// Chart models per exercise, as produced by [`crate::plotting::charts_for_plan`].
pub fn save_charts_json<P: AsRef<Path>>(
    path: P,
    charts: &[(String, Vec<ExerciseChartModel>)],
) -> std::io::Result<()> {
    write_json(charts, path)
}

/// One CSV line per exercise and day. Sets are left out.
pub fn save_charts_csv<P: AsRef<Path>>(
    path: P,
    charts: &[(String, Vec<ExerciseChartModel>)],
) -> csv::Result<()> {
    #[derive(Serialize)]
    struct Row<'a> {
        exercise: &'a str,
        date: NaiveDateTime,
        total_volume: Option<i64>,
        weight_max: Option<i64>,
        one_rep_max: Option<i64>,
        total_reps: Option<i64>,
        max_reps: Option<i64>,
        total_seconds: Option<i64>,
        max_seconds: Option<i64>,
        sets: usize,
    }
    let rows: Vec<Row> = charts
        .iter()
        .flat_map(|(_, models)| models)
        .map(|m| Row {
            exercise: &m.name,
            date: m.date,
            total_volume: m.total_volume,
            weight_max: m.weight_max,
            one_rep_max: m.one_rep_max,
            total_reps: m.total_reps,
            max_reps: m.max_reps,
            total_seconds: m.total_seconds,
            max_seconds: m.max_seconds,
            sets: m.sets.len(),
        })
        .collect();
    write_csv(std::fs::File::create(path)?, &rows)
}

pub fn save_session_json<P: AsRef<Path>>(path: P, data: &StrongData) -> std::io::Result<()> {
    write_json(data, path)
}
