//! Reading the semicolon separated Strong export into flat rows.

use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;

use chrono::NaiveDateTime;
use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// Timestamp format of the `Date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATE: &str = "Date";
const WORKOUT_NAME: &str = "Workout Name";
const EXERCISE_NAME: &str = "Exercise Name";
const SET_ORDER: &str = "Set Order";
const WEIGHT: &str = "Weight (kg)";
const SECONDS: &str = "Seconds";
const REPS: &str = "Reps";
const DURATION: &str = "Duration (sec)";

const REQUIRED_HEADERS: [&str; 8] = [
    DATE,
    WORKOUT_NAME,
    EXERCISE_NAME,
    SET_ORDER,
    WEIGHT,
    SECONDS,
    REPS,
    DURATION,
];

/// A single line of the export file.
///
/// Rows sharing the same `date` belong to one workout. The `set_order` is kept
/// as text because the export also uses that column for markers like `Note`
/// or `Rest Timer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRow {
    pub date: NaiveDateTime,
    pub workout_name: String,
    pub exercise_name: String,
    pub set_order: String,
    /// Weight in kg, absent when the cell is empty.
    pub weight: Option<f64>,
    pub seconds: Option<f64>,
    pub reps: Option<i32>,
    /// Total duration of the workout in seconds.
    pub workout_duration: i64,
}

/// Column positions resolved once from the header line.
struct Columns {
    date: usize,
    workout_name: usize,
    exercise_name: usize,
    set_order: usize,
    weight: usize,
    seconds: usize,
    reps: usize,
    duration: usize,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self, ImportError> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        for (i, name) in header.iter().enumerate() {
            if REQUIRED_HEADERS.iter().any(|h| *h == name) && index.insert(name, i).is_some() {
                return Err(ImportError::DuplicateHeader(name.to_string()));
            }
        }
        let find = |name: &'static str| {
            index
                .get(name)
                .copied()
                .ok_or(ImportError::MissingHeader(name))
        };
        Ok(Self {
            date: find(DATE)?,
            workout_name: find(WORKOUT_NAME)?,
            exercise_name: find(EXERCISE_NAME)?,
            set_order: find(SET_ORDER)?,
            weight: find(WEIGHT)?,
            seconds: find(SECONDS)?,
            reps: find(REPS)?,
            duration: find(DURATION)?,
        })
    }

    fn read_row(&self, record: &StringRecord, line: u64) -> Result<WorkoutRow, ImportError> {
        Ok(WorkoutRow {
            date: read_date(record, self.date, DATE, line)?,
            workout_name: read_string(record, self.workout_name, WORKOUT_NAME, line)?,
            exercise_name: read_string(record, self.exercise_name, EXERCISE_NAME, line)?,
            set_order: read_string(record, self.set_order, SET_ORDER, line)?,
            weight: read_decimal(record, self.weight, WEIGHT, line)?,
            seconds: read_decimal(record, self.seconds, SECONDS, line)?,
            reps: read_int(record, self.reps, REPS, line)?,
            workout_duration: read_int(record, self.duration, DURATION, line)?.unwrap_or(0),
        })
    }
}

fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

fn parse_error(line: u64, field: &'static str, value: &str) -> ImportError {
    ImportError::FieldParse {
        line,
        field,
        value: value.to_string(),
    }
}

fn read_string(
    record: &StringRecord,
    index: usize,
    field: &'static str,
    line: u64,
) -> Result<String, ImportError> {
    match cell(record, index) {
        "" => Err(ImportError::RequiredFieldMissing { line, field }),
        value => Ok(value.to_string()),
    }
}

fn read_date(
    record: &StringRecord,
    index: usize,
    field: &'static str,
    line: u64,
) -> Result<NaiveDateTime, ImportError> {
    let value = cell(record, index);
    if value.is_empty() {
        return Err(ImportError::RequiredFieldMissing { line, field });
    }
    NaiveDateTime::parse_from_str(value, DATE_FORMAT).map_err(|_| parse_error(line, field, value))
}

/// Decimal cells always use `.` as separator, whatever the host locale.
fn read_decimal(
    record: &StringRecord,
    index: usize,
    field: &'static str,
    line: u64,
) -> Result<Option<f64>, ImportError> {
    let value = cell(record, index).trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(parse_error(line, field, value)),
    }
}

fn read_int<T: FromStr>(
    record: &StringRecord,
    index: usize,
    field: &'static str,
    line: u64,
) -> Result<Option<T>, ImportError> {
    let value = cell(record, index).trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<T>()
        .map(Some)
        .map_err(|_| parse_error(line, field, value))
}

/// Parse the full text of an export file.
///
/// The first line is the header. An empty text yields no rows; so does a file
/// holding only a header. Any missing header or unparsable cell fails the whole
/// import.
pub fn parse_rows(text: &str) -> Result<Vec<WorkoutRow>, ImportError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = rdr.records();

    let Some(header) = records.next() else {
        return Ok(Vec::new());
    };
    let columns = Columns::from_header(&header?)?;

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        rows.push(columns.read_row(&record, line)?);
    }
    log::info!("Parsed {} rows from export", rows.len());
    Ok(rows)
}

/// Read an export from `reader` to completion and parse it.
pub fn import_file<R: Read>(mut reader: R) -> Result<Vec<WorkoutRow>, ImportError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_rows(&text)
}

/// Format a user facing message after successfully loading an export file.
pub fn format_load_message(rows: usize, filename: &str) -> String {
    format!("Loaded {} rows from {}", rows, filename)
}
