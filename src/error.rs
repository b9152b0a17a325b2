//! Error types for importing an export file and rebuilding the training history.

use thiserror::Error;

/// Failures while turning the raw export text into [`crate::import::WorkoutRow`]s.
///
/// Any of these aborts the whole import; no partially parsed rows are returned.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read export: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed export: {0}")]
    Csv(#[from] csv::Error),

    #[error("header '{0}' not found in export file")]
    MissingHeader(&'static str),

    #[error("header '{0}' appears more than once")]
    DuplicateHeader(String),

    #[error("line {line}: cannot parse {field} from '{value}'")]
    FieldParse {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: {field} not set")]
    RequiredFieldMissing { line: u64, field: &'static str },
}

/// Failures of the workout model: rebuilding a session or reading derived metrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("no data items to process")]
    NoRecords,

    #[error("unknown exercise type for set {order}: no weight, reps or seconds")]
    UnknownExerciseType { order: i32 },

    #[error("reps must be greater than zero, got {0}")]
    InvalidReps(i32),

    #[error("exercise name must not be empty")]
    EmptyExerciseName,

    #[error("exercise '{0}' has no sets")]
    EmptyExercise(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_field() {
        let err = ImportError::RequiredFieldMissing {
            line: 3,
            field: "Exercise Name",
        };
        assert_eq!(err.to_string(), "line 3: Exercise Name not set");

        let err = ImportError::MissingHeader("Date");
        assert_eq!(err.to_string(), "header 'Date' not found in export file");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: ImportError = io.into();
        assert!(matches!(err, ImportError::Io(_)));
    }
}
