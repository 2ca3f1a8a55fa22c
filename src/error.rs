//! Error type shared by the loading pipeline, the record store and the
//! chart renderer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradebookError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} line {line}: expected at least {expected} columns, found {found}")]
    MalformedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("{path} line {line}: invalid score {value:?}")]
    InvalidScore {
        path: PathBuf,
        line: u64,
        value: String,
    },

    #[error("{path} line {line}: unknown student id {sid}")]
    UnknownStudent { path: PathBuf, line: u64, sid: String },

    #[error("duplicate student id {0} in roster")]
    DuplicateStudent(String),

    #[error("{path} line {line}: second {subject} row for student {sid}")]
    DuplicateScore {
        path: PathBuf,
        line: u64,
        subject: String,
        sid: String,
    },

    #[error("unknown subject {0:?}")]
    UnknownSubject(String),

    #[error("unexpected grade file {path}: unknown subject {subject:?}")]
    UnexpectedGradeFile { path: PathBuf, subject: String },

    #[error("student {sid} has no {subject} average")]
    MissingCoreSubject { sid: String, subject: String },

    #[error("no core subjects configured")]
    NoCoreSubjects,

    #[error("no student with id {0}")]
    StudentNotFound(String),

    #[error("unknown school category {0:?}")]
    UnknownSchool(String),

    #[error("unsupported chart format {0:?}, expected pdf, png or jpg")]
    UnsupportedChartFormat(String),

    #[error("chart rendering failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF chart failed: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, GradebookError>;

impl GradebookError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GradebookError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        GradebookError::Csv {
            path: path.into(),
            source,
        }
    }
}
