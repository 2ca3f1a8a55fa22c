//! Data types used by the grading pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::GradebookError;
use crate::grading::school::School;

/// A school subject, derived from a `grades_<subject>.csv` file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Deutsch,
    Mathematik,
    Hsu,
    Sport,
    Musik,
    Englisch,
}

impl Subject {
    /// Column order of the subject averages in the exported CSV.
    pub const EXPORT_ORDER: [Subject; 6] = [
        Subject::Deutsch,
        Subject::Mathematik,
        Subject::Hsu,
        Subject::Sport,
        Subject::Musik,
        Subject::Englisch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Deutsch => "deutsch",
            Subject::Mathematik => "mathematik",
            Subject::Hsu => "hsu",
            Subject::Sport => "sport",
            Subject::Musik => "musik",
            Subject::Englisch => "englisch",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = GradebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Subject::EXPORT_ORDER
            .into_iter()
            .find(|subject| subject.as_str() == lowered)
            .ok_or_else(|| GradebookError::UnknownSubject(s.to_string()))
    }
}

/// Identity fields plus the subject averages collected so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    pub(crate) last_name: String,
    pub(crate) first_name: String,
    pub(crate) sid: String,
    pub(crate) email: String,
    pub(crate) section: String,
    pub(crate) scores: BTreeMap<Subject, f64>,
}

impl Student {
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Uppercased student ID.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// Rounded average for `subject`, if a grade file for it listed this student.
    pub fn score(&self, subject: Subject) -> Option<f64> {
        self.scores.get(&subject).copied()
    }

    pub fn scores(&self) -> &BTreeMap<Subject, f64> {
        &self.scores
    }
}

/// A finalized student: identity, subject averages, core average and placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    #[serde(flatten)]
    pub(crate) student: Student,
    pub(crate) average_core: f64,
    pub(crate) school: School,
}

impl StudentRecord {
    pub fn student(&self) -> &Student {
        &self.student
    }

    pub fn average_core(&self) -> f64 {
        self.average_core
    }

    pub fn school(&self) -> School {
        self.school
    }
}

impl std::ops::Deref for StudentRecord {
    type Target = Student;

    fn deref(&self) -> &Student {
        &self.student
    }
}
